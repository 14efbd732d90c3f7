use crate::runtime::{
    data_structures::memory::Cell,
    error::{self, ForthError, StackId},
};

/// A fixed-capacity stack of cells.
///
/// Both of the interpreter's stacks are instances of this type.  The
/// capacity is fixed at construction and every operation is bounds checked:
/// exceeding either bound is reported as a recoverable error naming the
/// stack, never as silent memory corruption.
pub struct Stack {
    values: Vec<Cell>,
    capacity: usize,
    id: StackId,
}

impl Stack {
    /// Create an empty stack with the given fixed capacity.
    pub fn new(capacity: usize, id: StackId) -> Stack {
        Stack {
            values: Vec::with_capacity(capacity),
            capacity,
            id,
        }
    }

    /// Push a value, failing if the stack is at capacity.
    pub fn push(&mut self, value: Cell) -> error::Result<()> {
        if self.values.len() >= self.capacity {
            return Err(ForthError::StackOverflow(self.id));
        }

        self.values.push(value);
        Ok(())
    }

    /// Pop the top value, failing if the stack is empty.
    pub fn pop(&mut self) -> error::Result<Cell> {
        self.values
            .pop()
            .ok_or(ForthError::StackUnderflow(self.id))
    }

    /// Read the top value without removing it.
    pub fn peek(&self) -> error::Result<Cell> {
        self.values
            .last()
            .copied()
            .ok_or(ForthError::StackUnderflow(self.id))
    }

    pub fn depth(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drop everything.  Used by the abort path and the per-line return
    /// stack reset.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// The values from bottom to top, for stack dumps and tests.
    pub fn as_slice(&self) -> &[Cell] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_stack() -> Stack {
        Stack::new(3, StackId::Parameter)
    }

    #[test]
    fn push_pop_round_trip() {
        let mut stack = small_stack();

        stack.push(1).unwrap();
        stack.push(2).unwrap();

        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.pop().unwrap(), 2);
        assert_eq!(stack.pop().unwrap(), 1);
        assert!(stack.is_empty());
    }

    #[test]
    fn underflow_is_reported() {
        let mut stack = small_stack();

        assert!(matches!(
            stack.pop(),
            Err(ForthError::StackUnderflow(StackId::Parameter))
        ));
        assert!(matches!(
            stack.peek(),
            Err(ForthError::StackUnderflow(StackId::Parameter))
        ));
    }

    #[test]
    fn overflow_is_reported() {
        let mut stack = small_stack();

        stack.push(1).unwrap();
        stack.push(2).unwrap();
        stack.push(3).unwrap();

        assert!(matches!(
            stack.push(4),
            Err(ForthError::StackOverflow(StackId::Parameter))
        ));

        // The failed push must not have disturbed the contents.
        assert_eq!(stack.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn peek_leaves_top_in_place() {
        let mut stack = small_stack();

        stack.push(42).unwrap();

        assert_eq!(stack.peek().unwrap(), 42);
        assert_eq!(stack.depth(), 1);
    }

    #[test]
    fn return_stack_errors_name_the_return_stack() {
        let mut stack = Stack::new(1, StackId::Return);

        let error = stack.pop().unwrap_err();
        assert_eq!(format!("{}", error), "Return stack underflow.");
    }
}
