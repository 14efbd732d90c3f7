use std::{
    error::Error,
    fmt::{self, Debug, Display, Formatter},
    process::{ExitCode, Termination},
};

pub type Result<T> = std::result::Result<T, ForthError>;

/// Which of the interpreter's two stacks an over/underflow occurred on.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum StackId {
    Parameter,
    Return,
}

impl Display for StackId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            StackId::Parameter => write!(f, "Stack"),
            StackId::Return => write!(f, "Return stack"),
        }
    }
}

/// Any error that can occur while the kernel is interpreting source text.
///
/// Most variants are recoverable: the REPL prints the message, aborts the
/// current input line and keeps running.  `DictionaryExhausted` and
/// `MalformedInstructionPointer` indicate the kernel's foundations have
/// failed and are fatal.
#[derive(Clone)]
pub enum ForthError {
    /// A token that is neither a number nor a resolvable dictionary entry.
    UnknownWord(String),

    /// Popping or peeking an empty stack.
    StackUnderflow(StackId),

    /// Pushing onto a full stack.
    StackOverflow(StackId),

    /// `/` or `MOD` with a zero divisor.
    DivisionByZero,

    /// A memory word was handed an address outside the arena.
    InvalidAddress(i64),

    /// An input line longer than the fixed line buffer.
    LineTooLong(usize),

    /// A definition name longer than an entry's length byte can record.
    NameTooLong(String),

    /// An include file that could not be opened or read.
    BadInclude(String, String),

    /// Nested includes past the fixed source-stack limit.
    IncludeDepthExceeded,

    /// Any other I/O failure while reading input.
    Io(String),

    /// The dictionary arena is full.  Fatal.
    DictionaryExhausted,

    /// The instruction pointer left the arena, lost cell alignment, or
    /// fetched a cell that is not a registered opcode.  Fatal.
    MalformedInstructionPointer(String),
}

impl ForthError {
    /// Fatal errors terminate the process; everything else aborts the
    /// current line and the REPL continues.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ForthError::DictionaryExhausted | ForthError::MalformedInstructionPointer(_)
        )
    }
}

impl Error for ForthError {}

impl Display for ForthError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ForthError::UnknownWord(token) => write!(f, "Word not found: {}", token),
            ForthError::StackUnderflow(id) => write!(f, "{} underflow.", id),
            ForthError::StackOverflow(id) => write!(f, "{} overflow.", id),
            ForthError::DivisionByZero => write!(f, "Division by zero."),
            ForthError::InvalidAddress(addr) => {
                write!(f, "Memory address {} out of range.", addr)
            }
            ForthError::LineTooLong(len) => {
                write!(f, "Input line of {} bytes is too long.", len)
            }
            ForthError::NameTooLong(name) => write!(f, "Word name too long: {}", name),
            ForthError::BadInclude(path, reason) => {
                write!(f, "Unable to include {}: {}", path, reason)
            }
            ForthError::IncludeDepthExceeded => write!(f, "Includes nested too deeply."),
            ForthError::Io(error) => write!(f, "I/O error: {}", error),
            ForthError::DictionaryExhausted => write!(f, "Dictionary space exhausted."),
            ForthError::MalformedInstructionPointer(detail) => {
                write!(f, "Malformed instruction pointer: {}", detail)
            }
        }
    }
}

impl Debug for ForthError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// When returned from main, convert the error result to an operating system
/// exit code.
impl Termination for ForthError {
    fn report(self) -> ExitCode {
        eprintln!("Error: {}", self);
        ExitCode::FAILURE
    }
}

impl From<std::io::Error> for ForthError {
    fn from(error: std::io::Error) -> ForthError {
        ForthError::Io(error.to_string())
    }
}
