use crate::runtime::{
    data_structures::memory::Cell,
    error,
    interpreter::MorthInterpreter,
};

/// Duplicate the top value on the parameter stack.
///
/// Signature: `value -- value value`
fn word_dup(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let value = interpreter.peek()?;

    interpreter.push(value)
}

/// Drop the top value on the parameter stack.
///
/// Signature: `value -- `
fn word_drop(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let _ = interpreter.pop()?;

    Ok(())
}

/// Copy the second value to the top of the stack.
///
/// Signature: `a b -- a b a`
fn word_over(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(a)?;
    interpreter.push(b)?;
    interpreter.push(a)
}

/// Swap the top two values on the stack.
///
/// Signature: `a b -- b a`
fn word_swap(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(b)?;
    interpreter.push(a)
}

/// Rotate the third value to the top of the stack.
///
/// Signature: `a b c -- b c a`
fn word_rot(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let c = interpreter.pop()?;
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(b)?;
    interpreter.push(c)?;
    interpreter.push(a)
}

/// Move the top value to the return stack.  Only balanced use within a
/// single definition is meaningful; a value left behind is consumed by the
/// definition's return.
///
/// Signature: `a -- ` and on the return stack ` -- a`
fn word_to_r(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let value = interpreter.pop()?;

    interpreter.rpush(value)
}

/// Move the top of the return stack back to the parameter stack.
///
/// Signature: ` -- a` and on the return stack `a -- `
fn word_r_from(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let value = interpreter.rpop()?;

    interpreter.push(value)
}

/// Get the depth of the parameter stack before calling this word.
///
/// Signature: ` -- depth`
fn word_depth(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let depth = interpreter.stack_depth() as Cell;

    interpreter.push(depth)
}

/// Register the stack manipulation words with the given interpreter.
pub fn register_stack_words(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    interpreter.add_primitive("DUP", word_dup)?;
    interpreter.add_primitive("DROP", word_drop)?;
    interpreter.add_primitive("OVER", word_over)?;
    interpreter.add_primitive("SWAP", word_swap)?;
    interpreter.add_primitive("ROT", word_rot)?;
    interpreter.add_primitive(">R", word_to_r)?;
    interpreter.add_primitive("R>", word_r_from)?;
    interpreter.add_primitive("DEPTH", word_depth)?;

    Ok(())
}
