use crate::runtime::{error, error::ForthError, interpreter::MorthInterpreter};

/// Add the top two values.  All arithmetic here wraps like the native
/// signed machine word.
///
/// Signature: `a b -- a+b`
fn word_add(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(a.wrapping_add(b))
}

/// Subtract the top value from the second.
///
/// Signature: `a b -- a-b`
fn word_subtract(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(a.wrapping_sub(b))
}

/// Multiply the top two values.
///
/// Signature: `a b -- a*b`
fn word_multiply(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(a.wrapping_mul(b))
}

/// Divide the second value by the top, truncating toward zero.
///
/// Signature: `a b -- a/b`
fn word_divide(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    if b == 0 {
        return Err(ForthError::DivisionByZero);
    }

    interpreter.push(a.wrapping_div(b))
}

/// Remainder of dividing the second value by the top; the sign follows the
/// host's truncating division.
///
/// Signature: `a b -- a%b`
fn word_modulo(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    if b == 0 {
        return Err(ForthError::DivisionByZero);
    }

    interpreter.push(a.wrapping_rem(b))
}

/// Shift the top value left one bit.
///
/// Signature: `a -- a*2`
fn word_two_star(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let value = interpreter.pop()?;

    interpreter.push(value.wrapping_shl(1))
}

/// Arithmetic shift of the top value right one bit.
///
/// Signature: `a -- a/2`
fn word_two_slash(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let value = interpreter.pop()?;

    interpreter.push(value >> 1)
}

/// Bitwise complement of the top value.
///
/// Signature: `a -- ~a`
fn word_not(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let value = interpreter.pop()?;

    interpreter.push(!value)
}

/// Bitwise and of the top two values.
///
/// Signature: `a b -- a&b`
fn word_and(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(a & b)
}

/// Bitwise or of the top two values.
///
/// Signature: `a b -- a|b`
fn word_or(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(a | b)
}

/// Bitwise exclusive or of the top two values.
///
/// Signature: `a b -- a^b`
fn word_xor(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(a ^ b)
}

/// Is the second value less than the top?  Comparisons push -1 for true
/// and 0 for false.
///
/// Signature: `a b -- flag`
fn word_less(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(if a < b { -1 } else { 0 })
}

/// Are the top two values equal?
///
/// Signature: `a b -- flag`
fn word_equals(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(if a == b { -1 } else { 0 })
}

/// Is the second value greater than the top?
///
/// Signature: `a b -- flag`
fn word_greater(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    interpreter.push(if a > b { -1 } else { 0 })
}

/// Register the arithmetic, logic and comparison words with the given
/// interpreter.
pub fn register_arithmetic_words(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    interpreter.add_primitive("+", word_add)?;
    interpreter.add_primitive("-", word_subtract)?;
    interpreter.add_primitive("*", word_multiply)?;
    interpreter.add_primitive("/", word_divide)?;
    interpreter.add_primitive("MOD", word_modulo)?;
    interpreter.add_primitive("2*", word_two_star)?;
    interpreter.add_primitive("2/", word_two_slash)?;
    interpreter.add_primitive("NOT", word_not)?;
    interpreter.add_primitive("AND", word_and)?;
    interpreter.add_primitive("OR", word_or)?;
    interpreter.add_primitive("XOR", word_xor)?;
    interpreter.add_primitive("<", word_less)?;
    interpreter.add_primitive("=", word_equals)?;
    interpreter.add_primitive(">", word_greater)?;

    Ok(())
}
