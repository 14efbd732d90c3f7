use crate::runtime::{
    data_structures::memory::{Cell, CELL_BYTES},
    error,
    error::ForthError,
    interpreter::MorthInterpreter,
};

/// Fetch the cell stored at an address.
///
/// Signature: `addr -- n`
fn word_fetch(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let address = interpreter.pop_offset()?;
    let value = interpreter.memory().fetch_cell(address)?;

    interpreter.push(value)
}

/// Store a cell at an address.
///
/// Signature: `n addr -- `
fn word_store(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let address = interpreter.pop_offset()?;
    let value = interpreter.pop()?;

    interpreter.memory_mut().store_cell(address, value)
}

/// Fetch the byte stored at an address.
///
/// Signature: `addr -- byte`
fn word_char_fetch(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let address = interpreter.pop_offset()?;
    let value = interpreter.memory().fetch_byte(address)?;

    interpreter.push(value as Cell)
}

/// Store the low byte of a value at an address.
///
/// Signature: `byte addr -- `
fn word_char_store(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let address = interpreter.pop_offset()?;
    let value = interpreter.pop()?;

    interpreter.memory_mut().store_byte(address, value as u8)
}

/// Add a value to the cell stored at an address.
///
/// Signature: `n addr -- `
fn word_add_store(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let address = interpreter.pop_offset()?;
    let value = interpreter.pop()?;
    let current = interpreter.memory().fetch_cell(address)?;

    interpreter
        .memory_mut()
        .store_cell(address, current.wrapping_add(value))
}

/// Copy cells from a source address to a destination address.  The copy is
/// safe for overlapping regions.
///
/// Signature: `src dst n -- `
fn word_move(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let count = interpreter.pop_offset()?;
    let destination = interpreter.pop_offset()?;
    let source = interpreter.pop_offset()?;

    let bytes = count
        .checked_mul(CELL_BYTES)
        .ok_or(ForthError::InvalidAddress(count as Cell))?;

    interpreter.memory_mut().copy_bytes(source, destination, bytes)
}

/// Copy bytes from a source address to a destination address.  The copy is
/// safe for overlapping regions.
///
/// Signature: `src dst n -- `
fn word_char_move(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let count = interpreter.pop_offset()?;
    let destination = interpreter.pop_offset()?;
    let source = interpreter.pop_offset()?;

    interpreter.memory_mut().copy_bytes(source, destination, count)
}

/// Fill a byte range with a value.
///
/// Signature: `addr n byte -- `
fn word_fill(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let value = interpreter.pop()?;
    let count = interpreter.pop_offset()?;
    let address = interpreter.pop_offset()?;

    interpreter
        .memory_mut()
        .fill_bytes(address, count, value as u8)
}

/// Print a hex and ASCII listing of a byte range, eight bytes per row.  A
/// trailing partial row is printed without the ASCII gutter.
///
/// Signature: `addr n -- `
fn word_dump(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let count = interpreter.pop_offset()?;
    let address = interpreter.pop_offset()?;
    let bytes = interpreter.memory().fetch_bytes(address, count)?.to_vec();

    let mut text = String::new();
    let mut row_start = 0;

    for (index, byte) in bytes.iter().enumerate() {
        text.push_str(&format!("{:02x} ", byte));

        if index - row_start >= 7 {
            for printed in &bytes[row_start..=index] {
                let shown = if (b' '..b'~').contains(printed) {
                    *printed as char
                } else {
                    '.'
                };
                text.push(shown);
            }

            text.push('\n');
            row_start = index + 1;
        }
    }

    interpreter.write_str(&text)
}

/// Register the raw memory access words with the given interpreter.
pub fn register_memory_words(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    interpreter.add_primitive("@", word_fetch)?;
    interpreter.add_primitive("!", word_store)?;
    interpreter.add_primitive("C@", word_char_fetch)?;
    interpreter.add_primitive("C!", word_char_store)?;
    interpreter.add_primitive("+!", word_add_store)?;
    interpreter.add_primitive("MOVE", word_move)?;
    interpreter.add_primitive("CMOVE", word_char_move)?;
    interpreter.add_primitive("FILL", word_fill)?;
    interpreter.add_primitive("DUMP", word_dump)?;

    Ok(())
}
