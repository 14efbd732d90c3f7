use std::io::{self, BufRead, Read};

use sysinfo::System;

use crate::runtime::{
    data_structures::memory::Cell,
    error,
    error::ForthError,
    interpreter::MorthInterpreter,
};

/// Read one byte from standard input, or -1 at end of input.
///
/// Signature: ` -- char`
fn word_key(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let mut byte = [0u8; 1];
    let count = io::stdin().lock().read(&mut byte)?;

    if count == 0 {
        interpreter.push(-1)
    } else {
        interpreter.push(byte[0] as Cell)
    }
}

/// Write the low byte of a value to the output.
///
/// Signature: `char -- `
fn word_emit(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let value = interpreter.pop()?;

    interpreter.write_bytes(&[value as u8])
}

/// Write a byte range from memory to the output.
///
/// Signature: `addr n -- `
fn word_type(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let count = interpreter.pop_offset()?;
    let address = interpreter.pop_offset()?;
    let bytes = interpreter.memory().fetch_bytes(address, count)?.to_vec();

    interpreter.write_bytes(&bytes)
}

/// Read one line from standard input into memory at the given address,
/// storing at most n-1 bytes plus a terminating zero byte.
///
/// Signature: `addr n -- `
fn word_expect(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let count = interpreter.pop_offset()?;
    let address = interpreter.pop_offset()?;

    if count == 0 {
        return Ok(());
    }

    let mut line = Vec::new();
    io::stdin().lock().read_until(b'\n', &mut line)?;

    let stored = line.len().min(count - 1);

    interpreter.memory_mut().store_bytes(address, &line[..stored])?;
    interpreter.memory_mut().store_byte(address + stored, 0)
}

/// Print the top value as a signed decimal number followed by one space.
///
/// Signature: `n -- `
fn word_dot(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let value = interpreter.pop()?;
    let text = format!("{} ", value);

    interpreter.write_str(&text)
}

/// Print the stack depth and contents, bottom first, without disturbing
/// them.
///
/// Signature: ` -- `
fn word_dot_s(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let values = interpreter.stack_values().to_vec();
    let mut text = format!("<{}>", values.len());

    for value in values {
        text.push_str(&format!(" {}", value));
    }

    text.push('\n');
    interpreter.write_str(&text)
}

/// Parse the next token as a file path and redirect input to that file
/// until it is exhausted.
///
/// Signature: ` -- `
fn word_include(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let token = match interpreter.next_input_token() {
        Some(token) => token,
        None => {
            return Err(ForthError::BadInclude(
                String::new(),
                "missing file name".to_string(),
            ));
        }
    };

    let text = interpreter.token_text(token)?;
    let path = String::from_utf8_lossy(&text).into_owned();

    interpreter.push_source_file(&path)
}

/// Leave the interpreter loop once the current line finishes.
///
/// Signature: ` -- `
fn word_bye(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    interpreter.stop();
    Ok(())
}

/// Get the size of the process's working set in bytes.
///
/// Signature: ` -- memory-size`
fn word_morth_memory(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let mut system = System::new();

    system.refresh_all();

    let pid = sysinfo::get_current_pid()
        .map_err(|err| ForthError::Io(format!("could not read process pid: {}", err)))?;

    match system.process(pid) {
        Some(process) => interpreter.push(process.memory() as Cell),
        None => Err(ForthError::Io(
            "could not read process memory information".to_string(),
        )),
    }
}

/// Register the input/output words with the given interpreter.
pub fn register_io_words(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    interpreter.add_primitive("KEY", word_key)?;
    interpreter.add_primitive("EMIT", word_emit)?;
    interpreter.add_primitive("TYPE", word_type)?;
    interpreter.add_primitive("EXPECT", word_expect)?;
    interpreter.add_primitive(".", word_dot)?;
    interpreter.add_primitive(".S", word_dot_s)?;
    interpreter.add_primitive("INCLUDE", word_include)?;
    interpreter.add_primitive("BYE", word_bye)?;
    interpreter.add_primitive("MORTH.MEMORY", word_morth_memory)?;

    Ok(())
}
