use crate::{
    lang::tokenizing,
    runtime::{
        data_structures::{
            dictionary::{
                self, WordFlags, FLAG_HIDDEN, FLAG_IMMEDIATE, FLAG_PRIMITIVE,
            },
            memory::{Cell, CELL_BYTES},
        },
        error,
        interpreter::{MorthInterpreter, OP_EXIT, STATE_COMPILING, STATE_INTERPRETING},
    },
};

/// Numeric build stamp pushed by `VERSION` and shown in the startup banner.
pub const VERSION_STAMP: Cell = 20260825;

/// Scan the next whitespace-delimited token from the input line.  At end
/// of line both the address and the length are zero.
///
/// Signature: ` -- addr len | 0 0`
fn word_word(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    match interpreter.next_input_token() {
        Some(token) => {
            interpreter.push(token.start as Cell)?;
            interpreter.push(token.len as Cell)
        }

        None => {
            interpreter.push(0)?;
            interpreter.push(0)
        }
    }
}

/// Collect input up to a delimiter byte.  The delimiter is consumed but
/// not counted.
///
/// Signature: `delim -- addr len`
fn word_parse(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let delimiter = interpreter.pop()?;
    let token = interpreter.parse_input_delimited(delimiter as u8);

    interpreter.push(token.start as Cell)?;
    interpreter.push(token.len as Cell)
}

/// Attempt a signed decimal parse of a string in memory.  On success the
/// value and a zero are pushed; on failure the string is left unchanged so
/// the caller can fall back to dictionary search.
///
/// Signature: `addr len -- n 0 | addr len`
fn word_number(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let length = interpreter.pop_offset()?;
    let address = interpreter.pop_offset()?;
    let text = interpreter.memory().fetch_bytes(address, length)?.to_vec();

    match tokenizing::parse_number(&text) {
        Some(value) => {
            interpreter.push(value)?;
            interpreter.push(0)
        }

        None => {
            interpreter.push(address as Cell)?;
            interpreter.push(length as Cell)
        }
    }
}

/// Resolve a name against the dictionary, newest first, skipping hidden
/// entries.  Pushes the entry offset, or 0 when the name is unknown.
///
/// Signature: `addr len -- entry | 0`
fn word_find(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let length = interpreter.pop_offset()?;
    let address = interpreter.pop_offset()?;
    let name = interpreter.memory().fetch_bytes(address, length)?.to_vec();

    match interpreter.find_word(&name)? {
        Some(entry) => interpreter.push(entry as Cell),
        None => interpreter.push(0),
    }
}

/// Transfer control to a body address, returning here when it exits.
///
/// Signature: `body -- `
fn word_execute(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let target = interpreter.pop()?;
    let resume = interpreter.resume_cell();

    interpreter.rpush(resume)?;
    interpreter.jump_to(target)
}

/// Compile a reference to a dictionary entry into the open definition: a
/// primitive's opcode is inlined, anything else becomes a call.
///
/// Signature: `entry -- `
fn word_compile_comma(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let entry = interpreter.pop_offset()?;

    interpreter.compile_reference(entry)
}

/// Compile the top value as an inline literal.
///
/// Signature: `n -- `
fn word_literal(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let value = interpreter.pop()?;

    interpreter.append_literal(value)
}

/// Parse the next token as a name and begin a new dictionary entry for
/// it.  The new entry is visible and has an empty body.
///
/// Signature: ` -- `
fn word_header(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let name = match interpreter.next_input_token() {
        Some(token) => interpreter.token_text(token)?,
        None => Vec::new(),
    };

    interpreter.create_header(&name, WordFlags::default())?;
    Ok(())
}

/// Append a cell to the dictionary.
///
/// Signature: `n -- `
fn word_comma(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let value = interpreter.pop()?;

    interpreter.memory_mut().append_cell(value)
}

/// Append the low byte of a value to the dictionary.
///
/// Signature: `byte -- `
fn word_char_comma(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let value = interpreter.pop()?;

    interpreter.memory_mut().append_byte(value as u8)
}

/// Append a byte range from memory to the dictionary.
///
/// Signature: `addr len -- `
fn word_string_comma(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let length = interpreter.pop_offset()?;
    let address = interpreter.pop_offset()?;
    let bytes = interpreter.memory().fetch_bytes(address, length)?.to_vec();

    interpreter.memory_mut().append_bytes(&bytes)
}

/// Round the dictionary write position up to the next cell boundary.
///
/// Signature: ` -- `
fn word_align(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    interpreter.memory_mut().align()
}

/// Derive an entry's body address from its header address.
///
/// Signature: `entry -- body`
fn word_to_body(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let entry = interpreter.pop_offset()?;
    let body = dictionary::entry_body(interpreter.memory(), entry)?;

    interpreter.push(body as Cell)
}

/// Derive the address of an entry's name-length byte.
///
/// Signature: `entry -- caddr`
fn word_to_count(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let entry = interpreter.pop_offset()?;

    interpreter.push(dictionary::entry_count_offset(entry) as Cell)
}

/// Derive the address of an entry's flags byte.
///
/// Signature: `entry -- faddr`
fn word_to_flags(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let entry = interpreter.pop_offset()?;

    interpreter.push(dictionary::entry_flags_offset(entry) as Cell)
}

/// Expand a counted string: the address of a length byte becomes the
/// address of the first text byte plus the length.
///
/// Signature: `caddr -- addr len`
fn word_count(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let address = interpreter.pop_offset()?;
    let length = interpreter.memory().fetch_byte(address)?;

    interpreter.push((address + 1) as Cell)?;
    interpreter.push(length as Cell)
}

/// Push the dictionary's next free address.
///
/// Signature: ` -- addr`
fn word_here(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let here = interpreter.memory().here() as Cell;

    interpreter.push(here)
}

/// Push the newest dictionary entry, hidden or not.
///
/// Signature: ` -- entry`
fn word_latest(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let latest = interpreter.dictionary().latest() as Cell;

    interpreter.push(latest)
}

/// Push the mode flag: 0 while interpreting, -1 while compiling.
///
/// Signature: ` -- flag`
fn word_state(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let state = interpreter.state();

    interpreter.push(state)
}

/// Switch to interpret mode.  Immediate, so it takes effect inside a
/// definition.
///
/// Signature: ` -- `
fn word_lbrac(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    interpreter.set_state(STATE_INTERPRETING);
    Ok(())
}

/// Switch to compile mode.
///
/// Signature: ` -- `
fn word_rbrac(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    interpreter.set_state(STATE_COMPILING);
    Ok(())
}

/// Begin a colon definition: parse the name, create a hidden entry for it
/// and enter compile mode.  The entry stays hidden until `;` so that the
/// name still resolves to its previous definition inside the body.
///
/// Signature: ` -- `
fn word_colon(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let name = match interpreter.next_input_token() {
        Some(token) => interpreter.token_text(token)?,
        None => Vec::new(),
    };

    interpreter.create_header(&name, WordFlags::default().hidden())?;
    interpreter.set_state(STATE_COMPILING);

    Ok(())
}

/// End a colon definition: compile the return, reveal the entry and leave
/// compile mode.
///
/// Signature: ` -- `
fn word_semicolon(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    interpreter.memory_mut().append_cell(OP_EXIT)?;

    let entry = interpreter.dictionary().latest();

    if entry != 0 {
        let mut flags = dictionary::entry_flags(interpreter.memory(), entry)?;
        flags.hidden = false;
        dictionary::entry_set_flags(interpreter.memory_mut(), entry, flags)?;
    }

    interpreter.set_state(STATE_INTERPRETING);
    Ok(())
}

/// Mark the newest definition as immediate.
///
/// Signature: ` -- `
fn word_immediate(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let entry = interpreter.dictionary().latest();

    if entry != 0 {
        let mut flags = dictionary::entry_flags(interpreter.memory(), entry)?;
        flags.immediate = true;
        dictionary::entry_set_flags(interpreter.memory_mut(), entry, flags)?;
    }

    Ok(())
}

/// Toggle an entry's hidden flag, removing it from or returning it to
/// dictionary search.
///
/// Signature: `entry -- `
fn word_hidden(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let entry = interpreter.pop_offset()?;
    let mut flags = dictionary::entry_flags(interpreter.memory(), entry)?;

    flags.hidden = !flags.hidden;
    dictionary::entry_set_flags(interpreter.memory_mut(), entry, flags)
}

/// Abandon the current line: clear the stacks, force interpret mode and
/// discard all pending input.
///
/// Signature: ` -- `
fn word_abort(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    interpreter.abort_line();
    Ok(())
}

/// List the visible dictionary names, newest first.
///
/// Signature: ` -- `
fn word_words(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    let mut names = Vec::new();
    let mut entry = interpreter.dictionary().latest();

    while entry != 0 {
        let flags = dictionary::entry_flags(interpreter.memory(), entry)?;

        if !flags.hidden {
            let name = dictionary::entry_name(interpreter.memory(), entry)?;
            names.push(String::from_utf8_lossy(name).into_owned());
        }

        entry = dictionary::entry_link(interpreter.memory(), entry)?;
    }

    let mut text = names.join(" ");
    text.push('\n');

    interpreter.write_str(&text)
}

/// Push the size of a cell in bytes.
///
/// Signature: ` -- 8`
fn word_cell(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    interpreter.push(CELL_BYTES as Cell)
}

/// Push the immediate flag bit.
///
/// Signature: ` -- 1`
fn word_flag_immediate(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    interpreter.push(FLAG_IMMEDIATE as Cell)
}

/// Push the hidden flag bit.
///
/// Signature: ` -- 2`
fn word_flag_hidden(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    interpreter.push(FLAG_HIDDEN as Cell)
}

/// Push the primitive flag bit.
///
/// Signature: ` -- 4`
fn word_flag_primitive(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    interpreter.push(FLAG_PRIMITIVE as Cell)
}

/// Push the numeric build stamp.
///
/// Signature: ` -- n`
fn word_version(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    interpreter.push(VERSION_STAMP)
}

/// Register the parsing, compiling and dictionary words with the given
/// interpreter.
pub fn register_word_words(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    interpreter.add_primitive("WORD", word_word)?;
    interpreter.add_primitive("PARSE", word_parse)?;
    interpreter.add_primitive("NUMBER", word_number)?;
    interpreter.add_primitive("FIND", word_find)?;
    interpreter.add_primitive("EXECUTE", word_execute)?;
    interpreter.add_primitive("COMPILE,", word_compile_comma)?;
    interpreter.add_immediate_primitive("LITERAL", word_literal)?;
    interpreter.add_primitive("HEADER", word_header)?;
    interpreter.add_primitive(",", word_comma)?;
    interpreter.add_primitive("C,", word_char_comma)?;
    interpreter.add_primitive("S,", word_string_comma)?;
    interpreter.add_primitive("ALIGN", word_align)?;
    interpreter.add_primitive(">BODY", word_to_body)?;
    interpreter.add_primitive(">COUNT", word_to_count)?;
    interpreter.add_primitive(">FLAGS", word_to_flags)?;
    interpreter.add_primitive("COUNT", word_count)?;
    interpreter.add_primitive("HERE", word_here)?;
    interpreter.add_primitive("LATEST", word_latest)?;
    interpreter.add_primitive("STATE", word_state)?;
    interpreter.add_immediate_primitive("[", word_lbrac)?;
    interpreter.add_primitive("]", word_rbrac)?;
    interpreter.add_primitive(":", word_colon)?;
    interpreter.add_immediate_primitive(";", word_semicolon)?;
    interpreter.add_primitive("IMMEDIATE", word_immediate)?;
    interpreter.add_primitive("HIDDEN", word_hidden)?;
    interpreter.add_primitive("ABORT", word_abort)?;
    interpreter.add_primitive("WORDS", word_words)?;
    interpreter.add_primitive("CELL", word_cell)?;
    interpreter.add_primitive("FLAG_IMMEDIATE", word_flag_immediate)?;
    interpreter.add_primitive("FLAG_HIDDEN", word_flag_hidden)?;
    interpreter.add_primitive("FLAG_PRIMITIVE", word_flag_primitive)?;
    interpreter.add_primitive("VERSION", word_version)?;

    Ok(())
}
