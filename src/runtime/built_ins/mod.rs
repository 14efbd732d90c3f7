use crate::runtime::{error, interpreter::MorthInterpreter};

/// Words that shuffle the parameter and return stacks.
pub mod stack_words;

/// Arithmetic, bitwise and comparison words.
pub mod arithmetic_words;

/// Words that read and write the memory arena.
pub mod memory_words;

/// Words that perform I/O operations.
pub mod io_words;

/// Words that parse, search and extend the dictionary.
pub mod word_words;

/// Register the complete built-in word set with the given interpreter.
pub fn register_built_in_words(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    stack_words::register_stack_words(interpreter)?;
    arithmetic_words::register_arithmetic_words(interpreter)?;
    memory_words::register_memory_words(interpreter)?;
    io_words::register_io_words(interpreter)?;
    word_words::register_word_words(interpreter)?;

    Ok(())
}
