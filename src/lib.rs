/// Module for managing source text: tokenization and number parsing.
pub mod lang;

/// Module for the runtime and the data structures used by the interpreter.
/// As well as the interpreter itself.
pub mod runtime;
