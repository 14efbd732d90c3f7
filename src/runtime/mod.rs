/// All of the core data structures used by the kernel: the stacks, the
/// memory arena and the dictionary.
pub mod data_structures;

/// Module for defining the built-in native words that are available to the
/// interpreter.
pub mod built_ins;

/// Module for defining the kernel's error reporting.
pub mod error;

/// Module for defining the core functionality of the interpreter: the
/// outer interpreter, the compiler and the threaded-code engine.
pub mod interpreter;

/// Module for the interactive and batch drivers built on top of the
/// interpreter.
pub mod repl;
