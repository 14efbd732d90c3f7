use crate::runtime::{data_structures::memory::Cell, error};

pub mod morth_interpreter;

pub use morth_interpreter::{MorthInterpreter, STATE_COMPILING, STATE_INTERPRETING};

/// A native operation invoked by the execution engine.  Words defined in
/// Rust are all of this shape; their opcode is their index in the
/// interpreter's handler table.
pub type WordHandler = fn(&mut MorthInterpreter) -> error::Result<()>;

/// Opcode of the engine's call operation.  The engine operations are
/// registered first, in a fixed order, so their opcodes are compile-time
/// constants the compiler can emit directly.
pub const OP_CALL: Cell = 0;

/// Opcode of the return operation terminating every word body.
pub const OP_EXIT: Cell = 1;

/// Opcode of the literal-push operation; its operand is the next cell.
pub const OP_LIT: Cell = 2;

/// Opcode of the unconditional branch; its operand is a signed
/// displacement in cells, relative to the operand cell itself.
pub const OP_BRANCH: Cell = 3;

/// Opcode of the branch-if-zero operation, operand as for `OP_BRANCH`.
pub const OP_ZBRANCH: Cell = 4;

/// Opcode of the inline string literal: a count cell followed by that many
/// string bytes, padded to a cell boundary.
pub const OP_LITSTRING: Cell = 5;

/// Return stack sentinel marking the outermost frame of an execution
/// started by the outer interpreter.  Popping it ends the dispatch loop.
pub const RETURN_SENTINEL: Cell = -1;

/// Maximum nesting of open include files.
pub const MAX_INCLUDE_DEPTH: usize = 16;
