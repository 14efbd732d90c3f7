/// Module for scanning source text into whitespace-delimited tokens and for
/// parsing number literals.  Everything here works on plain byte slices so
/// the same code serves the terminal input buffer and included files.
pub mod tokenizing;
