// Parameterized single-line evaluations covering the built-in words and
// the core library helpers.  Each case runs on a fresh interpreter.

use morth::runtime::error::Result;
use morth::runtime::interpreter::MorthInterpreter;
use test_case::test_case;

const CORE_LIBRARY: &str = include_str!("../std/core.f");

fn eval_and_stack(line: &str, init_stack: &[i64]) -> Result<Vec<i64>> {
    let mut interpreter = MorthInterpreter::new()?;
    interpreter.capture_output();
    interpreter.process_source(CORE_LIBRARY)?;

    for &value in init_stack {
        interpreter.push(value)?;
    }

    interpreter.interpret_line(line)?;
    Ok(interpreter.stack_values().to_vec())
}

// Number parsing
#[test_case("0", &[], &[0]; "zero")]
#[test_case("42", &[], &[42]; "number")]
#[test_case("-17", &[], &[-17]; "negative number")]
#[test_case("9223372036854775807", &[], &[i64::MAX]; "largest cell")]
#[test_case("-9223372036854775808", &[], &[i64::MIN]; "smallest cell")]
// Arithmetic
#[test_case("+", &[2, 2], &[4]; "simple add")]
#[test_case("-", &[5, 2], &[3]; "simple sub")]
#[test_case("*", &[3, 4], &[12]; "simple mul")]
#[test_case("/", &[12, 3], &[4]; "simple div")]
#[test_case("/", &[-7, 2], &[-3]; "div truncates toward zero")]
#[test_case("MOD", &[13, 5], &[3]; "simple mod")]
#[test_case("MOD", &[-7, 3], &[-1]; "mod follows the dividend sign")]
#[test_case("2*", &[7], &[14]; "times two")]
#[test_case("2/", &[8], &[4]; "divide by two")]
#[test_case("2/", &[-7], &[-4]; "divide by two shifts arithmetically")]
#[test_case("+", &[i64::MAX, 1], &[i64::MIN]; "add wraps around")]
#[test_case("*", &[i64::MIN, -1], &[i64::MIN]; "mul wraps around")]
// Bitwise logic
#[test_case("NOT", &[0], &[-1]; "not of false")]
#[test_case("NOT", &[-1], &[0]; "not of true")]
#[test_case("NOT", &[5], &[-6]; "not complements bits")]
#[test_case("AND", &[6, 3], &[2]; "and")]
#[test_case("OR", &[6, 3], &[7]; "or")]
#[test_case("XOR", &[6, 3], &[5]; "xor")]
#[test_case("XOR", &[-1, -1], &[0]; "xor of equal values")]
// Comparison
#[test_case("<", &[3, 4], &[-1]; "less is true")]
#[test_case("<", &[4, 3], &[0]; "less is false")]
#[test_case("<", &[3, 3], &[0]; "less for equal")]
#[test_case(">", &[4, 3], &[-1]; "greater is true")]
#[test_case(">", &[3, 4], &[0]; "greater is false")]
#[test_case("=", &[5, 5], &[-1]; "equal is true")]
#[test_case("=", &[5, 6], &[0]; "equal is false")]
// Stack manipulation
#[test_case("DUP", &[42], &[42, 42]; "dup")]
#[test_case("DROP", &[1, 2], &[1]; "drop")]
#[test_case("SWAP", &[1, 2], &[2, 1]; "swap")]
#[test_case("OVER", &[1, 2], &[1, 2, 1]; "over")]
#[test_case("ROT", &[1, 2, 3], &[2, 3, 1]; "rot")]
#[test_case("DEPTH", &[], &[0]; "depth of empty stack")]
#[test_case("DEPTH", &[1, 2, 3], &[1, 2, 3, 3]; "depth of loaded stack")]
#[test_case(": STASH >R 100 R> ; STASH", &[5], &[100, 5]; "return stack round trip")]
// Memory access
#[test_case("HERE ! HERE @", &[42], &[42]; "store then fetch a cell")]
#[test_case("HERE C! HERE C@", &[65], &[65]; "store then fetch a byte")]
#[test_case("HERE C! HERE C@", &[321], &[65]; "byte store keeps the low byte")]
#[test_case("HERE ! HERE +! HERE @", &[2, 40], &[42]; "add to a stored cell")]
// Parsing words
#[test_case("WORD HELLO SWAP DROP", &[], &[5]; "word pushes the token length")]
#[test_case("WORD", &[], &[0, 0]; "word at end of line pushes zeros")]
#[test_case("41 PARSE ABC) SWAP DROP 7", &[], &[3, 7]; "parse stops at the delimiter")]
#[test_case("WORD 4096 NUMBER", &[], &[4096, 0]; "number parses digits")]
#[test_case("WORD ZILCH NUMBER SWAP DROP", &[], &[5]; "number leaves unparsable text")]
// Definitions and the compiler
#[test_case(": F 42 ; F", &[], &[42]; "trivial definition")]
#[test_case(": SQUARE DUP * ; 6 SQUARE", &[], &[36]; "definition with arguments")]
#[test_case(": K [ 3 4 + ] LITERAL ; K K +", &[], &[14]; "literal freezes a bracketed value")]
#[test_case("STATE", &[], &[0]; "state is zero while interpreting")]
#[test_case(": MODE STATE ; IMMEDIATE : DURING MODE ;", &[], &[-1]; "immediate words see compile state")]
#[test_case("WORD DUP FIND >FLAGS C@", &[], &[4]; "built-ins carry the primitive flag")]
#[test_case("WORD ; FIND >FLAGS C@", &[], &[5]; "semicolon is an immediate primitive")]
#[test_case("WORD NOPE FIND", &[], &[0]; "find pushes zero for unknown names")]
// Constants
#[test_case("CELL", &[], &[8]; "cell size")]
#[test_case("FLAG_IMMEDIATE FLAG_HIDDEN FLAG_PRIMITIVE", &[], &[1, 2, 4]; "flag bits")]
#[test_case("VERSION", &[], &[20260825]; "version stamp")]
// Core library helpers
#[test_case("1+", &[41], &[42]; "add one")]
#[test_case("1-", &[43], &[42]; "sub one")]
#[test_case("NEGATE", &[9], &[-9]; "negate")]
#[test_case("ABS", &[-42], &[42]; "abs of negative number")]
#[test_case("ABS", &[9], &[9]; "abs of positive number")]
#[test_case("MIN", &[3, 7], &[3]; "min picks the smaller")]
#[test_case("MIN", &[7, 3], &[3]; "min picks the smaller reversed")]
#[test_case("MAX", &[3, 7], &[7]; "max picks the larger")]
#[test_case("TRUE", &[], &[-1]; "true word")]
#[test_case("FALSE", &[], &[0]; "false word")]
#[test_case("0=", &[0], &[-1]; "zero equal is true")]
#[test_case("0=", &[5], &[0]; "zero equal is false")]
#[test_case("0<", &[-3], &[-1]; "zero less is true")]
#[test_case("0<", &[3], &[0]; "zero less is false")]
#[test_case("<>", &[5, 6], &[-1]; "not equal is true")]
#[test_case("<>", &[5, 5], &[0]; "not equal is false")]
#[test_case("2DUP", &[1, 2], &[1, 2, 1, 2]; "two dup")]
#[test_case("2DROP", &[1, 2, 3], &[1]; "two drop")]
#[test_case("NIP", &[1, 2], &[2]; "nip")]
#[test_case("TUCK", &[1, 2], &[2, 1, 2]; "tuck")]
#[test_case("?DUP", &[5], &[5, 5]; "question dup of non-zero")]
#[test_case("?DUP", &[0], &[0]; "question dup of zero")]
#[test_case("CELLS", &[3], &[24]; "cells scales by the cell size")]
#[test_case("CELL+", &[100], &[108]; "cell plus advances one cell")]
// Control flow
#[test_case(": F IF 10 ELSE 20 THEN ; F", &[-1], &[10]; "if else then true branch")]
#[test_case(": F IF 10 ELSE 20 THEN ; F", &[0], &[20]; "if else then false branch")]
#[test_case(": F IF 10 ELSE 20 THEN ; F", &[7], &[10]; "if treats non-zero as true")]
#[test_case(": F BEGIN 1 + DUP 10 > UNTIL ; F", &[0], &[11]; "begin until loop")]
#[test_case(": F BEGIN DUP 10 < WHILE 1 + REPEAT ; F", &[0], &[10]; "begin while repeat loop")]
fn word_cases(line: &str, init_stack: &[i64], expected: &[i64]) {
    let result = eval_and_stack(line, init_stack).unwrap();
    assert_eq!(result, expected);
}

// Error cases: the evaluation returns an error and the unwrap panics.
#[test_case("+", &[]; "add on empty stack")]
#[test_case("+", &[1]; "add with one value")]
#[test_case("DUP", &[]; "dup on empty stack")]
#[test_case("DROP", &[]; "drop on empty stack")]
#[test_case("SWAP", &[1]; "swap with one value")]
#[test_case("OVER", &[1]; "over with one value")]
#[test_case("ROT", &[1, 2]; "rot with two values")]
#[test_case("/", &[1, 0]; "division by zero")]
#[test_case("MOD", &[7, 0]; "mod by zero")]
#[test_case("@", &[-8]; "fetch from a negative address")]
#[test_case("FROBNICATE", &[]; "unknown word")]
#[test_case("dup", &[1]; "lowercase names do not resolve")]
#[test_case(": F + ; F", &[]; "underflow inside a definition")]
#[test_case(": F / ; F", &[1, 0]; "division by zero inside a definition")]
#[should_panic]
fn word_error_cases(line: &str, init_stack: &[i64]) {
    let _ = eval_and_stack(line, init_stack).unwrap();
}
