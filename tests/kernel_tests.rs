// End-to-end tests for the bare kernel: the outer interpreter, error
// recovery, the dictionary machinery and hand-threaded code, with no
// core library loaded.

use std::{env, fs};

use morth::runtime::error::ForthError;
use morth::runtime::interpreter::MorthInterpreter;
use morth::runtime::repl;

fn interpreter() -> MorthInterpreter {
    let mut interpreter = MorthInterpreter::new().unwrap();
    interpreter.capture_output();
    interpreter
}

// --- Outer interpreter ---

#[test]
fn numbers_then_dot_prints_the_sum() {
    let mut interpreter = interpreter();

    interpreter.interpret_line("3 4 + .").unwrap();

    assert_eq!(interpreter.take_output(), "7 ");
    assert_eq!(interpreter.stack_depth(), 0);
}

#[test]
fn colon_definition_runs_when_called() {
    let mut interpreter = interpreter();

    interpreter.interpret_line(": SQUARE DUP * ;").unwrap();
    interpreter.interpret_line("5 SQUARE .").unwrap();

    assert_eq!(interpreter.take_output(), "25 ");
}

#[test]
fn unknown_word_prints_and_clears_the_line() {
    let mut interpreter = interpreter();

    interpreter
        .interpret_line_recovering("1 2 FROBNICATE 3")
        .unwrap();

    assert_eq!(interpreter.take_output(), "Word not found: FROBNICATE\n");
    assert_eq!(interpreter.stack_depth(), 0);

    interpreter.interpret_line("7").unwrap();
    assert_eq!(interpreter.stack_values(), &[7]);
}

#[test]
fn stack_underflow_aborts_but_keeps_definitions() {
    let mut interpreter = interpreter();

    interpreter.interpret_line(": TEN 10 ;").unwrap();
    interpreter.interpret_line_recovering("DROP").unwrap();

    assert_eq!(interpreter.take_output(), "Stack underflow.\n");

    interpreter.interpret_line("TEN").unwrap();
    assert_eq!(interpreter.stack_values(), &[10]);
}

#[test]
fn division_by_zero_is_recoverable() {
    let mut interpreter = interpreter();

    interpreter.interpret_line_recovering("7 0 /").unwrap();

    assert_eq!(interpreter.take_output(), "Division by zero.\n");
    assert_eq!(interpreter.stack_depth(), 0);
}

#[test]
fn failed_compilation_leaves_interpret_mode() {
    let mut interpreter = interpreter();

    interpreter
        .interpret_line_recovering(": BROKEN FROBNICATE")
        .unwrap();

    assert_eq!(interpreter.take_output(), "Word not found: FROBNICATE\n");
    assert!(!interpreter.is_compiling());

    // The unfinished entry stays hidden, so the name does not resolve.
    interpreter.interpret_line_recovering("BROKEN").unwrap();
    assert_eq!(interpreter.take_output(), "Word not found: BROKEN\n");

    interpreter.interpret_line("1 2 +").unwrap();
    assert_eq!(interpreter.stack_values(), &[3]);
}

#[test]
fn abort_discards_the_rest_of_the_line() {
    let mut interpreter = interpreter();

    interpreter.interpret_line("1 2 3 ABORT 4 5").unwrap();

    assert_eq!(interpreter.stack_depth(), 0);
}

#[test]
fn unbalanced_return_stack_use_is_fatal() {
    let mut interpreter = interpreter();

    let error = interpreter.interpret_line("5 >R").unwrap_err();

    assert!(matches!(error, ForthError::MalformedInstructionPointer(_)));
    assert!(error.is_fatal());
}

#[test]
fn bye_requests_shutdown_after_the_line() {
    let mut interpreter = interpreter();

    interpreter.interpret_line("1 2 BYE").unwrap();

    assert!(!interpreter.is_running());
    assert_eq!(interpreter.stack_values(), &[1, 2]);
}

// --- Dictionary ---

#[test]
fn redefinition_shadows_but_old_callers_keep_the_old_meaning() {
    let mut interpreter = interpreter();

    interpreter
        .process_source(": VAL 1 ;\n: TWICE-VAL VAL VAL + ;\n: VAL 100 ;")
        .unwrap();
    interpreter.interpret_line("VAL TWICE-VAL").unwrap();

    assert_eq!(interpreter.stack_values(), &[100, 2]);
}

#[test]
fn words_lists_newest_first_and_skips_hidden() {
    let mut interpreter = interpreter();

    interpreter.process_source(": FIRST 1 ;\n: SECOND 2 ;").unwrap();

    interpreter.interpret_line("WORDS").unwrap();
    let listing = interpreter.take_output();
    assert!(listing.starts_with("SECOND FIRST "));
    assert!(listing.contains("DUP"));
    assert!(listing.ends_with('\n'));

    interpreter.interpret_line("WORD SECOND FIND HIDDEN").unwrap();
    interpreter.interpret_line("WORDS").unwrap();
    let listing = interpreter.take_output();
    assert!(!listing.contains("SECOND"));
    assert!(listing.contains("FIRST"));
}

#[test]
fn hidden_entries_can_come_back() {
    let mut interpreter = interpreter();

    interpreter.interpret_line(": SECRET 42 ;").unwrap();
    interpreter.interpret_line("LATEST HIDDEN").unwrap();

    interpreter.interpret_line_recovering("SECRET").unwrap();
    assert_eq!(interpreter.take_output(), "Word not found: SECRET\n");

    interpreter.interpret_line("LATEST HIDDEN").unwrap();
    interpreter.interpret_line("SECRET").unwrap();
    assert_eq!(interpreter.stack_values(), &[42]);
}

#[test]
fn execute_runs_a_body_found_at_runtime() {
    let mut interpreter = interpreter();

    interpreter.interpret_line(": SQUARE DUP * ;").unwrap();
    interpreter
        .interpret_line("5 WORD SQUARE FIND >BODY EXECUTE")
        .unwrap();

    assert_eq!(interpreter.stack_values(), &[25]);
}

#[test]
fn execute_works_from_inside_a_definition() {
    let mut interpreter = interpreter();

    interpreter
        .process_source(": APPLY EXECUTE ;\n: DOUBLE 2 * ;")
        .unwrap();
    interpreter
        .interpret_line("7 WORD DOUBLE FIND >BODY APPLY")
        .unwrap();

    assert_eq!(interpreter.stack_values(), &[14]);
}

#[test]
fn count_exposes_an_entry_name() {
    let mut interpreter = interpreter();

    interpreter.interpret_line(": SQUARE DUP * ;").unwrap();
    interpreter
        .interpret_line("WORD SQUARE FIND >COUNT COUNT TYPE")
        .unwrap();

    assert_eq!(interpreter.take_output(), "SQUARE");
}

#[test]
fn header_creates_a_plain_visible_entry() {
    let mut interpreter = interpreter();

    interpreter
        .interpret_line("HEADER BLANK WORD BLANK FIND >FLAGS C@")
        .unwrap();

    assert_eq!(interpreter.stack_values(), &[0]);
}

#[test]
fn immediate_words_run_during_compilation() {
    let mut interpreter = interpreter();

    interpreter
        .process_source(": NOW 7 ; IMMEDIATE\n: LATER NOW ;")
        .unwrap();
    assert_eq!(interpreter.stack_values(), &[7]);

    // The immediate word left nothing in the body.
    interpreter.interpret_line("LATER").unwrap();
    assert_eq!(interpreter.stack_values(), &[7]);
}

// --- Hand-threaded code ---

#[test]
fn header_comma_and_compile_comma_build_a_working_word() {
    let mut interpreter = interpreter();

    interpreter
        .interpret_line(
            "HEADER TRIPLE WORD LIT FIND COMPILE, 3 , WORD * FIND COMPILE, WORD EXIT FIND COMPILE,",
        )
        .unwrap();
    interpreter.interpret_line("7 TRIPLE").unwrap();

    assert_eq!(interpreter.stack_values(), &[21]);
}

#[test]
fn branch_displacements_are_measured_in_cells() {
    let mut interpreter = interpreter();

    interpreter
        .process_source(
            "HEADER BOUNCE\n\
             WORD BRANCH FIND COMPILE, 3 ,\n\
             WORD LIT FIND COMPILE, 99 ,\n\
             WORD LIT FIND COMPILE, 42 ,\n\
             WORD EXIT FIND COMPILE,",
        )
        .unwrap();
    interpreter.interpret_line("BOUNCE").unwrap();

    assert_eq!(interpreter.stack_values(), &[42]);
}

#[test]
fn zero_branch_pops_the_flag_and_selects_a_path() {
    let mut interpreter = interpreter();

    interpreter
        .process_source(
            "HEADER PICKER\n\
             WORD 0BRANCH FIND COMPILE, 4 ,\n\
             WORD LIT FIND COMPILE, 11 ,\n\
             WORD EXIT FIND COMPILE,\n\
             WORD LIT FIND COMPILE, 22 ,\n\
             WORD EXIT FIND COMPILE,",
        )
        .unwrap();

    interpreter.interpret_line("1 PICKER").unwrap();
    assert_eq!(interpreter.stack_values(), &[11]);

    interpreter.interpret_line("DROP 0 PICKER").unwrap();
    assert_eq!(interpreter.stack_values(), &[22]);
}

#[test]
fn litstring_pushes_the_inline_text() {
    let mut interpreter = interpreter();

    interpreter
        .process_source(
            "HEADER GREETING\n\
             WORD LITSTRING FIND COMPILE, 2 ,\n\
             WORD HI S, ALIGN\n\
             WORD EXIT FIND COMPILE,",
        )
        .unwrap();
    interpreter.interpret_line("GREETING TYPE").unwrap();

    assert_eq!(interpreter.take_output(), "HI");
}

// --- Dictionary space ---

#[test]
fn comma_appends_one_cell_at_here() {
    let mut interpreter = interpreter();

    interpreter
        .interpret_line("HERE 1234 , HERE OVER - SWAP @")
        .unwrap();

    assert_eq!(interpreter.stack_values(), &[8, 1234]);
}

#[test]
fn align_rounds_here_up_to_a_cell_boundary() {
    let mut interpreter = interpreter();

    interpreter
        .interpret_line("HERE 65 C, ALIGN HERE SWAP -")
        .unwrap();

    assert_eq!(interpreter.stack_values(), &[8]);
}

#[test]
fn move_copies_cells_through_an_overlap() {
    let mut interpreter = interpreter();

    interpreter
        .interpret_line(
            "11 HERE ! 22 HERE CELL + ! HERE HERE CELL + 2 MOVE HERE CELL + @ HERE CELL + CELL + @",
        )
        .unwrap();

    assert_eq!(interpreter.stack_values(), &[11, 22]);
}

// --- Output words ---

#[test]
fn emit_writes_single_bytes() {
    let mut interpreter = interpreter();

    interpreter.interpret_line("72 EMIT 73 EMIT 33 EMIT").unwrap();

    assert_eq!(interpreter.take_output(), "HI!");
}

#[test]
fn type_writes_a_range_from_the_input_buffer() {
    let mut interpreter = interpreter();

    interpreter.interpret_line("WORD HELLO TYPE").unwrap();

    assert_eq!(interpreter.take_output(), "HELLO");
}

#[test]
fn dot_s_lists_the_depth_then_the_values() {
    let mut interpreter = interpreter();

    interpreter.interpret_line("1 2 3 .S").unwrap();
    assert_eq!(interpreter.take_output(), "<3> 1 2 3\n");
    assert_eq!(interpreter.stack_values(), &[1, 2, 3]);

    interpreter.interpret_line("DROP DROP DROP .S").unwrap();
    assert_eq!(interpreter.take_output(), "<0>\n");
}

#[test]
fn fill_and_cmove_work_on_bytes() {
    let mut interpreter = interpreter();

    interpreter.interpret_line("HERE 4 65 FILL HERE 4 TYPE").unwrap();
    assert_eq!(interpreter.take_output(), "AAAA");

    interpreter
        .interpret_line("WORD ABCDE DROP HERE 5 CMOVE HERE 5 TYPE")
        .unwrap();
    assert_eq!(interpreter.take_output(), "ABCDE");
}

#[test]
fn dump_prints_hex_rows_with_an_ascii_gutter() {
    let mut interpreter = interpreter();

    interpreter.interpret_line("HERE 8 65 FILL HERE 8 DUMP").unwrap();

    assert_eq!(
        interpreter.take_output(),
        "41 41 41 41 41 41 41 41 AAAAAAAA\n"
    );
}

#[test]
fn process_memory_reports_a_working_set() {
    let mut interpreter = interpreter();

    interpreter.interpret_line("MORTH.MEMORY").unwrap();

    assert_eq!(interpreter.stack_depth(), 1);
    assert!(interpreter.stack_values()[0] > 0);
}

// --- Include files ---

#[test]
fn include_reads_definitions_from_a_file() {
    let path = env::temp_dir().join("morth-include-def.f");
    fs::write(&path, ": FROM-FILE 40 2 + ;\nFROM-FILE\n").unwrap();

    let mut interpreter = interpreter();
    interpreter
        .interpret_line(&format!("INCLUDE {}", path.display()))
        .unwrap();

    // Drain the queued source the way the interpreter loop does.
    while let Some(line) = interpreter.next_source_line().unwrap() {
        interpreter.interpret_line_bytes(&line).unwrap();
    }

    assert_eq!(interpreter.stack_values(), &[42]);
    fs::remove_file(&path).ok();
}

#[test]
fn include_of_a_missing_file_is_recoverable() {
    let mut interpreter = interpreter();

    interpreter
        .interpret_line_recovering("INCLUDE definitely-missing-morth.f")
        .unwrap();

    assert!(interpreter
        .take_output()
        .starts_with("Unable to include definitely-missing-morth.f"));
    assert_eq!(interpreter.stack_depth(), 0);
}

#[test]
fn include_lines_need_not_be_valid_utf8() {
    let path = env::temp_dir().join("morth-include-raw.f");
    fs::write(&path, b"1 2 +\n\xFF\xFE\n").unwrap();

    let mut interpreter = interpreter();
    interpreter
        .interpret_line(&format!("INCLUDE {}", path.display()))
        .unwrap();

    let line = interpreter.next_source_line().unwrap().unwrap();
    interpreter.interpret_line_bytes(&line).unwrap();
    assert_eq!(interpreter.stack_values(), &[3]);

    // The high-bit line reads back as written; its token is an
    // unresolvable name, not a reader failure.
    let line = interpreter.next_source_line().unwrap().unwrap();
    assert_eq!(line, b"\xFF\xFE\n");

    let error = interpreter.interpret_line_bytes(&line).unwrap_err();
    assert!(matches!(error, ForthError::UnknownWord(_)));
    assert!(!error.is_fatal());

    fs::remove_file(&path).ok();
}

#[test]
fn source_read_failures_are_recoverable() {
    let mut interpreter = interpreter();

    // A directory opens like a file but fails on the first read, so the
    // error surfaces at line-read time rather than open time.
    let dir = env::temp_dir();
    interpreter.push_source_file(dir.to_str().unwrap()).unwrap();

    let error = interpreter.next_source_line().unwrap_err();
    assert!(matches!(error, ForthError::BadInclude(_, _)));
    assert!(!error.is_fatal());

    interpreter.recover_from(&error).unwrap();
    assert!(interpreter
        .take_output()
        .starts_with(&format!("Unable to include {}", dir.display())));
    assert!(!interpreter.has_source());

    interpreter.interpret_line("6 7 *").unwrap();
    assert_eq!(interpreter.stack_values(), &[42]);
}

#[test]
fn include_nesting_is_bounded() {
    let path = env::temp_dir().join("morth-include-depth.f");
    fs::write(&path, "1\n").unwrap();
    let path = path.to_str().unwrap().to_string();

    let mut interpreter = interpreter();
    for _ in 0..16 {
        interpreter.push_source_file(&path).unwrap();
    }

    let error = interpreter.push_source_file(&path).unwrap_err();
    assert!(matches!(error, ForthError::IncludeDepthExceeded));
    fs::remove_file(&path).ok();
}

// --- Interactive sessions ---

#[test]
fn session_survives_an_unreadable_include() {
    let mut interpreter = interpreter();
    let input = format!("INCLUDE {}\n9 .\n", env::temp_dir().display());

    repl::run_repl(&mut interpreter, input.as_bytes()).unwrap();

    let output = interpreter.take_output();
    assert!(output.contains(&format!("Unable to include {}", env::temp_dir().display())));
    assert!(output.ends_with("9  ok\n"));
}

#[test]
fn session_accepts_raw_byte_input_lines() {
    let mut interpreter = interpreter();

    repl::run_repl(&mut interpreter, &b"1 2 +\n\xFF\xFE\n9 .\n"[..]).unwrap();

    let output = interpreter.take_output();
    assert!(output.contains("Word not found: \u{FFFD}\u{FFFD}\n"));
    assert!(output.ends_with("9  ok\n"));
}

#[test]
fn session_defers_the_include_prompt_until_the_file_drains() {
    let path = env::temp_dir().join("morth-include-prompt.f");
    fs::write(&path, "10 20 +\n.\n").unwrap();

    let mut interpreter = interpreter();
    let input = format!("INCLUDE {}\n", path.display());

    repl::run_repl(&mut interpreter, input.as_bytes()).unwrap();

    // A single prompt after the file's output; adjacent prompts would
    // mean one leaked out between the file's lines.
    let output = interpreter.take_output();
    assert!(output.ends_with("30  ok\n"));
    assert!(!output.contains(" ok\n ok\n"));

    fs::remove_file(&path).ok();
}

#[test]
fn session_ends_at_bye_without_reading_further_input() {
    let mut interpreter = interpreter();

    repl::run_repl(&mut interpreter, &b"BYE\n77 .\n"[..]).unwrap();

    assert!(!interpreter.is_running());
    assert!(!interpreter.take_output().contains("77"));
}
