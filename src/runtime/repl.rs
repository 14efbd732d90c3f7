use std::{
    env,
    io::{self, BufRead},
    path::PathBuf,
};

use crate::runtime::{
    built_ins::word_words::VERSION_STAMP,
    error::{self, ForthError},
    interpreter::MorthInterpreter,
};

/// Locate the core library.  A path set in the environment wins, then the
/// directory of the running executable is tried, then the working
/// directory's `std/` layout used during development.
fn find_core_library() -> Option<PathBuf> {
    if let Ok(lib_path) = env::var("MORTH_LIB_PATH") {
        let candidate = PathBuf::from(lib_path).join("core.f");

        if candidate.is_file() {
            return Some(candidate);
        }
    }

    if let Ok(exe_path) = env::current_exe() {
        if let Some(directory) = exe_path.parent() {
            for candidate in [
                directory.join("core.f"),
                directory.join("std").join("core.f"),
            ] {
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
    }

    let fallback = PathBuf::from("std").join("core.f");

    if fallback.is_file() {
        return Some(fallback);
    }

    None
}

/// Queue the core library as the interpreter's first input source.  A
/// missing library only costs the words it defines, so it is reported and
/// tolerated rather than treated as a startup failure.
fn push_core_library(interpreter: &mut MorthInterpreter) -> error::Result<()> {
    match find_core_library() {
        Some(path) => match path.to_str() {
            Some(text) => interpreter.push_source_file(text),
            None => {
                eprintln!("Skipping core library: its path is not valid text.");
                Ok(())
            }
        },

        None => {
            eprintln!("Core library core.f not found; only built-in words are available.");
            Ok(())
        }
    }
}

/// The interactive loop: drain queued sources, then read lines from
/// `input` until end of input or `BYE`.
///
/// The ` ok\n` prompt follows every line consumed directly from `input`.
/// A line that opens an include gets its prompt only once the included
/// input is fully drained, so file contents are never interleaved with
/// prompts.
///
/// Lines are raw bytes, matching the byte-delimited tokenizer.  A line
/// read that fails recoverably is reported and abandoned like any other
/// non-fatal fault, and the loop carries on.
pub fn run_repl(interpreter: &mut MorthInterpreter, mut input: impl BufRead) -> error::Result<()> {
    let banner = format!(
        "Welcome to morth\nBuilt for {}-{}, version {}\nmorth comes with ABSOLUTELY NO WARRANTY\n",
        env::consts::ARCH,
        env::consts::OS,
        VERSION_STAMP
    );

    interpreter.write_str(&banner)?;
    push_core_library(interpreter)?;

    let mut prompt_pending = false;

    while interpreter.is_running() {
        let line = match interpreter.next_source_line() {
            Ok(Some(line)) => line,

            Ok(None) => {
                if prompt_pending {
                    interpreter.write_str(" ok\n")?;
                }

                let mut line = Vec::new();

                match input.read_until(b'\n', &mut line) {
                    Ok(0) => break,
                    Ok(_) => line,

                    Err(error) => {
                        interpreter.recover_from(&ForthError::from(error))?;
                        prompt_pending = true;
                        continue;
                    }
                }
            }

            Err(error) if !error.is_fatal() => {
                interpreter.recover_from(&error)?;
                prompt_pending = true;
                continue;
            }

            Err(error) => return Err(error),
        };

        match interpreter.interpret_line_bytes(&line) {
            Err(error) if !error.is_fatal() => interpreter.recover_from(&error)?,
            result => result?,
        }

        if !interpreter.is_running() {
            break;
        }

        if interpreter.has_source() {
            prompt_pending = true;
        } else {
            prompt_pending = false;
            interpreter.write_str(" ok\n")?;
        }
    }

    Ok(())
}

/// Batch mode: interpret one script file and exit.  No banner, no prompts,
/// and the first error stops the run and is reported through the exit
/// status.
fn run_script(interpreter: &mut MorthInterpreter, path: &str) -> error::Result<()> {
    if let Some(library) = find_core_library() {
        if let Some(text) = library.to_str() {
            interpreter.process_source_file(text)?;
        }
    } else {
        eprintln!("Core library core.f not found; only built-in words are available.");
    }

    interpreter.process_source_file(path)
}

/// Entry point used by `main`: build an interpreter and either run the
/// script named on the command line or start the interactive loop.
pub fn run() -> error::Result<()> {
    let mut interpreter = MorthInterpreter::new()?;
    let args: Vec<String> = env::args().collect();

    if args.len() >= 2 {
        run_script(&mut interpreter, &args[1])
    } else {
        run_repl(&mut interpreter, io::stdin().lock())
    }
}
