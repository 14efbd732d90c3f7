use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
};

use crate::{
    lang::tokenizing::{self, Token},
    runtime::{
        built_ins,
        data_structures::{
            dictionary::{self, Dictionary, WordFlags},
            memory::{self, Cell, Memory, BLOCK_SIZE, CELL_BYTES},
            stack::Stack,
        },
        error::{self, ForthError, StackId},
        interpreter::{
            WordHandler, MAX_INCLUDE_DEPTH, OP_CALL, OP_EXIT, OP_LIT, RETURN_SENTINEL,
        },
    },
};

/// Capacity of the parameter and return stacks, in cells.
const STACK_DEPTH: usize = 1024;

/// Mode flag value while interpreting.
pub const STATE_INTERPRETING: Cell = 0;

/// Mode flag value while compiling a definition.
pub const STATE_COMPILING: Cell = -1;

/// Where interpreter output goes.  The REPL writes straight to stdout;
/// tests swap in a buffer and read it back after evaluation.
enum OutputTarget {
    Stdout,
    Buffer(Vec<u8>),
}

/// An open include file.  Line reads always come from the most recently
/// opened source; when it is exhausted the previous one resumes.
struct IncludeSource {
    path: String,
    reader: BufReader<File>,
}

/// The virtual machine context: stacks, dictionary memory, the operation
/// table, the mode flag and the input plumbing, bundled so that several
/// independent interpreters can coexist.  Constructed once at startup with
/// the full built-in word set already registered.
pub struct MorthInterpreter {
    /// The byte arena holding the input buffer and all dictionary storage.
    memory: Memory,

    /// The linked registry of named entries living inside `memory`.
    dictionary: Dictionary,

    /// General computation stack.
    data_stack: Stack,

    /// Resume offsets for nested word calls.
    return_stack: Stack,

    /// The operation table.  A body cell holding a primitive opcode is an
    /// index into this table.
    handlers: Vec<WordHandler>,

    /// Mode flag: 0 interpreting, -1 compiling.
    state: Cell,

    /// Byte offset of the next cell to dispatch, `None` when no threaded
    /// code is running.
    ip: Option<usize>,

    /// Length of the line currently stored in the input buffer region.
    input_len: usize,

    /// Parse position within the input buffer.
    cursor: usize,

    /// Open include files, innermost last.
    sources: Vec<IncludeSource>,

    /// Sink for all user-visible output.
    output: OutputTarget,

    /// Cleared by `BYE`; the REPL driver exits once it goes false.
    running: bool,
}

impl MorthInterpreter {
    /// Create an interpreter with the engine operations and the whole
    /// built-in word set registered.  Fails only if the dictionary arena
    /// cannot hold the built-ins, which would make the kernel unusable.
    pub fn new() -> error::Result<MorthInterpreter> {
        let mut interpreter = MorthInterpreter {
            memory: Memory::new(),
            dictionary: Dictionary::new(),
            data_stack: Stack::new(STACK_DEPTH, StackId::Parameter),
            return_stack: Stack::new(STACK_DEPTH, StackId::Return),
            handlers: Vec::new(),
            state: STATE_INTERPRETING,
            ip: None,
            input_len: 0,
            cursor: 0,
            sources: Vec::new(),
            output: OutputTarget::Stdout,
            running: true,
        };

        interpreter.register_engine_ops()?;
        built_ins::register_built_in_words(&mut interpreter)?;

        Ok(interpreter)
    }

    /// The engine operations must come first so that their opcodes match
    /// the `OP_*` constants the compiler emits.
    fn register_engine_ops(&mut self) -> error::Result<()> {
        self.add_primitive("CALL", Self::op_call)?;
        self.add_primitive("EXIT", Self::op_exit)?;
        self.add_primitive("LIT", Self::op_lit)?;
        self.add_primitive("BRANCH", Self::op_branch)?;
        self.add_primitive("0BRANCH", Self::op_zbranch)?;
        self.add_primitive("LITSTRING", Self::op_litstring)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Word registration.

    /// Register a native word.  The handler is appended to the operation
    /// table and a dictionary entry with the primitive body
    /// `[opcode][exit]` is created for it.
    pub fn add_primitive(&mut self, name: &str, handler: WordHandler) -> error::Result<()> {
        self.add_native_word(name, handler, WordFlags::default().primitive())
    }

    /// Register a native word that executes even while compiling.
    pub fn add_immediate_primitive(
        &mut self,
        name: &str,
        handler: WordHandler,
    ) -> error::Result<()> {
        self.add_native_word(name, handler, WordFlags::default().primitive().immediate())
    }

    fn add_native_word(
        &mut self,
        name: &str,
        handler: WordHandler,
        flags: WordFlags,
    ) -> error::Result<()> {
        self.handlers.push(handler);
        let opcode = (self.handlers.len() - 1) as Cell;

        self.dictionary
            .create_header(&mut self.memory, name.as_bytes(), flags)?;
        self.memory.append_cell(opcode)?;
        self.memory.append_cell(OP_EXIT)?;

        Ok(())
    }

    /// Begin a new dictionary entry at `here`.  Wrapped here so word
    /// implementations need only the interpreter handle.
    pub fn create_header(&mut self, name: &[u8], flags: WordFlags) -> error::Result<usize> {
        self.dictionary
            .create_header(&mut self.memory, name, flags)
    }

    /// Resolve a name against the dictionary, newest first, skipping
    /// hidden entries.
    pub fn find_word(&self, name: &[u8]) -> error::Result<Option<usize>> {
        self.dictionary.find(&self.memory, name)
    }

    // ------------------------------------------------------------------
    // Stack access.

    pub fn push(&mut self, value: Cell) -> error::Result<()> {
        self.data_stack.push(value)
    }

    pub fn pop(&mut self) -> error::Result<Cell> {
        self.data_stack.pop()
    }

    pub fn peek(&self) -> error::Result<Cell> {
        self.data_stack.peek()
    }

    /// Pop a value that will be used as an arena offset; negative values
    /// are an addressing error.
    pub fn pop_offset(&mut self) -> error::Result<usize> {
        memory::as_offset(self.pop()?)
    }

    pub fn rpush(&mut self, value: Cell) -> error::Result<()> {
        self.return_stack.push(value)
    }

    pub fn rpop(&mut self) -> error::Result<Cell> {
        self.return_stack.pop()
    }

    pub fn stack_depth(&self) -> usize {
        self.data_stack.depth()
    }

    pub fn stack_values(&self) -> &[Cell] {
        self.data_stack.as_slice()
    }

    // ------------------------------------------------------------------
    // Component access.

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Mode flag value, as pushed by `STATE`.
    pub fn state(&self) -> Cell {
        self.state
    }

    pub fn set_state(&mut self, state: Cell) {
        self.state = state;
    }

    pub fn is_compiling(&self) -> bool {
        self.state != STATE_INTERPRETING
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Request REPL shutdown; the current line still finishes.
    pub fn stop(&mut self) {
        self.running = false;
    }

    // ------------------------------------------------------------------
    // Output sink.

    /// Redirect output into an internal buffer, for tests that assert on
    /// what the interpreter printed.
    pub fn capture_output(&mut self) {
        self.output = OutputTarget::Buffer(Vec::new());
    }

    /// Drain and return everything captured since the last call.
    pub fn take_output(&mut self) -> String {
        match &mut self.output {
            OutputTarget::Buffer(bytes) => {
                String::from_utf8_lossy(&std::mem::take(bytes)).into_owned()
            }
            OutputTarget::Stdout => String::new(),
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> error::Result<()> {
        match &mut self.output {
            OutputTarget::Stdout => io::stdout().write_all(bytes)?,
            OutputTarget::Buffer(buffer) => buffer.extend_from_slice(bytes),
        }

        Ok(())
    }

    pub fn write_str(&mut self, text: &str) -> error::Result<()> {
        self.write_bytes(text.as_bytes())
    }

    // ------------------------------------------------------------------
    // Input line and token plumbing.

    /// Copy one line of source into the input buffer region and reset the
    /// parse cursor.  Lines beyond the buffer size are refused whole.
    fn load_input_line(&mut self, bytes: &[u8]) -> error::Result<()> {
        if bytes.len() > BLOCK_SIZE {
            return Err(ForthError::LineTooLong(bytes.len()));
        }

        self.memory.store_bytes(0, bytes)?;
        self.input_len = bytes.len();
        self.cursor = 0;

        Ok(())
    }

    /// Scan the next whitespace-delimited token of the current line.  The
    /// token's start is a real arena address, which is what makes `WORD`'s
    /// addr/len pair meaningful to Forth code.
    pub fn next_input_token(&mut self) -> Option<Token> {
        let buffer = self.memory.fetch_bytes(0, self.input_len).ok()?;
        tokenizing::next_token(buffer, &mut self.cursor)
    }

    /// Collect input up to a delimiter byte, as for the `PARSE` word.
    pub fn parse_input_delimited(&mut self, delimiter: u8) -> Token {
        match self.memory.fetch_bytes(0, self.input_len) {
            Ok(buffer) => tokenizing::parse_delimited(buffer, &mut self.cursor, delimiter),
            Err(_) => Token { start: 0, len: 0 },
        }
    }

    /// Copy a token's text out of the arena.
    pub fn token_text(&self, token: Token) -> error::Result<Vec<u8>> {
        Ok(self.memory.fetch_bytes(token.start, token.len)?.to_vec())
    }

    // ------------------------------------------------------------------
    // Include sources.

    /// Open a file and make it the current line source.
    pub fn push_source_file(&mut self, path: &str) -> error::Result<()> {
        if self.sources.len() >= MAX_INCLUDE_DEPTH {
            return Err(ForthError::IncludeDepthExceeded);
        }

        let file = File::open(path)
            .map_err(|err| ForthError::BadInclude(path.to_string(), err.to_string()))?;

        self.sources.push(IncludeSource {
            path: path.to_string(),
            reader: BufReader::new(file),
        });

        Ok(())
    }

    /// Is a file currently supplying input lines?  The REPL prompt is
    /// suppressed while this holds.
    pub fn has_source(&self) -> bool {
        !self.sources.is_empty()
    }

    /// Read the next line from the innermost open source, closing
    /// exhausted files along the way.  `None` once every source is spent.
    /// Lines come back as raw bytes; tokens are byte-delimited, so source
    /// files need not be valid UTF-8.
    pub fn next_source_line(&mut self) -> error::Result<Option<Vec<u8>>> {
        while let Some(source) = self.sources.last_mut() {
            let mut line = Vec::new();
            let count = source
                .reader
                .read_until(b'\n', &mut line)
                .map_err(|err| ForthError::BadInclude(source.path.clone(), err.to_string()))?;

            if count == 0 {
                self.sources.pop();
                continue;
            }

            return Ok(Some(line));
        }

        Ok(None)
    }

    // ------------------------------------------------------------------
    // Outer interpreter.

    /// Interpret one line of raw source bytes: reset the per-line
    /// execution state, then run the per-token state machine until end of
    /// line.  Tokens are byte-delimited, so the line need not be valid
    /// UTF-8.
    pub fn interpret_line_bytes(&mut self, line: &[u8]) -> error::Result<()> {
        self.load_input_line(line)?;
        self.return_stack.clear();
        self.ip = None;

        while self.interpret_next_token()? {}

        Ok(())
    }

    /// Interpret one line of source text.
    pub fn interpret_line(&mut self, line: &str) -> error::Result<()> {
        self.interpret_line_bytes(line.as_bytes())
    }

    /// One step of the outer state machine.  Returns `Ok(false)` at end of
    /// line.  Number parse runs before dictionary search, so a token like
    /// `12` never reaches the dictionary.
    pub fn interpret_next_token(&mut self) -> error::Result<bool> {
        let token = match self.next_input_token() {
            Some(token) => token,
            None => return Ok(false),
        };

        let text = self.token_text(token)?;

        if let Some(value) = tokenizing::parse_number(&text) {
            if self.is_compiling() {
                self.append_literal(value)?;
            } else {
                self.push(value)?;
            }

            return Ok(true);
        }

        match self.find_word(&text)? {
            Some(entry) => {
                let flags = dictionary::entry_flags(&self.memory, entry)?;

                if flags.immediate || !self.is_compiling() {
                    self.execute_entry(entry)?;
                } else {
                    self.compile_reference(entry)?;
                }

                Ok(true)
            }

            None => Err(ForthError::UnknownWord(
                String::from_utf8_lossy(&text).into_owned(),
            )),
        }
    }

    /// The recovery path shared by every non-fatal fault: print the
    /// message through the output sink, then abandon the current line.
    pub fn recover_from(&mut self, error: &ForthError) -> error::Result<()> {
        let message = format!("{}\n", error);
        self.write_str(&message)?;
        self.abort_line();

        Ok(())
    }

    /// Interpret a line the way the REPL does: recoverable faults print
    /// their message through the output sink and abort the line; fatal
    /// faults propagate to the caller.
    pub fn interpret_line_recovering(&mut self, line: &str) -> error::Result<()> {
        match self.interpret_line(line) {
            Err(error) if !error.is_fatal() => self.recover_from(&error),
            result => result,
        }
    }

    /// Interpret an in-memory source, line by line.  The first error
    /// stops processing, as for a source file.
    pub fn process_source(&mut self, source: &str) -> error::Result<()> {
        for line in source.lines() {
            self.interpret_line(line)?;
        }

        Ok(())
    }

    /// Open a file and interpret it to exhaustion.
    pub fn process_source_file(&mut self, path: &str) -> error::Result<()> {
        self.push_source_file(path)?;

        while self.running {
            match self.next_source_line()? {
                Some(line) => self.interpret_line_bytes(&line)?,
                None => break,
            }
        }

        Ok(())
    }

    /// Abandon the current line after a fault: clear both stacks, force
    /// interpret mode, discard unread input and drop open include files.
    /// The dictionary is left alone.
    pub fn abort_line(&mut self) {
        self.data_stack.clear();
        self.return_stack.clear();
        self.ip = None;
        self.state = STATE_INTERPRETING;
        self.cursor = self.input_len;
        self.sources.clear();
    }

    /// Append a `[lit][value]` pair to the open definition.
    pub fn append_literal(&mut self, value: Cell) -> error::Result<()> {
        self.memory.append_cell(OP_LIT)?;
        self.memory.append_cell(value)
    }

    /// Compile a reference to an entry into the open definition: a
    /// primitive's opcode is inlined, anything else becomes a call to its
    /// body.
    pub fn compile_reference(&mut self, entry: usize) -> error::Result<()> {
        let flags = dictionary::entry_flags(&self.memory, entry)?;
        let body = dictionary::entry_body(&self.memory, entry)?;

        if flags.primitive {
            let opcode = self.memory.fetch_cell(body)?;
            self.memory.append_cell(opcode)
        } else {
            self.memory.append_cell(OP_CALL)?;
            self.memory.append_cell(body as Cell)
        }
    }

    // ------------------------------------------------------------------
    // Execution engine.

    /// Execute a dictionary entry from token level.
    pub fn execute_entry(&mut self, entry: usize) -> error::Result<()> {
        let body = dictionary::entry_body(&self.memory, entry)?;
        self.execute_body(body)
    }

    /// Run a body to completion: a sentinel frame marks the outermost
    /// return, so the dispatch loop ends exactly when this body exits.
    pub fn execute_body(&mut self, body: usize) -> error::Result<()> {
        self.return_stack.push(RETURN_SENTINEL)?;
        self.ip = Some(body);
        self.run_dispatch_loop()
    }

    /// The inner interpreter: fetch the cell at `ip`, advance past it,
    /// invoke the operation it indexes.  Every fault here is fatal; it
    /// means the dictionary no longer holds well-formed threaded code.
    fn run_dispatch_loop(&mut self) -> error::Result<()> {
        while let Some(at) = self.ip {
            if at % CELL_BYTES != 0 {
                return Err(ForthError::MalformedInstructionPointer(format!(
                    "misaligned instruction offset {}",
                    at
                )));
            }

            let opcode = self.memory.fetch_cell(at).map_err(|_| {
                ForthError::MalformedInstructionPointer(format!(
                    "instruction offset {} out of range",
                    at
                ))
            })?;

            self.ip = Some(at + CELL_BYTES);

            let handler = match usize::try_from(opcode)
                .ok()
                .and_then(|index| self.handlers.get(index))
            {
                Some(handler) => *handler,
                None => {
                    return Err(ForthError::MalformedInstructionPointer(format!(
                        "invalid opcode {} at offset {}",
                        opcode, at
                    )));
                }
            };

            handler(self)?;
        }

        Ok(())
    }

    /// The current `ip` encoded as a return-stack cell.
    pub fn resume_cell(&self) -> Cell {
        match self.ip {
            Some(offset) => offset as Cell,
            None => RETURN_SENTINEL,
        }
    }

    /// Redirect execution to a body offset taken from a cell, as `CALL`
    /// and `EXECUTE` do.
    pub fn jump_to(&mut self, target: Cell) -> error::Result<()> {
        self.ip = Some(Self::code_offset(target)?);
        Ok(())
    }

    /// Convert a cell into a code offset; a negative value cannot name
    /// threaded code.
    fn code_offset(value: Cell) -> error::Result<usize> {
        usize::try_from(value).map_err(|_| {
            ForthError::MalformedInstructionPointer(format!("negative code offset {}", value))
        })
    }

    /// Where the operand of the currently running operation sits.
    fn operand_offset(&self) -> error::Result<usize> {
        match self.ip {
            Some(offset) => Ok(offset),
            None => Err(ForthError::MalformedInstructionPointer(
                "operand read outside threaded code".to_string(),
            )),
        }
    }

    /// Fetch the operand cell and advance `ip` past it.
    fn fetch_operand(&mut self) -> error::Result<Cell> {
        let offset = self.operand_offset()?;

        let value = self.memory.fetch_cell(offset).map_err(|_| {
            ForthError::MalformedInstructionPointer(format!("operand offset {} out of range", offset))
        })?;

        self.ip = Some(offset + CELL_BYTES);
        Ok(value)
    }

    // ------------------------------------------------------------------
    // Engine operations.  Registered first so their opcodes are the OP_*
    // constants.

    /// Enter the body named by the operand cell, saving the resume offset
    /// on the return stack.
    fn op_call(&mut self) -> error::Result<()> {
        let operand = self.operand_offset()?;
        let target = self.fetch_operand()?;

        self.return_stack.push((operand + CELL_BYTES) as Cell)?;
        self.jump_to(target)
    }

    /// Return to the caller; popping the sentinel frame instead ends the
    /// dispatch loop.
    fn op_exit(&mut self) -> error::Result<()> {
        let resume = self.return_stack.pop()?;

        if resume == RETURN_SENTINEL {
            self.ip = None;
            Ok(())
        } else {
            self.jump_to(resume)
        }
    }

    /// Push the operand cell as data.
    fn op_lit(&mut self) -> error::Result<()> {
        let value = self.fetch_operand()?;
        self.data_stack.push(value)
    }

    /// Unconditional jump by a signed cell displacement, measured from the
    /// displacement cell itself.  A displacement of 1 is fall-through.
    fn op_branch(&mut self) -> error::Result<()> {
        let operand = self.operand_offset()?;
        let displacement = self.fetch_operand()?;

        let target = (operand as Cell).wrapping_add(displacement.wrapping_mul(CELL_BYTES as Cell));
        self.jump_to(target)
    }

    /// Branch when the popped flag is zero, fall through otherwise.
    fn op_zbranch(&mut self) -> error::Result<()> {
        let flag = self.data_stack.pop()?;

        if flag == 0 {
            self.op_branch()
        } else {
            let operand = self.operand_offset()?;
            self.ip = Some(operand + CELL_BYTES);
            Ok(())
        }
    }

    /// Push the addr/len of the inline string following the count operand,
    /// then resume past the string's cell-aligned end.
    fn op_litstring(&mut self) -> error::Result<()> {
        let count = self.fetch_operand()?;

        let length = usize::try_from(count).map_err(|_| {
            ForthError::MalformedInstructionPointer(format!("negative string count {}", count))
        })?;

        let start = self.operand_offset()?;

        self.data_stack.push(start as Cell)?;
        self.data_stack.push(length as Cell)?;

        self.ip = Some(start + memory::aligned(length));
        Ok(())
    }
}
