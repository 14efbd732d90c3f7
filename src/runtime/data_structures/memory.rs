use crate::runtime::error::{self, ForthError};

/// The native machine word: the unit of stack values and dictionary cell
/// storage.  Addresses are carried in cells as byte offsets into the arena.
pub type Cell = i64;

/// Size of a cell in bytes.
pub const CELL_BYTES: usize = std::mem::size_of::<Cell>();

/// Size of the input line buffer region at the bottom of the arena, and the
/// per-stack capacity in cells.
pub const BLOCK_SIZE: usize = 1024;

/// Fixed size of the dictionary space that follows the input buffer.
pub const DICTIONARY_BYTES: usize = BLOCK_SIZE * 64;

/// Round a byte offset up to the next cell boundary.
pub fn aligned(offset: usize) -> usize {
    (offset + CELL_BYTES - 1) & !(CELL_BYTES - 1)
}

/// Convert a cell from the stack into an arena byte offset, rejecting
/// negative values.  Range checking happens at the access itself.
pub fn as_offset(value: Cell) -> error::Result<usize> {
    if value < 0 {
        return Err(ForthError::InvalidAddress(value));
    }

    Ok(value as usize)
}

/// The kernel's one addressable memory: a pre-sized byte arena.
///
/// The bottom `BLOCK_SIZE` bytes are the input line buffer; the dictionary
/// occupies the rest, growing upward through the `here` bump pointer.
/// Offsets are the only address form that ever reaches the stacks, so every
/// published address stays valid for the life of the process, and offset 0
/// (the start of the input buffer) doubles as the null sentinel for entry
/// links and failed lookups.  All accesses are bounds checked; the
/// out-of-range cases surface as recoverable `InvalidAddress` errors except
/// for appends, where running out of dictionary space is fatal.
pub struct Memory {
    bytes: Vec<u8>,
    here: usize,
}

impl Memory {
    pub fn new() -> Memory {
        Memory {
            bytes: vec![0; BLOCK_SIZE + DICTIONARY_BYTES],
            here: BLOCK_SIZE,
        }
    }

    /// The next free dictionary offset.
    pub fn here(&self) -> usize {
        self.here
    }

    /// Total arena size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Append one byte at `here`.
    pub fn append_byte(&mut self, value: u8) -> error::Result<()> {
        if self.here >= self.bytes.len() {
            return Err(ForthError::DictionaryExhausted);
        }

        self.bytes[self.here] = value;
        self.here += 1;
        Ok(())
    }

    /// Append one cell at `here`.
    pub fn append_cell(&mut self, value: Cell) -> error::Result<()> {
        if self.here + CELL_BYTES > self.bytes.len() {
            return Err(ForthError::DictionaryExhausted);
        }

        self.bytes[self.here..self.here + CELL_BYTES].copy_from_slice(&value.to_ne_bytes());
        self.here += CELL_BYTES;
        Ok(())
    }

    /// Append a run of bytes at `here`.
    pub fn append_bytes(&mut self, values: &[u8]) -> error::Result<()> {
        if self.here + values.len() > self.bytes.len() {
            return Err(ForthError::DictionaryExhausted);
        }

        self.bytes[self.here..self.here + values.len()].copy_from_slice(values);
        self.here += values.len();
        Ok(())
    }

    /// Advance `here` to the next cell boundary.  Code cells must start
    /// aligned so the dispatch loop can treat alignment loss as corruption.
    pub fn align(&mut self) -> error::Result<()> {
        let next = aligned(self.here);

        if next > self.bytes.len() {
            return Err(ForthError::DictionaryExhausted);
        }

        self.here = next;
        Ok(())
    }

    fn check(&self, offset: usize, len: usize) -> error::Result<()> {
        match offset.checked_add(len) {
            Some(end) if end <= self.bytes.len() => Ok(()),
            _ => Err(ForthError::InvalidAddress(offset as Cell)),
        }
    }

    /// Read the cell at any in-range byte offset.
    pub fn fetch_cell(&self, offset: usize) -> error::Result<Cell> {
        self.check(offset, CELL_BYTES)?;

        let mut raw = [0u8; CELL_BYTES];
        raw.copy_from_slice(&self.bytes[offset..offset + CELL_BYTES]);
        Ok(Cell::from_ne_bytes(raw))
    }

    /// Write the cell at any in-range byte offset.
    pub fn store_cell(&mut self, offset: usize, value: Cell) -> error::Result<()> {
        self.check(offset, CELL_BYTES)?;

        self.bytes[offset..offset + CELL_BYTES].copy_from_slice(&value.to_ne_bytes());
        Ok(())
    }

    pub fn fetch_byte(&self, offset: usize) -> error::Result<u8> {
        self.check(offset, 1)?;
        Ok(self.bytes[offset])
    }

    pub fn store_byte(&mut self, offset: usize, value: u8) -> error::Result<()> {
        self.check(offset, 1)?;

        self.bytes[offset] = value;
        Ok(())
    }

    /// Borrow a byte range, for name comparison and text output.
    pub fn fetch_bytes(&self, offset: usize, len: usize) -> error::Result<&[u8]> {
        self.check(offset, len)?;
        Ok(&self.bytes[offset..offset + len])
    }

    /// Overwrite a byte range, for `EXPECT` and the input buffer load.
    pub fn store_bytes(&mut self, offset: usize, values: &[u8]) -> error::Result<()> {
        self.check(offset, values.len())?;

        self.bytes[offset..offset + values.len()].copy_from_slice(values);
        Ok(())
    }

    /// Copy `len` bytes between two in-range regions, overlap safe.
    pub fn copy_bytes(&mut self, src: usize, dst: usize, len: usize) -> error::Result<()> {
        self.check(src, len)?;
        self.check(dst, len)?;

        self.bytes.copy_within(src..src + len, dst);
        Ok(())
    }

    /// Fill a byte range with one value.
    pub fn fill_bytes(&mut self, offset: usize, len: usize, value: u8) -> error::Result<()> {
        self.check(offset, len)?;

        self.bytes[offset..offset + len].fill(value);
        Ok(())
    }
}
