use crate::runtime::{
    data_structures::memory::{aligned, Cell, Memory, CELL_BYTES},
    error::{self, ForthError},
};

/// Longest name a dictionary entry can carry.
pub const MAX_NAME_LEN: usize = 31;

/// Flag bits as they appear in an entry's flags byte.  Exposed to Forth
/// code through the `FLAG_*` constant words.
pub const FLAG_IMMEDIATE: u8 = 0x01;
pub const FLAG_HIDDEN: u8 = 0x02;
pub const FLAG_PRIMITIVE: u8 = 0x04;

/// The explicit flag record for a dictionary entry.
///
/// Immediate words execute even while compiling.  Hidden words are
/// invisible to `find`, which is how a definition is hidden from itself
/// until it is complete.  Primitive words hold a single native operation.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct WordFlags {
    pub immediate: bool,
    pub hidden: bool,
    pub primitive: bool,
}

impl WordFlags {
    pub fn immediate(mut self) -> WordFlags {
        self.immediate = true;
        self
    }

    pub fn hidden(mut self) -> WordFlags {
        self.hidden = true;
        self
    }

    pub fn primitive(mut self) -> WordFlags {
        self.primitive = true;
        self
    }

    pub fn to_byte(self) -> u8 {
        let mut byte = 0;

        if self.immediate {
            byte |= FLAG_IMMEDIATE;
        }

        if self.hidden {
            byte |= FLAG_HIDDEN;
        }

        if self.primitive {
            byte |= FLAG_PRIMITIVE;
        }

        byte
    }

    pub fn from_byte(byte: u8) -> WordFlags {
        WordFlags {
            immediate: byte & FLAG_IMMEDIATE != 0,
            hidden: byte & FLAG_HIDDEN != 0,
            primitive: byte & FLAG_PRIMITIVE != 0,
        }
    }
}

/// The word dictionary: an append-only chain of entries living in the
/// memory arena.
///
/// Each entry is laid out as
///
/// ```text
/// [link cell][flags byte][length byte][name bytes][pad][body cells...]
/// ```
///
/// starting on a cell boundary.  `link` holds the byte offset of the
/// previous entry, 0 at the oldest.  Entries are never deleted, only
/// hidden, and only the newest entry is ever extended, so every published
/// offset is stable.  This type owns nothing but the `latest` cursor; the
/// bytes live in the arena so Forth code can inspect them with the memory
/// words.
pub struct Dictionary {
    latest: usize,
}

impl Dictionary {
    pub fn new() -> Dictionary {
        Dictionary { latest: 0 }
    }

    /// Offset of the most recently defined entry, 0 if none exist yet.
    pub fn latest(&self) -> usize {
        self.latest
    }

    /// Begin a new definition: write the header and make it the newest
    /// entry.  The body is appended by the caller afterwards.
    pub fn create_header(
        &mut self,
        memory: &mut Memory,
        name: &[u8],
        flags: WordFlags,
    ) -> error::Result<usize> {
        if name.len() > MAX_NAME_LEN {
            return Err(ForthError::NameTooLong(
                String::from_utf8_lossy(name).into_owned(),
            ));
        }

        memory.align()?;
        let entry = memory.here();

        memory.append_cell(self.latest as Cell)?;
        memory.append_byte(flags.to_byte())?;
        memory.append_byte(name.len() as u8)?;
        memory.append_bytes(name)?;
        memory.align()?;

        self.latest = entry;
        Ok(entry)
    }

    /// Linear search from the newest entry, skipping hidden ones,
    /// comparing exact length and exact bytes.  First match wins, which is
    /// what lets newer definitions shadow older ones.
    pub fn find(&self, memory: &Memory, name: &[u8]) -> error::Result<Option<usize>> {
        let mut entry = self.latest;

        while entry != 0 {
            let flags = entry_flags(memory, entry)?;

            if !flags.hidden && entry_name(memory, entry)? == name {
                return Ok(Some(entry));
            }

            entry = entry_link(memory, entry)?;
        }

        Ok(None)
    }
}

/// Offset of an entry's flags byte.
pub fn entry_flags_offset(entry: usize) -> usize {
    entry + CELL_BYTES
}

/// Offset of an entry's length (count) byte.
pub fn entry_count_offset(entry: usize) -> usize {
    entry + CELL_BYTES + 1
}

/// The previous entry's offset, 0 at the oldest definition.
pub fn entry_link(memory: &Memory, entry: usize) -> error::Result<usize> {
    let link = memory.fetch_cell(entry)?;

    if link < 0 {
        return Err(ForthError::InvalidAddress(link));
    }

    Ok(link as usize)
}

pub fn entry_flags(memory: &Memory, entry: usize) -> error::Result<WordFlags> {
    Ok(WordFlags::from_byte(
        memory.fetch_byte(entry_flags_offset(entry))?,
    ))
}

pub fn entry_set_flags(memory: &mut Memory, entry: usize, flags: WordFlags) -> error::Result<()> {
    memory.store_byte(entry_flags_offset(entry), flags.to_byte())
}

pub fn entry_name(memory: &Memory, entry: usize) -> error::Result<&[u8]> {
    let len = memory.fetch_byte(entry_count_offset(entry))? as usize;
    memory.fetch_bytes(entry_count_offset(entry) + 1, len)
}

/// First cell of the entry's body: past the header, rounded up to the cell
/// boundary exactly as the header writer left it.
pub fn entry_body(memory: &Memory, entry: usize) -> error::Result<usize> {
    let len = memory.fetch_byte(entry_count_offset(entry))? as usize;
    Ok(aligned(entry_count_offset(entry) + 1 + len))
}
