/// A token's position within the buffer it was scanned from: a byte range,
/// never a copy.  The interpreter turns `start` into an arena address when
/// it hands token text to Forth code.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Token {
    pub start: usize,
    pub len: usize,
}

impl Token {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Anything at or below the space character delimits tokens, which covers
/// tabs, newlines and carriage returns without naming them.
pub fn is_whitespace(byte: u8) -> bool {
    byte <= 0x20
}

/// Scan the next whitespace-delimited token, advancing the cursor past it
/// and the single whitespace byte that ended it.  Consuming that delimiter
/// is what lets a following delimited parse begin directly at the text it
/// wants.  Returns `None` at end of buffer, the outer interpreter's
/// end-of-line signal.
pub fn next_token(buffer: &[u8], cursor: &mut usize) -> Option<Token> {
    while *cursor < buffer.len() && is_whitespace(buffer[*cursor]) {
        *cursor += 1;
    }

    if *cursor >= buffer.len() {
        return None;
    }

    let start = *cursor;

    while *cursor < buffer.len() && !is_whitespace(buffer[*cursor]) {
        *cursor += 1;
    }

    let token = Token {
        start,
        len: *cursor - start,
    };

    if *cursor < buffer.len() {
        *cursor += 1;
    }

    Some(token)
}

/// Collect bytes up to the delimiter or end of buffer, advancing the
/// cursor past the delimiter when present.  The delimiter is not part of
/// the returned range.
pub fn parse_delimited(buffer: &[u8], cursor: &mut usize, delimiter: u8) -> Token {
    let start = *cursor;

    while *cursor < buffer.len() && buffer[*cursor] != delimiter {
        *cursor += 1;
    }

    let len = *cursor - start;

    if *cursor < buffer.len() {
        *cursor += 1;
    }

    Token { start, len }
}

/// Attempt a signed decimal parse of a token.
///
/// A leading `-` negates, but only when the token is longer than one byte:
/// a lone `-` is the subtraction word, not a malformed number.  Every other
/// byte must be an ASCII digit.  Accumulation wraps like native signed
/// arithmetic.  Any failure returns `None` and the caller falls back to
/// dictionary search; there is no separate "bad number" condition.
pub fn parse_number(token: &[u8]) -> Option<i64> {
    if token.is_empty() {
        return None;
    }

    let negative = token[0] == b'-' && token.len() > 1;
    let digits = if negative { &token[1..] } else { token };

    let mut result: i64 = 0;

    for byte in digits {
        if !byte.is_ascii_digit() {
            return None;
        }

        result = result.wrapping_mul(10).wrapping_add((byte - b'0') as i64);
    }

    Some(if negative { result.wrapping_neg() } else { result })
}
