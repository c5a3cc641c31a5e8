//! Character classification used by word selection, word movement and keyword matching.

/// Punctuation that ends a word.
const SEPARATORS: &[u8] = b"`~!@#$%^&*()-=+[{]}\\|;:'\",.<>/?";

/// The three classes a byte can fall into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Whitespace,
    Separator,
    Identifier,
}

impl CharClass {
    /// Classify a single byte of row text.
    ///
    /// Bytes of multi-byte UTF-8 sequences are classified as identifier bytes,
    /// so non-ASCII words are selected as a single run.
    pub fn of(byte: u8) -> Self {
        if is_space(byte) {
            Self::Whitespace
        } else if is_separator(byte) || byte == 0 {
            Self::Separator
        } else {
            Self::Identifier
        }
    }
}

pub fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

pub fn is_separator(byte: u8) -> bool {
    SEPARATORS.contains(&byte)
}

/// True when `byte` ends an identifier or keyword token
pub fn is_token_boundary(byte: u8) -> bool {
    CharClass::of(byte) != CharClass::Identifier
}

pub fn is_identifier(byte: u8) -> bool {
    CharClass::of(byte) == CharClass::Identifier
}

/// Returns the byte range `[start, end)` of the maximal run of bytes that share
/// the class of the byte at `at`.
pub fn class_run(bytes: &[u8], at: usize) -> (usize, usize) {
    if bytes.is_empty() {
        return (0, 0);
    }
    let at = at.min(bytes.len() - 1);
    let class = CharClass::of(bytes[at]);

    let mut start = at;
    while start > 0 && CharClass::of(bytes[start - 1]) == class {
        start -= 1;
    }
    let mut end = at + 1;
    while end < bytes.len() && CharClass::of(bytes[end]) == class {
        end += 1;
    }
    (start, end)
}
