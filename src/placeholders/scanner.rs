#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    BacktickQuoted,
    LineComment,
    BlockComment,
}

impl State {
    /// The closing quote byte for quoted states.
    pub(super) fn quote(self) -> Option<u8> {
        match self {
            State::SingleQuoted => Some(b'\''),
            State::DoubleQuoted => Some(b'"'),
            State::BacktickQuoted => Some(b'`'),
            _ => None,
        }
    }
}

/// Consume identifier bytes starting at `start`; returns the end index.
pub(super) fn scan_identifier(bytes: &[u8], start: usize) -> usize {
    let mut idx = start;
    while idx < bytes.len() && is_identifier_byte(bytes[idx]) {
        idx += 1;
    }
    idx
}

pub(super) fn is_identifier_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

pub(super) fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
