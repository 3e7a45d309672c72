//! Named-placeholder handling: scanning SQL for `:name` tokens, rewriting repeated
//! names into unique ones, and fanning bound values back out to the rewritten names.

use std::collections::HashMap;

mod expand;
mod parsers;
mod rewrite;
mod scanner;

pub use expand::expand_params;
pub use rewrite::{ExpansionTable, RewrittenQuery, rewrite};

use parsers::{
    is_block_comment_end, is_block_comment_start, is_line_comment_start, is_placeholder_start,
};
use scanner::{State, scan_identifier};

/// One `:name` token found outside quotes and comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderOccurrence {
    /// Byte offset of the leading `:`.
    pub position: usize,
    /// Byte length of the token, sigil included.
    pub length: usize,
    /// Placeholder name without the sigil.
    pub name: String,
}

/// Placeholder name to number of occurrences in one statement.
pub type NameCounts = HashMap<String, usize>;

/// Output of [`scan`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderScan {
    /// Occurrences in text order.
    pub occurrences: Vec<PlaceholderOccurrence>,
    /// How many times each name occurs.
    pub counts: NameCounts,
}

impl PlaceholderScan {
    /// True when at least one name occurs more than once.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.counts.values().any(|&count| count > 1)
    }
}

/// Find every named placeholder in `sql`, skipping quoted strings, quoted identifiers,
/// and comments.
///
/// Never fails: an unterminated quote or comment makes the rest of the input inert.
///
/// ```rust
/// use sql_cipher_middleware::placeholders::scan;
///
/// let found = scan("SELECT ':x' AS lit, :y FROM t -- :z");
/// assert_eq!(found.occurrences.len(), 1);
/// assert_eq!(found.occurrences[0].name, "y");
/// ```
#[must_use]
pub fn scan(sql: &str) -> PlaceholderScan {
    let mut result = PlaceholderScan::default();
    let mut state = State::Normal;
    let mut idx = 0;
    let bytes = sql.as_bytes();

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => match b {
                b'\'' => state = State::SingleQuoted,
                b'"' => state = State::DoubleQuoted,
                b'`' => state = State::BacktickQuoted,
                _ if is_line_comment_start(bytes, idx) => state = State::LineComment,
                _ if is_block_comment_start(bytes, idx) => {
                    state = State::BlockComment;
                    idx += 1; // don't let the `*` of `/*` close the comment
                }
                _ if is_placeholder_start(bytes, idx) => {
                    let end = scan_identifier(bytes, idx + 1);
                    let name = &sql[idx + 1..end];
                    *result.counts.entry(name.to_string()).or_insert(0) += 1;
                    result.occurrences.push(PlaceholderOccurrence {
                        position: idx,
                        length: end - idx,
                        name: name.to_string(),
                    });
                    idx = end - 1;
                }
                _ => {}
            },
            State::SingleQuoted | State::DoubleQuoted | State::BacktickQuoted => {
                if Some(b) == state.quote() {
                    if bytes.get(idx + 1) == Some(&b) {
                        idx += 1; // skip escaped quote
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                if is_block_comment_end(bytes, idx) {
                    state = State::Normal;
                    idx += 1;
                }
            }
        }

        idx += 1;
    }

    result
}
