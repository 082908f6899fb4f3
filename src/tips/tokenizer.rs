//! Line classifier for the tip resource format
//!
//! Every physical line becomes exactly one [`Token`]. Nothing here keeps
//! state between lines; attaching continuations to fields is the builder's job.

use crate::constants::grammar::{
    CMD_KEY, COMMENT_PREFIX, DELIMITER, IMG_KEY, TIP_KEY, VERSION_KEY,
};

/// Recognized field keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Tip,
    Cmd,
    Version,
    Img,
}

impl Field {
    /// Keys are matched exactly (case-sensitive, no surrounding whitespace)
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            TIP_KEY => Some(Field::Tip),
            CMD_KEY => Some(Field::Cmd),
            VERSION_KEY => Some(Field::Version),
            IMG_KEY => Some(Field::Img),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Field::Tip => TIP_KEY,
            Field::Cmd => CMD_KEY,
            Field::Version => VERSION_KEY,
            Field::Img => IMG_KEY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Comment,
    Blank,
    /// `key=value`; value is everything after the first `=`
    Field { field: Field, value: &'a str },
    /// Any other non-blank line, kept verbatim
    Continuation(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// 1-based line number in the resource
    pub line: usize,
    pub kind: LineKind<'a>,
}

/// Classify a single line
pub fn classify(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if trimmed.starts_with(COMMENT_PREFIX) {
        return LineKind::Comment;
    }

    // Unknown keys fall through to continuation
    if let Some((key, value)) = line.split_once(DELIMITER)
        && let Some(field) = Field::from_key(key)
    {
        return LineKind::Field { field, value };
    }

    LineKind::Continuation(line)
}

/// Lazily classify every line of `text`
pub fn tokenize(text: &str) -> impl Iterator<Item = Token<'_>> {
    text.lines().enumerate().map(|(i, line)| Token {
        line: i + 1,
        kind: classify(line),
    })
}
