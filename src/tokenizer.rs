//! Logical-line tokenizer for environment file text
//!
//! This module splits raw source text into logical lines and classifies each
//! line by pattern before the rest of the pipeline sees it. Classification is
//! strictly line-local: patterns are tried in a fixed precedence order and
//! only the first match governs the line.

use crate::coerce::ValueKind;

/// Classification of a single logical line
///
/// Patterns are tried in order: plain pair, typed pair, object path. A line
/// matching none of them is `Malformed` and skipped by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass<'a> {
    /// Empty or whitespace-only line
    Blank,
    /// Line starting with `#`
    Comment,
    /// `KEY=VALUE` with key charset `[\w.-]+`
    Pair {
        /// Key text, trimmed
        key: &'a str,
        /// Raw value text, trimmed, quotes still attached
        value: &'a str,
    },
    /// `KEY:type=VALUE` with a recognized type tag
    Typed {
        /// Bare key without the type suffix
        key: &'a str,
        /// Declared value kind
        kind: ValueKind,
        /// Raw value text, trimmed, quotes still attached
        value: &'a str,
    },
    /// `KEY->SUBKEY=VALUE` object-path line (key contains `->`)
    Path {
        /// Full path key, separators included
        key: &'a str,
        /// Raw value text, trimmed, quotes still attached
        value: &'a str,
    },
    /// Line that matches no recognized pattern
    Malformed,
}

impl LineClass<'_> {
    /// Returns true for lines that carry no payload data
    pub fn is_inert(&self) -> bool {
        matches!(
            self,
            LineClass::Blank | LineClass::Comment | LineClass::Malformed
        )
    }
}

/// A classified logical line with its position in the source
#[derive(Debug, Clone)]
pub struct SourceLine<'a> {
    /// Zero-based logical line index
    pub index: usize,
    /// Raw line text without the terminator
    pub raw: &'a str,
    /// Pattern classification
    pub class: LineClass<'a>,
}

/// Tokenizer over one source text
///
/// The tokenizer itself is cheap to construct and restartable: every call to
/// [`lines`](LineTokenizer::lines) yields a fresh iterator over the same
/// source.
#[derive(Debug, Clone, Copy)]
pub struct LineTokenizer<'a> {
    source: &'a str,
}

impl<'a> LineTokenizer<'a> {
    /// Creates a tokenizer over the given source text
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Returns a lazy iterator of classified logical lines
    pub fn lines(&self) -> LogicalLines<'a> {
        LogicalLines {
            rest: Some(self.source),
            index: 0,
        }
    }
}

/// Iterator over logical lines split on `\n`, `\r`, or `\r\n`
///
/// The first terminator found wins for each line; a `\r\n` pair counts as a
/// single terminator.
#[derive(Debug, Clone)]
pub struct LogicalLines<'a> {
    rest: Option<&'a str>,
    index: usize,
}

impl<'a> Iterator for LogicalLines<'a> {
    type Item = SourceLine<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest?;
        let (raw, remainder) = match rest.find(['\n', '\r']) {
            Some(pos) => {
                let after = if rest[pos..].starts_with("\r\n") {
                    &rest[pos + 2..]
                } else {
                    &rest[pos + 1..]
                };
                (&rest[..pos], Some(after))
            }
            None => (rest, None),
        };
        self.rest = remainder;
        let index = self.index;
        self.index += 1;
        Some(SourceLine {
            index,
            raw,
            class: classify(raw),
        })
    }
}

/// Classifies one raw line by pattern precedence
pub fn classify(raw: &str) -> LineClass<'_> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return LineClass::Blank;
    }
    if trimmed.starts_with('#') {
        return LineClass::Comment;
    }
    let Some((key_part, value_part)) = trimmed.split_once('=') else {
        return LineClass::Malformed;
    };
    let key = key_part.trim();
    let value = value_part.trim();
    if key.is_empty() {
        return LineClass::Malformed;
    }

    if is_plain_key(key) {
        return LineClass::Pair { key, value };
    }

    if let Some((name, tag)) = key.split_once(':') {
        let name = name.trim_end();
        if is_plain_key(name)
            && let Ok(kind) = tag.trim_start().parse::<ValueKind>()
        {
            return LineClass::Typed {
                key: name,
                kind,
                value,
            };
        }
    }

    if key.contains("->") && is_path_key(key) {
        return LineClass::Path { key, value };
    }

    LineClass::Malformed
}

/// Key charset for plain and typed keys: word characters, dot, hyphen
fn is_plain_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
}

/// Key charset for object-path keys: word characters, hyphen, `>`, colon
fn is_path_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '>' || c == ':')
}
