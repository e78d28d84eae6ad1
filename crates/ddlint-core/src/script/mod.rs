//! Source scripts and line-location resolution
//!
//! The parser output carries no usable line information, so diagnostics are
//! located by searching the raw source text. A [`Script`] holds the text,
//! split into lines once. A [`Cursor`] is the bookmark into those lines; it is
//! a plain `Copy` value bounded to one statement, handed to whoever owns the
//! current traversal and returned updated by every lookup.

mod split;

use std::ops::Range;
use std::sync::Arc;

use crate::error::Span;

pub use split::{split_statements, Segment};

/// A named DDL source text
#[derive(Debug, Clone)]
pub struct Script {
    inner: Arc<ScriptData>,
}

#[derive(Debug)]
struct ScriptData {
    name: String,
    source: String,
    lines: Vec<Line>,
}

/// Byte range of one line, without its terminator
#[derive(Debug, Clone, Copy)]
struct Line {
    offset: usize,
    len: usize,
}

/// Read position within a script's lines.
///
/// `next` is the first line index still eligible for a match, `end` the
/// exclusive upper bound (the end of the current statement).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    next: usize,
    end: usize,
}

impl Cursor {
    /// Index of the next line that will be scanned (0-indexed)
    pub fn position(&self) -> usize {
        self.next
    }
}

impl Script {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let lines = split_lines(&source);
        Self {
            inner: Arc::new(ScriptData {
                name: name.into(),
                source,
                lines,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn source(&self) -> &str {
        &self.inner.source
    }

    pub fn line_count(&self) -> usize {
        self.inner.lines.len()
    }

    /// Text of a line by 0-based index
    pub fn line_text(&self, index: usize) -> Option<&str> {
        self.inner
            .lines
            .get(index)
            .map(|l| &self.inner.source[l.offset..l.offset + l.len])
    }

    /// Span of a whole line by 0-based index
    pub fn line_span(&self, index: usize) -> Option<Span> {
        self.inner
            .lines
            .get(index)
            .map(|l| Span::line(index + 1, l.offset, l.len))
    }

    /// 0-based index of the line containing byte `offset`
    pub fn line_index_of(&self, offset: usize) -> usize {
        self.inner
            .lines
            .partition_point(|l| l.offset <= offset)
            .saturating_sub(1)
    }

    /// Cursor covering the whole script
    pub fn cursor(&self) -> Cursor {
        Cursor {
            next: 0,
            end: self.line_count(),
        }
    }

    /// Cursor bounded to a range of 0-based line indices
    pub fn cursor_for(&self, lines: Range<usize>) -> Cursor {
        let end = lines.end.min(self.line_count());
        Cursor {
            next: lines.start.min(end),
            end,
        }
    }

    /// Find the first line at or after the cursor matching `predicate`.
    ///
    /// On a match the returned cursor is positioned just past the matched
    /// line, so the next lookup starts after it. Without a match the cursor
    /// is returned unchanged.
    pub fn resolve<F>(&self, cursor: Cursor, predicate: F) -> (Option<Span>, Cursor)
    where
        F: Fn(&str) -> bool,
    {
        match self.find(cursor, predicate) {
            Some(index) => {
                let span = self.line_span(index);
                (
                    span,
                    Cursor {
                        next: index + 1,
                        end: cursor.end,
                    },
                )
            }
            None => (None, cursor),
        }
    }

    /// Cursor moved onto (not past) the first line matching `predicate`
    pub fn seek<F>(&self, cursor: Cursor, predicate: F) -> Option<Cursor>
    where
        F: Fn(&str) -> bool,
    {
        self.find(cursor, predicate).map(|index| Cursor {
            next: index,
            end: cursor.end,
        })
    }

    fn find<F>(&self, cursor: Cursor, predicate: F) -> Option<usize>
    where
        F: Fn(&str) -> bool,
    {
        (cursor.next..cursor.end).find(|&i| self.line_text(i).is_some_and(&predicate))
    }
}

fn split_lines(source: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for raw in source.split('\n') {
        let len = raw.strip_suffix('\r').map_or(raw.len(), str::len);
        lines.push(Line { offset, len });
        offset += raw.len() + 1;
    }
    lines
}

/// Case-insensitive test for `ident` appearing in `line` as a whole identifier.
///
/// `is_deleted` matches `` `is_deleted` tinyint(1)`` but not
/// `is_deleted_at datetime`.
pub fn mentions(line: &str, ident: &str) -> bool {
    let haystack = line.to_ascii_lowercase();
    let found = occurrences(&haystack, ident).next().is_some();
    found
}

/// `ident` followed by the word `keyword`, quotes aside: a column name
/// followed by its type, as in `declares("  enabled BIT,", "enabled", "bit")`.
pub fn declares(line: &str, ident: &str, keyword: &str) -> bool {
    if keyword.is_empty() {
        return false;
    }
    let haystack = line.to_ascii_lowercase();
    let keyword = keyword.to_ascii_lowercase();
    let found = occurrences(&haystack, ident).any(|(_, end)| {
        let rest = &haystack[end..];
        let rest = rest.strip_prefix(['`', '"', ']']).unwrap_or(rest);
        let trimmed = rest.trim_start();
        trimmed.len() < rest.len() && starts_with_word(trimmed, &keyword)
    });
    found
}

/// `keyword` opening a definition: first on the line, right after `(` or
/// `,`, or after `ADD`. `KEY (a)` opens with `key`, `PRIMARY KEY (a)` does not.
pub fn opens(line: &str, keyword: &str) -> bool {
    let haystack = line.to_ascii_lowercase();
    let found = occurrences(&haystack, keyword).any(|(start, _)| {
        let before = haystack[..start].trim_end();
        before.is_empty()
            || before.ends_with([',', '('])
            || occurrences(before, "add").last().is_some_and(|(_, end)| end == before.len())
    });
    found
}

/// Byte ranges of whole-identifier matches of `ident` in lowercased `haystack`
fn occurrences<'h>(haystack: &'h str, ident: &str) -> impl Iterator<Item = (usize, usize)> + 'h {
    let needle = ident.to_ascii_lowercase();
    let bytes = haystack.as_bytes();
    let mut from = 0;
    std::iter::from_fn(move || {
        if needle.is_empty() {
            return None;
        }
        while let Some(pos) = haystack[from..].find(&needle) {
            let start = from + pos;
            let end = start + needle.len();
            from = start + 1;
            while !haystack.is_char_boundary(from) {
                from += 1;
            }
            let before_ok = start == 0 || !is_ident_byte(bytes[start - 1]);
            let after_ok = end == bytes.len() || !is_ident_byte(bytes[end]);
            if before_ok && after_ok {
                return Some((start, end));
            }
        }
        None
    })
}

fn starts_with_word(text: &str, word: &str) -> bool {
    text.starts_with(word)
        && text
            .as_bytes()
            .get(word.len())
            .map_or(true, |&b| !is_ident_byte(b))
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}
