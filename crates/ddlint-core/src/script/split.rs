//! Statement splitting over raw script text

use std::ops::Range;

use crate::dialect::SqlDialect;

use super::Script;

/// One semicolon-terminated statement of a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Byte range in the script source, without the terminating `;`
    pub bytes: Range<usize>,
    /// 0-based line indices covered by the statement, end exclusive
    pub lines: Range<usize>,
}

impl Segment {
    pub fn text<'s>(&self, script: &'s Script) -> &'s str {
        &script.source()[self.bytes.clone()]
    }
}

/// Split a script into statements.
///
/// Quoted strings and identifiers, line comments and block comments are
/// skipped so a `;` inside them does not end a statement. Segments that are
/// blank after trimming are dropped. The line range of a segment starts at its
/// first non-blank character and ends at the line holding its terminator.
pub fn split_statements(script: &Script, dialect: SqlDialect) -> Vec<Segment> {
    let sql = script.source();
    let bytes = sql.as_bytes();
    let len = bytes.len();
    let mut segments = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < len {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                i = skip_quoted(bytes, i, quote);
            }
            b'$' if dialect == SqlDialect::PostgreSQL => {
                if let Some(tag_end) = find_dollar_tag_end(sql, i) {
                    let tag = &sql[i..=tag_end];
                    i = tag_end + 1;
                    if let Some(close_pos) = sql[i..].find(tag) {
                        i += close_pos + tag.len();
                    } else {
                        i = len;
                    }
                } else {
                    i += 1;
                }
            }
            b'-' if i + 1 < len && bytes[i + 1] == b'-' => {
                i = skip_line(bytes, i);
            }
            b'#' if dialect.hash_comments() => {
                i = skip_line(bytes, i);
            }
            b'/' if i + 1 < len && bytes[i + 1] == b'*' => {
                i += 2;
                while i + 1 < len {
                    if bytes[i] == b'*' && bytes[i + 1] == b'/' {
                        i += 1;
                        break;
                    }
                    i += 1;
                }
                i += 1;
            }
            b';' => {
                push_segment(script, dialect, start..i, i, &mut segments);
                start = i + 1;
                i += 1;
            }
            _ => {
                i += 1;
            }
        }
    }

    // Last statement without a trailing semicolon
    if start < len {
        push_segment(
            script,
            dialect,
            start..len,
            len.saturating_sub(1),
            &mut segments,
        );
    }

    segments
}

fn push_segment(
    script: &Script,
    dialect: SqlDialect,
    range: Range<usize>,
    terminator: usize,
    out: &mut Vec<Segment>,
) {
    let text = &script.source()[range.clone()];
    let Some(lead) = code_start(text, dialect) else {
        return;
    };
    let first = script.line_index_of(range.start + lead);
    let last = script.line_index_of(terminator);
    out.push(Segment {
        bytes: range,
        lines: first..last + 1,
    });
}

/// Offset of the first byte that is neither whitespace nor comment
fn code_start(text: &str, dialect: SqlDialect) -> Option<usize> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut i = 0;
    loop {
        while i < len && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= len {
            return None;
        }
        if text[i..].starts_with("--") || (bytes[i] == b'#' && dialect.hash_comments()) {
            i = skip_line(bytes, i);
        } else if text[i..].starts_with("/*") {
            i += 2 + text[i + 2..].find("*/")? + 2;
        } else {
            return Some(i);
        }
    }
}

fn skip_quoted(bytes: &[u8], open: usize, quote: u8) -> usize {
    let len = bytes.len();
    let mut i = open + 1;
    while i < len {
        match bytes[i] {
            b'\\' if quote != b'`' => i += 2,
            b if b == quote => {
                i += 1;
                if i < len && bytes[i] == quote {
                    i += 1; // doubled quote
                } else {
                    return i;
                }
            }
            _ => i += 1,
        }
    }
    len
}

fn skip_line(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i] != b'\n' {
        i += 1;
    }
    i
}

/// Find the end of a dollar-quote tag starting at position `start`.
/// Returns the index of the closing `$` if a valid tag is found.
fn find_dollar_tag_end(sql: &str, start: usize) -> Option<usize> {
    let bytes = sql.as_bytes();
    let len = bytes.len();
    let mut i = start + 1;
    if i < len && bytes[i] == b'$' {
        return Some(i);
    }
    while i < len && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
    }
    if i < len && bytes[i] == b'$' {
        Some(i)
    } else {
        None
    }
}
