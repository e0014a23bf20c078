//! Logical lines of a DBC schema.
//!
//! A physical line with an odd number of `"` is joined with the following
//! lines (separated by `'\n'`) until the quote count is even again, so quoted
//! strings may span several lines.

use std::iter::Peekable;
use std::vec::IntoIter;

use crate::core::strings::count_quotes;
use crate::types::errors::DbcParseError;

/// One logical line, trimmed, with tabs replaced by spaces.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LogicalLine {
    /// 1-based physical line the logical line starts on.
    pub number: usize,
    pub text: String,
}

impl LogicalLine {
    pub(crate) fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// Splits `text` into logical lines.
///
/// Continuation lines are appended after a `'\n'`, not concatenated directly,
/// so the joined text keeps the line breaks of the quoted string.
///
/// Fails with `MalformedSchema` on a quoted string still open at end of input.
pub(crate) fn join_logical_lines(text: &str) -> Result<Vec<LogicalLine>, DbcParseError> {
    let mut out: Vec<LogicalLine> = Vec::new();
    let mut pending: Option<(LogicalLine, usize)> = None;

    for (idx, raw) in text.lines().enumerate() {
        let normalized: String = raw.replace('\t', " ");
        let line: &str = normalized.trim();
        let quotes: usize = count_quotes(line);

        if let Some((mut open, count)) = pending.take() {
            open.text.push('\n');
            open.text.push_str(line);
            let count: usize = count + quotes;
            if count % 2 == 0 {
                out.push(open);
            } else {
                pending = Some((open, count));
            }
            continue;
        }

        let logical = LogicalLine {
            number: idx + 1,
            text: line.to_string(),
        };
        if quotes % 2 == 1 {
            pending = Some((logical, quotes));
        } else {
            out.push(logical);
        }
    }

    if let Some((open, _)) = pending {
        return Err(DbcParseError::malformed(
            open.number,
            "unterminated quoted string",
        ));
    }
    Ok(out)
}

/// Forward cursor over owned logical lines.
pub(crate) struct LineCursor {
    lines: Peekable<IntoIter<LogicalLine>>,
}

impl LineCursor {
    pub(crate) fn new(lines: Vec<LogicalLine>) -> Self {
        LineCursor {
            lines: lines.into_iter().peekable(),
        }
    }

    pub(crate) fn next(&mut self) -> Option<LogicalLine> {
        self.lines.next()
    }

    pub(crate) fn peek(&mut self) -> Option<&LogicalLine> {
        self.lines.peek()
    }

    /// Consumes the next line only if it satisfies `pred`.
    pub(crate) fn next_if(&mut self, pred: impl FnOnce(&LogicalLine) -> bool) -> Option<LogicalLine> {
        self.lines.next_if(pred)
    }

    /// Consumes lines up to the next blank line (consumed too) or the end.
    pub(crate) fn take_block(&mut self) -> Vec<LogicalLine> {
        let mut block: Vec<LogicalLine> = Vec::new();
        while let Some(line) = self.lines.next() {
            if line.is_blank() {
                break;
            }
            block.push(line);
        }
        block
    }
}
