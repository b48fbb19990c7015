//! Source buffer with a text-edit log.
//!
//! Callers address the CURRENT text. Every change is recorded as a
//! `TextEdit` against the ORIGINAL text, so that applying the log to the
//! original reproduces the current text at any time.

use crate::edit::{EditSet, TextEdit};
use serde::Serialize;
use thiserror::Error;
use tracing::trace;

/// Errors raised by buffer access and edits.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum BufferError {
    #[error("Bad location [{start}..{end}) in text of length {len}")]
    BadLocation { start: usize, end: usize, len: usize },

    #[error(
        "Edit [{start}..{end}) straddles recorded edits at [{first_start}..{first_end}) and [{second_start}..{second_end})"
    )]
    RangeConflict {
        start: usize,
        end: usize,
        first_start: usize,
        first_end: usize,
        second_start: usize,
        second_end: usize,
    },

    #[error("Can not find '{needle}' starting from {from}")]
    NotFound { needle: String, from: usize },
}

/// The original text, the current text and the log connecting them.
#[derive(Debug, Clone)]
pub struct SourceBuffer {
    original: String,
    current: String,
    /// Sorted by original start, non-overlapping.
    edits: Vec<TextEdit>,
}

impl SourceBuffer {
    pub fn new(original: impl Into<String>) -> Self {
        let original = original.into();
        Self {
            current: original.clone(),
            original,
            edits: Vec::new(),
        }
    }

    /// The current text.
    pub fn text(&self) -> &str {
        &self.current
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Recorded edits, sorted by their original start offset.
    pub fn edits(&self) -> &[TextEdit] {
        &self.edits
    }

    pub fn is_modified(&self) -> bool {
        !self.edits.is_empty()
    }

    /// The log as a validated `EditSet` over the original text.
    pub fn edit_set(&self) -> EditSet {
        // the log is kept sorted and disjoint, so this never fails
        EditSet::new(self.edits.clone(), self.original.len()).unwrap_or_default()
    }

    /// Substring of the current text.
    pub fn text_range(&self, offset: usize, length: usize) -> Result<&str, BufferError> {
        let end = offset.saturating_add(length);
        self.check_range(offset, end)?;
        Ok(&self.current[offset..end])
    }

    /// Character at the given offset of the current text.
    pub fn char_at(&self, offset: usize) -> Result<char, BufferError> {
        self.current
            .get(offset..)
            .and_then(|rest| rest.chars().next())
            .ok_or(BufferError::BadLocation {
                start: offset,
                end: offset,
                len: self.current.len(),
            })
    }

    /// First occurrence of `needle` at or after `from`.
    pub fn index_of(&self, needle: &str, from: usize) -> Result<usize, BufferError> {
        self.current
            .get(from..)
            .and_then(|rest| rest.find(needle))
            .map(|index| from + index)
            .ok_or_else(|| BufferError::NotFound {
                needle: needle.to_string(),
                from,
            })
    }

    /// Nearest occurrence of `c` strictly before `end`.
    pub fn index_of_char_backward(&self, c: char, end: usize) -> Result<usize, BufferError> {
        self.current
            .get(..end)
            .and_then(|head| head.rfind(c))
            .ok_or_else(|| BufferError::NotFound {
                needle: c.to_string(),
                from: end,
            })
    }

    /// Replace `length` bytes at `offset` (current coordinates) with `text`.
    pub fn replace(&mut self, offset: usize, length: usize, text: &str) -> Result<(), BufferError> {
        let end = offset.saturating_add(length);
        self.check_range(offset, end)?;
        if length == 0 && text.is_empty() {
            return Ok(());
        }

        // Walk the log in current coordinates, collecting edits that touch
        // or overlap [offset, end).
        let mut shift_before: isize = 0;
        let mut shift_involved: isize = 0;
        let mut first: Option<usize> = None;
        let mut last: Option<usize> = None;
        let mut insert_at = self.edits.len();
        let mut inside_start: Option<(usize, usize, usize)> = None;
        let mut inside_end: Option<(usize, usize, usize)> = None;
        let mut union_start = offset;
        let mut union_end = end;

        for (i, edit) in self.edits.iter().enumerate() {
            let cs = (edit.start as isize + shift_before + shift_involved) as usize;
            let ce = cs + edit.replacement.len();
            if ce < offset {
                shift_before += edit.delta();
                continue;
            }
            if cs > end {
                insert_at = i;
                break;
            }
            if cs < offset && offset < ce {
                inside_start = Some((i, cs, ce));
            }
            if cs < end && end < ce {
                inside_end = Some((i, cs, ce));
            }
            first.get_or_insert(i);
            last = Some(i);
            union_start = union_start.min(cs);
            union_end = union_end.max(ce);
            shift_involved += edit.delta();
        }

        if let (Some((a, a_start, a_end)), Some((b, b_start, b_end))) = (inside_start, inside_end) {
            if a != b {
                return Err(BufferError::RangeConflict {
                    start: offset,
                    end,
                    first_start: a_start,
                    first_end: a_end,
                    second_start: b_start,
                    second_end: b_end,
                });
            }
        }

        // Map the union back to original coordinates.
        let original_start = match first {
            Some(i) if union_start < offset || self.starts_at(i, union_start, shift_before) => {
                self.edits[i].start
            }
            _ => (offset as isize - shift_before) as usize,
        };
        let original_end = match last {
            Some(i) if union_end > end || self.ends_at(i, union_end, shift_before, shift_involved) => {
                self.edits[i].end
            }
            _ => (end as isize - shift_before - shift_involved) as usize,
        };

        let mut replacement = String::with_capacity(union_end - union_start + text.len());
        replacement.push_str(&self.current[union_start..offset]);
        replacement.push_str(text);
        replacement.push_str(&self.current[end..union_end]);

        let range = match (first, last) {
            (Some(f), Some(l)) => f..l + 1,
            _ => insert_at..insert_at,
        };
        let at = range.start;
        self.edits.drain(range);
        if self.original[original_start..original_end] != replacement {
            self.edits
                .insert(at, TextEdit::new(original_start, original_end, replacement));
        }

        self.current.replace_range(offset..end, text);
        trace!(offset, length, inserted = text.len(), log = self.edits.len(), "buffer replace");
        Ok(())
    }

    /// Forget the log and make the current text the new original.
    pub fn rebase(&mut self) {
        self.original = self.current.clone();
        self.edits.clear();
    }

    /// Replace the whole text, recording it as a single edit.
    pub fn set_text(&mut self, text: &str) -> Result<(), BufferError> {
        self.replace(0, self.current.len(), text)
    }

    fn starts_at(&self, index: usize, position: usize, shift_before: isize) -> bool {
        (self.edits[index].start as isize + shift_before) as usize == position
    }

    fn ends_at(&self, index: usize, position: usize, shift_before: isize, shift_involved: isize) -> bool {
        (self.edits[index].end as isize + shift_before + shift_involved) as usize == position
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), BufferError> {
        if start > end
            || end > self.current.len()
            || !self.current.is_char_boundary(start)
            || !self.current.is_char_boundary(end)
        {
            return Err(BufferError::BadLocation {
                start,
                end,
                len: self.current.len(),
            });
        }
        Ok(())
    }
}
