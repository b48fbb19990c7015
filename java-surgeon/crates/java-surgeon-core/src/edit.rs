//! Text edits against an original source string.
//!
//! A `TextEdit` addresses bytes of the ORIGINAL text. An `EditSet` is a
//! validated, sorted, non-overlapping collection of them that can be applied
//! in one pass using reverse-order application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single text replacement. Replaces bytes `[start..end)` with `replacement`.
/// `start` and `end` are byte offsets into the ORIGINAL source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    /// Byte offset of the first byte to replace (inclusive).
    pub start: usize,
    /// Byte offset past the last byte to replace (exclusive).
    pub end: usize,
    /// The replacement text.
    pub replacement: String,
    /// Human-readable label for diagnostics.
    #[serde(default)]
    pub label: String,
}

impl TextEdit {
    pub fn new(start: usize, end: usize, replacement: impl Into<String>) -> Self {
        Self {
            start,
            end,
            replacement: replacement.into(),
            label: String::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Length change this edit causes.
    pub fn delta(&self) -> isize {
        self.replacement.len() as isize - (self.end - self.start) as isize
    }

    pub fn is_insertion(&self) -> bool {
        self.start == self.end
    }
}

/// Describes what went wrong when building an EditSet.
#[derive(Debug, Clone, Error, Serialize)]
pub enum EditConflict {
    #[error("Edits overlap: '{a_label}' [{a_start}..{a_end}) and '{b_label}' [{b_start}..{b_end})")]
    Overlapping {
        a_label: String,
        a_start: usize,
        a_end: usize,
        b_label: String,
        b_start: usize,
        b_end: usize,
    },
    #[error("Edit '{label}' byte range [{start}..{end}) exceeds source length {source_len}")]
    OutOfBounds {
        label: String,
        start: usize,
        end: usize,
        source_len: usize,
    },
}

/// A validated, non-overlapping set of edits for a single source string.
///
/// Edits are stored sorted by `(start, end)` ascending.
/// The `apply` method processes them in REVERSE order so byte offsets
/// remain valid throughout.
#[derive(Debug, Clone, Default)]
pub struct EditSet {
    edits: Vec<TextEdit>,
}

impl EditSet {
    /// Create a new EditSet, validating against the given source length.
    ///
    /// Returns `Err` if any edits overlap or are out of bounds.
    pub fn new(mut edits: Vec<TextEdit>, source_len: usize) -> Result<Self, EditConflict> {
        edits.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));

        for edit in &edits {
            if edit.start > edit.end || edit.end > source_len {
                return Err(EditConflict::OutOfBounds {
                    label: edit.label.clone(),
                    start: edit.start,
                    end: edit.end,
                    source_len,
                });
            }
        }

        // edit[i].end must be <= edit[i+1].start; two insertions at one point
        // have no defined order, so they conflict as well
        for pair in edits.windows(2) {
            let a = &pair[0];
            let b = &pair[1];
            let same_point_inserts = a.is_insertion() && b.is_insertion() && a.start == b.start;
            if a.end > b.start || same_point_inserts {
                return Err(EditConflict::Overlapping {
                    a_label: a.label.clone(),
                    a_start: a.start,
                    a_end: a.end,
                    b_label: b.label.clone(),
                    b_start: b.start,
                    b_end: b.end,
                });
            }
        }

        Ok(Self { edits })
    }

    /// Apply all edits to `source` and return the new text.
    pub fn apply(&self, source: &str) -> String {
        let mut result = source.to_string();
        for edit in self.edits.iter().rev() {
            result.replace_range(edit.start..edit.end, &edit.replacement);
        }
        result
    }

    /// Returns the number of edits.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Returns true if there are no edits.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Returns an iterator over edits (sorted ascending by start offset).
    pub fn iter(&self) -> impl Iterator<Item = &TextEdit> {
        self.edits.iter()
    }

    pub fn into_edits(self) -> Vec<TextEdit> {
        self.edits
    }
}

/// Compute the single edit that turns `old` into `new`: the common prefix and
/// suffix are kept, everything between them is replaced.
///
/// Returns `None` when both texts are equal.
pub fn difference_interval(old: &str, new: &str) -> Option<TextEdit> {
    if old == new {
        return None;
    }
    let old_bytes = old.as_bytes();
    let new_bytes = new.as_bytes();

    let mut prefix = old_bytes
        .iter()
        .zip(new_bytes.iter())
        .take_while(|(a, b)| a == b)
        .count();
    while !old.is_char_boundary(prefix) || !new.is_char_boundary(prefix) {
        prefix -= 1;
    }

    let max_suffix = old.len().min(new.len()) - prefix;
    let mut suffix = old_bytes
        .iter()
        .rev()
        .zip(new_bytes.iter().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();
    while !old.is_char_boundary(old.len() - suffix) || !new.is_char_boundary(new.len() - suffix)
    {
        suffix -= 1;
    }

    Some(
        TextEdit::new(prefix, old.len() - suffix, &new[prefix..new.len() - suffix])
            .with_label("difference"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_edit() {
        let source = "hello world";
        let edits = vec![TextEdit::new(6, 11, "rust")];
        let edit_set = EditSet::new(edits, source.len()).unwrap();
        assert_eq!(edit_set.apply(source), "hello rust");
    }

    #[test]
    fn test_multiple_non_overlapping_edits() {
        let source = "aaa bbb ccc";
        let edits = vec![TextEdit::new(8, 11, "zzz"), TextEdit::new(0, 3, "xxx")];
        let edit_set = EditSet::new(edits, source.len()).unwrap();
        assert_eq!(edit_set.apply(source), "xxx bbb zzz");
        assert_eq!(edit_set.iter().next().unwrap().start, 0);
    }

    #[test]
    fn test_insertions_at_same_point_rejected() {
        let source = "ab";
        let edits = vec![TextEdit::new(1, 1, "X"), TextEdit::new(1, 1, "Y")];
        assert!(matches!(
            EditSet::new(edits, source.len()),
            Err(EditConflict::Overlapping { .. })
        ));
    }

    #[test]
    fn test_insertion_touching_replacement() {
        let source = "abcd";
        let edits = vec![TextEdit::new(1, 1, "X"), TextEdit::new(1, 3, "Y")];
        let edit_set = EditSet::new(edits, source.len()).unwrap();
        assert_eq!(edit_set.apply(source), "aXYd");
    }

    #[test]
    fn test_overlapping_edits_rejected() {
        let source = "hello world";
        let edits = vec![
            TextEdit::new(3, 8, "X").with_label("edit1"),
            TextEdit::new(5, 10, "Y").with_label("edit2"),
        ];
        match EditSet::new(edits, source.len()).unwrap_err() {
            EditConflict::Overlapping { a_label, b_label, .. } => {
                assert_eq!(a_label, "edit1");
                assert_eq!(b_label, "edit2");
            }
            other => panic!("Expected Overlapping, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let source = "hello";
        let result = EditSet::new(vec![TextEdit::new(3, 10, "X")], source.len());
        assert!(matches!(result, Err(EditConflict::OutOfBounds { .. })));
    }

    #[test]
    fn test_empty_edit_set() {
        let source = "unchanged";
        let edit_set = EditSet::new(vec![], source.len()).unwrap();
        assert_eq!(edit_set.apply(source), "unchanged");
        assert!(edit_set.is_empty());
    }

    #[test]
    fn test_reverse_order_correctness() {
        let source = "ab cd ef";
        let edits = vec![
            TextEdit::new(0, 2, "LONGER"),
            TextEdit::new(3, 5, "X"),
            TextEdit::new(6, 8, "YYY"),
        ];
        let edit_set = EditSet::new(edits, source.len()).unwrap();
        assert_eq!(edit_set.apply(source), "LONGER X YYY");
    }

    #[test]
    fn test_difference_interval() {
        assert_eq!(difference_interval("same", "same"), None);

        let edit = difference_interval("class A {}", "class A { int a; }").unwrap();
        assert_eq!((edit.start, edit.end), (9, 9));
        assert_eq!(edit.replacement, " int a; ");

        let edit = difference_interval("aXXb", "ab").unwrap();
        assert_eq!((edit.start, edit.end, edit.replacement.as_str()), (1, 3, ""));
    }

    #[test]
    fn test_difference_interval_applies() {
        let old = "int a;\nint b;\nint c;";
        let new = "int a;\nint c;";
        let edit = difference_interval(old, new).unwrap();
        let set = EditSet::new(vec![edit], old.len()).unwrap();
        assert_eq!(set.apply(old), new);
    }
}
