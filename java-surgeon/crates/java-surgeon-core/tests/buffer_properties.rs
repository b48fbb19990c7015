use java_surgeon_core::{BufferError, EditSet, SourceBuffer};
use proptest::prelude::*;

proptest! {
    /// Property: applying the log to the original text always reproduces the
    /// current text, whatever sequence of edits was accepted.
    #[test]
    fn prop_log_reproduces_current_text(
        original in "[a-z \n;{}]{0,60}",
        ops in prop::collection::vec((0usize..200, 0usize..20, "[A-Z;\n]{0,6}"), 0..25),
    ) {
        let mut buffer = SourceBuffer::new(original.clone());
        let mut expected = original.clone();

        for (a, b, text) in ops {
            let len = buffer.len();
            let offset = a % (len + 1);
            let length = b % (len - offset + 1);
            match buffer.replace(offset, length, &text) {
                Ok(()) => expected.replace_range(offset..offset + length, &text),
                Err(BufferError::RangeConflict { .. }) => {}
                Err(other) => prop_assert!(false, "unexpected error {}", other),
            }
            prop_assert_eq!(buffer.text(), expected.as_str());

            let set = EditSet::new(buffer.edits().to_vec(), original.len()).unwrap();
            prop_assert_eq!(set.apply(&original), expected.clone());
        }
    }

    /// Property: undoing an edit with the inverse edit leaves an empty log.
    #[test]
    fn prop_inverse_edit_empties_log(
        original in "[a-z ]{1,40}",
        a in 0usize..100,
        b in 0usize..10,
        text in "[A-Z]{0,5}",
    ) {
        let mut buffer = SourceBuffer::new(original.clone());
        let offset = a % (original.len() + 1);
        let length = b % (original.len() - offset + 1);
        let removed = original[offset..offset + length].to_string();

        buffer.replace(offset, length, &text).unwrap();
        buffer.replace(offset, text.len(), &removed).unwrap();

        prop_assert_eq!(buffer.text(), original.as_str());
        prop_assert!(!buffer.is_modified());
    }
}
