//! Whitespace, comment and line scanning over source text.
//!
//! All offsets are byte offsets. Scans only ever stop on ASCII bytes or on
//! the first byte of a character, so results are char boundaries.

fn is_eol(b: u8) -> bool {
    b == b'\r' || b == b'\n'
}

fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace()
}

/// The whitespace run that ends at `end`.
pub fn whitespace_to_left(text: &str, end: usize, include_eol: bool) -> &str {
    let start = skip_whitespace_to_left(text, end, include_eol);
    &text[start..end]
}

/// Index of the first character of the whitespace run that ends at `end`.
pub fn skip_whitespace_to_left(text: &str, end: usize, include_eol: bool) -> usize {
    let bytes = text.as_bytes();
    let mut start = end.min(bytes.len());
    while start != 0 {
        let b = bytes[start - 1];
        if !is_space(b) || (!include_eol && is_eol(b)) {
            break;
        }
        start -= 1;
    }
    start
}

/// Skips whitespace to the left and then any lines that are empty or hold
/// only an end-of-line comment.
pub fn skip_whitespace_and_pure_eolc_to_left(text: &str, end: usize) -> usize {
    let mut index = skip_whitespace_to_left(text, end, false);
    while index != 0 {
        let begin = line_begin(text, index - 1);
        let line_end = line_end(text, index - 1);
        let content = text[begin..line_end].trim_start_matches([' ', '\t']);
        if content.is_empty() || content.starts_with("//") {
            index = begin;
            continue;
        }
        break;
    }
    index
}

/// If the characters left of `index` are an EOL, skips exactly one.
pub fn skip_single_eol_to_left(text: &str, index: usize) -> usize {
    let bytes = text.as_bytes();
    let mut index = index.min(bytes.len());
    if index > 0 && bytes[index - 1] == b'\n' {
        index -= 1;
    }
    if index > 0 && bytes[index - 1] == b'\r' {
        index -= 1;
    }
    index
}

/// Index of the first non-whitespace character to the right on the same
/// line, stopping at the EOL. An end-of-line comment is skipped up to the
/// EOL that terminates it.
pub fn skip_whitespace_eolc_to_right(text: &str, position: usize) -> usize {
    let bytes = text.as_bytes();
    let mut position = position;
    while position < bytes.len() {
        let b = bytes[position];
        if is_eol(b) {
            break;
        }
        if is_space(b) {
            position += 1;
            continue;
        }
        if b == b'/' && bytes.get(position + 1) == Some(&b'/') {
            return line_end(text, position);
        }
        break;
    }
    position
}

/// The index just past a statement: trailing spaces and an end-of-line
/// comment are skipped; the result is the index of the EOL, of the next
/// non-whitespace character, or the end of text.
pub fn statement_end_index(text: &str, node_end: usize) -> usize {
    let bytes = text.as_bytes();
    let mut index = node_end;
    while index < bytes.len() {
        let b = bytes[index];
        if is_eol(b) || !is_space(b) {
            break;
        }
        index += 1;
    }
    if bytes.get(index) == Some(&b'/') && bytes.get(index + 1) == Some(&b'/') {
        return line_end(text, index);
    }
    index
}

/// First index at or after `from` holding one of `chars`.
pub fn index_of_any(text: &str, chars: &str, from: usize) -> Option<usize> {
    text.get(from..)?
        .char_indices()
        .find(|(_, c)| chars.contains(*c))
        .map(|(i, _)| from + i)
}

/// First index at or after `from` holding a character not in `chars`.
pub fn index_of_any_but(text: &str, chars: &str, from: usize) -> Option<usize> {
    text.get(from..)?
        .char_indices()
        .find(|(_, c)| !chars.contains(*c))
        .map(|(i, _)| from + i)
}

/// Nearest index strictly before `end` holding a character not in `chars`.
pub fn index_of_any_but_backward(text: &str, chars: &str, end: usize) -> Option<usize> {
    text.get(..end)?
        .char_indices()
        .rev()
        .find(|(_, c)| !chars.contains(*c))
        .map(|(i, _)| i)
}

/// Zero-based line number of `offset`. `\r\n` counts as one line break.
pub fn line_number(text: &str, offset: usize) -> usize {
    let bytes = text.as_bytes();
    let end = offset.min(bytes.len());
    let mut line = 0;
    let mut i = 0;
    while i < end {
        match bytes[i] {
            b'\r' => {
                if i + 1 < end && bytes[i + 1] == b'\n' {
                    i += 1;
                }
                line += 1;
            }
            b'\n' => line += 1,
            _ => {}
        }
        i += 1;
    }
    line
}

/// Index of the first character of the line containing `offset`.
pub fn line_begin(text: &str, offset: usize) -> usize {
    let bytes = text.as_bytes();
    let mut i = offset.min(bytes.len());
    if i > 0 && i < bytes.len() && bytes[i] == b'\n' && bytes[i - 1] == b'\r' {
        i -= 1;
    }
    while i > 0 && !is_eol(bytes[i - 1]) {
        i -= 1;
    }
    i
}

/// Index of the first EOL character of the line containing `offset`, or the
/// text length on the last line.
pub fn line_end(text: &str, offset: usize) -> usize {
    let bytes = text.as_bytes();
    let mut i = offset.min(bytes.len());
    if i > 0 && i < bytes.len() && bytes[i] == b'\n' && bytes[i - 1] == b'\r' {
        return i - 1;
    }
    while i < bytes.len() && !is_eol(bytes[i]) {
        i += 1;
    }
    i
}

/// Index just past the EOL that ends the line containing `offset`.
pub fn next_line_begin(text: &str, offset: usize) -> usize {
    let bytes = text.as_bytes();
    let mut i = line_end(text, offset);
    if i < bytes.len() && bytes[i] == b'\r' {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'\n' {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_to_left() {
        let text = "foo\n  \t bar";
        assert_eq!(whitespace_to_left(text, 8, false), "  \t ");
        assert_eq!(whitespace_to_left(text, 8, true), "\n  \t ");
        assert_eq!(whitespace_to_left(text, 3, false), "");
        assert_eq!(whitespace_to_left("  x", 2, false), "  ");
    }

    #[test]
    fn test_skip_whitespace_and_pure_eolc_to_left() {
        let text = "  int a;\n\n  // comment\n    \n  int b;";
        let b = text.find("int b").unwrap();
        assert_eq!(skip_whitespace_and_pure_eolc_to_left(text, b), 9);

        let text = "{ int b;";
        assert_eq!(skip_whitespace_and_pure_eolc_to_left(text, 2), 1);

        let text = "\n  x";
        assert_eq!(skip_whitespace_and_pure_eolc_to_left(text, 3), 0);
    }

    #[test]
    fn test_skip_single_eol_to_left() {
        assert_eq!(skip_single_eol_to_left("a\r\nb", 3), 1);
        assert_eq!(skip_single_eol_to_left("a\nb", 2), 1);
        assert_eq!(skip_single_eol_to_left("a\n\nb", 3), 2);
        assert_eq!(skip_single_eol_to_left("ab", 1), 1);
    }

    #[test]
    fn test_skip_whitespace_eolc_to_right() {
        let text = "int a;  // tail\nint b;";
        assert_eq!(skip_whitespace_eolc_to_right(text, 6), 15);
        assert_eq!(skip_whitespace_eolc_to_right("int a;  int b;", 6), 8);
        assert_eq!(skip_whitespace_eolc_to_right("x  ", 1), 3);
    }

    #[test]
    fn test_statement_end_index() {
        let text = "int a;\t \t\n }";
        assert_eq!(statement_end_index(text, 6), 9);
        let text = "int a; // abc \n}";
        assert_eq!(statement_end_index(text, 6), 14);
        let text = "int a;}";
        assert_eq!(statement_end_index(text, 6), 6);
        let text = "int a; // tail";
        assert_eq!(statement_end_index(text, 6), text.len());
    }

    #[test]
    fn test_index_of_any_but() {
        let text = "bar(0  ,  \r\n 1, 2)";
        assert_eq!(index_of_any_but(text, ", \t\r\n", 5), Some(13));
        assert_eq!(index_of_any_but_backward(text, ", \t\r\n", 13), Some(4));
        assert_eq!(index_of_any(text, ",)", 0), Some(7));
        assert_eq!(index_of_any_but("   ", " ", 0), None);
    }

    #[test]
    fn test_lines() {
        let text = "a\r\nbb\ncc\rd";
        assert_eq!(line_number(text, 0), 0);
        assert_eq!(line_number(text, 3), 1);
        assert_eq!(line_number(text, 7), 2);
        assert_eq!(line_number(text, 10), 3);
        assert_eq!(line_begin(text, 4), 3);
        assert_eq!(line_end(text, 4), 5);
        assert_eq!(line_end(text, 0), 1);
        assert_eq!(line_begin(text, 2), 0);
        assert_eq!(next_line_begin(text, 0), 3);
        assert_eq!(line_end(text, 10), text.len());
    }
}
