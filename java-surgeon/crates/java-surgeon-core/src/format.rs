//! Formatting preservation: indentation and EOL inference, indented
//! insertion of caller-supplied source lines.

/// Detected indentation style for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndentStyle {
    Spaces(u8),
    Tabs,
}

impl IndentStyle {
    /// One level of indentation.
    pub fn unit(&self) -> String {
        match self {
            IndentStyle::Spaces(n) => " ".repeat(*n as usize),
            IndentStyle::Tabs => "\t".to_string(),
        }
    }
}

/// Infer the indentation style used in a source file.
///
/// Scans the first 200 lines and votes on the most common indentation delta
/// between adjacent lines. Returns `None` when nothing is indented.
pub fn infer_indent_style(source: &str) -> Option<IndentStyle> {
    let mut space_counts = [0u32; 9]; // index = spaces per indent level
    let mut tab_count: u32 = 0;

    let lines: Vec<&str> = source.lines().take(200).collect();
    for pair in lines.windows(2) {
        let a_indent = count_leading_spaces(pair[0]);
        let b_indent = count_leading_spaces(pair[1]);

        if pair[1].starts_with('\t') {
            tab_count += 1;
        } else {
            let delta = b_indent.abs_diff(a_indent);
            if delta > 0 && delta <= 8 {
                space_counts[delta] += 1;
            }
        }
    }

    let space_total = space_counts.iter().sum::<u32>();
    if tab_count == 0 && space_total == 0 {
        return None;
    }
    if tab_count > space_total {
        Some(IndentStyle::Tabs)
    } else {
        let most_common = space_counts
            .iter()
            .enumerate()
            .skip(1)
            .max_by_key(|(_, &count)| count)
            .map(|(i, _)| i as u8)
            .unwrap_or(2);
        Some(IndentStyle::Spaces(most_common))
    }
}

/// The line delimiter of the first line, or `None` for single-line text.
pub fn detect_eol(source: &str) -> Option<&'static str> {
    let index = source.find(['\r', '\n'])?;
    let rest = &source.as_bytes()[index..];
    Some(match rest {
        [b'\r', b'\n', ..] => "\r\n",
        [b'\r', ..] => "\r",
        _ => "\n",
    })
}

/// Extract the whitespace prefix of the line containing the given byte offset.
pub fn extract_line_prefix(source: &str, byte_offset: usize) -> String {
    let line_start = source[..byte_offset]
        .rfind(['\n', '\r'])
        .map(|i| i + 1)
        .unwrap_or(0);

    source[line_start..]
        .chars()
        .take_while(|c| c.is_whitespace() && *c != '\n' && *c != '\r')
        .collect()
}

/// Join `lines` with `eol`, prefixing each with `indent`. Leading tabs of a
/// line are nesting levels relative to the first line: each one is replaced
/// with `single_indent`.
pub fn indented_source(lines: &[impl AsRef<str>], indent: &str, single_indent: &str, eol: &str) -> String {
    let mut buffer = String::new();
    for (i, line) in lines.iter().enumerate() {
        let line = line.as_ref();
        if i != 0 {
            buffer.push_str(eol);
        }
        buffer.push_str(indent);
        let tabs = line.bytes().take_while(|b| *b == b'\t').count();
        for _ in 0..tabs {
            buffer.push_str(single_indent);
        }
        buffer.push_str(&line[tabs..]);
    }
    buffer
}

fn count_leading_spaces(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_2_spaces() {
        let source = "class A {\n  int x = 1;\n  void foo() {\n    return;\n  }\n}";
        assert_eq!(infer_indent_style(source), Some(IndentStyle::Spaces(2)));
    }

    #[test]
    fn test_infer_4_spaces() {
        let source = "class A {\n    int x = 1;\n    void foo() {\n        return;\n    }\n}";
        assert_eq!(infer_indent_style(source), Some(IndentStyle::Spaces(4)));
    }

    #[test]
    fn test_infer_tabs() {
        let source = "class A {\n\tint x = 1;\n\tvoid foo() {\n\t\treturn;\n\t}\n}";
        assert_eq!(infer_indent_style(source), Some(IndentStyle::Tabs));
    }

    #[test]
    fn test_infer_nothing_indented() {
        assert_eq!(infer_indent_style("class A {}"), None);
    }

    #[test]
    fn test_detect_eol() {
        assert_eq!(detect_eol("class A {}"), None);
        assert_eq!(detect_eol("a\nb"), Some("\n"));
        assert_eq!(detect_eol("a\r\nb"), Some("\r\n"));
        assert_eq!(detect_eol("a\rb\n"), Some("\r"));
        assert_eq!(detect_eol("a\n\rb"), Some("\n"));
    }

    #[test]
    fn test_extract_line_prefix() {
        let source = "  int x = 1;\n    int y = 2;";
        assert_eq!(extract_line_prefix(source, 13), "    ");
    }

    #[test]
    fn test_indented_source() {
        let lines = ["void foo() {", "\tbar();", "}"];
        assert_eq!(
            indented_source(&lines, "  ", "    ", "\n"),
            "  void foo() {\n      bar();\n  }"
        );
        assert_eq!(indented_source(&["int a;"], "\t", "\t", "\r\n"), "\tint a;");
        assert_eq!(indented_source(&["a", ""], "  ", "  ", "\n"), "  a\n  ");
    }

    #[test]
    fn test_indent_unit() {
        assert_eq!(IndentStyle::Spaces(4).unit(), "    ");
        assert_eq!(IndentStyle::Tabs.unit(), "\t");
    }
}
