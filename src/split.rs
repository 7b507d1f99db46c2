//! Splitting an export page into its metadata preamble and its CSV table.

use crate::endpoint::EndpointKind;
use tracing::warn;

/// One export page separated at the table header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitResponse {
    /// Lines before the table header
    pub preamble_lines: Vec<String>,
    /// The header line and everything after it, joined with `\n`
    pub table_text: String,
}

impl SplitResponse {
    /// Table text broken back into lines
    pub fn table_lines(&self) -> Vec<&str> {
        split_lines(&self.table_text)
    }
}

/// Split `text` at the first line starting with the endpoint's table marker.
///
/// When no line carries the marker the whole text is returned as table text
/// and the preamble is empty.
pub fn split_response(text: &str, kind: EndpointKind) -> SplitResponse {
    let lines = split_lines(text);
    let marker = kind.split_marker();

    let start = match lines.iter().position(|line| line.starts_with(marker)) {
        Some(index) => index,
        None => {
            warn!(endpoint = %kind, marker = marker, "Table header not found, treating whole page as table");
            0
        }
    };

    SplitResponse {
        preamble_lines: lines[..start].iter().map(|l| l.to_string()).collect(),
        table_text: lines[start..].join("\n"),
    }
}

/// Split text into lines on every line boundary SciVal files may contain.
///
/// `\r\n` counts as one boundary. A trailing boundary does not produce an
/// empty last line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_line_boundary(c) {
            continue;
        }
        lines.push(&text[start..i]);
        let mut end = i + c.len_utf8();
        if c == '\r' {
            if let Some(&(_, '\n')) = chars.peek() {
                chars.next();
                end += 1;
            }
        }
        start = end;
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }

    lines
}

fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\u{0b}'
            | '\u{0c}'
            | '\u{1c}'
            | '\u{1d}'
            | '\u{1e}'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}
