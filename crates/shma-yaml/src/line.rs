//! Line records and document splitting.

/// A single input line.
///
/// Lines are produced once from the input text and never mutated. The line
/// number is 1-based and only used for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub number: usize,
    /// Count of leading space characters
    pub indent: usize,
}

impl Line {
    pub fn new(text: impl Into<String>, number: usize) -> Self {
        let text = text.into();
        let indent = text.len() - text.trim_start_matches(' ').len();
        Self {
            text,
            number,
            indent,
        }
    }

    /// The line with surrounding whitespace removed.
    pub fn stripped(&self) -> &str {
        self.text.trim()
    }

    /// The line without its indentation, trailing whitespace removed.
    pub fn content(&self) -> &str {
        self.text[self.indent..].trim_end()
    }

    pub fn is_blank(&self) -> bool {
        self.stripped().is_empty()
    }

    /// Blank lines and whole-line comments carry no structure.
    pub fn is_ignorable(&self) -> bool {
        let stripped = self.stripped();
        stripped.is_empty() || stripped.starts_with('#')
    }
}

/// Split raw text into documents on bare `---` and `...` lines.
///
/// Blank and comment lines stay with the document they appear in. Empty input
/// yields a single empty document.
pub fn split_documents(text: &str) -> Vec<Vec<Line>> {
    let mut documents = Vec::new();
    let mut current: Vec<Line> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = Line::new(raw, idx + 1);
        let stripped = line.stripped();
        if stripped == "---" || stripped == "..." {
            if !current.is_empty() {
                documents.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push(line);
    }

    if !current.is_empty() {
        documents.push(current);
    }
    if documents.is_empty() {
        documents.push(Vec::new());
    }
    documents
}

/// Index of the first line at or after `pos` that carries content.
pub(crate) fn skip_ignorable(lines: &[Line], mut pos: usize) -> usize {
    while pos < lines.len() && lines[pos].is_ignorable() {
        pos += 1;
    }
    pos
}

/// Whether a quote character at this point opens a quoted scalar. Quotes only
/// open at the start of a token, so apostrophes inside plain text are literal.
fn opens_quote(prev: Option<char>) -> bool {
    prev.is_none_or(|c| c.is_whitespace() || matches!(c, '[' | '{' | ',' | ':'))
}

/// Whether a `#` at this point starts a comment. Like quotes, it only
/// counts at the start of a token, so `c#` stays plain text.
fn opens_comment(prev: Option<char>) -> bool {
    prev.is_none_or(char::is_whitespace)
}

/// Remove a trailing comment that is not inside a quoted scalar.
pub(crate) fn strip_comment(value: &str) -> &str {
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    let mut prev = None;
    let mut chars = value.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if in_double {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_double = false,
                _ => {}
            }
        } else if in_single {
            // `''` is an escaped quote inside a single-quoted scalar
            if ch == '\'' && chars.next_if(|(_, next)| *next == '\'').is_none() {
                in_single = false;
            }
        } else {
            match ch {
                '\'' if opens_quote(prev) => in_single = true,
                '"' if opens_quote(prev) => in_double = true,
                '#' if opens_comment(prev) => return value[..idx].trim_end(),
                _ => {}
            }
        }
        prev = Some(ch);
    }
    value.trim_end()
}

/// Byte offset of the first `key: value` separator outside quotes and flow
/// brackets. The colon must be followed by whitespace or end the text.
pub(crate) fn find_separator(text: &str) -> Option<usize> {
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    let mut depth = 0usize;
    let mut prev = None;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if in_double {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_double = false,
                _ => {}
            }
        } else if in_single {
            if ch == '\'' && chars.next_if(|(_, next)| *next == '\'').is_none() {
                in_single = false;
            }
        } else {
            match ch {
                '\'' if opens_quote(prev) => in_single = true,
                '"' if opens_quote(prev) => in_double = true,
                '[' | '{' => depth += 1,
                ']' | '}' => depth = depth.saturating_sub(1),
                '#' if opens_comment(prev) => return None,
                ':' if depth == 0 => {
                    if chars.peek().is_none_or(|(_, next)| next.is_whitespace()) {
                        return Some(idx);
                    }
                }
                _ => {}
            }
        }
        prev = Some(ch);
    }
    None
}
