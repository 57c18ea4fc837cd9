//! Block scalars (`|`, `>` and their chomping variants).

use crate::line::Line;

/// How body lines are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Style {
    /// `|`: lines joined with `\n` verbatim
    Literal,
    /// `>`: adjacent lines joined with a space, blank lines become `\n`
    Folded,
}

/// Trailing newline policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Chomping {
    /// Default: drop trailing blank lines, end with a single `\n`
    Clip,
    /// `-`: no trailing newline
    Strip,
    /// `+`: keep trailing blank lines, end with `\n`
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockHeader {
    pub style: Style,
    pub chomping: Chomping,
}

impl BlockHeader {
    /// Recognise a block scalar indicator occupying a whole value position.
    pub(crate) fn parse(indicator: &str) -> Option<Self> {
        let (style, chomping) = match indicator {
            "|" => (Style::Literal, Chomping::Clip),
            "|-" => (Style::Literal, Chomping::Strip),
            "|+" => (Style::Literal, Chomping::Keep),
            ">" => (Style::Folded, Chomping::Clip),
            ">-" => (Style::Folded, Chomping::Strip),
            ">+" => (Style::Folded, Chomping::Keep),
            _ => return None,
        };
        Some(Self { style, chomping })
    }
}

/// Read the body of a block scalar whose header is on line `header_pos`.
///
/// The body is every following line indented deeper than `base_indent`,
/// blank lines included. Returns the scalar and the index of the first line
/// after the body.
pub(crate) fn parse_block_scalar(
    lines: &[Line],
    header_pos: usize,
    header: BlockHeader,
    base_indent: usize,
) -> (String, usize) {
    let mut cursor = header_pos + 1;
    while cursor < lines.len() {
        let line = &lines[cursor];
        if !line.is_blank() && line.indent <= base_indent {
            break;
        }
        cursor += 1;
    }
    let body = &lines[header_pos + 1..cursor];

    let Some(strip_column) = body
        .iter()
        .filter(|line| !line.is_blank())
        .map(|line| line.indent)
        .min()
    else {
        let empty = match header.chomping {
            Chomping::Strip => String::new(),
            Chomping::Clip | Chomping::Keep => "\n".to_string(),
        };
        return (empty, cursor);
    };

    let processed: Vec<&str> = body
        .iter()
        .map(|line| {
            if line.is_blank() {
                ""
            } else {
                &line.text[strip_column..]
            }
        })
        .collect();

    let trailing = processed.iter().rev().take_while(|l| l.is_empty()).count();
    let content = &processed[..processed.len() - trailing];

    let mut text = match header.style {
        Style::Literal => content.join("\n"),
        Style::Folded => fold(content),
    };

    match header.chomping {
        Chomping::Strip => {}
        Chomping::Clip => text.push('\n'),
        Chomping::Keep => {
            text.push('\n');
            text.push_str(&"\n".repeat(trailing));
        }
    }

    (text, cursor)
}

/// Join adjacent non-blank lines with a space; each blank line between
/// paragraphs becomes a single `\n`.
fn fold(lines: &[&str]) -> String {
    let mut out = String::new();
    let mut blank_run = 0;
    let mut first = true;
    for line in lines {
        if line.is_empty() {
            blank_run += 1;
            continue;
        }
        if !first && blank_run == 0 {
            out.push(' ');
        } else {
            out.push_str(&"\n".repeat(blank_run));
        }
        out.push_str(line);
        first = false;
        blank_run = 0;
    }
    out
}
