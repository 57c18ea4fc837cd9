//! Inline flow collections (`[a, b]`, `{k: v}`).
//!
//! The accepted grammar is deliberately small:
//!
//! ```text
//! node     := sequence | mapping | quoted | plain
//! sequence := '[' ( node ( ',' node )* ','? )? ']'
//! mapping  := '{' ( entry ( ',' entry )* ','? )? '}'
//! entry    := key ( ':' node )?
//! ```
//!
//! Plain elements run up to the next `,`, `]` or `}` and are classified like
//! any other unquoted scalar. Every helper takes a byte position and returns
//! the parsed value together with the position after it.

use crate::error::{FormatError, Result};
use crate::scalar::{classify_plain, parse_quoted};
use crate::value::{Mapping, Value};

/// Parse a complete flow collection. Trailing text after the closing bracket
/// is an error.
pub(crate) fn parse_flow(text: &str, line: usize, depth: usize, max_depth: usize) -> Result<Value> {
    let (value, end) = parse_node(text, 0, line, depth, max_depth)?;
    let rest = text[end..].trim();
    if !rest.is_empty() {
        return Err(FormatError::brackets(
            line,
            format!("unexpected `{}` after flow collection", rest),
        ));
    }
    Ok(value)
}

fn peek(text: &str, pos: usize) -> Option<char> {
    text[pos..].chars().next()
}

fn skip_ws(text: &str, mut pos: usize) -> usize {
    while text.as_bytes().get(pos).is_some_and(u8::is_ascii_whitespace) {
        pos += 1;
    }
    pos
}

/// End of a plain scalar starting at `pos`. Keys also stop at a `: ` separator.
fn plain_end(text: &str, pos: usize, is_key: bool) -> usize {
    for (offset, ch) in text[pos..].char_indices() {
        match ch {
            ',' | ']' | '}' => return pos + offset,
            ':' if is_key => {
                let after = peek(text, pos + offset + 1);
                if after.is_none_or(|c| c.is_whitespace() || matches!(c, ',' | ']' | '}')) {
                    return pos + offset;
                }
            }
            _ => {}
        }
    }
    text.len()
}

fn enter(line: usize, depth: usize, max_depth: usize) -> Result<usize> {
    if depth >= max_depth {
        return Err(FormatError::DepthExceeded {
            line,
            limit: max_depth,
        });
    }
    Ok(depth + 1)
}

fn parse_node(
    text: &str,
    pos: usize,
    line: usize,
    depth: usize,
    max_depth: usize,
) -> Result<(Value, usize)> {
    let pos = skip_ws(text, pos);
    match peek(text, pos) {
        Some('[') => parse_sequence(text, pos, line, depth, max_depth),
        Some('{') => parse_mapping(text, pos, line, depth, max_depth),
        Some('"' | '\'') => {
            let (s, consumed) = parse_quoted(&text[pos..], line)?;
            Ok((Value::String(s), pos + consumed))
        }
        Some(',') => Err(FormatError::syntax(line, "Empty element in flow collection")),
        Some(c @ (']' | '}')) => Err(FormatError::brackets(line, format!("unexpected `{}`", c))),
        None => Err(FormatError::brackets(line, "unexpected end of flow collection")),
        Some(_) => {
            let end = plain_end(text, pos, false);
            Ok((classify_plain(text[pos..end].trim()), end))
        }
    }
}

fn parse_sequence(
    text: &str,
    open: usize,
    line: usize,
    depth: usize,
    max_depth: usize,
) -> Result<(Value, usize)> {
    let depth = enter(line, depth, max_depth)?;
    let mut items = Vec::new();
    let mut pos = open + 1;
    loop {
        pos = skip_ws(text, pos);
        if peek(text, pos) == Some(']') {
            return Ok((Value::Sequence(items), pos + 1));
        }
        let (item, next) = parse_node(text, pos, line, depth, max_depth)?;
        items.push(item);
        pos = skip_ws(text, next);
        match peek(text, pos) {
            Some(',') => pos += 1,
            Some(']') => return Ok((Value::Sequence(items), pos + 1)),
            Some(c) => {
                return Err(FormatError::brackets(
                    line,
                    format!("expected `,` or `]`, found `{}`", c),
                ));
            }
            None => return Err(FormatError::brackets(line, "missing closing `]`")),
        }
    }
}

fn parse_mapping(
    text: &str,
    open: usize,
    line: usize,
    depth: usize,
    max_depth: usize,
) -> Result<(Value, usize)> {
    let depth = enter(line, depth, max_depth)?;
    let mut map = Mapping::new();
    let mut pos = open + 1;
    loop {
        pos = skip_ws(text, pos);
        match peek(text, pos) {
            Some('}') => return Ok((Value::Mapping(map), pos + 1)),
            Some(',') => return Err(FormatError::syntax(line, "Empty entry in flow mapping")),
            None => return Err(FormatError::brackets(line, "missing closing `}`")),
            _ => {}
        }

        let (key, next) = parse_flow_key(text, pos, line)?;
        pos = skip_ws(text, next);

        let mut value = Value::Null;
        if peek(text, pos) == Some(':') {
            pos = skip_ws(text, pos + 1);
            if !matches!(peek(text, pos), Some(',' | '}') | None) {
                let (parsed, next) = parse_node(text, pos, line, depth, max_depth)?;
                value = parsed;
                pos = skip_ws(text, next);
            }
        }
        map.insert(key, value);

        match peek(text, pos) {
            Some(',') => pos += 1,
            Some('}') => return Ok((Value::Mapping(map), pos + 1)),
            Some(c) => {
                return Err(FormatError::brackets(
                    line,
                    format!("expected `,` or `}}`, found `{}`", c),
                ));
            }
            None => return Err(FormatError::brackets(line, "missing closing `}`")),
        }
    }
}

fn parse_flow_key(text: &str, pos: usize, line: usize) -> Result<(Value, usize)> {
    if matches!(peek(text, pos), Some('"' | '\'')) {
        let (key, consumed) = parse_quoted(&text[pos..], line)?;
        return Ok((Value::String(key), pos + consumed));
    }
    let end = plain_end(text, pos, true);
    Ok((Value::String(text[pos..end].trim().to_string()), end))
}
