//! Indentation-driven recursive descent over document lines.
//!
//! Every step takes the immutable line slice plus a start index and returns
//! the parsed value together with the index of the first unconsumed line.

use crate::block::{BlockHeader, parse_block_scalar};
use crate::error::{FormatError, Result};
use crate::line::{Line, find_separator, skip_ignorable, split_documents, strip_comment};
use crate::scalar::{parse_key, parse_scalar};
use crate::value::{Mapping, Value};
use std::path::Path;
use tracing::{debug, trace};

/// Default limit for nested structures, flow collections included.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum nesting depth before [`FormatError::DepthExceeded`] is raised
    pub max_depth: usize,
    /// Try a strict JSON reader for input that looks like JSON, and as a
    /// fallback when the line parser fails (only used by `parse_one`)
    pub json_fast_path: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            json_fast_path: true,
        }
    }
}

/// Parse the first document in `text`.
///
/// # Example
///
/// ```rust
/// use shma_yaml::{parse_one, Value};
///
/// let doc = parse_one("name: web\nreplicas: 2").unwrap();
/// assert_eq!(doc.get("replicas"), Some(&Value::Int(2)));
/// ```
///
/// # Errors
///
/// Returns a [`FormatError`] if the first document is malformed.
pub fn parse_one(text: &str) -> Result<Value> {
    parse_one_with(text, &ParseOptions::default())
}

/// Parse the first document in `text` with explicit options.
pub fn parse_one_with(text: &str, options: &ParseOptions) -> Result<Value> {
    if options.json_fast_path && text.trim_start().starts_with(['{', '[']) {
        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(json) => {
                trace!("parsed input with the JSON reader");
                return Ok(Value::from(json));
            }
            Err(err) => trace!(%err, "JSON reader rejected input, using line parser"),
        }
    }

    let first = parse_all_with(text, options)
        .next()
        .unwrap_or(Ok(Value::Null));

    match first {
        Err(err) if options.json_fast_path => serde_json::from_str::<serde_json::Value>(text)
            .map(Value::from)
            .map_err(|_| err),
        other => other,
    }
}

/// Parse every document in `text`, lazily and in file order.
///
/// Empty input yields a single `Null` document. The returned iterator can be
/// cloned; calling `parse_all` again with the same text starts over.
///
/// # Example
///
/// ```rust
/// use shma_yaml::parse_all;
///
/// let docs: Vec<_> = parse_all("---\na: 1\n---\nb: 2\n")
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(docs.len(), 2);
/// ```
pub fn parse_all(text: &str) -> Documents {
    parse_all_with(text, &ParseOptions::default())
}

/// Parse every document in `text` with explicit options.
pub fn parse_all_with(text: &str, options: &ParseOptions) -> Documents {
    let documents = split_documents(text);
    debug!(count = documents.len(), "split input into documents");
    Documents {
        documents: documents.into_iter(),
        max_depth: options.max_depth,
    }
}

/// Read and parse the first document of a file.
///
/// # Errors
///
/// Returns [`FormatError::Io`] if the file cannot be read, or the parse error
/// wrapped with the file name.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let text = read(path)?;
    parse_one(&text).map_err(|err| err.in_file(path))
}

/// Read and parse every document of a file.
pub fn parse_all_file(path: impl AsRef<Path>) -> Result<Vec<Value>> {
    let path = path.as_ref();
    let text = read(path)?;
    parse_all(&text)
        .collect::<Result<Vec<_>>>()
        .map_err(|err| err.in_file(path))
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| FormatError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Lazy iterator over the documents of one input.
#[derive(Debug, Clone)]
pub struct Documents {
    documents: std::vec::IntoIter<Vec<Line>>,
    max_depth: usize,
}

impl Iterator for Documents {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        let lines = self.documents.next()?;
        Some(parse_document(&lines, self.max_depth))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.documents.size_hint()
    }
}

impl ExactSizeIterator for Documents {}

fn parse_document(lines: &[Line], max_depth: usize) -> Result<Value> {
    let ctx = Context { lines, max_depth };
    let start = skip_ignorable(lines, 0);
    if start == lines.len() {
        return Ok(Value::Null);
    }

    let (value, next) = parse_structure(&ctx, start, 0, 0)?;
    let rest = skip_ignorable(lines, next);
    if let Some(line) = lines.get(rest) {
        return Err(FormatError::TrailingContent { line: line.number });
    }
    Ok(value)
}

/// Immutable state shared by one document parse.
struct Context<'a> {
    lines: &'a [Line],
    max_depth: usize,
}

impl Context<'_> {
    fn enter(&self, depth: usize, line: usize) -> Result<usize> {
        if depth >= self.max_depth {
            return Err(FormatError::DepthExceeded {
                line,
                limit: self.max_depth,
            });
        }
        Ok(depth + 1)
    }

    fn scalar(&self, text: &str, line: usize, depth: usize) -> Result<Value> {
        parse_scalar(text, line, depth, self.max_depth)
    }
}

enum Collection {
    Sequence(Vec<Value>),
    Mapping(Mapping),
}

impl From<Collection> for Value {
    fn from(collection: Collection) -> Self {
        match collection {
            Collection::Sequence(items) => Value::Sequence(items),
            Collection::Mapping(map) => Value::Mapping(map),
        }
    }
}

/// Text after a sequence marker (`- value` or a bare `-`).
fn sequence_item(content: &str) -> Option<&str> {
    if content == "-" {
        Some("")
    } else {
        content.strip_prefix("- ")
    }
}

fn leading_spaces(text: &str) -> usize {
    text.len() - text.trim_start().len()
}

fn parse_structure(
    ctx: &Context,
    start: usize,
    min_indent: usize,
    depth: usize,
) -> Result<(Value, usize)> {
    let depth = ctx.enter(depth, ctx.lines[start].number)?;
    parse_collection(ctx, start, min_indent, depth, None)
}

/// Scan lines indented at least `min_indent`, building a homogeneous
/// sequence or mapping. `seed` carries entries already parsed from an
/// embedded `key: value` on the opening line.
fn parse_collection(
    ctx: &Context,
    start: usize,
    min_indent: usize,
    depth: usize,
    seed: Option<Collection>,
) -> Result<(Value, usize)> {
    let lines = ctx.lines;
    let mut collection = seed;
    let mut pos = start;

    loop {
        pos = skip_ignorable(lines, pos);
        let Some(line) = lines.get(pos) else { break };
        if line.indent < min_indent {
            break;
        }
        let content = line.content();

        if let Some(rest) = sequence_item(content) {
            let items = match collection.get_or_insert_with(|| Collection::Sequence(Vec::new())) {
                Collection::Sequence(items) => items,
                Collection::Mapping(_) => {
                    return Err(FormatError::MixedStructure { line: line.number });
                }
            };
            let (value, next) = parse_sequence_item(ctx, pos, rest, depth)?;
            items.push(value);
            pos = next;
            continue;
        }

        let Some(sep) = find_separator(content) else {
            if collection.is_none() {
                // A lone scalar where a structure was expected. Nested ones
                // must be the only content of their block.
                let value = ctx.scalar(strip_comment(content), line.number, depth)?;
                let next = skip_ignorable(lines, pos + 1);
                if min_indent > 0
                    && let Some(extra) = lines.get(next)
                    && extra.indent >= min_indent
                {
                    return Err(FormatError::syntax(extra.number, "Expected mapping entry"));
                }
                return Ok((value, pos + 1));
            }
            return Err(FormatError::syntax(line.number, "Expected mapping entry"));
        };

        let map = match collection.get_or_insert_with(|| Collection::Mapping(Mapping::new())) {
            Collection::Mapping(map) => map,
            Collection::Sequence(_) => {
                return Err(FormatError::MixedStructure { line: line.number });
            }
        };
        let (key, value, next) = parse_mapping_entry(ctx, pos, line.indent, content, sep, depth)?;
        map.insert(key, value);
        pos = next;
    }

    Ok((collection.map_or(Value::Null, Value::from), pos))
}

/// Parse the structure nested under the line before `start`, if any line is
/// indented at least `min_indent`.
fn parse_nested(
    ctx: &Context,
    start: usize,
    min_indent: usize,
    depth: usize,
) -> Result<(Value, usize)> {
    let pos = skip_ignorable(ctx.lines, start);
    match ctx.lines.get(pos) {
        Some(line) if line.indent >= min_indent => parse_structure(ctx, pos, min_indent, depth),
        _ => Ok((Value::Null, pos)),
    }
}

fn parse_sequence_item(
    ctx: &Context,
    pos: usize,
    rest: &str,
    depth: usize,
) -> Result<(Value, usize)> {
    let line = &ctx.lines[pos];
    let text = strip_comment(rest).trim();

    if text.is_empty() {
        return parse_nested(ctx, pos + 1, line.indent + 1, depth);
    }
    if let Some(header) = BlockHeader::parse(text) {
        let (value, next) = parse_block_scalar(ctx.lines, pos, header, line.indent);
        return Ok((Value::String(value), next));
    }
    if !text.starts_with(['[', '{'])
        && let Some(sep) = find_separator(text)
    {
        let column = line.indent + 2 + leading_spaces(rest);
        return parse_embedded_mapping(ctx, pos, column, text, sep, depth);
    }
    Ok((ctx.scalar(text, line.number, depth)?, pos + 1))
}

/// A `key: value` pair found inside a sequence item or mapping value opens a
/// nested mapping anchored at the key's column.
fn parse_embedded_mapping(
    ctx: &Context,
    pos: usize,
    column: usize,
    text: &str,
    sep: usize,
    depth: usize,
) -> Result<(Value, usize)> {
    let depth = ctx.enter(depth, ctx.lines[pos].number)?;
    let (key, value, next) = parse_mapping_entry(ctx, pos, column, text, sep, depth)?;
    let mut map = Mapping::new();
    map.insert(key, value);
    parse_collection(ctx, next, column, depth, Some(Collection::Mapping(map)))
}

/// Parse one `key: value` entry whose key starts at `key_column`.
fn parse_mapping_entry(
    ctx: &Context,
    pos: usize,
    key_column: usize,
    text: &str,
    sep: usize,
    depth: usize,
) -> Result<(Value, Value, usize)> {
    let line = &ctx.lines[pos];
    let key = parse_key(&text[..sep], line.number)?;
    let raw_value = &text[sep + 1..];
    let value_text = strip_comment(raw_value).trim();

    if let Some(header) = BlockHeader::parse(value_text) {
        let (value, next) = parse_block_scalar(ctx.lines, pos, header, key_column);
        return Ok((key, Value::String(value), next));
    }
    if value_text.is_empty() {
        let (value, next) = parse_nested(ctx, pos + 1, key_column + 1, depth)?;
        return Ok((key, value, next));
    }
    if !value_text.starts_with(['[', '{'])
        && let Some(inner) = find_separator(value_text)
    {
        let key_width = text[..sep].chars().count();
        let column = key_column + key_width + 1 + leading_spaces(raw_value);
        let (value, next) = parse_embedded_mapping(ctx, pos, column, value_text, inner, depth)?;
        return Ok((key, value, next));
    }
    Ok((key, ctx.scalar(value_text, line.number, depth)?, pos + 1))
}
