//! Scalar classification and quoted-scalar unescaping.

use crate::error::{FormatError, Result};
use crate::flow;
use crate::value::Value;

/// Parse a scalar in value position.
///
/// `line` is used for diagnostics, `depth` is the current nesting depth
/// (inline flow collections nest further).
pub(crate) fn parse_scalar(raw: &str, line: usize, depth: usize, max_depth: usize) -> Result<Value> {
    let value = raw.trim();
    if value.is_empty() {
        return Ok(Value::Null);
    }

    if value.starts_with(['"', '\'']) {
        let (text, consumed) = parse_quoted(value, line)?;
        if !value[consumed..].trim().is_empty() {
            return Err(FormatError::syntax(
                line,
                format!("Unexpected text after quoted scalar `{}`", value),
            ));
        }
        return Ok(Value::String(text));
    }

    if value.starts_with(['[', '{']) {
        return flow::parse_flow(value, line, depth, max_depth);
    }

    Ok(classify_plain(value))
}

/// Parse a mapping key. Keys are never coerced to booleans, numbers or null.
pub(crate) fn parse_key(raw: &str, line: usize) -> Result<Value> {
    let key = raw.trim();
    if key.starts_with(['"', '\'']) {
        let (text, consumed) = parse_quoted(key, line)?;
        if !key[consumed..].trim().is_empty() {
            return Err(FormatError::syntax(
                line,
                format!("Unexpected text after quoted key `{}`", key),
            ));
        }
        return Ok(Value::String(text));
    }
    Ok(Value::String(key.to_string()))
}

/// Classify an unquoted scalar.
pub(crate) fn classify_plain(value: &str) -> Value {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => return Value::Bool(true),
        "false" | "no" | "off" => return Value::Bool(false),
        "null" | "~" | "" => return Value::Null,
        _ => {}
    }

    if is_integer(value) {
        // Out-of-range integers stay strings rather than losing precision
        return match value.parse::<i64>() {
            Ok(n) => Value::Int(n),
            Err(_) => Value::String(value.to_string()),
        };
    }

    if is_float(value)
        && let Ok(f) = value.parse::<f64>()
    {
        return Value::Float(f);
    }

    Value::String(value.to_string())
}

fn strip_sign(value: &str) -> &str {
    value.strip_prefix(['+', '-']).unwrap_or(value)
}

/// `[-+]?[0-9]+`
fn is_integer(value: &str) -> bool {
    let digits = strip_sign(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// `[-+]?[0-9]*\.[0-9]+`
fn is_float(value: &str) -> bool {
    let Some((whole, fraction)) = strip_sign(value).split_once('.') else {
        return false;
    };
    whole.bytes().all(|b| b.is_ascii_digit())
        && !fraction.is_empty()
        && fraction.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a quoted scalar at the start of `text`.
///
/// Returns the unescaped content and the number of bytes consumed, including
/// both quotes.
pub(crate) fn parse_quoted(text: &str, line: usize) -> Result<(String, usize)> {
    match text.chars().next() {
        Some('\'') => parse_single_quoted(text, line),
        Some('"') => parse_double_quoted(text, line),
        _ => Err(FormatError::syntax(line, "Expected quoted scalar")),
    }
}

fn parse_single_quoted(text: &str, line: usize) -> Result<(String, usize)> {
    let mut out = String::new();
    let mut chars = text.char_indices().skip(1).peekable();
    while let Some((idx, ch)) = chars.next() {
        if ch == '\'' {
            if let Some((_, '\'')) = chars.peek() {
                out.push('\'');
                chars.next();
                continue;
            }
            return Ok((out, idx + 1));
        }
        out.push(ch);
    }
    Err(FormatError::UnterminatedQuote { line })
}

fn parse_double_quoted(text: &str, line: usize) -> Result<(String, usize)> {
    let mut out = String::new();
    let mut chars = text.char_indices().skip(1);
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '"' => return Ok((out, idx + 1)),
            '\\' => {
                let Some((_, escape)) = chars.next() else {
                    break;
                };
                match escape {
                    '\\' => out.push('\\'),
                    '"' => out.push('"'),
                    '/' => out.push('/'),
                    '\'' => out.push('\''),
                    ' ' => out.push(' '),
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    '0' => out.push('\0'),
                    'a' => out.push('\u{07}'),
                    'b' => out.push('\u{08}'),
                    'e' => out.push('\u{1b}'),
                    'f' => out.push('\u{0c}'),
                    'v' => out.push('\u{0b}'),
                    'x' => out.push(read_code_point(&mut chars, 2, line)?),
                    'u' => out.push(read_code_point(&mut chars, 4, line)?),
                    'U' => out.push(read_code_point(&mut chars, 8, line)?),
                    other => {
                        return Err(FormatError::syntax(
                            line,
                            format!("Unknown escape sequence `\\{}`", other),
                        ));
                    }
                }
            }
            other => out.push(other),
        }
    }
    Err(FormatError::UnterminatedQuote { line })
}

fn read_code_point(
    chars: &mut impl Iterator<Item = (usize, char)>,
    width: usize,
    line: usize,
) -> Result<char> {
    let digits: String = chars.take(width).map(|(_, c)| c).collect();
    if digits.len() != width {
        return Err(FormatError::UnterminatedQuote { line });
    }
    u32::from_str_radix(&digits, 16)
        .ok()
        .and_then(char::from_u32)
        .ok_or_else(|| FormatError::syntax(line, format!("Invalid escape code `{}`", digits)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(raw: &str) -> Value {
        parse_scalar(raw, 1, 0, 128).unwrap()
    }

    #[test]
    fn test_booleans_any_case() {
        for raw in ["true", "True", "YES", "on", "On"] {
            assert_eq!(scalar(raw), Value::Bool(true), "{raw}");
        }
        for raw in ["false", "FALSE", "no", "No", "off"] {
            assert_eq!(scalar(raw), Value::Bool(false), "{raw}");
        }
    }

    #[test]
    fn test_nulls() {
        assert_eq!(scalar("~"), Value::Null);
        assert_eq!(scalar("null"), Value::Null);
        assert_eq!(scalar("NULL"), Value::Null);
        assert_eq!(scalar(""), Value::Null);
        assert_eq!(scalar("   "), Value::Null);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(scalar("42"), Value::Int(42));
        assert_eq!(scalar("-7"), Value::Int(-7));
        assert_eq!(scalar("+3"), Value::Int(3));
        assert_eq!(scalar("4.5"), Value::Float(4.5));
        assert_eq!(scalar(".5"), Value::Float(0.5));
        assert_eq!(scalar("-0.25"), Value::Float(-0.25));
    }

    #[test]
    fn test_number_like_strings() {
        assert_eq!(scalar("1."), Value::from("1."));
        assert_eq!(scalar("1e5"), Value::from("1e5"));
        assert_eq!(scalar("1.2.3"), Value::from("1.2.3"));
        assert_eq!(scalar("0x1F"), Value::from("0x1F"));
        assert_eq!(
            scalar("99999999999999999999"),
            Value::from("99999999999999999999")
        );
    }

    #[test]
    fn test_quoted_scalars_are_strings() {
        assert_eq!(scalar("'true'"), Value::from("true"));
        assert_eq!(scalar("\"42\""), Value::from("42"));
        assert_eq!(scalar("'it''s'"), Value::from("it's"));
        assert_eq!(scalar(r#""a\tb\né""#), Value::from("a\tb\né"));
        assert_eq!(scalar("''"), Value::from(""));
    }

    #[test]
    fn test_unterminated_quote() {
        let err = parse_scalar("\"open", 4, 0, 128).unwrap_err();
        assert!(matches!(err, FormatError::UnterminatedQuote { line: 4 }));
        let err = parse_scalar("'open", 2, 0, 128).unwrap_err();
        assert!(matches!(err, FormatError::UnterminatedQuote { line: 2 }));
    }

    #[test]
    fn test_text_after_quote() {
        let err = parse_scalar("'a' b", 1, 0, 128).unwrap_err();
        assert!(matches!(err, FormatError::Syntax { .. }));
    }

    #[test]
    fn test_keys_are_not_coerced() {
        assert_eq!(parse_key("80", 1).unwrap(), Value::from("80"));
        assert_eq!(parse_key("true", 1).unwrap(), Value::from("true"));
        assert_eq!(parse_key("'quoted key'", 1).unwrap(), Value::from("quoted key"));
    }
}
