//! Structural sanity check for schema documents.

use crate::error::{SchemaPath, ValidationError, ValidationResult};
use crate::validator::{TYPE_NAMES, as_count};
use regex::Regex;
use shma_yaml::{Mapping, Value};

const BOUND_KEYWORDS: [&str; 4] = ["minimum", "maximum", "exclusiveMinimum", "exclusiveMaximum"];
const COUNT_KEYWORDS: [&str; 4] = ["minLength", "maxLength", "minItems", "maxItems"];

/// Check that `schema` is well formed before it is used for validation.
///
/// Every node must be a mapping, a boolean or null; `type` names must be
/// known, `pattern`s must compile, composition keywords must hold lists,
/// `required` must hold strings and bounds must be numeric. `$ref` targets
/// are not loaded.
pub fn check_schema(schema: &Value) -> ValidationResult<()> {
    let mut path = SchemaPath::new();
    check_node(schema, &mut path)
}

fn check_node(schema: &Value, path: &mut SchemaPath) -> ValidationResult<()> {
    match schema {
        Value::Null | Value::Bool(_) => Ok(()),
        Value::Mapping(keywords) => check_keywords(keywords, path),
        other => Err(ValidationError::invalid_schema(
            path,
            format!("expected a mapping or boolean, got {}", other.type_name()),
        )),
    }
}

/// Run `f` with `segments` appended to the path.
fn nested<F>(path: &mut SchemaPath, segments: &[&str], f: F) -> ValidationResult<()>
where
    F: FnOnce(&mut SchemaPath) -> ValidationResult<()>,
{
    for segment in segments {
        path.push(*segment);
    }
    let result = f(path);
    for _ in segments {
        path.pop();
    }
    result
}

fn invalid(path: &mut SchemaPath, keyword: &str, message: &str) -> ValidationError {
    path.push(keyword);
    let error = ValidationError::invalid_schema(path, format!("{} {}", keyword, message));
    path.pop();
    error
}

fn check_keywords(keywords: &Mapping, path: &mut SchemaPath) -> ValidationResult<()> {
    if let Some(reference) = keywords.get("$ref")
        && !reference.is_string()
    {
        return Err(invalid(path, "$ref", "must be a string"));
    }

    if let Some(expected) = keywords.get("type") {
        let names: Vec<&Value> = match expected {
            Value::Sequence(options) => options.iter().collect(),
            single => vec![single],
        };
        for name in names {
            match name.as_str() {
                Some(name) if TYPE_NAMES.contains(&name) => {}
                Some(name) => {
                    return Err(invalid(path, "type", &format!("has unknown type name {}", name)));
                }
                None => return Err(invalid(path, "type", "must be a string or a list of strings")),
            }
        }
    }

    if let Some(pattern) = keywords.get("pattern") {
        let Some(pattern) = pattern.as_str() else {
            return Err(invalid(path, "pattern", "must be a string"));
        };
        if let Err(e) = Regex::new(pattern) {
            return Err(invalid(
                path,
                "pattern",
                &format!("'{}' is not a valid regex: {}", pattern, e),
            ));
        }
    }

    if let Some(allowed) = keywords.get("enum")
        && !allowed.is_sequence()
    {
        return Err(invalid(path, "enum", "must be a list"));
    }

    if let Some(required) = keywords.get("required") {
        let all_strings = required
            .as_sequence()
            .is_some_and(|names| names.iter().all(Value::is_string));
        if !all_strings {
            return Err(invalid(path, "required", "must be a list of strings"));
        }
    }

    for keyword in BOUND_KEYWORDS {
        if let Some(bound) = keywords.get(keyword)
            && !bound.is_null()
            && !bound.is_number()
        {
            return Err(invalid(path, keyword, "must be a number"));
        }
    }

    for keyword in COUNT_KEYWORDS {
        if let Some(count) = keywords.get(keyword)
            && !count.is_null()
            && as_count(count).is_none()
        {
            return Err(invalid(path, keyword, "must be a non-negative integer"));
        }
    }

    match keywords.get("properties") {
        None | Some(Value::Null) => {}
        Some(Value::Mapping(properties)) => {
            for (key, subschema) in properties.iter() {
                let key = key.to_string();
                nested(path, &["properties", key.as_str()], |path| check_node(subschema, path))?;
            }
        }
        Some(_) => return Err(invalid(path, "properties", "must be a mapping")),
    }

    if let Some(additional) = keywords.get("additionalProperties") {
        nested(path, &["additionalProperties"], |path| {
            check_node(additional, path)
        })?;
    }

    match keywords.get("items") {
        None => {}
        Some(Value::Sequence(schemas)) => {
            for (i, subschema) in schemas.iter().enumerate() {
                let index = i.to_string();
                nested(path, &["items", index.as_str()], |path| check_node(subschema, path))?;
            }
        }
        Some(item_schema) => nested(path, &["items"], |path| check_node(item_schema, path))?,
    }

    for keyword in ["allOf", "anyOf", "oneOf"] {
        let Some(subschemas) = keywords.get(keyword) else {
            continue;
        };
        let Some(subschemas) = subschemas.as_sequence() else {
            return Err(invalid(path, keyword, "must be a list of schemas"));
        };
        for (i, subschema) in subschemas.iter().enumerate() {
            let index = i.to_string();
            nested(path, &[keyword, index.as_str()], |path| check_node(subschema, path))?;
        }
    }

    Ok(())
}
