// Schema validation engine

use crate::error::{
    InstancePath, PathSegment, SchemaPath, ValidationError, ValidationErrorKind, ValidationResult,
};
use crate::resolver::{Resolver, SchemaResolver};
use regex::Regex;
use shma_yaml::{Mapping, Value};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Default limit on nested schema applications, `$ref` hops included.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Type names understood by the `type` keyword.
pub const TYPE_NAMES: [&str; 7] = [
    "object", "array", "string", "integer", "number", "boolean", "null",
];

/// Composition keywords, in evaluation order.
const COMPOSITION_KEYWORDS: [&str; 3] = ["allOf", "anyOf", "oneOf"];

/// Validator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorOptions {
    pub max_depth: usize,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Validates instances against one schema.
///
/// A `Validator` is immutable once built and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use shma_yaml::parse_one;
/// use shma_yaml_validation::Validator;
///
/// let schema = parse_one("type: object\nrequired: [name]").unwrap();
/// let validator = Validator::new(schema);
///
/// let err = validator.validate(&parse_one("{}").unwrap()).unwrap_err();
/// assert_eq!(err.message(), "instance.name is a required property");
/// ```
#[derive(Clone)]
pub struct Validator {
    schema: Arc<Value>,
    resolver: Arc<dyn SchemaResolver>,
    options: ValidatorOptions,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("schema", &self.schema)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Validator {
    /// Build a validator whose `$ref`s resolve relative to the current
    /// directory.
    pub fn new(schema: Value) -> Self {
        let schema = Arc::new(schema);
        let resolver = Resolver::new(".", Arc::clone(&schema));
        Self {
            schema,
            resolver: Arc::new(resolver),
            options: ValidatorOptions::default(),
        }
    }

    pub fn with_resolver(schema: Value, resolver: impl SchemaResolver + 'static) -> Self {
        Self {
            schema: Arc::new(schema),
            resolver: Arc::new(resolver),
            options: ValidatorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ValidatorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Validate `instance`, stopping at the first violation.
    pub fn validate(&self, instance: &Value) -> ValidationResult<()> {
        let mut context = ValidationContext::new(self.resolver.as_ref(), self.options.max_depth);
        let result = validate_generic(&self.schema, instance, &mut context);
        if let Err(err) = &result {
            debug!(error = %err, schema_path = %err.schema_path, "validation failed");
        }
        result
    }
}

/// Validate `instance` against `schema`, resolving `$ref`s relative to the
/// current directory.
pub fn validate(schema: &Value, instance: &Value) -> ValidationResult<()> {
    Validator::new(schema.clone()).validate(instance)
}

/// Validation context tracks state during validation
struct ValidationContext<'a> {
    /// Resolver for `$ref` targets
    resolver: &'a dyn SchemaResolver,
    max_depth: usize,
    /// Nested schema applications so far
    depth: usize,
    /// Current instance path (e.g. `instance.services[0]`)
    instance_path: InstancePath,
    /// Current schema path (e.g. ["properties", "services", "items"])
    schema_path: SchemaPath,
}

impl<'a> ValidationContext<'a> {
    fn new(resolver: &'a dyn SchemaResolver, max_depth: usize) -> Self {
        Self {
            resolver,
            max_depth,
            depth: 0,
            instance_path: InstancePath::new(),
            schema_path: SchemaPath::new(),
        }
    }

    /// Build an error at the current position
    fn error(&self, kind: ValidationErrorKind) -> ValidationError {
        ValidationError::new(kind, self.instance_path.clone())
            .with_schema_path(self.schema_path.clone())
    }

    /// Report a malformed keyword under the current schema node
    fn invalid_keyword(&self, keyword: &str, message: impl fmt::Display) -> ValidationError {
        let mut schema_path = self.schema_path.clone();
        schema_path.push(keyword);
        let mut error = ValidationError::invalid_schema(&schema_path, format!("{keyword} {message}"));
        error.instance_path = self.instance_path.clone();
        error
    }

    /// Execute a function with a new instance path segment
    fn with_instance_path<F, R>(&mut self, segment: PathSegment, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.instance_path.push(segment);
        let result = f(self);
        self.instance_path.pop();
        result
    }

    /// Execute a function with a new schema path segment
    fn with_schema_path<F, R>(&mut self, segment: impl Into<String>, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.schema_path.push(segment);
        let result = f(self);
        self.schema_path.pop();
        result
    }
}

/// Navigate a value tree along an instance path, returning the node an error
/// points at.
pub fn navigate<'a>(path: &InstancePath, root: &'a Value) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(root, |node, segment| match (segment, node) {
            (PathSegment::Key(key), Value::Mapping(map)) => map.get(key),
            (PathSegment::Index(index), Value::Sequence(items)) => items.get(*index),
            _ => None,
        })
}

/// Structural equality used by `enum` and `const`: numbers compare by value,
/// mappings ignore key order, booleans never equal numbers.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::Int(i), Value::Float(f)) | (Value::Float(f), Value::Int(i)) => {
            int_equals_float(*i, *f)
        }
        (Value::Sequence(x), Value::Sequence(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| values_equal(x, y))
        }
        (Value::Mapping(x), Value::Mapping(y)) => {
            x.len() == y.len()
                && x.iter().all(|(key, value)| {
                    y.iter()
                        .any(|(k, v)| values_equal(key, k) && values_equal(value, v))
                })
        }
        _ => a == b,
    }
}

/// Whether `instance` has the named type. `None` for unknown names.
pub(crate) fn type_matches(name: &str, instance: &Value) -> Option<bool> {
    let matched = match name {
        "object" => instance.is_mapping(),
        "array" => instance.is_sequence(),
        "string" => instance.is_string(),
        "integer" => matches!(instance, Value::Int(_)),
        "number" => instance.is_number(),
        "boolean" => instance.is_bool(),
        "null" => instance.is_null(),
        _ => return None,
    };
    Some(matched)
}

/// A non-negative integer keyword value. Integral floats are accepted.
pub(crate) fn as_count(value: &Value) -> Option<usize> {
    match value {
        Value::Int(n) => usize::try_from(*n).ok(),
        Value::Float(f) if *f >= 0.0 && f.fract() == 0.0 => Some(*f as usize),
        _ => None,
    }
}

fn count_keyword(
    keywords: &Mapping,
    keyword: &str,
    ctx: &ValidationContext,
) -> ValidationResult<Option<usize>> {
    match keywords.get(keyword) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => as_count(value)
            .map(Some)
            .ok_or_else(|| ctx.invalid_keyword(keyword, "must be a non-negative integer")),
    }
}

fn bound_keyword<'a>(
    keywords: &'a Mapping,
    keyword: &str,
    ctx: &ValidationContext,
) -> ValidationResult<Option<&'a Value>> {
    match keywords.get(keyword) {
        None | Some(Value::Null) => Ok(None),
        Some(value) if value.is_number() => Ok(Some(value)),
        Some(_) => Err(ctx.invalid_keyword(keyword, "must be a number")),
    }
}

/// Order two numbers. Integers compare exactly; anything involving a float
/// compares as `f64`.
fn compare_numbers(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

/// Whether an integer and a float denote the same number, without rounding
/// the integer.
fn int_equals_float(int: i64, float: f64) -> bool {
    float.fract() == 0.0
        && float >= i64::MIN as f64
        && float < i64::MAX as f64
        && float as i64 == int
}

/// Depth-checked entry point for every schema application
fn validate_generic(
    schema: &Value,
    instance: &Value,
    context: &mut ValidationContext,
) -> ValidationResult<()> {
    if context.depth >= context.max_depth {
        return Err(context.error(ValidationErrorKind::DepthExceeded {
            limit: context.max_depth,
        }));
    }
    context.depth += 1;
    let result = validate_node(schema, instance, context);
    context.depth -= 1;
    result
}

/// Main validation dispatcher
fn validate_node(
    schema: &Value,
    instance: &Value,
    context: &mut ValidationContext,
) -> ValidationResult<()> {
    let keywords = match schema {
        Value::Null | Value::Bool(true) => return Ok(()),
        Value::Bool(false) => return Err(context.error(ValidationErrorKind::FalseSchema)),
        Value::Mapping(keywords) => keywords,
        other => {
            let mut error = ValidationError::invalid_schema(
                &context.schema_path,
                format!("expected a mapping or boolean, got {}", other.type_name()),
            );
            error.instance_path = context.instance_path.clone();
            return Err(error);
        }
    };

    // A reference replaces every other keyword on the node
    if let Some(reference) = keywords.get("$ref") {
        return context.with_schema_path("$ref", |ctx| validate_ref(reference, instance, ctx));
    }

    if let Some(expected) = keywords.get("type") {
        validate_type(expected, instance, context)?;
    }
    if let Some(allowed) = keywords.get("enum") {
        validate_enum(allowed, instance, context)?;
    }
    if let Some(expected) = keywords.get("const")
        && !values_equal(instance, expected)
    {
        return Err(context.error(ValidationErrorKind::ConstMismatch {
            expected: expected.clone(),
        }));
    }

    match instance {
        Value::String(s) => validate_string(keywords, s, context)?,
        Value::Int(_) | Value::Float(_) => validate_number(keywords, instance, context)?,
        Value::Mapping(map) => validate_object(keywords, map, context)?,
        Value::Sequence(items) => validate_array(keywords, items, context)?,
        Value::Null | Value::Bool(_) => {}
    }

    validate_composition(keywords, instance, context)
}

fn validate_ref(
    reference: &Value,
    instance: &Value,
    context: &mut ValidationContext,
) -> ValidationResult<()> {
    let Some(reference) = reference.as_str() else {
        return Err(context.invalid_keyword("$ref", "must be a string"));
    };
    let target = context.resolver.resolve(reference).map_err(|err| {
        context.error(ValidationErrorKind::UnresolvedReference {
            ref_id: reference.to_string(),
            reason: err.to_string(),
        })
    })?;
    trace!(reference, path = %context.instance_path, "following schema reference");
    validate_generic(&target, instance, context)
}

/// Validate the `type` keyword (a single name or a union)
fn validate_type(
    expected: &Value,
    instance: &Value,
    context: &mut ValidationContext,
) -> ValidationResult<()> {
    match expected {
        Value::String(name) => {
            if type_matches(name, instance) == Some(false) {
                return Err(context.error(ValidationErrorKind::TypeMismatch {
                    expected: name.clone(),
                    got: instance.type_name().to_string(),
                }));
            }
            Ok(())
        }
        Value::Sequence(options) => {
            let mut names = Vec::with_capacity(options.len());
            for option in options {
                let Some(name) = option.as_str() else {
                    return Err(context.invalid_keyword("type", "entries must be strings"));
                };
                names.push(name);
            }
            // Unknown names never reject, matching the single-name form
            if names
                .iter()
                .any(|name| type_matches(name, instance) != Some(false))
            {
                return Ok(());
            }
            Err(context.error(ValidationErrorKind::TypeUnionMismatch {
                expected: names.iter().map(|name| name.to_string()).collect(),
                got: instance.type_name().to_string(),
            }))
        }
        _ => Err(context.invalid_keyword("type", "must be a string or a list of strings")),
    }
}

/// Validate an enum value
fn validate_enum(
    allowed: &Value,
    instance: &Value,
    context: &mut ValidationContext,
) -> ValidationResult<()> {
    let Some(allowed) = allowed.as_sequence() else {
        return Err(context.invalid_keyword("enum", "must be a list"));
    };
    if allowed.iter().any(|candidate| values_equal(instance, candidate)) {
        return Ok(());
    }
    Err(context.error(ValidationErrorKind::InvalidEnumValue {
        allowed: allowed.to_vec(),
    }))
}

/// Validate a string value
fn validate_string(
    keywords: &Mapping,
    s: &str,
    context: &mut ValidationContext,
) -> ValidationResult<()> {
    if let Some(pattern) = keywords.get("pattern") {
        let Some(pattern) = pattern.as_str() else {
            return Err(context.invalid_keyword("pattern", "must be a string"));
        };
        let re = Regex::new(pattern).map_err(|e| {
            context.invalid_keyword("pattern", format_args!("'{}' is not a valid regex: {}", pattern, e))
        })?;
        if !re.is_match(s) {
            return Err(context.error(ValidationErrorKind::StringPatternMismatch {
                pattern: pattern.to_string(),
            }));
        }
    }

    let length = s.chars().count();

    // Check min length
    if let Some(min) = count_keyword(keywords, "minLength", context)?
        && length < min
    {
        return Err(context.error(ValidationErrorKind::StringLengthInvalid {
            length,
            min_length: Some(min),
            max_length: None,
        }));
    }

    // Check max length
    if let Some(max) = count_keyword(keywords, "maxLength", context)?
        && length > max
    {
        return Err(context.error(ValidationErrorKind::StringLengthInvalid {
            length,
            min_length: None,
            max_length: Some(max),
        }));
    }

    Ok(())
}

/// Validate a number value
fn validate_number(
    keywords: &Mapping,
    instance: &Value,
    context: &mut ValidationContext,
) -> ValidationResult<()> {
    let Some(num) = instance.as_f64() else {
        return Ok(());
    };
    let out_of_range = |bound: &Value, rejected: &[Ordering]| {
        compare_numbers(instance, bound).is_some_and(|order| rejected.contains(&order))
    };
    let bound_f64 = |bound: &Value| bound.as_f64().unwrap_or(f64::NAN);

    // Check minimum
    if let Some(min) = bound_keyword(keywords, "minimum", context)?
        && out_of_range(min, &[Ordering::Less])
    {
        return Err(context.error(ValidationErrorKind::NumberOutOfRange {
            value: num,
            minimum: Some(bound_f64(min)),
            maximum: None,
            exclusive_minimum: None,
            exclusive_maximum: None,
        }));
    }

    // Check maximum
    if let Some(max) = bound_keyword(keywords, "maximum", context)?
        && out_of_range(max, &[Ordering::Greater])
    {
        return Err(context.error(ValidationErrorKind::NumberOutOfRange {
            value: num,
            minimum: None,
            maximum: Some(bound_f64(max)),
            exclusive_minimum: None,
            exclusive_maximum: None,
        }));
    }

    // Check exclusive minimum
    if let Some(min) = bound_keyword(keywords, "exclusiveMinimum", context)?
        && out_of_range(min, &[Ordering::Less, Ordering::Equal])
    {
        return Err(context.error(ValidationErrorKind::NumberOutOfRange {
            value: num,
            minimum: None,
            maximum: None,
            exclusive_minimum: Some(bound_f64(min)),
            exclusive_maximum: None,
        }));
    }

    // Check exclusive maximum
    if let Some(max) = bound_keyword(keywords, "exclusiveMaximum", context)?
        && out_of_range(max, &[Ordering::Greater, Ordering::Equal])
    {
        return Err(context.error(ValidationErrorKind::NumberOutOfRange {
            value: num,
            minimum: None,
            maximum: None,
            exclusive_minimum: None,
            exclusive_maximum: Some(bound_f64(max)),
        }));
    }

    Ok(())
}

/// Validate an object value
fn validate_object(
    keywords: &Mapping,
    map: &Mapping,
    context: &mut ValidationContext,
) -> ValidationResult<()> {
    // Check required properties
    if let Some(required) = keywords.get("required") {
        let Some(required) = required.as_sequence() else {
            return Err(context.invalid_keyword("required", "must be a list of strings"));
        };
        for name in required {
            let Some(name) = name.as_str() else {
                return Err(context.invalid_keyword("required", "must be a list of strings"));
            };
            if !map.contains_key(name) {
                return Err(context.with_instance_path(PathSegment::Key(name.to_string()), |ctx| {
                    ctx.error(ValidationErrorKind::MissingRequiredProperty {
                        property: name.to_string(),
                    })
                }));
            }
        }
    }

    let properties = match keywords.get("properties") {
        None | Some(Value::Null) => None,
        Some(Value::Mapping(properties)) => Some(properties),
        Some(_) => return Err(context.invalid_keyword("properties", "must be a mapping")),
    };

    // Validate declared properties, in schema order
    for (key, subschema) in properties.into_iter().flat_map(Mapping::iter) {
        let Some(key) = key.as_str() else { continue };
        let Some(value) = map.get(key) else { continue };
        context.with_schema_path("properties", |ctx| {
            ctx.with_schema_path(key, |ctx| {
                ctx.with_instance_path(PathSegment::Key(key.to_string()), |ctx| {
                    validate_generic(subschema, value, ctx)
                })
            })
        })?;
    }

    let declared = |name: &str| properties.is_some_and(|p| p.contains_key(name));

    match keywords.get("additionalProperties") {
        Some(Value::Bool(false)) => {
            // Closed object - no additional properties allowed
            for (key, _) in map.iter() {
                let name = key.to_string();
                if !declared(&name) {
                    return Err(context.with_instance_path(PathSegment::Key(name.clone()), |ctx| {
                        ctx.error(ValidationErrorKind::UnknownProperty { property: name })
                    }));
                }
            }
        }
        Some(additional @ Value::Mapping(_)) => {
            for (key, value) in map.iter() {
                let name = key.to_string();
                if declared(&name) {
                    continue;
                }
                context.with_schema_path("additionalProperties", |ctx| {
                    ctx.with_instance_path(PathSegment::Key(name), |ctx| {
                        validate_generic(additional, value, ctx)
                    })
                })?;
            }
        }
        _ => {}
    }

    Ok(())
}

/// Validate an array value
fn validate_array(
    keywords: &Mapping,
    items: &[Value],
    context: &mut ValidationContext,
) -> ValidationResult<()> {
    let length = items.len();

    // Check min items
    if let Some(min) = count_keyword(keywords, "minItems", context)?
        && length < min
    {
        return Err(context.error(ValidationErrorKind::ArrayLengthInvalid {
            length,
            min_items: Some(min),
            max_items: None,
        }));
    }

    // Check max items
    if let Some(max) = count_keyword(keywords, "maxItems", context)?
        && length > max
    {
        return Err(context.error(ValidationErrorKind::ArrayLengthInvalid {
            length,
            min_items: None,
            max_items: Some(max),
        }));
    }

    match keywords.get("items") {
        None | Some(Value::Null) => {}
        // Positional schemas; excess elements are unchecked
        Some(Value::Sequence(schemas)) => {
            for (i, (item, item_schema)) in items.iter().zip(schemas).enumerate() {
                context.with_schema_path("items", |ctx| {
                    ctx.with_schema_path(i.to_string(), |ctx| {
                        ctx.with_instance_path(PathSegment::Index(i), |ctx| {
                            validate_generic(item_schema, item, ctx)
                        })
                    })
                })?;
            }
        }
        Some(item_schema) => {
            for (i, item) in items.iter().enumerate() {
                context.with_schema_path("items", |ctx| {
                    ctx.with_instance_path(PathSegment::Index(i), |ctx| {
                        validate_generic(item_schema, item, ctx)
                    })
                })?;
            }
        }
    }

    Ok(())
}

/// Validate allOf / anyOf / oneOf. Each sub-schema is evaluated on its own and
/// only the aggregate outcome is reported.
fn validate_composition(
    keywords: &Mapping,
    instance: &Value,
    context: &mut ValidationContext,
) -> ValidationResult<()> {
    for keyword in COMPOSITION_KEYWORDS {
        let Some(subschemas) = keywords.get(keyword) else {
            continue;
        };
        let Some(subschemas) = subschemas.as_sequence() else {
            return Err(context.invalid_keyword(keyword, "must be a list of schemas"));
        };

        let mut passed = 0;
        for (i, subschema) in subschemas.iter().enumerate() {
            let result = context.with_schema_path(keyword, |ctx| {
                ctx.with_schema_path(i.to_string(), |ctx| {
                    validate_generic(subschema, instance, ctx)
                })
            });
            match result {
                Ok(()) => passed += 1,
                Err(err) if err.kind.is_schema_defect() => return Err(err),
                Err(_) => {}
            }
        }

        let satisfied = match keyword {
            "allOf" => passed == subschemas.len(),
            "anyOf" => passed > 0,
            _ => passed == 1,
        };
        if !satisfied {
            return Err(context.error(ValidationErrorKind::CompositionFailed {
                keyword: keyword.to_string(),
            }));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReferenceError;
    use shma_yaml::parse_one;
    use std::collections::HashMap;

    fn yaml(text: &str) -> Value {
        parse_one(text).unwrap()
    }

    fn check(schema: &str, instance: &str) -> ValidationResult<()> {
        validate(&yaml(schema), &yaml(instance))
    }

    fn message(schema: &str, instance: &str) -> String {
        check(schema, instance).unwrap_err().message().to_string()
    }

    /// In-memory resolver keyed by reference string
    struct MapResolver(HashMap<String, Arc<Value>>);

    impl SchemaResolver for MapResolver {
        fn resolve(&self, reference: &str) -> Result<Arc<Value>, ReferenceError> {
            self.0
                .get(reference)
                .cloned()
                .ok_or_else(|| ReferenceError::Unsupported {
                    reference: reference.to_string(),
                })
        }
    }

    // ==================== Type Tests ====================

    #[test]
    fn test_validate_boolean() {
        assert!(check("type: boolean", "true").is_ok());
        assert!(check("type: boolean", "off").is_ok());
        assert_eq!(
            message("type: boolean", "not a boolean"),
            "instance is not of type boolean"
        );
    }

    #[test]
    fn test_validate_number_excludes_booleans() {
        assert!(check("type: number", "42").is_ok());
        assert!(check("type: number", "4.5").is_ok());
        assert!(check("type: number", "true").is_err());
        assert!(check("type: integer", "true").is_err());
        assert!(check("type: integer", "4.5").is_err());
    }

    #[test]
    fn test_validate_null() {
        assert!(check("type: 'null'", "~").is_ok());
        assert!(check("type: 'null'", "0").is_err());
    }

    #[test]
    fn test_type_union() {
        assert!(check("type: [string, integer]", "7").is_ok());
        assert_eq!(
            message("type: [string, integer]", "true"),
            "instance is not any of [string, integer]"
        );
    }

    #[test]
    fn test_unknown_type_name_is_ignored() {
        assert!(check("type: widget", "1").is_ok());
    }

    // ==================== Number Tests ====================

    #[test]
    fn test_validate_number_bounds() {
        let schema = "minimum: 1\nmaximum: 10";
        assert!(check(schema, "1").is_ok());
        assert!(check(schema, "10").is_ok());
        assert_eq!(message(schema, "0"), "instance is less than 1");
        assert_eq!(message(schema, "10.5"), "instance is greater than 10");
    }

    #[test]
    fn test_validate_number_exclusive_bounds() {
        let schema = "exclusiveMinimum: 0\nexclusiveMaximum: 1.5";
        assert!(check(schema, "0.5").is_ok());
        assert_eq!(message(schema, "0"), "instance must be greater than 0");
        assert_eq!(message(schema, "1.5"), "instance must be less than 1.5");
    }

    #[test]
    fn test_large_integer_bounds_compare_exactly() {
        let schema = "minimum: 9007199254740993";
        assert!(check(schema, "9007199254740992").is_err());
        assert!(check(schema, "9007199254740993").is_ok());
        assert!(check("exclusiveMaximum: 9007199254740993", "9007199254740992").is_ok());
    }

    #[test]
    fn test_bounds_ignore_other_types() {
        assert!(check("minimum: 5", "abc").is_ok());
        assert!(check("minimum: 5", "true").is_ok());
    }

    // ==================== String Tests ====================

    #[test]
    fn test_validate_string_length() {
        let schema = "minLength: 2\nmaxLength: 3";
        assert!(check(schema, "héé").is_ok());
        assert_eq!(message(schema, "a"), "instance is shorter than 2");
        assert_eq!(message(schema, "abcd"), "instance is longer than 3");
    }

    #[test]
    fn test_validate_string_pattern() {
        let schema = "pattern: '[0-9]+'";
        assert!(check(schema, "abc123").is_ok());
        assert_eq!(
            message(schema, "abc"),
            "instance does not match pattern [0-9]+"
        );
    }

    #[test]
    fn test_invalid_pattern_is_schema_error() {
        let err = check("pattern: '('", "x").unwrap_err();
        assert!(matches!(err.kind, ValidationErrorKind::InvalidSchema { .. }));
    }

    // ==================== Enum / Const Tests ====================

    #[test]
    fn test_validate_enum() {
        let schema = "enum: [web, worker, 1]";
        assert!(check(schema, "web").is_ok());
        assert!(check(schema, "1.0").is_ok());
        assert_eq!(
            message(schema, "db"),
            r#"instance is not one of ["web", "worker", 1]"#
        );
    }

    #[test]
    fn test_enum_booleans_are_not_numbers() {
        assert!(check("enum: [1]", "true").is_err());
        assert!(check("enum: [true]", "1").is_err());
    }

    #[test]
    fn test_const_mapping_ignores_order() {
        assert!(check("const: {a: 1, b: 2}", "{b: 2, a: 1}").is_ok());
        assert_eq!(message("const: production", "staging"), "instance must equal production");
    }

    // ==================== Object Tests ====================

    #[test]
    fn test_validate_object_required() {
        let schema = "type: object\nrequired: [name]\nproperties:\n  name:\n    type: string\n";
        let err = check(schema, "{}").unwrap_err();
        assert_eq!(err.message(), "instance.name is a required property");
        assert_eq!(err.instance_path.to_string(), "instance.name");
        assert!(matches!(
            err.kind,
            ValidationErrorKind::MissingRequiredProperty { ref property } if property == "name"
        ));
    }

    #[test]
    fn test_validate_nested_properties() {
        let schema = r#"
properties:
  service:
    properties:
      port:
        type: integer
"#;
        let err = check(schema, "service:\n  port: http\n").unwrap_err();
        assert_eq!(err.message(), "instance.service.port is not of type integer");
        assert_eq!(err.schema_path.to_string(), "properties > service > properties > port");
    }

    #[test]
    fn test_additional_properties_false() {
        let schema = "properties:\n  name: {}\nadditionalProperties: false\n";
        assert!(check(schema, "name: x").is_ok());
        let err = check(schema, "name: x\nextra: 1").unwrap_err();
        assert_eq!(err.message(), "Unexpected property extra at instance");
        assert_eq!(err.instance_path.to_string(), "instance.extra");
    }

    #[test]
    fn test_additional_properties_false_without_properties() {
        assert!(check("additionalProperties: false", "{}").is_ok());
        assert!(check("additionalProperties: false", "a: 1").is_err());
    }

    #[test]
    fn test_additional_properties_schema() {
        let schema = "properties:\n  name: {}\nadditionalProperties:\n  type: integer\n";
        assert!(check(schema, "name: x\nreplicas: 2").is_ok());
        assert_eq!(
            message(schema, "name: x\nreplicas: two"),
            "instance.replicas is not of type integer"
        );
    }

    // ==================== Array Tests ====================

    #[test]
    fn test_validate_array_max_items() {
        let schema = "type: array\nitems:\n  type: integer\nmaxItems: 2\n";
        assert_eq!(message(schema, "[1, 2, 3]"), "instance has more than 2 items");
        assert_eq!(message(schema, "[1, x]"), "instance[1] is not of type integer");
    }

    #[test]
    fn test_validate_array_min_items() {
        assert_eq!(message("minItems: 1", "[]"), "instance has fewer than 1 items");
    }

    #[test]
    fn test_positional_items() {
        let schema = "items:\n  - type: string\n  - type: integer\n";
        assert!(check(schema, "[a, 1, anything]").is_ok());
        assert_eq!(message(schema, "[a, b]"), "instance[1] is not of type integer");
    }

    // ==================== Composition Tests ====================

    #[test]
    fn test_one_of() {
        let schema = "oneOf:\n  - type: string\n  - type: integer\n";
        assert!(check(schema, "7").is_ok());
        assert_eq!(message(schema, "true"), "instance failed oneOf");
        assert!(check("oneOf: [{type: number}, {type: integer}]", "7").is_err());
    }

    #[test]
    fn test_any_of_and_all_of() {
        assert!(check("anyOf: [{type: string}, {minimum: 3}]", "5").is_ok());
        assert_eq!(
            message("anyOf: [{type: string}, {minimum: 3}]", "1"),
            "instance failed anyOf"
        );
        assert_eq!(
            message("allOf: [{type: integer}, {minimum: 3}]", "1"),
            "instance failed allOf"
        );
    }

    #[test]
    fn test_composition_runs_after_local_keywords() {
        let err = check("type: string\nanyOf: [{type: integer}]", "5").unwrap_err();
        assert_eq!(err.message(), "instance is not of type string");
    }

    // ==================== Boolean / Null Schemas ====================

    #[test]
    fn test_boolean_and_null_schemas() {
        assert!(validate(&Value::Bool(true), &yaml("a: 1")).is_ok());
        assert!(validate(&Value::Null, &yaml("a: 1")).is_ok());
        let err = check("properties:\n  a: false\n", "a: 1").unwrap_err();
        assert_eq!(err.message(), "instance.a is not allowed");
    }

    #[test]
    fn test_scalar_schema_is_invalid() {
        let err = validate(&Value::Int(3), &Value::Null).unwrap_err();
        assert!(matches!(err.kind, ValidationErrorKind::InvalidSchema { .. }));
    }

    // ==================== Reference Tests ====================

    #[test]
    fn test_ref_replaces_siblings() {
        let mut targets = HashMap::new();
        targets.insert("port.yaml".to_string(), Arc::new(yaml("type: integer")));
        let validator = Validator::with_resolver(
            yaml("$ref: port.yaml\ntype: string"),
            MapResolver(targets),
        );
        assert!(validator.validate(&Value::Int(80)).is_ok());
        assert!(validator.validate(&Value::from("80")).is_err());
    }

    #[test]
    fn test_unresolved_reference() {
        let validator = Validator::with_resolver(yaml("$ref: missing.yaml"), MapResolver(HashMap::new()));
        let err = validator.validate(&Value::Null).unwrap_err();
        assert_eq!(err.message(), "Unsupported reference: missing.yaml");
        assert!(matches!(err.kind, ValidationErrorKind::UnresolvedReference { .. }));
    }

    #[test]
    fn test_self_reference_hits_depth_limit() {
        let schema = yaml("items:\n  $ref: '#'\n");
        let validator = Validator::new(schema).with_options(ValidatorOptions { max_depth: 8 });

        assert!(validator.validate(&yaml("[[[]]]")).is_ok());

        let mut deep = Value::Sequence(vec![]);
        for _ in 0..10 {
            deep = Value::Sequence(vec![deep]);
        }
        let err = validator.validate(&deep).unwrap_err();
        assert!(matches!(err.kind, ValidationErrorKind::DepthExceeded { limit: 8 }));
    }

    // ==================== Helpers ====================

    #[test]
    fn test_navigate() {
        let root = yaml("services:\n  - name: web\n  - name: db\n");
        let mut path = InstancePath::new();
        path.push_key("services");
        path.push_index(1);
        path.push_key("name");
        assert_eq!(navigate(&path, &root), Some(&Value::from("db")));

        path.push_index(0);
        assert_eq!(navigate(&path, &root), None);
    }

    #[test]
    fn test_values_equal() {
        assert!(values_equal(&Value::Int(1), &Value::Float(1.0)));
        assert!(!values_equal(&Value::Bool(true), &Value::Int(1)));
        assert!(values_equal(&yaml("[1, {a: b}]"), &yaml("[1.0, {a: b}]")));
        assert!(!values_equal(&Value::Int(1), &Value::Float(1.5)));
    }

    #[test]
    fn test_large_integers_are_not_rounded() {
        let big = Value::Int(9_007_199_254_740_993);
        assert!(!values_equal(&big, &Value::Int(9_007_199_254_740_992)));
        assert!(!values_equal(&big, &Value::Float(9_007_199_254_740_992.0)));
        assert!(check("enum: [9007199254740993]", "9007199254740992").is_err());
    }
}
