// Error types for schema validation

use shma_yaml::{FormatError, Value};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Failure to turn a `$ref` string into a schema.
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("Reference target not found: {reference}")]
    NotFound { reference: String, path: PathBuf },

    #[error("Unsupported reference: {reference}")]
    Unsupported { reference: String },

    #[error("Reference target {reference} is not a valid document: {source}")]
    Format {
        reference: String,
        #[source]
        source: FormatError,
    },

    #[error("Failed to read reference target {reference}: {source}")]
    Io {
        reference: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReferenceError {
    /// The `$ref` string that failed to resolve.
    pub fn reference(&self) -> &str {
        match self {
            ReferenceError::NotFound { reference, .. }
            | ReferenceError::Unsupported { reference }
            | ReferenceError::Format { reference, .. }
            | ReferenceError::Io { reference, .. } => reference,
        }
    }
}

/// Structured validation error kinds
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ValidationErrorKind {
    /// Instance does not have the single expected type
    TypeMismatch { expected: String, got: String },

    /// Instance matches none of the listed types
    TypeUnionMismatch { expected: Vec<String>, got: String },

    /// Value not in enum
    InvalidEnumValue { allowed: Vec<Value> },

    /// Value differs from `const`
    ConstMismatch { expected: Value },

    /// String doesn't match pattern
    StringPatternMismatch { pattern: String },

    /// String length invalid (counted in characters)
    StringLengthInvalid {
        length: usize,
        min_length: Option<usize>,
        max_length: Option<usize>,
    },

    /// Number out of range
    NumberOutOfRange {
        value: f64,
        minimum: Option<f64>,
        maximum: Option<f64>,
        exclusive_minimum: Option<f64>,
        exclusive_maximum: Option<f64>,
    },

    /// Missing required property
    MissingRequiredProperty { property: String },

    /// Property not allowed by `additionalProperties: false`
    UnknownProperty { property: String },

    /// Array length invalid
    ArrayLengthInvalid {
        length: usize,
        min_items: Option<usize>,
        max_items: Option<usize>,
    },

    /// `allOf`, `anyOf` or `oneOf` not satisfied
    CompositionFailed { keyword: String },

    /// The `false` schema rejects everything
    FalseSchema,

    /// Unresolved schema reference
    UnresolvedReference { ref_id: String, reason: String },

    /// Too many nested schema applications
    DepthExceeded { limit: usize },

    /// The schema itself is malformed
    InvalidSchema { schema_path: String, message: String },
}

impl ValidationErrorKind {
    /// Render the message for an error at `path`.
    pub fn describe(&self, path: &InstancePath) -> String {
        match self {
            ValidationErrorKind::TypeMismatch { expected, .. } => {
                format!("{} is not of type {}", path, expected)
            }
            ValidationErrorKind::TypeUnionMismatch { expected, .. } => {
                format!("{} is not any of [{}]", path, expected.join(", "))
            }
            ValidationErrorKind::InvalidEnumValue { allowed } => {
                format!(
                    "{} is not one of {}",
                    path,
                    Value::Sequence(allowed.clone())
                )
            }
            ValidationErrorKind::ConstMismatch { expected } => {
                format!("{} must equal {}", path, expected)
            }
            ValidationErrorKind::StringPatternMismatch { pattern } => {
                format!("{} does not match pattern {}", path, pattern)
            }
            ValidationErrorKind::StringLengthInvalid {
                length,
                min_length,
                max_length,
            } => {
                if let Some(min) = min_length {
                    format!("{} is shorter than {}", path, min)
                } else if let Some(max) = max_length {
                    format!("{} is longer than {}", path, max)
                } else {
                    format!("{} has invalid length {}", path, length)
                }
            }
            ValidationErrorKind::NumberOutOfRange {
                value,
                minimum,
                maximum,
                exclusive_minimum,
                exclusive_maximum,
            } => {
                if let Some(min) = minimum {
                    format!("{} is less than {}", path, min)
                } else if let Some(max) = maximum {
                    format!("{} is greater than {}", path, max)
                } else if let Some(min) = exclusive_minimum {
                    format!("{} must be greater than {}", path, min)
                } else if let Some(max) = exclusive_maximum {
                    format!("{} must be less than {}", path, max)
                } else {
                    format!("{} is out of range ({})", path, value)
                }
            }
            ValidationErrorKind::MissingRequiredProperty { .. } => {
                format!("{} is a required property", path)
            }
            ValidationErrorKind::UnknownProperty { property } => {
                format!("Unexpected property {} at {}", property, path.parent())
            }
            ValidationErrorKind::ArrayLengthInvalid {
                length,
                min_items,
                max_items,
            } => {
                if let Some(min) = min_items {
                    format!("{} has fewer than {} items", path, min)
                } else if let Some(max) = max_items {
                    format!("{} has more than {} items", path, max)
                } else {
                    format!("{} has invalid length {}", path, length)
                }
            }
            ValidationErrorKind::CompositionFailed { keyword } => {
                format!("{} failed {}", path, keyword)
            }
            ValidationErrorKind::FalseSchema => format!("{} is not allowed", path),
            ValidationErrorKind::UnresolvedReference { reason, .. } => reason.clone(),
            ValidationErrorKind::DepthExceeded { limit } => {
                format!("{} exceeds the maximum schema depth of {}", path, limit)
            }
            ValidationErrorKind::InvalidSchema {
                schema_path,
                message,
            } => format!("Invalid schema at {}: {}", schema_path, message),
        }
    }

    /// Errors that describe a broken schema rather than a bad instance.
    /// Composition keywords propagate these instead of counting a failure.
    pub fn is_schema_defect(&self) -> bool {
        matches!(
            self,
            ValidationErrorKind::InvalidSchema { .. } | ValidationErrorKind::DepthExceeded { .. }
        )
    }
}

/// A validation failure. The message is rendered once, at construction.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// The structured error kind
    pub kind: ValidationErrorKind,
    /// Instance path where the error occurred (e.g. `instance.services[2]`)
    pub instance_path: InstancePath,
    /// Schema path that failed (e.g. `properties > services > items`)
    pub schema_path: SchemaPath,
    message: String,
}

impl ValidationError {
    /// Create a new validation error with a structured kind
    pub fn new(kind: ValidationErrorKind, instance_path: InstancePath) -> Self {
        let message = kind.describe(&instance_path);
        Self {
            kind,
            instance_path,
            schema_path: SchemaPath::new(),
            message,
        }
    }

    /// An error reporting a malformed schema at `schema_path`.
    pub fn invalid_schema(schema_path: &SchemaPath, message: impl Into<String>) -> Self {
        let kind = ValidationErrorKind::InvalidSchema {
            schema_path: schema_path.to_string(),
            message: message.into(),
        };
        Self::new(kind, InstancePath::new()).with_schema_path(schema_path.clone())
    }

    /// Get the human-readable message for this error
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Set the schema path for this error
    pub fn with_schema_path(mut self, schema_path: SchemaPath) -> Self {
        self.schema_path = schema_path;
        self
    }
}

/// Breadcrumb path into the instance (e.g. `instance.container.features[2]`)
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct InstancePath {
    segments: Vec<PathSegment>,
}

impl InstancePath {
    /// Create a new empty instance path
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Push a key segment onto the path
    pub fn push_key(&mut self, key: impl Into<String>) {
        self.segments.push(PathSegment::Key(key.into()));
    }

    /// Push an index segment onto the path
    pub fn push_index(&mut self, index: usize) {
        self.segments.push(PathSegment::Index(index));
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// Pop the last segment from the path
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    /// The path without its last segment.
    pub fn parent(&self) -> InstancePath {
        let mut parent = self.clone();
        parent.pop();
        parent
    }

    /// Get the segments as a slice
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Check if the path is empty
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Get the length of the path
    pub fn len(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instance")?;
        for segment in &self.segments {
            match segment {
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// Schema path (e.g. ["properties", "services", "items"])
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct SchemaPath {
    segments: Vec<String>,
}

impl SchemaPath {
    /// Create a new empty schema path
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Push a segment onto the path
    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    /// Pop the last segment from the path
    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    /// Get the segments as a slice
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Check if the path is empty
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Get the length of the path
    pub fn len(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "(root)")
        } else {
            write!(f, "{}", self.segments.join(" > "))
        }
    }
}

/// A segment in an instance path
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum PathSegment {
    /// Object key
    Key(String),
    /// Array index
    Index(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_path_display() {
        let mut path = InstancePath::new();
        assert_eq!(path.to_string(), "instance");

        path.push_key("container");
        assert_eq!(path.to_string(), "instance.container");

        path.push_key("features");
        path.push_index(2);
        assert_eq!(path.to_string(), "instance.container.features[2]");
        assert_eq!(path.parent().to_string(), "instance.container.features");
    }

    #[test]
    fn test_schema_path_display() {
        let mut path = SchemaPath::new();
        assert_eq!(path.to_string(), "(root)");

        path.push("properties");
        path.push("name");
        assert_eq!(path.to_string(), "properties > name");
    }

    #[test]
    fn test_validation_error_creation() {
        let mut path = InstancePath::new();
        path.push_key("name");

        let error = ValidationError::new(
            ValidationErrorKind::MissingRequiredProperty {
                property: "name".to_string(),
            },
            path,
        );
        assert_eq!(error.message(), "instance.name is a required property");
        assert_eq!(error.to_string(), error.message());
        assert_eq!(error.instance_path.len(), 1);
    }

    #[test]
    fn test_unknown_property_names_parent() {
        let mut path = InstancePath::new();
        path.push_key("service");
        path.push_key("extra");

        let error = ValidationError::new(
            ValidationErrorKind::UnknownProperty {
                property: "extra".to_string(),
            },
            path,
        );
        assert_eq!(error.message(), "Unexpected property extra at instance.service");
    }

    #[test]
    fn test_numeric_bounds_render_plainly() {
        let error = ValidationError::new(
            ValidationErrorKind::NumberOutOfRange {
                value: 0.0,
                minimum: Some(1.0),
                maximum: None,
                exclusive_minimum: None,
                exclusive_maximum: None,
            },
            InstancePath::new(),
        );
        assert_eq!(error.message(), "instance is less than 1");
    }

    #[test]
    fn test_enum_message_lists_values() {
        let error = ValidationError::new(
            ValidationErrorKind::InvalidEnumValue {
                allowed: vec![Value::from("a"), Value::Int(1)],
            },
            InstancePath::new(),
        );
        insta::assert_snapshot!(error.message(), @r#"instance is not one of ["a", 1]"#);
    }

    #[test]
    fn test_reference_error_messages() {
        let err = ReferenceError::Unsupported {
            reference: "https://example.com/s.json".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported reference: https://example.com/s.json"
        );
        assert_eq!(err.reference(), "https://example.com/s.json");
    }

    #[test]
    fn test_invalid_schema_uses_schema_path() {
        let mut schema_path = SchemaPath::new();
        schema_path.push("properties");
        schema_path.push("port");
        let error = ValidationError::invalid_schema(&schema_path, "minimum must be a number");
        assert_eq!(
            error.message(),
            "Invalid schema at properties > port: minimum must be a number"
        );
        assert!(error.kind.is_schema_defect());
    }
}
