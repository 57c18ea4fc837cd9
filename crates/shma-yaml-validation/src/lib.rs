//! # shma-yaml-validation
//!
//! Validates [`shma_yaml::Value`] documents against schemas written in a
//! subset of JSON Schema.
//!
//! Schemas are plain `Value`s read with the same parser as the documents they
//! check; there is no compile step. Supported keywords are `type`, `enum`,
//! `const`, `pattern`, `minLength`, `maxLength`, `minimum`, `maximum`,
//! `exclusiveMinimum`, `exclusiveMaximum`, `required`, `properties`,
//! `additionalProperties`, `minItems`, `maxItems`, `items`, `allOf`, `anyOf`,
//! `oneOf` and whole-document `$ref`s. Unknown keywords are ignored.
//!
//! Validation stops at the first violation and reports it with a breadcrumb
//! path such as `instance.services[2].port`.
//!
//! ## Example
//!
//! ```rust
//! use shma_yaml::parse_one;
//! use shma_yaml_validation::validate;
//!
//! let schema = parse_one("type: array\nitems:\n  type: integer\nmaxItems: 2").unwrap();
//! let err = validate(&schema, &parse_one("[1, 2, 3]").unwrap()).unwrap_err();
//! assert_eq!(err.message(), "instance has more than 2 items");
//! ```

mod check;
pub mod error;
mod resolver;
mod validator;

pub use check::check_schema;
pub use error::{
    InstancePath, PathSegment, ReferenceError, SchemaPath, ValidationError, ValidationErrorKind,
    ValidationResult,
};
pub use resolver::{Resolver, SchemaResolver};
pub use validator::{
    DEFAULT_MAX_DEPTH, TYPE_NAMES, Validator, ValidatorOptions, navigate, validate, values_equal,
};
