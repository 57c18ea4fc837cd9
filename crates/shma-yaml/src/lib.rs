//! # shma-yaml
//!
//! Line-oriented parser for the reduced YAML subset used by service
//! descriptions and their schemas.
//!
//! The supported subset covers block mappings and sequences, plain and quoted
//! scalars, inline flow collections, literal (`|`) and folded (`>`) block
//! scalars, comments and multi-document streams. Anchors, aliases, tags and
//! complex keys are not supported.
//!
//! ## Design
//!
//! Input is split into documents, each document into immutable [`Line`]
//! records, and a recursive descent walks the lines by indentation. Every
//! parse step takes the line slice and a start index and returns the value
//! together with the next unconsumed index, so the parser holds no mutable
//! cursor state.
//!
//! Input that looks like JSON is handed to `serde_json` first (see
//! [`ParseOptions::json_fast_path`]).
//!
//! ## Example
//!
//! ```rust
//! use shma_yaml::{parse_one, Value};
//!
//! let content = r#"
//! name: web
//! ports:
//!   - 80
//!   - 443
//! "#;
//!
//! let doc = parse_one(content).unwrap();
//! assert_eq!(doc.get("name").and_then(Value::as_str), Some("web"));
//! ```

mod block;
mod error;
mod flow;
mod line;
mod parser;
mod scalar;
mod value;

pub use error::{FormatError, Result};
pub use line::{Line, split_documents};
pub use parser::{
    DEFAULT_MAX_DEPTH, Documents, ParseOptions, parse_all, parse_all_file, parse_all_with,
    parse_file, parse_one, parse_one_with,
};
pub use value::{Mapping, Value};
