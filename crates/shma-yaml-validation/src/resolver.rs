//! `$ref` resolution against sibling schema files.

use crate::error::ReferenceError;
use shma_yaml::{Mapping, Value, parse_one};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, trace};

/// Maps a `$ref` string to the schema it designates.
///
/// The validator only depends on this trait, so hosts can supply in-memory
/// resolvers.
pub trait SchemaResolver: Send + Sync {
    fn resolve(&self, reference: &str) -> Result<Arc<Value>, ReferenceError>;
}

/// Resolves whole-document references against files next to a base location.
///
/// Supported forms:
/// - `#` or an empty string: the root schema
/// - `other.yaml`, `other.yaml#`, `file:///abs/other.yaml`: a schema file,
///   relative paths taken from the base directory
///
/// JSON-pointer fragments and non-`file` schemes are rejected with
/// [`ReferenceError::Unsupported`]. Loaded files are memoised per instance.
#[derive(Debug)]
pub struct Resolver {
    base_dir: PathBuf,
    root: Arc<Value>,
    cache: Mutex<HashMap<String, Arc<Value>>>,
}

impl Resolver {
    /// `base_location` may be a directory, a file (its parent directory is
    /// used) or a `file://` URI of either.
    pub fn new(base_location: impl AsRef<Path>, root: impl Into<Arc<Value>>) -> Self {
        let base = base_location.as_ref();
        let base = match base.to_str().and_then(|s| s.strip_prefix("file://")) {
            Some(stripped) => PathBuf::from(stripped),
            None => base.to_path_buf(),
        };
        let base_dir = if base.is_file() {
            base.parent().map_or_else(PathBuf::new, Path::to_path_buf)
        } else {
            base
        };
        Self {
            base_dir,
            root: root.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn load(&self, reference: &str, target: &str) -> Result<Value, ReferenceError> {
        let path = self.base_dir.join(target);
        if !path.is_file() {
            return Err(ReferenceError::NotFound {
                reference: reference.to_string(),
                path,
            });
        }
        let text = std::fs::read_to_string(&path).map_err(|source| ReferenceError::Io {
            reference: reference.to_string(),
            path: path.clone(),
            source,
        })?;
        let document = parse_one(&text).map_err(|source| ReferenceError::Format {
            reference: reference.to_string(),
            source,
        })?;
        debug!(reference, path = %path.display(), "loaded referenced schema");
        Ok(match document {
            Value::Null => Value::Mapping(Mapping::new()),
            other => other,
        })
    }
}

/// Strip the optional `file://` scheme and trailing empty fragment, rejecting
/// everything else that is not a plain relative or absolute path.
fn file_target(reference: &str) -> Option<&str> {
    let target = reference.strip_suffix('#').unwrap_or(reference);
    if target.contains('#') {
        return None;
    }
    match target.strip_prefix("file://") {
        Some(path) => Some(path),
        None if target.contains("://") => None,
        None => Some(target),
    }
}

impl SchemaResolver for Resolver {
    fn resolve(&self, reference: &str) -> Result<Arc<Value>, ReferenceError> {
        let reference = reference.trim();
        if reference.is_empty() || reference == "#" {
            return Ok(Arc::clone(&self.root));
        }

        let unsupported = || ReferenceError::Unsupported {
            reference: reference.to_string(),
        };
        if reference.starts_with('#') {
            return Err(unsupported());
        }
        let target = file_target(reference).ok_or_else(unsupported)?;

        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = cache.get(reference) {
            trace!(reference, "reference served from memo");
            return Ok(Arc::clone(hit));
        }
        drop(cache);

        let loaded = Arc::new(self.load(reference, target)?);
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(reference.to_string(), Arc::clone(&loaded));
        Ok(loaded)
    }
}
