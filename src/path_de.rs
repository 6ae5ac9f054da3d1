use serde::de::DeserializeOwned;
use serde_path_to_error::{Path, Segment};

use crate::error::LoadError;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, LoadError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(into_load_error)
}

/// Same as [`from_str_with_path`] for an already-parsed document.
pub fn from_value_with_path<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, LoadError> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(into_load_error)
}

fn into_load_error(err: serde_path_to_error::Error<serde_json::Error>) -> LoadError {
    let path = json_pointer(err.path());
    LoadError::Json { path, message: err.into_inner().to_string() }
}

/// Render a deserializer path as an RFC 6901 JSON Pointer (`/types/0/fields`).
fn json_pointer(path: &Path) -> String {
    let mut out = String::new();
    for segment in path.iter() {
        out.push('/');
        match segment {
            Segment::Seq { index } => out.push_str(&index.to_string()),
            Segment::Map { key } => out.push_str(&key.replace('~', "~0").replace('/', "~1")),
            Segment::Enum { variant } => out.push_str(variant),
            Segment::Unknown => out.push('?'),
        }
    }
    out
}
