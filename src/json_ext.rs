use serde::{Deserialize, Serialize};

pub use serde_json::Value;

/// A json object.
pub type Object = serde_json::Map<String, Value>;

/// A path for an error. This can be composed of field names and list indices.
pub type Path = Vec<PathElement>;

/// One element of an error path, e.g. `["hero", "friends", 1, "name"]`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathElement {
    /// An integer path element.
    Number(i32),

    /// A string path element.
    String(String),
}

impl From<&str> for PathElement {
    fn from(key: &str) -> Self {
        PathElement::String(key.to_string())
    }
}

impl From<i32> for PathElement {
    fn from(index: i32) -> Self {
        PathElement::Number(index)
    }
}
