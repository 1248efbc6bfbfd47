use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// One step from the document root to a violating value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// An object property.
    Key(String),
    /// An array element.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// A single schema violation: a human-readable message and where it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub message: String,
    pub path: Vec<PathSegment>,
}

impl Violation {
    pub fn new(message: impl Into<String>, path: Vec<PathSegment>) -> Self {
        Self {
            message: message.into(),
            path,
        }
    }

    /// Build a violation from a JSON Pointer into `instance`.
    ///
    /// The instance is walked alongside the pointer so that numeric tokens
    /// become [`PathSegment::Index`] only where they address an array.
    pub fn from_pointer(message: impl Into<String>, pointer: &str, instance: &Value) -> Self {
        let mut path = Vec::new();
        let mut node = Some(instance);

        for token in pointer.split('/').skip(1) {
            let token = unescape_token(token);
            let segment = match (node, token.parse::<usize>()) {
                (Some(Value::Array(_)), Ok(index)) => PathSegment::Index(index),
                _ => PathSegment::Key(token),
            };
            node = match (&segment, node) {
                (PathSegment::Index(i), Some(Value::Array(items))) => items.get(*i),
                (PathSegment::Key(k), Some(Value::Object(map))) => map.get(k),
                _ => None,
            };
            path.push(segment);
        }

        Self::new(message, path)
    }

    /// `a -> b -> 0`, or `root` for the document itself.
    pub fn path_display(&self) -> String {
        if self.path.is_empty() {
            return "root".to_string();
        }
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.path_display())
    }
}

fn unescape_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}
