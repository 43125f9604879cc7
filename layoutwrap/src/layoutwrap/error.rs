use std::io;

use thiserror::Error;

use crate::layoutwrap::engines::Engine;

/// Failure raised by a rendering capability. Passed through untouched.
pub type EngineError = Box<dyn std::error::Error + Send + Sync>;

/// Invalid stage configuration. Raised before any item is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("`layout` should be a location string or a function: {found} is given")]
    InvalidLayout { found: String },

    #[error("`engine` is not specified\n`engine` should be one of {}", Engine::names())]
    MissingEngine,

    #[error("Unknown `engine`: {name}\n`engine` should be one of {}", Engine::names())]
    UnknownEngine { name: String },

    #[error("`data` should be an object: {found} is given")]
    InvalidData { found: String },
}

/// Failure while wrapping a single item.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("loading layout {location}")]
    Storage {
        location: String,
        #[source]
        source: io::Error,
    },

    #[error("{engine} failed to render layout {location}")]
    Render {
        engine: Engine,
        location: String,
        #[source]
        source: EngineError,
    },
}

impl LayoutError {
    pub(crate) fn storage(location: &str, source: io::Error) -> Self {
        LayoutError::Storage {
            location: location.to_string(),
            source,
        }
    }

    /// True when the layout location does not exist in storage.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LayoutError::Storage { source, .. } if source.kind() == io::ErrorKind::NotFound
        )
    }
}

/// Short description of a JSON value's shape for error messages.
pub(crate) fn describe(value: &serde_json::Value) -> String {
    use serde_json::Value;

    match value {
        Value::Null => "null".into(),
        Value::Bool(_) => "boolean".into(),
        Value::Number(_) => "number".into(),
        Value::String(_) => "string".into(),
        Value::Array(_) => "array".into(),
        Value::Object(_) => "object".into(),
    }
}
