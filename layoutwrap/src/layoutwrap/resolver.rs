use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::layoutwrap::error::{ConfigError, describe};
use crate::layoutwrap::types::ContentItem;

pub type LayoutFn = dyn Fn(&ContentItem) -> String + Send + Sync;

/// Where to find the layout for an item.
#[derive(Clone)]
pub enum LayoutRef {
    Fixed(String),
    /// Re-evaluated for every item.
    Derived(Arc<LayoutFn>),
}

impl LayoutRef {
    pub fn derived<F>(f: F) -> Self
    where
        F: Fn(&ContentItem) -> String + Send + Sync + 'static,
    {
        LayoutRef::Derived(Arc::new(f))
    }

    pub fn resolve(&self, item: &ContentItem) -> Result<String, ConfigError> {
        let location = match self {
            LayoutRef::Fixed(location) => location.clone(),
            LayoutRef::Derived(f) => f(item),
        };
        usable(location)
    }

    /// Checks the reference shape without touching storage.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        match self {
            LayoutRef::Fixed(location) => usable(location.clone()).map(|_| ()),
            LayoutRef::Derived(_) => Ok(()),
        }
    }
}

fn usable(location: String) -> Result<String, ConfigError> {
    if location.trim().is_empty() {
        return Err(ConfigError::InvalidLayout {
            found: "empty string".into(),
        });
    }
    Ok(location)
}

impl fmt::Debug for LayoutRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutRef::Fixed(location) => f.debug_tuple("Fixed").field(location).finish(),
            LayoutRef::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

impl From<&str> for LayoutRef {
    fn from(location: &str) -> Self {
        LayoutRef::Fixed(location.to_string())
    }
}

impl From<String> for LayoutRef {
    fn from(location: String) -> Self {
        LayoutRef::Fixed(location)
    }
}

impl TryFrom<&Value> for LayoutRef {
    type Error = ConfigError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(location) => Ok(LayoutRef::Fixed(location.clone())),
            other => Err(ConfigError::InvalidLayout {
                found: describe(other),
            }),
        }
    }
}
