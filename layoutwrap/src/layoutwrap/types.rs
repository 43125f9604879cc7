use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

/// One unit flowing through a layout stage.
#[derive(Clone, Debug, Default)]
pub struct ContentItem {
    pub path: PathBuf,
    pub contents: Vec<u8>,
    /// Item metadata, typically parsed front matter.
    pub data: Map<String, Value>,
}

impl ContentItem {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
            data: Map::new(),
        }
    }

    pub fn contents_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.contents)
    }

    pub fn set_contents(&mut self, contents: impl Into<Vec<u8>>) {
        self.contents = contents.into();
    }

    /// String value of a metadata key, if present.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// The view of this item exposed to templates as `file`.
    pub fn template_view(&self) -> FileView<'_> {
        FileView {
            path: self.path.to_string_lossy(),
            contents: self.contents_str(),
            data: &self.data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FileView<'a> {
    pub path: Cow<'a, str>,
    pub contents: Cow<'a, str>,
    pub data: &'a Map<String, Value>,
}

/// Path of `path` relative to `root`, using `/` separators.
pub fn relative_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .ok()
        .and_then(|p| p.to_str().map(|s| s.replace('\\', "/")))
        .unwrap_or_else(|| path.to_string_lossy().replace('\\', "/"))
}
