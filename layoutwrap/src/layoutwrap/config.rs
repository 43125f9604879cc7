use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use confik::{Configuration, EnvSource};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use self::yaml::YamlFileSource;
use crate::layoutwrap::stage::StageOptions;

pub const CONFIG_ENV: &str = "LAYOUTWRAP_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "layoutwrap.yml";

/// A configuration value kept as loose JSON. Its shape is checked where it
/// is used, so a bad `layout` or `data` reports the same error as the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigValue(pub Value);

impl Configuration for ConfigValue {
    type Builder = Option<Self>;
}

impl From<Value> for ConfigValue {
    fn from(value: Value) -> Self {
        ConfigValue(value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Configuration)]
pub struct WrapConfig {
    /// Template engine name, checked when the stage is built.
    pub engine: Option<String>,
    /// Layout used by every item unless `layout_key` picks another.
    pub layout: ConfigValue,
    /// Directory holding the layouts named through `layout_key`.
    #[serde(default)]
    pub layout_dir: Option<String>,
    /// Front matter key naming an item's layout file.
    #[serde(default)]
    pub layout_key: Option<String>,
    #[serde(default = "default_source_dir")]
    #[confik(default = default_source_dir())]
    pub source_dir: String,
    #[serde(default = "default_output_dir")]
    #[confik(default = default_output_dir())]
    pub output_dir: String,
    /// Extra template variables, any JSON object.
    #[serde(default = "default_data")]
    #[confik(default = default_data())]
    pub data: ConfigValue,
    /// Also pick up `.md` sources and render them to HTML first.
    #[serde(default = "default_markdown")]
    #[confik(default = default_markdown())]
    pub markdown: bool,
}

fn default_source_dir() -> String {
    "content".into()
}

fn default_output_dir() -> String {
    "public".into()
}

fn default_markdown() -> bool {
    true
}

fn default_data() -> ConfigValue {
    ConfigValue(Value::Object(Map::new()))
}

impl WrapConfig {
    /// Path named by `LAYOUTWRAP_CONFIG`, or `layoutwrap.yml` in the working directory.
    pub fn default_path() -> PathBuf {
        env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from a YAML file (if present) and environment variables.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut builder = WrapConfig::builder();

        if config_path.exists() {
            builder.override_with(YamlFileSource::new(config_path));
        } else {
            log::warn!(
                "{} not found, reading configuration from the environment only",
                config_path.display()
            );
        }

        builder.override_with(EnvSource::new());

        builder
            .try_build()
            .with_context(|| format!("loading configuration from {}", config_path.display()))
    }

    pub fn stage_options(&self) -> StageOptions {
        StageOptions {
            engine: self.engine.clone(),
            data: self.data.0.clone(),
        }
    }
}

mod yaml {
    use std::error::Error;
    use std::path::PathBuf;

    use confik::Source;
    use serde::de::DeserializeOwned;

    #[derive(Debug)]
    pub struct YamlFileSource {
        path: PathBuf,
    }

    impl YamlFileSource {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }
    }

    impl<T> Source<T> for YamlFileSource
    where
        T: DeserializeOwned + confik::ConfigurationBuilder,
    {
        fn allows_secrets(&self) -> bool {
            false
        }

        fn provide(&self) -> Result<T, Box<dyn Error + Sync + Send>> {
            let contents = std::fs::read_to_string(&self.path)?;
            Ok(serde_yaml::from_str(&contents)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layoutwrap::cache::LayoutCache;
    use crate::layoutwrap::error::ConfigError;
    use crate::layoutwrap::stage::LayoutStage;
    use crate::layoutwrap::storage::MemoryStorage;
    use crate::layoutwrap::types::ContentItem;
    use serde_json::json;
    use std::fs;
    use std::sync::Arc;

    #[test]
    fn loads_yaml_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layoutwrap.yml");
        fs::write(
            &path,
            "engine: ejs\nlayout: layouts/default.ejs\ndata:\n  title: THE SITE\n",
        )
        .unwrap();

        let config = WrapConfig::load_from(&path).unwrap();
        assert_eq!(config.engine.as_deref(), Some("ejs"));
        assert_eq!(config.layout, ConfigValue(json!("layouts/default.ejs")));
        assert_eq!(config.source_dir, "content");
        assert_eq!(config.output_dir, "public");
        assert!(config.markdown);

        let options = config.stage_options();
        assert_eq!(options.data, json!({ "title": "THE SITE" }));
    }

    #[test]
    fn structured_data_reaches_the_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layoutwrap.yml");
        fs::write(
            &path,
            "engine: ejs\nlayout: default.ejs\ndata:\n  year: 2024\n  site:\n    name: Garden\n    tags: [rust, notes]\n",
        )
        .unwrap();

        let config = WrapConfig::load_from(&path).unwrap();
        assert_eq!(
            config.stage_options().data,
            json!({ "year": 2024, "site": { "name": "Garden", "tags": ["rust", "notes"] } })
        );

        let storage = Arc::new(MemoryStorage::new());
        storage.put(
            "default.ejs",
            "<%= year %>|<%= site.name %>|<%= site.tags[1] %>|<%- file.contents %>",
        );
        let stage = LayoutStage::with_cache(
            "default.ejs",
            config.stage_options(),
            Arc::new(LayoutCache::new(storage)),
        )
        .unwrap();

        let item = stage.process(ContentItem::new("a.html", "<p>x</p>")).unwrap();
        assert_eq!(item.contents_str(), "2024|Garden|notes|<p>x</p>");
    }

    #[test]
    fn non_object_data_fails_at_stage_construction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layoutwrap.yml");
        fs::write(&path, "engine: ejs\nlayout: default.ejs\ndata: [1, 2]\n").unwrap();

        let config = WrapConfig::load_from(&path).unwrap();
        assert!(matches!(
            LayoutStage::new("default.ejs", config.stage_options()),
            Err(ConfigError::InvalidData { .. })
        ));
    }

    #[test]
    fn missing_layout_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layoutwrap.yml");
        fs::write(&path, "engine: ejs\n").unwrap();

        assert!(WrapConfig::load_from(&path).is_err());
    }
}
