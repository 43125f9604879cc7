use std::sync::Arc;

use log::debug;
use serde_json::{Map, Value};

use crate::layoutwrap::cache::LayoutCache;
use crate::layoutwrap::engines::Engine;
use crate::layoutwrap::error::{ConfigError, LayoutError, describe};
use crate::layoutwrap::renderer;
use crate::layoutwrap::resolver::LayoutRef;
use crate::layoutwrap::types::ContentItem;

#[derive(Clone, Debug)]
pub struct StageOptions {
    pub engine: Option<String>,
    /// Extra template variables. Must be a JSON object.
    pub data: Value,
}

impl Default for StageOptions {
    fn default() -> Self {
        Self {
            engine: None,
            data: Value::Object(Map::new()),
        }
    }
}

impl StageOptions {
    pub fn engine(name: impl Into<String>) -> Self {
        Self {
            engine: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// Wraps each item in a layout: resolve, load through the cache, render,
/// replace the payload.
pub struct LayoutStage {
    layout: LayoutRef,
    engine: Engine,
    data: Map<String, Value>,
    cache: Arc<LayoutCache>,
}

macro_rules! engine_constructors {
    ($($fn_name:ident => $engine:expr),* $(,)?) => {
        $(
            #[doc = concat!("Stage rendering with `", stringify!($fn_name), "`.")]
            pub fn $fn_name(
                layout: impl Into<LayoutRef>,
                options: StageOptions,
            ) -> Result<Self, ConfigError> {
                Self::new(
                    layout,
                    StageOptions {
                        engine: Some($engine.name().to_string()),
                        ..options
                    },
                )
            }
        )*
    };
}

impl LayoutStage {
    /// Builds a stage with its own filesystem-backed cache.
    pub fn new(layout: impl Into<LayoutRef>, options: StageOptions) -> Result<Self, ConfigError> {
        Self::with_cache(layout, options, Arc::new(LayoutCache::filesystem()))
    }

    /// Builds a stage sharing `cache` with other stages.
    pub fn with_cache(
        layout: impl Into<LayoutRef>,
        options: StageOptions,
        cache: Arc<LayoutCache>,
    ) -> Result<Self, ConfigError> {
        let layout = layout.into();
        layout.validate()?;
        let engine = Engine::validate(options.engine.as_deref())?;
        let data = match options.data {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(ConfigError::InvalidData {
                    found: describe(&other),
                });
            }
        };

        Ok(Self {
            layout,
            engine,
            data,
            cache,
        })
    }

    engine_constructors! {
        ejs => Engine::Ejs,
        handlebars => Engine::Handlebars,
        mustache => Engine::Mustache,
        hogan => Engine::Hogan,
        nunjucks => Engine::Nunjucks,
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    pub fn process(&self, mut item: ContentItem) -> Result<ContentItem, LayoutError> {
        let location = self.layout.resolve(&item)?;
        let template = self.cache.get(&location)?;

        let rendered = renderer::render(self.engine, &template, &self.data, &item).map_err(
            |source| LayoutError::Render {
                engine: self.engine,
                location: location.clone(),
                source,
            },
        )?;

        debug!(
            "wrapped {} with {} ({})",
            item.path.display(),
            location,
            self.engine
        );
        item.set_contents(rendered);
        Ok(item)
    }

    /// Processes items one at a time, in order.
    pub fn process_all<'a, I>(
        &'a self,
        items: I,
    ) -> impl Iterator<Item = Result<ContentItem, LayoutError>> + 'a
    where
        I: IntoIterator<Item = ContentItem>,
        I::IntoIter: 'a,
    {
        items.into_iter().map(move |item| self.process(item))
    }
}
