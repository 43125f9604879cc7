pub mod frontmatter;
pub mod markdown;
pub mod traits;

use anyhow::Result;

use crate::layoutwrap::stage::LayoutStage;
use crate::layoutwrap::types::ContentItem;

use self::frontmatter::FrontMatter;
use self::markdown::MarkdownRenderer;
use self::traits::{Emitter, Filter, Transformer};

pub struct PluginRegistry {
    transformers: Vec<Box<dyn Transformer>>,
    filters: Vec<Box<dyn Filter>>,
    emitters: Vec<Box<dyn Emitter>>,
}

impl PluginRegistry {
    /// Front matter, then markdown, then the layout.
    pub fn with_layout(stage: LayoutStage) -> Self {
        Self {
            transformers: vec![
                // Order matters: FrontMatter must run first so filters and
                // derived layouts can see metadata
                Box::new(FrontMatter),
                Box::new(MarkdownRenderer),
                Box::new(stage),
            ],
            filters: vec![],
            emitters: vec![],
        }
    }

    pub fn with_filters(mut self, filters: Vec<Box<dyn Filter>>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_emitters(mut self, emitters: Vec<Box<dyn Emitter>>) -> Self {
        self.emitters = emitters;
        self
    }

    /// Run transformers in order while honoring filters.
    ///
    /// Filters are evaluated after the first transformer (FrontMatter) has
    /// populated metadata so they can read flags like `draft`.
    /// Returns `Ok(None)` when a filter excludes the item.
    pub fn transform(&self, mut item: ContentItem) -> Result<Option<ContentItem>> {
        if let Some((first, rest)) = self.transformers.split_first() {
            item = first.transform(item)?;

            if !self.allow(&item) {
                return Ok(None);
            }

            for transformer in rest {
                item = transformer.transform(item)?;
            }
        }

        Ok(Some(item))
    }

    /// Transform, then hand the result to every emitter. Returns whether the
    /// item was emitted.
    pub fn run(&self, item: ContentItem) -> Result<bool> {
        let Some(item) = self.transform(item)? else {
            return Ok(false);
        };
        for emitter in &self.emitters {
            emitter.emit(&item)?;
        }
        Ok(true)
    }

    pub fn allow(&self, item: &ContentItem) -> bool {
        self.filters.iter().all(|f| f.include(item))
    }
}

impl Transformer for LayoutStage {
    fn transform(&self, item: ContentItem) -> Result<ContentItem> {
        Ok(self.process(item)?)
    }
}

pub use frontmatter::DraftFilter;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layoutwrap::cache::LayoutCache;
    use crate::layoutwrap::resolver::LayoutRef;
    use crate::layoutwrap::stage::StageOptions;
    use crate::layoutwrap::storage::MemoryStorage;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Collect(Arc<Mutex<Vec<String>>>);

    impl Emitter for Collect {
        fn emit(&self, item: &ContentItem) -> Result<()> {
            self.0.lock().unwrap().push(item.contents_str().into_owned());
            Ok(())
        }
    }

    fn registry(out: Arc<Mutex<Vec<String>>>) -> PluginRegistry {
        let storage = Arc::new(MemoryStorage::new());
        storage.put("default.ejs", "<main><%- file.contents %></main>");
        storage.put(
            "post.ejs",
            "<article><h1><%= file.data.title %></h1><%- file.contents %></article>",
        );

        let layout = LayoutRef::derived(|item| {
            format!("{}.ejs", item.data_str("layout").unwrap_or("default"))
        });
        let stage = LayoutStage::with_cache(
            layout,
            StageOptions::engine("ejs"),
            Arc::new(LayoutCache::new(storage)),
        )
        .unwrap();

        PluginRegistry::with_layout(stage)
            .with_filters(vec![Box::new(DraftFilter)])
            .with_emitters(vec![Box::new(Collect(out))])
    }

    #[test]
    fn markdown_with_front_matter_picks_its_layout() {
        let out = Arc::new(Mutex::new(vec![]));
        let registry = registry(out.clone());

        let page = ContentItem::new("a.md", "---\nlayout: post\ntitle: Hi\n---\nBody");
        assert!(registry.run(page).unwrap());
        assert!(registry.run(ContentItem::new("b.html", "<p>x</p>")).unwrap());

        let out = out.lock().unwrap();
        assert_eq!(out[0], "<article><h1>Hi</h1><p>Body</p></article>");
        assert_eq!(out[1], "<main><p>x</p></main>");
    }

    #[test]
    fn drafts_are_not_emitted() {
        let out = Arc::new(Mutex::new(vec![]));
        let registry = registry(out.clone());

        let draft = ContentItem::new("d.md", "---\ndraft: true\n---\nsecret");
        assert!(!registry.run(draft).unwrap());
        assert!(out.lock().unwrap().is_empty());
    }
}
