use anyhow::Result;

use crate::layoutwrap::types::ContentItem;

pub trait Transformer: Send + Sync {
    fn transform(&self, item: ContentItem) -> Result<ContentItem>;
}

pub trait Filter: Send + Sync {
    fn include(&self, item: &ContentItem) -> bool;
}

pub trait Emitter: Send + Sync {
    fn emit(&self, _item: &ContentItem) -> Result<()> {
        Ok(())
    }
}
