use anyhow::{Result, anyhow};

use crate::layoutwrap::types::ContentItem;

use super::traits::Transformer;

/// Renders `.md` items to HTML and renames them to `.html`.
pub struct MarkdownRenderer;

impl Transformer for MarkdownRenderer {
    fn transform(&self, mut item: ContentItem) -> Result<ContentItem> {
        if !is_markdown(&item) {
            return Ok(item);
        }

        let rendered = markdown::to_html_with_options(
            &item.contents_str(),
            &markdown::Options {
                parse: markdown::ParseOptions::gfm(),
                compile: markdown::CompileOptions {
                    allow_dangerous_html: true,
                    ..markdown::CompileOptions::gfm()
                },
            },
        )
        .map_err(|e| anyhow!("rendering {}: {}", item.path.display(), e))?;

        item.set_contents(rendered);
        item.path.set_extension("html");
        Ok(item)
    }
}

fn is_markdown(item: &ContentItem) -> bool {
    item.path
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}
