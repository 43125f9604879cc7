use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::layoutwrap::types::ContentItem;

use super::traits::{Filter, Transformer};

/// Moves a leading `---` YAML block into the item's metadata.
pub struct FrontMatter;

impl Transformer for FrontMatter {
    fn transform(&self, mut item: ContentItem) -> Result<ContentItem> {
        let content = item.contents_str().into_owned();
        let mut lines = content.lines();

        if lines.next().map(str::trim_end) != Some("---") {
            return Ok(item);
        }

        let mut fm_lines = vec![];
        for line in lines.by_ref() {
            if line.trim() == "---" {
                break;
            }
            fm_lines.push(line);
        }

        let remainder: String = lines.collect::<Vec<&str>>().join("\n");
        let yaml_str = fm_lines.join("\n");

        if !yaml_str.trim().is_empty() {
            let parsed: Map<String, Value> = serde_yaml::from_str(&yaml_str)
                .with_context(|| format!("parsing front matter of {}", item.path.display()))?;
            item.data.extend(parsed);
        }

        item.set_contents(remainder);
        Ok(item)
    }
}

/// Drops items marked `draft: true`.
pub struct DraftFilter;

impl Filter for DraftFilter {
    fn include(&self, item: &ContentItem) -> bool {
        item.data
            .get("draft")
            .and_then(Value::as_bool)
            .map(|draft| !draft)
            .unwrap_or(true)
    }
}
