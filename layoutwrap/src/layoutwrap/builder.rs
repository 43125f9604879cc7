use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use walkdir::WalkDir;

use crate::layoutwrap::config::WrapConfig;
use crate::layoutwrap::error::ConfigError;
use crate::layoutwrap::plugins::traits::Emitter;
use crate::layoutwrap::plugins::{DraftFilter, PluginRegistry};
use crate::layoutwrap::resolver::LayoutRef;
use crate::layoutwrap::stage::LayoutStage;
use crate::layoutwrap::types::{ContentItem, relative_path};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub written: usize,
    pub skipped: usize,
}

/// Wraps every page under the source directory and writes it to the
/// output directory.
pub struct SiteBuilder {
    registry: PluginRegistry,
    source_root: PathBuf,
    markdown: bool,
}

impl SiteBuilder {
    pub fn new(config: &WrapConfig) -> Result<Self> {
        let stage = layout_ref(config)
            .and_then(|layout| LayoutStage::new(layout, config.stage_options()))
            .context("building layout stage")?;
        let source_root = PathBuf::from(&config.source_dir);
        let writer = OutputWriter {
            source_root: source_root.clone(),
            output_root: PathBuf::from(&config.output_dir),
        };

        Ok(Self {
            registry: PluginRegistry::with_layout(stage)
                .with_filters(vec![Box::new(DraftFilter)])
                .with_emitters(vec![Box::new(writer)]),
            source_root,
            markdown: config.markdown,
        })
    }

    pub fn build(&self) -> Result<BuildSummary> {
        let mut summary = BuildSummary::default();

        for entry in WalkDir::new(&self.source_root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.path().is_file())
        {
            if !self.is_page(entry.path()) {
                continue;
            }

            let contents = fs::read(entry.path())
                .with_context(|| format!("reading {}", entry.path().display()))?;
            let item = ContentItem::new(entry.path(), contents);

            if self
                .registry
                .run(item)
                .with_context(|| format!("wrapping {}", entry.path().display()))?
            {
                summary.written += 1;
            } else {
                debug!("skipping draft {}", entry.path().display());
                summary.skipped += 1;
            }
        }

        info!(
            "wrapped {} page(s), skipped {} draft(s)",
            summary.written, summary.skipped
        );
        Ok(summary)
    }

    fn is_page(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        match ext.to_ascii_lowercase().as_str() {
            "html" | "htm" => true,
            "md" => self.markdown,
            _ => false,
        }
    }
}

fn layout_ref(config: &WrapConfig) -> Result<LayoutRef, ConfigError> {
    let fixed = LayoutRef::try_from(&config.layout.0)?;
    let Some(key) = config.layout_key.clone() else {
        return Ok(fixed);
    };

    let default = match fixed {
        LayoutRef::Fixed(location) => location,
        derived => return Ok(derived),
    };
    let layout_dir = PathBuf::from(config.layout_dir.clone().unwrap_or_default());
    Ok(LayoutRef::derived(move |item| match item.data_str(&key) {
        Some(name) => layout_dir.join(name).to_string_lossy().into_owned(),
        None => default.clone(),
    }))
}

struct OutputWriter {
    source_root: PathBuf,
    output_root: PathBuf,
}

impl Emitter for OutputWriter {
    fn emit(&self, item: &ContentItem) -> Result<()> {
        let target = self
            .output_root
            .join(relative_path(&item.path, &self.source_root));
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, &item.contents)
            .with_context(|| format!("writing {}", target.display()))?;
        debug!("wrote {}", target.display());
        Ok(())
    }
}
