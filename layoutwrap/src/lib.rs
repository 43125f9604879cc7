pub mod layoutwrap;

pub use crate::layoutwrap::*;

use anyhow::Result;
use log::info;

/// Load configuration and wrap every page of the configured site.
pub fn run() -> Result<BuildSummary> {
    let config = WrapConfig::load()?;

    info!(
        "wrapping {} into {} with {}",
        config.source_dir,
        config.output_dir,
        config.engine.as_deref().unwrap_or("<no engine>")
    );

    SiteBuilder::new(&config)?.build()
}
