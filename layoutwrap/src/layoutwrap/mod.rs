pub mod builder;
pub mod cache;
pub mod config;
pub mod engines;
pub mod error;
pub mod plugins;
pub mod renderer;
pub mod resolver;
pub mod stage;
pub mod storage;
pub mod types;

pub use builder::{BuildSummary, SiteBuilder};
pub use cache::LayoutCache;
pub use config::WrapConfig;
pub use engines::Engine;
pub use error::{ConfigError, EngineError, LayoutError};
pub use resolver::LayoutRef;
pub use stage::{LayoutStage, StageOptions};
pub use storage::{FsStorage, MemoryStorage, Storage};
pub use types::ContentItem;
