pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, import_config::ImportConfig, toml_config::TomlConfig};

pub use app::FileImportJob;
pub use core::{
    catalog::MarketplaceFormatCatalog, engine::ImportEngine, parser::RecordParser,
    pipeline::ImportPipeline, registry::MappingRegistry,
};
pub use utils::error::{RegistryError, Result, SkuError};
