pub mod config;
pub mod metadata;

pub use config::{matching_mod_record, ModRecord, ToolchainConfig};
pub use metadata::{BuildMetadata, BUILD_INFO_FILE};
