pub mod catalog;
pub mod fetcher;
pub mod resolver;
pub mod validate;

pub use catalog::{CatalogProvider, ForgeBuild, McpcAsset, PlatformVersions, RemoteCatalog};
pub use fetcher::{Fetcher, HttpFetcher};
pub use resolver::{ForgeRelease, VersionResolver};
pub use validate::obtain_validated;
