pub mod archive;
pub mod merge;

pub use archive::build_archive;
pub use merge::{extract_archive, merge_directory, MergeStats};
