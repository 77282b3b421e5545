/// McDeploy - A CI toolchain assembler for Minecraft mod builds
///
/// This crate provides a reproducible build pipeline with focus on:
/// - Static version resolution with remote catalog fallback
/// - Cache-aware artifact fetching with integrity validation
/// - Deterministic toolchain tree assembly and output packaging
/// - Per-component exit codes for CI diagnostics
///
/// Main modules:
/// - build: Toolchain configuration and CI build metadata
/// - cache: Artifact cache shared between workspaces
/// - cli: Command-line interface parsing and execution
/// - commands: Implementation of the pipeline subcommands
/// - pipeline: Stage orchestration from resolution to packaging
/// - result: Error handling and exit code mapping
/// - toolchain: Component catalogs, resolution, fetching and validation
/// - tree: Directory merging and output archive construction
/// - utils: External build script execution
/// - workspace: Workspace layout and well-known paths
pub mod build;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod pipeline;
pub mod result;
pub mod toolchain;
pub mod tree;
pub mod utils;
pub mod workspace;
