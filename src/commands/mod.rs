pub mod clean;
pub mod compile;
pub mod package;
pub mod prepare;

use crate::build::ToolchainConfig;
use crate::cache::ArtifactCache;
use crate::cli::parser::CliParser;
use crate::pipeline::{Operation, Pipeline};
use crate::result::Result;
use crate::toolchain::{HttpFetcher, RemoteCatalog};
use crate::utils::ProcessRunner;
use crate::workspace::Workspace;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum CommandType {
    Prepare,
    Compile,
    Package,
    Clean { force: bool },
}

impl CommandType {
    pub async fn execute(
        self,
        workspace: &Workspace,
        config_path: &Path,
        cache_root: &Path,
    ) -> Result<()> {
        match self {
            CommandType::Prepare => prepare::execute(workspace, config_path, cache_root).await,
            CommandType::Compile => compile::execute(workspace, config_path, cache_root).await,
            CommandType::Package => package::execute(workspace, config_path, cache_root).await,
            CommandType::Clean { force } => {
                clean::execute(workspace, config_path, cache_root, force).await
            }
        }
    }
}

/// Resolved invocation context shared by every command: the workspace,
/// the config file and the artifact cache root, each overridable from
/// the command line.
pub struct CommandExecutor {
    workspace: Workspace,
    config_path: PathBuf,
    cache_root: PathBuf,
}

impl CommandExecutor {
    pub fn new(
        workspace_root: Option<&Path>,
        config_path: Option<&Path>,
        cache_root: Option<&Path>,
    ) -> Result<Self> {
        if let Some(root) = workspace_root {
            CliParser::validate_workspace_root(root)?;
        }
        let workspace = Workspace::detect(workspace_root);

        let config_path = match config_path {
            Some(path) => CliParser::validate_config_path(path)?,
            None => workspace.default_config_path(),
        };

        let cache_root = match cache_root {
            Some(path) => path.to_path_buf(),
            None => ArtifactCache::default_root()?,
        };

        Ok(Self {
            workspace,
            config_path,
            cache_root,
        })
    }

    pub async fn prepare(&self) -> Result<()> {
        CommandType::Prepare
            .execute(&self.workspace, &self.config_path, &self.cache_root)
            .await
    }

    pub async fn compile(&self) -> Result<()> {
        CommandType::Compile
            .execute(&self.workspace, &self.config_path, &self.cache_root)
            .await
    }

    pub async fn package(&self) -> Result<()> {
        CommandType::Package
            .execute(&self.workspace, &self.config_path, &self.cache_root)
            .await
    }

    pub async fn clean(&self, force: bool) -> Result<()> {
        CommandType::Clean { force }
            .execute(&self.workspace, &self.config_path, &self.cache_root)
            .await
    }
}

pub(crate) async fn run_pipeline(
    workspace: &Workspace,
    config_path: &Path,
    cache_root: &Path,
    operation: Operation,
) -> Result<()> {
    let config = ToolchainConfig::from_file(config_path).await?;
    run_pipeline_with(&config, workspace, cache_root, operation).await
}

pub(crate) async fn run_pipeline_with(
    config: &ToolchainConfig,
    workspace: &Workspace,
    cache_root: &Path,
    operation: Operation,
) -> Result<()> {
    let cache = ArtifactCache::new(cache_root);
    let fetcher = HttpFetcher::new();
    let catalog = RemoteCatalog::new();
    let runner = ProcessRunner::new();

    let mut pipeline = Pipeline::new(config, workspace, &cache, &fetcher, &catalog, &runner);
    pipeline.run(operation).await
}

pub(crate) fn format_duration(duration: std::time::Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms >= 1000 {
        let seconds = duration.as_secs_f64();
        format!("{:.2}s", seconds)
    } else {
        format!("{}ms", total_ms)
    }
}
