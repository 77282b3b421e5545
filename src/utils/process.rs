use crate::result::{McDeployError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use which::which;

/// Seam for the external build scripts. The pipeline only ever needs
/// "run this script in this directory and tell me whether it succeeded".
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run_script(&self, script: &Path, work_dir: &Path) -> Result<()>;
}

#[derive(Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ToolRunner for ProcessRunner {
    async fn run_script(&self, script: &Path, work_dir: &Path) -> Result<()> {
        let python = find_python()?;

        log::info!(
            "Running {} {} in {}",
            python.display(),
            script.display(),
            work_dir.display()
        );

        let mut command = Command::new(&python);
        command.arg(script);
        command.current_dir(work_dir);
        command.stdin(Stdio::inherit());
        command.stdout(Stdio::inherit());
        command.stderr(Stdio::inherit());

        let mut child = command.spawn().map_err(|e| {
            McDeployError::tool(format!("Failed to start {}: {}", script.display(), e))
        })?;

        let status = child.wait().await.map_err(|e| {
            McDeployError::tool(format!("Failed to wait for {}: {}", script.display(), e))
        })?;

        if !status.success() {
            return Err(McDeployError::tool(format!(
                "{} exited with {}",
                script.display(),
                status
            )));
        }

        Ok(())
    }
}

/// The MCP runtime scripts predate python3, so a bare `python` is tried
/// first and the versioned names after it.
fn find_python() -> Result<PathBuf> {
    for candidate in ["python", "python2", "python3"] {
        if let Ok(path) = which(candidate) {
            return Ok(path);
        }
    }

    Err(McDeployError::tool(McDeployError::PYTHON_NOT_FOUND))
}
