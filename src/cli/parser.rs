use crate::result::{McDeployError, Result};
use std::path::{Path, PathBuf};

pub struct CliParser;

impl CliParser {
    pub fn validate_config_path(path: &Path) -> Result<PathBuf> {
        if !path.exists() {
            return Err(McDeployError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        if !path.is_file() {
            return Err(McDeployError::config(format!(
                "Config path is not a file: {}",
                path.display()
            )));
        }

        Ok(path.to_path_buf())
    }

    pub fn validate_workspace_root(path: &Path) -> Result<()> {
        if !path.is_dir() {
            return Err(McDeployError::config(format!(
                "Workspace root is not a directory: {}",
                path.display()
            )));
        }

        Ok(())
    }
}
