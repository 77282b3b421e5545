use crate::build::ToolchainConfig;
use crate::pipeline::Operation;
use crate::result::{McDeployError, Result};
use crate::workspace::Workspace;
use std::path::Path;

pub async fn execute(
    workspace: &Workspace,
    config_path: &Path,
    cache_root: &Path,
    force: bool,
) -> Result<()> {
    // The config is loaded before the prompt so a broken config fails
    // with the config exit code rather than after the user confirmed.
    let config = ToolchainConfig::from_file(config_path).await?;

    println!("Cleaning workspace...");

    if !force && !confirmed()? {
        println!("Aborting...");
        return Err(McDeployError::abort("clean was declined at the prompt"));
    }

    super::run_pipeline_with(&config, workspace, cache_root, Operation::Clean).await
}

fn confirmed() -> Result<bool> {
    println!("This is a potentially destructive action, do you want to continue? (y/N)");

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();

    Ok(answer == "y" || answer == "yes")
}
