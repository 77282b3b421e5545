use crate::pipeline::Operation;
use crate::result::Result;
use crate::workspace::Workspace;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Instant;
use tokio::fs;

pub async fn execute(workspace: &Workspace, config_path: &Path, cache_root: &Path) -> Result<()> {
    println!("Packaging build output...");

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.set_message("Assembling output archives...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let start = Instant::now();
    let result = super::run_pipeline(workspace, config_path, cache_root, Operation::Package).await;
    spinner.finish_and_clear();
    result?;

    for jar in produced_jars(workspace).await? {
        println!("Packaged '{}'", jar.display());
    }

    println!(
        "Package successful ({})",
        super::format_duration(start.elapsed())
    );
    Ok(())
}

async fn produced_jars(workspace: &Workspace) -> Result<Vec<std::path::PathBuf>> {
    let target_dir = workspace.target_dir();
    let mut jars = Vec::new();

    if !target_dir.exists() {
        return Ok(jars);
    }

    let mut entries = fs::read_dir(&target_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().map(|ext| ext == "jar").unwrap_or(false) {
            jars.push(path);
        }
    }

    jars.sort();
    Ok(jars)
}
