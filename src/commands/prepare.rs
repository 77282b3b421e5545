use crate::pipeline::Operation;
use crate::result::Result;
use crate::workspace::Workspace;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Instant;

pub async fn execute(workspace: &Workspace, config_path: &Path, cache_root: &Path) -> Result<()> {
    println!("Preparing build toolchain...");

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.set_message("Resolving and fetching components...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let start = Instant::now();
    let result = super::run_pipeline(workspace, config_path, cache_root, Operation::Prepare).await;
    spinner.finish_and_clear();
    result?;

    println!(
        "Prepare successful ({})",
        super::format_duration(start.elapsed())
    );
    Ok(())
}
