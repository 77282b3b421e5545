pub mod parser;

use crate::commands::CommandExecutor;
use crate::result::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mcdeploy")]
#[command(about = "CI toolchain assembler for Minecraft mod builds")]
#[command(version = "0.1.0")]
#[command(arg_required_else_help = true)]
#[command(
    help_template = "{before-help}{name} v{version}\n\n{about-with-newline}\n{usage-heading} {usage}\n\n{all-args}{after-help}"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(
        short,
        long,
        global = true,
        help = "Toolchain config file (default: <workspace>/mctoolchain.json)"
    )]
    config: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        help = "Workspace root (default: $WORKSPACE, then the current directory)"
    )]
    workspace: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Artifact cache root (default: the platform cache directory)"
    )]
    cache_dir: Option<PathBuf>,
}

#[derive(Parser)]
pub enum Commands {
    #[command(about = "Resolve, fetch and install the build toolchain")]
    Prepare,

    #[command(about = "Prepare the toolchain, then recompile and reobfuscate the mod sources")]
    Compile,

    #[command(about = "Compile, then package the reobfuscated output into role jars")]
    Package,

    #[command(about = "Remove the toolchain tree, lib and target directories")]
    Clean {
        #[arg(long, help = "Skip the confirmation prompt")]
        force: bool,
    },
}

impl Default for Cli {
    fn default() -> Self {
        Self::parse()
    }
}

impl Cli {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn execute(self) -> Result<()> {
        let executor = CommandExecutor::new(
            self.workspace.as_deref(),
            self.config.as_deref(),
            self.cache_dir.as_deref(),
        )?;

        match self.command {
            Commands::Prepare => executor.prepare().await,
            Commands::Compile => executor.compile().await,
            Commands::Package => executor.package().await,
            Commands::Clean { force } => executor.clean(force).await,
        }
    }
}
