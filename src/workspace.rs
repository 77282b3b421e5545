use crate::result::Result;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Fixed layout of a CI workspace and the working tree assembled inside it.
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    // CLI override first, then the CI-provided WORKSPACE, then cwd
    pub fn detect(override_root: Option<&Path>) -> Self {
        let root = match override_root {
            Some(path) => path.to_path_buf(),
            None => match std::env::var_os("WORKSPACE") {
                Some(workspace) => PathBuf::from(workspace),
                None => PathBuf::from("."),
            },
        };
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Root of the working tree the toolchain is assembled into.
    pub fn tree(&self) -> PathBuf {
        self.root.join("mcp")
    }

    pub fn tree_jars(&self) -> PathBuf {
        self.tree().join("jars")
    }

    pub fn tree_jars_bin(&self) -> PathBuf {
        self.tree().join("jars").join("bin")
    }

    pub fn tree_lib(&self) -> PathBuf {
        self.tree().join("lib")
    }

    pub fn tree_forge(&self) -> PathBuf {
        self.tree().join("forge")
    }

    pub fn tree_src(&self) -> PathBuf {
        self.tree().join("src")
    }

    pub fn reobf_client(&self) -> PathBuf {
        self.tree().join("reobf").join("minecraft")
    }

    pub fn reobf_server(&self) -> PathBuf {
        self.tree().join("reobf").join("minecraft_server")
    }

    pub fn client_sources(&self) -> PathBuf {
        self.root.join("src").join("main").join("java").join("minecraft")
    }

    pub fn server_sources(&self) -> PathBuf {
        self.root
            .join("src")
            .join("main")
            .join("java")
            .join("minecraft_server")
    }

    pub fn resources(&self) -> PathBuf {
        self.root.join("src").join("main").join("resources")
    }

    pub fn mcmod_info(&self) -> PathBuf {
        self.resources().join("mcmod.info")
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.root.join("lib")
    }

    pub fn target_dir(&self) -> PathBuf {
        self.root.join("target")
    }

    pub fn default_config_path(&self) -> PathBuf {
        self.root.join("mctoolchain.json")
    }

    pub async fn ensure_tree(&self) -> Result<()> {
        let tree = self.tree();
        if !tree.exists() {
            fs::create_dir_all(&tree).await?;
            log::info!("Created working tree: {}", tree.display());
        }
        Ok(())
    }

    /// Paths removed by a clean, in removal order.
    pub fn clean_targets(&self) -> [PathBuf; 3] {
        [self.tree(), self.lib_dir(), self.target_dir()]
    }
}
