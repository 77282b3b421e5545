use std::path::{Path, PathBuf};

use tokio::fs;

use crate::build::{matching_mod_record, BuildMetadata, ToolchainConfig, BUILD_INFO_FILE};
use crate::cache::{ArtifactCache, ComponentSpec};
use crate::result::Result;
use crate::toolchain::catalog::CatalogProvider;
use crate::toolchain::fetcher::Fetcher;
use crate::toolchain::resolver::VersionResolver;
use crate::tree::{archive, merge};
use crate::utils::process::ToolRunner;
use crate::workspace::Workspace;

const DEFAULT_REATTEMPTS: u32 = 1;

/// Requested pipeline operation. Each one runs every stage the previous
/// one runs plus its own, `Clean` stands alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Prepare,
    Compile,
    Package,
    Clean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    ResolvingVersions,
    Fetching,
    Validating,
    Merging,
    ExternalBuild,
    Packaging,
    Cleaning,
    Done,
    Failed(i32),
}

// Specs resolved for one toolchain assembly; present only with usemcp.
struct ToolchainSpecs {
    mcp: ComponentSpec,
    client: ComponentSpec,
    server: ComponentSpec,
    lwjgl: ComponentSpec,
    forge: Option<ComponentSpec>,
}

// Cache paths of the obtained toolchain archives, same shape as the specs.
struct ToolchainPaths {
    mcp: PathBuf,
    client: PathBuf,
    server: PathBuf,
    lwjgl: PathBuf,
    forge: Option<PathBuf>,
}

/**
The build pipeline, a state machine over the stages of one operation

# Stages
```text
Idle -> ResolvingVersions -> Fetching -> Validating -> Merging
     -> ExternalBuild -> Packaging -> Done | Failed(exit code)
```
`Cleaning` is entered from `Idle` only. Stages a requested operation does
not need are skipped; `Merging` and `ExternalBuild` are revisited when an
operation both installs the toolchain and compiles sources.

# Collaborators
Everything with observable side effects is injected as a trait object:
the `Fetcher` for downloads, the `CatalogProvider` for version catalogs
and the `ToolRunner` for the MCP and Forge scripts. The pipeline itself
only decides what happens in which order.

# Example
```no_run
use mcdeploy::build::ToolchainConfig;
use mcdeploy::cache::ArtifactCache;
use mcdeploy::pipeline::{Operation, Pipeline};
use mcdeploy::toolchain::{HttpFetcher, RemoteCatalog};
use mcdeploy::utils::ProcessRunner;
use mcdeploy::workspace::Workspace;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = Workspace::detect(None);
    let config = ToolchainConfig::from_file(&workspace.default_config_path()).await?;
    let cache = ArtifactCache::new(ArtifactCache::default_root()?);
    let fetcher = HttpFetcher::new();
    let catalog = RemoteCatalog::new();
    let runner = ProcessRunner::new();

    let mut pipeline = Pipeline::new(&config, &workspace, &cache, &fetcher, &catalog, &runner);
    pipeline.run(Operation::Prepare).await?;

    Ok(())
}
```
*/
pub struct Pipeline<'a> {
    config: &'a ToolchainConfig,
    workspace: &'a Workspace,
    cache: &'a ArtifactCache,
    fetcher: &'a dyn Fetcher,
    catalog: &'a dyn CatalogProvider,
    runner: &'a dyn ToolRunner,
    reattempts: u32,
    state: PipelineState,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a ToolchainConfig,
        workspace: &'a Workspace,
        cache: &'a ArtifactCache,
        fetcher: &'a dyn Fetcher,
        catalog: &'a dyn CatalogProvider,
        runner: &'a dyn ToolRunner,
    ) -> Self {
        Self {
            config,
            workspace,
            cache,
            fetcher,
            catalog,
            runner,
            reattempts: DEFAULT_REATTEMPTS,
            state: PipelineState::Idle,
        }
    }

    /// Overrides the validation reattempt budget passed to the cache.
    pub fn with_reattempts(mut self, reattempts: u32) -> Self {
        self.reattempts = reattempts;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /** Runs one operation to completion
     *
     * # Errors
     * Stage failures surface unchanged; the pipeline additionally moves
     * into `Failed` carrying the exit code of the error. On success the
     * state is `Done`.
     */
    pub async fn run(&mut self, operation: Operation) -> Result<()> {
        log::info!("Starting {:?} in {}", operation, self.workspace.root().display());

        match self.execute(operation).await {
            Ok(()) => {
                self.set_state(PipelineState::Done);
                Ok(())
            }
            Err(e) => {
                self.set_state(PipelineState::Failed(e.exit_code()));
                Err(e)
            }
        }
    } // run

    async fn execute(&mut self, operation: Operation) -> Result<()> {
        if operation == Operation::Clean {
            return self.clean().await;
        }

        self.prepare().await?;
        if operation == Operation::Prepare {
            return Ok(());
        }

        if !self.config.usemcp {
            println!("Nothing to compile.");
            return Ok(());
        }

        self.compile().await?;
        if operation == Operation::Compile {
            return Ok(());
        }

        self.package().await
    }

    /**
    Resolves, fetches and installs every component the config asks for.

    With `usemcp` the MCP archive is extracted into the working tree, the
    client jar lands at `jars/bin/minecraft.jar`, the LWJGL bundle is
    unpacked next to it and the server jar at `jars/minecraft_server.jar`.
    Forge is extracted into the tree and its installer runs in
    `<tree>/forge`. An MCPC jar is placed in `<workspace>/lib` and, when
    the tree exists, mirrored into `<tree>/lib`.
    */
    async fn prepare(&mut self) -> Result<()> {
        self.set_state(PipelineState::ResolvingVersions);
        let resolver = VersionResolver::new(self.catalog);

        let mut toolchain_specs = None;
        let mut mcpc_spec = None;

        if self.config.usemcp {
            let mcp_version = self.config.mcp_version()?;
            let platform = resolver.resolve_platform(mcp_version).await?;
            log::info!(
                "Resolved {} to client {} / server {}",
                mcp_version,
                platform.client,
                platform.server
            );

            let forge = if self.config.useforge {
                let release = resolver.resolve_forge(self.config.forge_version()?).await?;
                log::info!("Resolved Forge build to {}", release.version);
                Some(ComponentSpec::forge_src(&release.version, &release.src_url))
            } else {
                None
            };

            toolchain_specs = Some(ToolchainSpecs {
                mcp: ComponentSpec::mcp_toolchain(mcp_version),
                client: ComponentSpec::client(&platform.client),
                server: ComponentSpec::server(&platform.server),
                lwjgl: ComponentSpec::lwjgl(),
                forge,
            });
        }

        if self.config.usemcpc {
            let build = self.config.mcpc_build()?;
            let asset = resolver.resolve_mcpc(build).await?;
            log::info!("Resolved MCPC build {} to asset {}", build, asset.name);
            mcpc_spec = Some(ComponentSpec::mcpc(build, &asset.name, &asset.url));
        }

        self.set_state(PipelineState::Fetching);

        let toolchain = match &toolchain_specs {
            Some(specs) => Some(ToolchainPaths {
                mcp: self.obtain(&specs.mcp).await?,
                client: self.obtain(&specs.client).await?,
                server: self.obtain(&specs.server).await?,
                lwjgl: self.obtain(&specs.lwjgl).await?,
                forge: match &specs.forge {
                    Some(spec) => Some(self.obtain(spec).await?),
                    None => None,
                },
            }),
            None => None,
        };

        let mcpc = match &mcpc_spec {
            Some(spec) => Some(self.obtain(spec).await?),
            None => None,
        };

        // Every obtained file has passed the archive scan at this point.
        self.set_state(PipelineState::Validating);

        self.set_state(PipelineState::Merging);

        if let Some(paths) = &toolchain {
            self.install_toolchain(paths).await?;
        }

        if let Some(mcpc_path) = &mcpc {
            self.install_mcpc(mcpc_path).await?;
        }

        Ok(())
    } // prepare

    async fn obtain(&self, spec: &ComponentSpec) -> Result<PathBuf> {
        self.cache.obtain(self.fetcher, spec, self.reattempts).await
    }

    async fn install_toolchain(&mut self, paths: &ToolchainPaths) -> Result<()> {
        let tree = self.workspace.tree();
        self.workspace.ensure_tree().await?;

        log::info!("Installing MCP into {}", tree.display());
        merge::extract_archive(&paths.mcp, &tree, false).await?;

        let jars_bin = self.workspace.tree_jars_bin();
        fs::create_dir_all(&jars_bin).await?;

        fs::copy(&paths.client, jars_bin.join("minecraft.jar")).await?;
        merge::extract_archive(&paths.lwjgl, &jars_bin, false).await?;
        fs::copy(
            &paths.server,
            self.workspace.tree_jars().join("minecraft_server.jar"),
        )
        .await?;

        if let Some(forge_path) = &paths.forge {
            log::info!("Installing Forge into {}", tree.display());
            merge::extract_archive(forge_path, &tree, false).await?;

            self.set_state(PipelineState::ExternalBuild);
            self.runner
                .run_script(Path::new("install.py"), &self.workspace.tree_forge())
                .await?;
        }

        Ok(())
    } // install_toolchain

    async fn install_mcpc(&mut self, mcpc_path: &Path) -> Result<()> {
        let lib_dir = self.workspace.lib_dir();
        fs::create_dir_all(&lib_dir).await?;
        fs::copy(mcpc_path, lib_dir.join("mcpc-craftbukkit.jar")).await?;

        if self.config.usemcp {
            let tree_lib = self.workspace.tree_lib();
            fs::create_dir_all(&tree_lib).await?;
            fs::copy(mcpc_path, tree_lib.join("mcpc-craftbukkit.jar")).await?;
        }

        Ok(())
    }

    /// Merges the mod sources into the tree and runs the MCP scripts.
    async fn compile(&mut self) -> Result<()> {
        self.set_state(PipelineState::Merging);

        let tree_src = self.workspace.tree_src();

        let client_sources = self.workspace.client_sources();
        if client_sources.exists() {
            let stats = merge::merge_directory(&client_sources, &tree_src, true).await?;
            log::info!("Merged {} client source files", stats.files);
        }

        let server_sources = self.workspace.server_sources();
        if server_sources.exists() {
            let stats = merge::merge_directory(&server_sources, &tree_src, true).await?;
            log::info!("Merged {} server source files", stats.files);
        }

        self.set_state(PipelineState::ExternalBuild);

        let tree = self.workspace.tree();
        self.runner
            .run_script(&Path::new("runtime").join("recompile.py"), &tree)
            .await?;
        self.runner
            .run_script(&Path::new("runtime").join("reobfuscate.py"), &tree)
            .await?;

        Ok(())
    } // compile

    /// Writes the build-info note and packages the reobfuscated output.
    async fn package(&mut self) -> Result<()> {
        self.set_state(PipelineState::Packaging);

        let target_dir = self.workspace.target_dir();
        fs::create_dir_all(&target_dir).await?;

        let resources = self.workspace.resources();
        fs::create_dir_all(&resources).await?;

        let metadata = BuildMetadata::from_env();
        fs::write(resources.join(BUILD_INFO_FILE), metadata.note()).await?;

        let record = matching_mod_record(&self.workspace.mcmod_info(), &self.config.modid).await?;

        let reobf_client = self.workspace.reobf_client();
        if reobf_client.exists() {
            let jar = target_dir.join(metadata.archive_file_name("Client", record.as_ref()));
            archive::build_archive(&[reobf_client, resources.clone()], &jar).await?;
        }

        let reobf_server = self.workspace.reobf_server();
        if reobf_server.exists() {
            let jar = target_dir.join(metadata.archive_file_name("Server", record.as_ref()));
            archive::build_archive(&[reobf_server, resources], &jar).await?;
        }

        Ok(())
    } // package

    /// Removes the working tree, the lib directory and the target
    /// directory. Confirmation happens at the command layer.
    async fn clean(&mut self) -> Result<()> {
        self.set_state(PipelineState::Cleaning);

        for target in self.workspace.clean_targets() {
            if !target.exists() {
                continue;
            }

            println!("Removing '{}'...", target.display());
            if target.is_dir() {
                fs::remove_dir_all(&target).await?;
            } else {
                fs::remove_file(&target).await?;
            }
        }

        println!("Workspace cleaned.");
        Ok(())
    }

    fn set_state(&mut self, next: PipelineState) {
        log::info!("Pipeline: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/*
 * Stage Contract:
 *
 * prepare : ResolvingVersions, Fetching, Validating, Merging and, with
 *           Forge enabled, ExternalBuild for the installer.
 * compile : prepare, then Merging for the mod sources and ExternalBuild
 *           for recompile and reobfuscate.
 * package : compile, then Packaging.
 * clean   : Cleaning only.
 *
 * A config with usemcp unset short-circuits compile and package after
 * prepare; there is no tree to compile in.
 */

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ArtifactKind;
    use crate::result::McDeployError;
    use crate::toolchain::catalog::{ForgeBuild, McpcAsset, PlatformVersions};
    use async_trait::async_trait;
    use smol_str::SmolStr;
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for (name, bytes) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(bytes).unwrap();
        }
        zip.finish().unwrap();
    }

    #[derive(Default)]
    struct FakeFetcher {
        calls: AtomicU32,
    }

    impl FakeFetcher {
        fn count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetcher for FakeFetcher {
        async fn fetch(&self, spec: &ComponentSpec, dest: &Path) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match spec.kind {
                ArtifactKind::McpToolchain => write_zip(
                    dest,
                    &[
                        ("runtime/recompile.py", b"print 'recompile'".as_slice()),
                        ("runtime/reobfuscate.py", b"print 'reobfuscate'".as_slice()),
                        ("conf/version.cfg", b"ClientVersion = 1.2.5".as_slice()),
                    ],
                ),
                ArtifactKind::Lwjgl => write_zip(dest, &[("lwjgl.jar", b"lwjgl".as_slice())]),
                ArtifactKind::ForgeSrc => write_zip(
                    dest,
                    &[("forge/install.py", b"print 'install'".as_slice())],
                ),
                _ => write_zip(dest, &[("stub.class", b"class".as_slice())]),
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeCatalog {
        mcp: HashMap<SmolStr, PlatformVersions>,
        forge: HashMap<SmolStr, ForgeBuild>,
        mcpc: Vec<McpcAsset>,
        mcp_calls: AtomicU32,
        forge_calls: AtomicU32,
        mcpc_calls: AtomicU32,
    }

    #[async_trait]
    impl CatalogProvider for FakeCatalog {
        async fn mcp_catalog(&self) -> Result<HashMap<SmolStr, PlatformVersions>> {
            self.mcp_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.mcp.clone())
        }

        async fn forge_catalog(&self) -> Result<HashMap<SmolStr, ForgeBuild>> {
            self.forge_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.forge.clone())
        }

        async fn mcpc_assets(&self) -> Result<Vec<McpcAsset>> {
            self.mcpc_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.mcpc.clone())
        }
    }

    // Records script invocations; creates reobf output when the
    // reobfuscate script runs so packaging has something to archive.
    struct FakeRunner {
        scripts: Mutex<Vec<String>>,
        reobf_root: Option<PathBuf>,
    }

    impl FakeRunner {
        fn new() -> Self {
            Self {
                scripts: Mutex::new(Vec::new()),
                reobf_root: None,
            }
        }

        fn with_reobf_output(root: PathBuf) -> Self {
            Self {
                scripts: Mutex::new(Vec::new()),
                reobf_root: Some(root),
            }
        }

        fn ran(&self) -> Vec<String> {
            self.scripts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ToolRunner for FakeRunner {
        async fn run_script(&self, script: &Path, _work_dir: &Path) -> Result<()> {
            let name = script.to_string_lossy().replace('\\', "/");
            self.scripts.lock().unwrap().push(name.clone());

            if name.ends_with("reobfuscate.py") {
                if let Some(root) = &self.reobf_root {
                    std::fs::create_dir_all(root).unwrap();
                    std::fs::write(root.join("Stub.class"), b"class").unwrap();
                }
            }

            Ok(())
        }
    }

    fn mcp_config() -> ToolchainConfig {
        ToolchainConfig {
            modid: "mod_example".into(),
            usemcp: true,
            mcpversion: Some("mcp62".into()),
            ..Default::default()
        }
    }

    struct Rig {
        _workspace_dir: TempDir,
        _cache_dir: TempDir,
        workspace: Workspace,
        cache: ArtifactCache,
        fetcher: FakeFetcher,
        catalog: FakeCatalog,
    }

    impl Rig {
        fn new() -> Self {
            let workspace_dir = TempDir::new().unwrap();
            let cache_dir = TempDir::new().unwrap();
            let workspace = Workspace::new(workspace_dir.path());
            let cache = ArtifactCache::new(cache_dir.path());
            Self {
                _workspace_dir: workspace_dir,
                _cache_dir: cache_dir,
                workspace,
                cache,
                fetcher: FakeFetcher::default(),
                catalog: FakeCatalog::default(),
            }
        }
    }

    #[tokio::test]
    async fn prepare_assembles_the_tree_from_statically_resolved_versions() {
        let rig = Rig::new();
        let config = mcp_config();
        let runner = FakeRunner::new();

        let mut pipeline = Pipeline::new(
            &config,
            &rig.workspace,
            &rig.cache,
            &rig.fetcher,
            &rig.catalog,
            &runner,
        );
        pipeline.run(Operation::Prepare).await.unwrap();

        assert_eq!(pipeline.state(), PipelineState::Done);
        // mcp62 resolves through the static table
        assert_eq!(rig.catalog.mcp_calls.load(Ordering::SeqCst), 0);
        // mcp zip, client jar, server jar, lwjgl bundle
        assert_eq!(rig.fetcher.count(), 4);

        let tree = rig.workspace.tree();
        assert!(tree.join("runtime").join("recompile.py").exists());
        assert!(rig.workspace.tree_jars_bin().join("minecraft.jar").exists());
        assert!(rig.workspace.tree_jars_bin().join("lwjgl.jar").exists());
        assert!(rig
            .workspace
            .tree_jars()
            .join("minecraft_server.jar")
            .exists());

        // prepare stops before any script or archive
        assert!(runner.ran().is_empty());
        assert!(!rig.workspace.target_dir().exists());
    }

    #[tokio::test]
    async fn prepare_reuses_the_cache_on_a_second_run() {
        let rig = Rig::new();
        let config = mcp_config();
        let runner = FakeRunner::new();

        let mut first = Pipeline::new(
            &config,
            &rig.workspace,
            &rig.cache,
            &rig.fetcher,
            &rig.catalog,
            &runner,
        );
        first.run(Operation::Prepare).await.unwrap();

        let mut second = Pipeline::new(
            &config,
            &rig.workspace,
            &rig.cache,
            &rig.fetcher,
            &rig.catalog,
            &runner,
        );
        second.run(Operation::Prepare).await.unwrap();

        assert_eq!(rig.fetcher.count(), 4);
    }

    #[tokio::test]
    async fn unresolvable_mcp_version_fails_with_the_resolution_code() {
        let rig = Rig::new();
        let config = ToolchainConfig {
            mcpversion: Some("mcp99".into()),
            ..mcp_config()
        };
        let runner = FakeRunner::new();

        let mut pipeline = Pipeline::new(
            &config,
            &rig.workspace,
            &rig.cache,
            &rig.fetcher,
            &rig.catalog,
            &runner,
        );
        let err = pipeline.run(Operation::Prepare).await.unwrap_err();

        assert!(matches!(err, McDeployError::Resolution(_)));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(pipeline.state(), PipelineState::Failed(2));
        // the catalog was consulted once, nothing was downloaded
        assert_eq!(rig.catalog.mcp_calls.load(Ordering::SeqCst), 1);
        assert_eq!(rig.fetcher.count(), 0);
    }

    #[tokio::test]
    async fn compile_without_usemcp_runs_no_scripts() {
        let rig = Rig::new();
        let config = ToolchainConfig {
            modid: "mod_example".into(),
            ..Default::default()
        };
        let runner = FakeRunner::new();

        let mut pipeline = Pipeline::new(
            &config,
            &rig.workspace,
            &rig.cache,
            &rig.fetcher,
            &rig.catalog,
            &runner,
        );
        pipeline.run(Operation::Compile).await.unwrap();

        assert_eq!(pipeline.state(), PipelineState::Done);
        assert!(runner.ran().is_empty());
        assert_eq!(rig.fetcher.count(), 0);
    }

    #[tokio::test]
    async fn compile_merges_sources_and_runs_the_mcp_scripts() {
        let rig = Rig::new();
        let config = mcp_config();
        let runner = FakeRunner::new();

        let sources = rig.workspace.client_sources();
        std::fs::create_dir_all(&sources).unwrap();
        std::fs::write(sources.join("ModBlock.java"), "class ModBlock {}").unwrap();

        let mut pipeline = Pipeline::new(
            &config,
            &rig.workspace,
            &rig.cache,
            &rig.fetcher,
            &rig.catalog,
            &runner,
        );
        pipeline.run(Operation::Compile).await.unwrap();

        assert_eq!(
            runner.ran(),
            vec!["runtime/recompile.py", "runtime/reobfuscate.py"]
        );
        assert!(rig
            .workspace
            .tree_src()
            .join("minecraft")
            .join("ModBlock.java")
            .exists());
        // compile stops before packaging
        assert!(!rig.workspace.target_dir().exists());
    }

    #[tokio::test]
    async fn package_archives_the_reobfuscated_output_with_the_note() {
        let rig = Rig::new();
        let config = mcp_config();
        let runner = FakeRunner::with_reobf_output(rig.workspace.reobf_client());

        let mut pipeline = Pipeline::new(
            &config,
            &rig.workspace,
            &rig.cache,
            &rig.fetcher,
            &rig.catalog,
            &runner,
        );
        pipeline.run(Operation::Package).await.unwrap();

        assert_eq!(pipeline.state(), PipelineState::Done);

        let jars: Vec<PathBuf> = std::fs::read_dir(rig.workspace.target_dir())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(jars.len(), 1);

        let name = jars[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.contains("Client"));
        assert!(name.ends_with(".jar"));

        let file = std::fs::File::open(&jars[0]).unwrap();
        let mut jar = zip::ZipArchive::new(file).unwrap();
        assert!(jar.by_name("Stub.class").is_ok());
        assert!(jar.by_name(BUILD_INFO_FILE).is_ok());
    }

    #[tokio::test]
    async fn forge_is_installed_from_its_catalog_build() {
        let mut rig = Rig::new();
        rig.catalog.forge.insert(
            "152".into(),
            ForgeBuild {
                version: "1.2.5.152".into(),
                urls: HashMap::from([(
                    SmolStr::new("src"),
                    "http://files.example.invalid/minecraftforge-src-1.2.5.152.zip".to_string(),
                )]),
            },
        );

        let config = ToolchainConfig {
            useforge: true,
            forgeversion: Some("152".into()),
            ..mcp_config()
        };
        let runner = FakeRunner::new();

        let mut pipeline = Pipeline::new(
            &config,
            &rig.workspace,
            &rig.cache,
            &rig.fetcher,
            &rig.catalog,
            &runner,
        );
        pipeline.run(Operation::Prepare).await.unwrap();

        assert_eq!(rig.catalog.forge_calls.load(Ordering::SeqCst), 1);
        // 4 toolchain artifacts plus the forge source archive
        assert_eq!(rig.fetcher.count(), 5);
        assert!(rig.workspace.tree_forge().join("install.py").exists());
        assert_eq!(runner.ran(), vec!["install.py"]);
    }

    #[tokio::test]
    async fn mcpc_installs_into_lib_without_a_tree() {
        let mut rig = Rig::new();
        rig.catalog.mcpc.push(McpcAsset {
            name: "craftbukkit-251.jar".to_string(),
            url: "http://github.example.invalid/craftbukkit-251.jar".to_string(),
        });

        let config = ToolchainConfig {
            modid: "mod_example".into(),
            usemcpc: true,
            mcpc_build: Some("251".into()),
            ..Default::default()
        };
        let runner = FakeRunner::new();

        let mut pipeline = Pipeline::new(
            &config,
            &rig.workspace,
            &rig.cache,
            &rig.fetcher,
            &rig.catalog,
            &runner,
        );
        pipeline.run(Operation::Prepare).await.unwrap();

        assert!(rig
            .workspace
            .lib_dir()
            .join("mcpc-craftbukkit.jar")
            .exists());
        assert!(!rig.workspace.tree().exists());
        assert_eq!(rig.fetcher.count(), 1);
    }

    #[tokio::test]
    async fn clean_removes_tree_lib_and_target() {
        let rig = Rig::new();
        let config = mcp_config();
        let runner = FakeRunner::new();

        std::fs::create_dir_all(rig.workspace.tree()).unwrap();
        std::fs::create_dir_all(rig.workspace.lib_dir()).unwrap();
        std::fs::create_dir_all(rig.workspace.target_dir()).unwrap();
        std::fs::write(rig.workspace.tree().join("marker"), b"x").unwrap();

        let mut pipeline = Pipeline::new(
            &config,
            &rig.workspace,
            &rig.cache,
            &rig.fetcher,
            &rig.catalog,
            &runner,
        );
        pipeline.run(Operation::Clean).await.unwrap();

        assert_eq!(pipeline.state(), PipelineState::Done);
        assert!(!rig.workspace.tree().exists());
        assert!(!rig.workspace.lib_dir().exists());
        assert!(!rig.workspace.target_dir().exists());
    }

    #[tokio::test]
    async fn a_failing_script_surfaces_as_a_tool_error() {
        struct FailingRunner;

        #[async_trait]
        impl ToolRunner for FailingRunner {
            async fn run_script(&self, script: &Path, _work_dir: &Path) -> Result<()> {
                Err(McDeployError::tool(format!(
                    "{} exited with exit status: 1",
                    script.display()
                )))
            }
        }

        let rig = Rig::new();
        let config = mcp_config();
        let runner = FailingRunner;

        let mut pipeline = Pipeline::new(
            &config,
            &rig.workspace,
            &rig.cache,
            &rig.fetcher,
            &rig.catalog,
            &runner,
        );
        let err = pipeline.run(Operation::Compile).await.unwrap_err();

        assert_eq!(err.exit_code(), 8);
        assert_eq!(pipeline.state(), PipelineState::Failed(8));
    }
}
