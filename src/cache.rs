use crate::result::{McDeployError, Result};
use crate::toolchain::fetcher::Fetcher;
use crate::toolchain::validate;
use sha2::{Digest, Sha256};
use smol_str::SmolStr;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;

const MCP_FILES_URL: &str = "http://mcp.ocean-labs.de/files/";
const MINECRAFT_ASSETS_URL: &str = "http://assets.minecraft.net/";
const LWJGL_URL: &str = "http://mirror.openshell.no/lwjgl_minecraft_1.2.5.zip";

/** Kinds of remote artifact the pipeline assembles
 *
 * # Notes
 * - The kind selects the cache subdirectory and the exit code reported
 *   when fetching or validating that artifact fails
 * - `Lwjgl` is a fixed bundle shared by every toolchain version and
 *   lives at the cache root
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    McpToolchain,
    Client,
    Server,
    Lwjgl,
    ForgeSrc,
    Mcpc,
}

impl ArtifactKind {
    // Cache subdirectory per kind; None keeps the file at the cache root
    fn cache_subdir(self) -> Option<&'static str> {
        match self {
            Self::McpToolchain => Some("mcp"),
            Self::Client | Self::Server => Some("minecraft"),
            Self::ForgeSrc => Some("forge"),
            Self::Mcpc => Some("mcpc-craftbukkit"),
            Self::Lwjgl => None,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::McpToolchain => "mcp toolchain",
            Self::Client => "minecraft client",
            Self::Server => "minecraft server",
            Self::Lwjgl => "lwjgl bundle",
            Self::ForgeSrc => "forge source",
            Self::Mcpc => "mcpc craftbukkit",
        };
        write!(f, "{}", name)
    }
}

/** Immutable description of one fetchable artifact
 *
 * # Fields
 * - `kind` - which component this is
 * - `version` - the resolved version or build label
 * - `url` - canonical download location
 * - `file_name` - name of the cached file
 *
 * # Notes
 * - Constructors encode the URL scheme of each upstream service, so a
 *   spec built for a version always maps to the same cache entry
 */
#[derive(Debug, Clone)]
pub struct ComponentSpec {
    pub kind: ArtifactKind,
    pub version: SmolStr,
    pub url: String,
    pub file_name: String,
}

impl ComponentSpec {
    /** Creates a spec for the MCP toolchain archive
     *
     * # Example
     * ```
     * use mcdeploy::cache::ComponentSpec;
     *
     * let spec = ComponentSpec::mcp_toolchain("mcp62");
     * assert_eq!(spec.url, "http://mcp.ocean-labs.de/files/mcp62.zip");
     * assert_eq!(spec.file_name, "mcp62.zip");
     * ```
     */
    pub fn mcp_toolchain(version: &str) -> Self {
        Self {
            kind: ArtifactKind::McpToolchain,
            version: SmolStr::new(version),
            url: format!("{}{}.zip", MCP_FILES_URL, version),
            file_name: format!("{}.zip", version),
        }
    }

    /** Creates a spec for a Minecraft client jar
     *
     * # Notes
     * - The assets service keys releases by version with dots replaced
     *   by underscores; the cache name keeps the dotted version
     */
    pub fn client(version: &str) -> Self {
        Self {
            kind: ArtifactKind::Client,
            version: SmolStr::new(version),
            url: format!(
                "{}{}/minecraft.jar",
                MINECRAFT_ASSETS_URL,
                version.replace('.', "_")
            ),
            file_name: format!("minecraft_{}.jar", version),
        }
    }

    /// Creates a spec for a Minecraft server jar.
    pub fn server(version: &str) -> Self {
        Self {
            kind: ArtifactKind::Server,
            version: SmolStr::new(version),
            url: format!(
                "{}{}/minecraft_server.jar",
                MINECRAFT_ASSETS_URL,
                version.replace('.', "_")
            ),
            file_name: format!("minecraft_server_{}.jar", version),
        }
    }

    /// Creates a spec for the fixed LWJGL bundle.
    pub fn lwjgl() -> Self {
        Self {
            kind: ArtifactKind::Lwjgl,
            version: SmolStr::new("1.2.5"),
            url: LWJGL_URL.to_string(),
            file_name: String::from("lwjgl_minecraft_1.2.5.zip"),
        }
    }

    /// Creates a spec for a Forge source archive resolved from the file index.
    pub fn forge_src(version: &str, url: &str) -> Self {
        Self {
            kind: ArtifactKind::ForgeSrc,
            version: SmolStr::new(version),
            url: url.to_string(),
            file_name: format!("minecraftforge-src-{}.zip", version),
        }
    }

    /// Creates a spec for an MCPC-CraftBukkit release asset.
    pub fn mcpc(build: &str, asset_name: &str, url: &str) -> Self {
        Self {
            kind: ArtifactKind::Mcpc,
            version: SmolStr::new(build),
            url: url.to_string(),
            file_name: asset_name.to_string(),
        }
    }
}

/** Persistent cache of validated toolchain artifacts
 *
 * The cache layout is:
 * ```text
 * <root>/mcp/<version>.zip
 * <root>/minecraft/minecraft_<ver>.jar
 * <root>/minecraft/minecraft_server_<ver>.jar
 * <root>/forge/minecraftforge-src-<version>.zip
 * <root>/mcpc-craftbukkit/<asset-name>
 * <root>/lwjgl_minecraft_1.2.5.zip
 * ```
 *
 * # Example
 * ```no_run
 * use mcdeploy::cache::{ArtifactCache, ComponentSpec};
 * use mcdeploy::toolchain::fetcher::HttpFetcher;
 *
 * #[tokio::main(flavor = "current_thread")]
 * async fn main() -> Result<(), Box<dyn std::error::Error>> {
 *     let cache = ArtifactCache::new("./cache");
 *     let fetcher = HttpFetcher::new();
 *
 *     // Downloads on the first call, reuses the file afterwards
 *     let spec = ComponentSpec::mcp_toolchain("mcp62");
 *     let path = cache.obtain(&fetcher, &spec, 1).await?;
 *     println!("toolchain at {}", path.display());
 *
 *     Ok(())
 * }
 * ```
 */
pub struct ArtifactCache {
    root: PathBuf,
}

impl ArtifactCache {
    /// Creates a cache rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /** Resolves the per-user default cache root
     *
     * # Returns
     * - `<platform cache dir>/mcdeploy`
     * - `Config` error when the platform reports no cache directory
     */
    pub fn default_root() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| McDeployError::config(McDeployError::CACHE_DIR_UNKNOWN))?;

        Ok(cache_dir.join("mcdeploy"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a component spec to its fixed location under the cache root.
    pub fn entry_path(&self, spec: &ComponentSpec) -> PathBuf {
        match spec.kind.cache_subdir() {
            Some(subdir) => self.root.join(subdir).join(&spec.file_name),
            None => self.root.join(&spec.file_name),
        }
    }

    /** Returns the local path of a validated artifact, fetching if needed
     *
     * # Arguments
     * * `fetcher` - transport used for any required download
     * * `spec` - the artifact to obtain
     * * `reattempts` - extra fetches allowed when validation fails
     *
     * # Process
     * 1. Derives the cache path from the spec
     * 2. Runs the download-and-validate loop (an existing valid file is
     *    never re-downloaded)
     * 3. Logs the SHA-256 digest of the final file
     *
     * # Errors
     * - `Fetch` when a download fails
     * - `Validation` when the file is still corrupt after the budget
     */
    pub async fn obtain(
        &self,
        fetcher: &dyn Fetcher,
        spec: &ComponentSpec,
        reattempts: u32,
    ) -> Result<PathBuf> {
        let path = self.entry_path(spec);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        validate::obtain_validated(fetcher, spec, &path, reattempts).await?;

        let digest = sha256_digest(&path).await?;
        log::info!(
            "{} {} ready at {} (sha256 {})",
            spec.kind,
            spec.version,
            path.display(),
            digest
        );

        Ok(path)
    } // obtain
}

// Digest of the cached file, logged for build traceability
async fn sha256_digest(path: &Path) -> Result<String> {
    let content = fs::read(path).await?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(format!("{:x}", hasher.finalize()))
}

/*
 * Cache Contract:
 *
 * 1. The (kind, version) pair fully determines the cache path, so two
 *    builds requesting the same component share one download.
 * 2. Existence is the fast path; integrity is still checked on every
 *    obtain, and a corrupt file is deleted and re-fetched in place.
 * 3. Nothing is ever evicted here. CI nodes prune the cache root out
 *    of band.
 */
