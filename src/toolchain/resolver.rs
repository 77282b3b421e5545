use crate::cache::ArtifactKind;
use crate::result::{McDeployError, Result};
use crate::toolchain::catalog::{CatalogProvider, McpcAsset, PlatformVersions};
use once_cell::sync::Lazy;
use regex::Regex;
use smol_str::SmolStr;
use std::collections::HashMap;

// Well-known toolchain releases; the remote history is only consulted
// for labels missing here
static MCP_TO_MINECRAFT: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut table = HashMap::new();
    table.insert("mcp50", "1.0.0");
    table.insert("mcp56", "1.1.0");
    table.insert("mcp60", "1.2.3");
    table.insert("mcp61", "1.2.4");
    table.insert("mcp62", "1.2.5");
    table.insert("mcp70", "1.3.1");
    table.insert("mcp70a", "1.3.1");
    table.insert("mcp72", "1.3.2");
    table
});

static MINECRAFT_TO_MCP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut table = HashMap::new();
    table.insert("1.0.0", "mcp50");
    table.insert("1.1.0", "mcp56");
    table.insert("1.2.3", "mcp60");
    table.insert("1.2.4", "mcp61");
    table.insert("1.2.5", "mcp62");
    table.insert("1.3.1", "mcp70a");
    table.insert("1.3.2", "mcp72");
    table
});

static CRAFTBUKKIT_JAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^craftbukkit-.+\.jar$").unwrap());

/// A Forge release resolved down to its source archive.
#[derive(Debug, Clone)]
pub struct ForgeRelease {
    pub version: SmolStr,
    pub src_url: String,
}

/** Maps configured version labels to concrete artifact versions
 *
 * # Resolution order
 * 1. The static tables above (no network)
 * 2. The injected catalogs, fetched at most once per call
 *
 * A label absent from both is a `Resolution` error; nothing is ever
 * guessed.
 */
pub struct VersionResolver<'a> {
    catalog: &'a dyn CatalogProvider,
}

impl<'a> VersionResolver<'a> {
    pub fn new(catalog: &'a dyn CatalogProvider) -> Self {
        Self { catalog }
    }

    /** Resolves the platform versions belonging to a toolchain release
     *
     * # Returns
     * - Static table hit: client and server share the mapped version
     * - History hit: the client and server columns of the release row
     * - `Resolution` error when the label is unknown everywhere
     */
    pub async fn resolve_platform(&self, mcp_version: &str) -> Result<PlatformVersions> {
        if let Some(version) = MCP_TO_MINECRAFT.get(mcp_version) {
            return Ok(PlatformVersions {
                client: SmolStr::new(version),
                server: SmolStr::new(version),
            });
        }

        log::info!(
            "{} is not in the static tables, consulting the release history",
            mcp_version
        );
        let catalog = self.catalog.mcp_catalog().await?;
        catalog.get(mcp_version).cloned().ok_or_else(|| {
            McDeployError::resolution(format!(
                "could not resolve a Minecraft version for {}",
                mcp_version
            ))
        })
    }

    /// Reverse lookup: the toolchain release maintained for a Minecraft version.
    pub fn resolve_toolchain(&self, minecraft_version: &str) -> Result<SmolStr> {
        MINECRAFT_TO_MCP
            .get(minecraft_version)
            .map(|label| SmolStr::new(label))
            .ok_or_else(|| {
                McDeployError::resolution(format!(
                    "no toolchain release is known for Minecraft {}",
                    minecraft_version
                ))
            })
    }

    /** Resolves a Forge build number to its source archive
     *
     * The build must appear in the file index and carry a `src` archive;
     * either miss fails the forge component.
     */
    pub async fn resolve_forge(&self, build: &str) -> Result<ForgeRelease> {
        let catalog = self.catalog.forge_catalog().await?;
        let entry = catalog.get(build).ok_or_else(|| {
            McDeployError::fetch(
                ArtifactKind::ForgeSrc,
                format!("build {} is not in the file index", build),
            )
        })?;

        let src_url = entry.urls.get("src").ok_or_else(|| {
            McDeployError::fetch(
                ArtifactKind::ForgeSrc,
                format!("build {} has no src archive", build),
            )
        })?;

        Ok(ForgeRelease {
            version: entry.version.clone(),
            src_url: src_url.clone(),
        })
    }

    /** Resolves an MCPC build number to its published jar
     *
     * Matches `craftbukkit-*.jar` assets whose final dash token (up to
     * the first dot) equals the requested build.
     */
    pub async fn resolve_mcpc(&self, build: &str) -> Result<McpcAsset> {
        let assets = self.catalog.mcpc_assets().await?;

        for asset in assets {
            if !CRAFTBUKKIT_JAR.is_match(&asset.name) {
                continue;
            }
            if jar_build_token(&asset.name) == Some(build) {
                return Ok(asset);
            }
        }

        Err(McDeployError::fetch(
            ArtifactKind::Mcpc,
            format!("no craftbukkit jar published for build {}", build),
        ))
    }
}

// "craftbukkit-1.2.5-R4.0-162.jar" carries its build in the final dash token
fn jar_build_token(name: &str) -> Option<&str> {
    let last = name.rsplit('-').next()?;
    last.split('.').next()
}
