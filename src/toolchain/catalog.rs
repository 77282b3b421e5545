use crate::cache::ArtifactKind;
use crate::result::{McDeployError, Result};
use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::Client;
use smol_str::SmolStr;
use std::collections::HashMap;

const MCP_CATALOG_URL: &str =
    "http://www.minecraftwiki.net/index.php?title=Minecraft_Coder_Pack&action=raw";
const FORGE_INDEX_URL: &str = "http://files.minecraftforge.net/";
const MCPC_REPO_OWNER: &str = "MinecraftPortCentral";
const MCPC_REPO_NAME: &str = "CraftBukkit";
const USER_AGENT: &str = "mcdeploy/0.1.0";

/// Client and server platform versions paired with one toolchain release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformVersions {
    pub client: SmolStr,
    pub server: SmolStr,
}

/// One Forge build in the file index: full version plus URLs by archive type.
#[derive(Debug, Clone)]
pub struct ForgeBuild {
    pub version: SmolStr,
    pub urls: HashMap<SmolStr, String>,
}

/// One jar published on the MCPC-CraftBukkit releases.
#[derive(Debug, Clone)]
pub struct McpcAsset {
    pub name: String,
    pub url: String,
}

/** Remote version catalogs consulted during resolution
 *
 * # Contract
 * - Each method fetches and parses its catalog on every call; callers
 *   decide when a catalog is worth fetching at all
 * - An empty map or list is a valid answer (the resolver turns misses
 *   into errors); only transport and decode failures are errors here
 */
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// MCP release history: toolchain label -> platform versions.
    async fn mcp_catalog(&self) -> Result<HashMap<SmolStr, PlatformVersions>>;

    /// Forge file index: build number -> release record.
    async fn forge_catalog(&self) -> Result<HashMap<SmolStr, ForgeBuild>>;

    /// Every jar asset on the MCPC-CraftBukkit releases.
    async fn mcpc_assets(&self) -> Result<Vec<McpcAsset>>;
}

/// Live catalogs: the MCP wiki page, the Forge file index and GitHub releases.
pub struct RemoteCatalog {
    github: std::sync::Arc<Octocrab>,
    client: Client,
}

impl Default for RemoteCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteCatalog {
    pub fn new() -> Self {
        let client = Client::new();

        let github = if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            if !token.is_empty() {
                let crab = Octocrab::builder()
                    .personal_token(token)
                    .build()
                    .unwrap_or_else(|_| Octocrab::default());
                octocrab::initialise(crab);
                octocrab::instance()
            } else {
                octocrab::instance()
            }
        } else {
            octocrab::instance()
        };

        Self { github, client }
    }

    async fn fetch_text(&self, url: &str) -> std::result::Result<String, String> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| format!("request to {} failed: {}", url, e))?;

        if !response.status().is_success() {
            return Err(format!("{} answered HTTP {}", url, response.status()));
        }

        response
            .text()
            .await
            .map_err(|e| format!("body of {} unreadable: {}", url, e))
    }
}

#[async_trait]
impl CatalogProvider for RemoteCatalog {
    async fn mcp_catalog(&self) -> Result<HashMap<SmolStr, PlatformVersions>> {
        let raw = self
            .fetch_text(MCP_CATALOG_URL)
            .await
            .map_err(McDeployError::resolution)?;

        Ok(parse_mcp_history(&raw))
    }

    async fn forge_catalog(&self) -> Result<HashMap<SmolStr, ForgeBuild>> {
        let html = self
            .fetch_text(FORGE_INDEX_URL)
            .await
            .map_err(|reason| McDeployError::fetch(ArtifactKind::ForgeSrc, reason))?;

        Ok(parse_forge_index(&html))
    }

    async fn mcpc_assets(&self) -> Result<Vec<McpcAsset>> {
        let releases = self
            .github
            .repos(MCPC_REPO_OWNER, MCPC_REPO_NAME)
            .releases()
            .list()
            .send()
            .await
            .map_err(|e| {
                McDeployError::fetch(ArtifactKind::Mcpc, format!("release listing failed: {}", e))
            })?;

        let mut assets = Vec::new();
        for release in releases.items {
            for asset in release.assets {
                assets.push(McpcAsset {
                    name: asset.name,
                    url: asset.browser_download_url.to_string(),
                });
            }
        }

        Ok(assets)
    }
}

/** Parses the release-history table out of the raw MCP wiki page
 *
 * The page is wikitext; the table of interest sits between the
 * `=== History ===` heading and the closing `|}`. Rows are separated by
 * `|-` lines and cells by line-leading pipes. Cell 0 carries the release
 * label (`6.2` becomes `mcp62`), cells 2 and 3 the client and server
 * Minecraft versions. Malformed rows are skipped.
 */
fn parse_mcp_history(raw: &str) -> HashMap<SmolStr, PlatformVersions> {
    let mut catalog = HashMap::new();

    let section = match raw.split("=== History ===").nth(1) {
        Some(section) => section,
        None => return catalog,
    };
    let table = section.split("|}").next().unwrap_or("");

    for row in table.split("|-\n").skip(1) {
        let cells: Vec<&str> = row
            .trim_matches(|c| c == '\n' || c == '|')
            .split("\n|")
            .collect();
        if cells.len() < 4 {
            continue;
        }

        let label = cells[0].trim().replace('.', "");
        let client = cells[2].trim();
        let server = cells[3].trim();
        if label.is_empty() || client.is_empty() || server.is_empty() {
            continue;
        }

        catalog.insert(
            SmolStr::new(format!("mcp{}", label)),
            PlatformVersions {
                client: SmolStr::new(client),
                server: SmolStr::new(server),
            },
        );
    }

    catalog
}

/** Parses the Forge file index into build records
 *
 * Quoted URLs ending in `.zip` name their files
 * `<name>-<type>-<version>.zip`; the build number is the last dotted
 * component of the version (or the whole version when undotted). The
 * first URL seen for a build fixes its version; later URLs only add
 * archive types, the newest one winning per type.
 */
fn parse_forge_index(html: &str) -> HashMap<SmolStr, ForgeBuild> {
    let mut catalog: HashMap<SmolStr, ForgeBuild> = HashMap::new();

    for token in html.split('"') {
        if !(token.starts_with("http") && token.ends_with(".zip")) {
            continue;
        }

        let file_name = token.rsplit('/').next().unwrap_or(token);
        let stem = file_name.strip_suffix(".zip").unwrap_or(file_name);
        let parts: Vec<&str> = stem.split('-').collect();
        if parts.len() < 3 {
            continue;
        }

        let archive_type = parts[1];
        let version = parts[2];
        if version.is_empty() {
            continue;
        }
        let build = version.rsplit('.').next().unwrap_or(version);
        if build.is_empty() {
            continue;
        }

        let entry = catalog
            .entry(SmolStr::new(build))
            .or_insert_with(|| ForgeBuild {
                version: SmolStr::new(version),
                urls: HashMap::new(),
            });
        entry
            .urls
            .insert(SmolStr::new(archive_type), token.to_string());
    }

    catalog
}
