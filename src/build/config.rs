use crate::result::{McDeployError, Result};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::path::Path;
use tokio::fs;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolchainConfig {
    pub modid: SmolStr,
    #[serde(default)]
    pub usemcp: bool,
    #[serde(default)]
    pub mcpversion: Option<SmolStr>,
    #[serde(default)]
    pub useforge: bool,
    #[serde(default)]
    pub forgeversion: Option<SmolStr>,
    #[serde(default)]
    pub usemcpc: bool,
    #[serde(default)]
    pub mcpc_build: Option<SmolStr>,
}

/// One record of an `mcmod.info` descriptor. Only the fields the output
/// naming needs are kept, anything else in the record is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModRecord {
    pub modid: SmolStr,
    pub version: SmolStr,
    pub mcversion: SmolStr,
}

impl ToolchainConfig {
    pub async fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            McDeployError::config(format!("Could not read {}: {}", path.display(), e))
        })?;

        let config: ToolchainConfig = serde_json::from_str(&content).map_err(|e| {
            McDeployError::config(format!("Invalid toolchain config {}: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.modid.is_empty() {
            return Err(McDeployError::config("modid cannot be empty"));
        }

        if self.usemcp {
            self.mcp_version()?;
        }

        if self.useforge {
            if !self.usemcp {
                return Err(McDeployError::config(
                    "useforge requires usemcp, Forge is installed into the MCP tree",
                ));
            }
            self.forge_version()?;
        }

        if self.usemcpc {
            self.mcpc_build()?;
        }

        Ok(())
    }

    pub fn mcp_version(&self) -> Result<&SmolStr> {
        match &self.mcpversion {
            Some(version) if !version.is_empty() => Ok(version),
            _ => Err(McDeployError::config(
                "mcpversion is required when usemcp is set",
            )),
        }
    }

    pub fn forge_version(&self) -> Result<&SmolStr> {
        match &self.forgeversion {
            Some(version) if !version.is_empty() => Ok(version),
            _ => Err(McDeployError::config(
                "forgeversion is required when useforge is set",
            )),
        }
    }

    pub fn mcpc_build(&self) -> Result<&SmolStr> {
        match &self.mcpc_build {
            Some(build) if !build.is_empty() => Ok(build),
            _ => Err(McDeployError::config(
                "mcpc_build is required when usemcpc is set",
            )),
        }
    }
}

/// Reads `mcmod.info` and returns the record matching `modid`, if any.
///
/// A missing or unparseable descriptor is not an error, the file is an
/// optional enrichment for output naming. Parse problems are logged and
/// treated as "no record".
pub async fn matching_mod_record(path: &Path, modid: &str) -> Result<Option<ModRecord>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).await?;

    let records: Vec<ModRecord> = match serde_json::from_str(&content) {
        Ok(records) => records,
        Err(e) => {
            log::warn!("Ignoring malformed {}: {}", path.display(), e);
            return Ok(None);
        }
    };

    Ok(records.into_iter().find(|record| record.modid == modid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn full_config_parses_and_validates() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mctoolchain.json");
        fs::write(
            &path,
            r#"{
                "modid": "mod_example",
                "usemcp": true,
                "mcpversion": "mcp62",
                "useforge": true,
                "forgeversion": "152",
                "usemcpc": true,
                "mcpc_build": "251"
            }"#,
        )
        .await
        .unwrap();

        let config = ToolchainConfig::from_file(&path).await.unwrap();

        assert_eq!(config.modid, "mod_example");
        assert!(config.usemcp);
        assert_eq!(config.mcp_version().unwrap(), "mcp62");
        assert_eq!(config.forge_version().unwrap(), "152");
        assert_eq!(config.mcpc_build().unwrap(), "251");
    }

    #[tokio::test]
    async fn flags_default_to_false_when_absent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mctoolchain.json");
        fs::write(&path, r#"{"modid": "mod_example"}"#).await.unwrap();

        let config = ToolchainConfig::from_file(&path).await.unwrap();

        assert!(!config.usemcp);
        assert!(!config.useforge);
        assert!(!config.usemcpc);
    }

    #[tokio::test]
    async fn a_missing_config_file_is_a_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.json");

        let err = ToolchainConfig::from_file(&path).await.unwrap_err();

        assert!(matches!(err, McDeployError::Config(_)));
        assert_eq!(err.exit_code(), 6);
    }

    #[tokio::test]
    async fn invalid_json_is_a_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mctoolchain.json");
        fs::write(&path, "{ this is not json").await.unwrap();

        let err = ToolchainConfig::from_file(&path).await.unwrap_err();

        assert!(matches!(err, McDeployError::Config(_)));
        assert_eq!(err.exit_code(), 6);
    }

    #[test]
    fn usemcp_without_a_version_fails_validation() {
        let config = ToolchainConfig {
            modid: "mod_example".into(),
            usemcp: true,
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        assert_eq!(err.exit_code(), 6);
    }

    #[test]
    fn useforge_without_usemcp_fails_validation() {
        let config = ToolchainConfig {
            modid: "mod_example".into(),
            useforge: true,
            forgeversion: Some("152".into()),
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn usemcpc_without_a_build_fails_validation() {
        let config = ToolchainConfig {
            modid: "mod_example".into(),
            usemcpc: true,
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn mod_record_matching_finds_the_configured_modid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mcmod.info");
        fs::write(
            &path,
            r#"[
                {"modid": "mod_other", "name": "Other", "version": "9.9", "mcversion": "1.0.0"},
                {"modid": "mod_example", "name": "Example", "version": "0.01", "mcversion": "1.2.5"}
            ]"#,
        )
        .await
        .unwrap();

        let record = matching_mod_record(&path, "mod_example")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(record.modid, "mod_example");
        assert_eq!(record.version, "0.01");
        assert_eq!(record.mcversion, "1.2.5");
    }

    #[tokio::test]
    async fn a_missing_mod_descriptor_matches_nothing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mcmod.info");

        assert!(matching_mod_record(&path, "mod_example")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn a_malformed_mod_descriptor_matches_nothing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mcmod.info");
        fs::write(&path, "not json").await.unwrap();

        assert!(matching_mod_record(&path, "mod_example")
            .await
            .unwrap()
            .is_none());
    }
}
