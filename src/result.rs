use std::borrow::Cow;
use thiserror::Error;

use crate::cache::ArtifactKind;

/** Main Result type alias for mcdeploy operations
 *
 * # Usage
 * ```no_run
 * use mcdeploy::result::Result;
 *
 * async fn read_note(path: &std::path::Path) -> Result<String> {
 *     // Function automatically propagates McDeployError
 *     Ok(tokio::fs::read_to_string(path).await?)
 * }
 * ```
 */
pub type Result<T> = std::result::Result<T, McDeployError>;

/** Error enumeration for the mcdeploy pipeline
 *
 * # Error Categories
 * - **Io**: File system and I/O operations
 * - **Json**: Configuration and mod-descriptor parsing failures
 * - **Resolution**: Version catalogs with no matching entry
 * - **Fetch**: Download failures for a specific artifact kind
 * - **Validation**: Artifacts that fail archive validation after the
 *   reattempt budget is spent
 * - **Config**: Build configuration loading and validation errors
 * - **Tool**: External toolchain script failures
 * - **Abort**: Operations cancelled at a confirmation prompt
 *
 * # Design Notes
 * - Uses `Cow<'static, str>` for efficient string storage
 * - Fetch and Validation carry the artifact kind so the process exit
 *   code identifies which component failed
 */
#[derive(Error, Debug)]
pub enum McDeployError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Resolution error: {0}")]
    Resolution(Cow<'static, str>),

    #[error("Fetch error ({kind}): {reason}")]
    Fetch {
        kind: ArtifactKind,
        reason: Cow<'static, str>,
    },

    #[error("Corrupt archive ({kind}): {reason}")]
    Validation {
        kind: ArtifactKind,
        reason: Cow<'static, str>,
    },

    #[error("Config error: {0}")]
    Config(Cow<'static, str>),

    #[error("Tool error: {0}")]
    Tool(Cow<'static, str>),

    #[error("Aborted: {0}")]
    Abort(Cow<'static, str>),
}

/** Error constants and constructor methods
 *
 * # Purpose
 * - Provides commonly used error messages as constants
 * - Offers convenient constructor methods for each error variant
 * - Ensures consistent error messaging across the codebase
 *
 * # Usage Examples
 * ```ignore
 * use mcdeploy::result::McDeployError;
 *
 * // Using constant error messages
 * return Err(McDeployError::tool(McDeployError::PYTHON_NOT_FOUND));
 *
 * // Using constructor methods
 * return Err(McDeployError::config("usemcp is set but mcpversion is empty"));
 *
 * // Using dynamic messages
 * return Err(McDeployError::resolution(format!("unknown toolchain {name}")));
 * ```
 */
impl McDeployError {
    // Tool-related error constants
    pub const PYTHON_NOT_FOUND: &'static str = "Python interpreter not found";

    // Configuration-related error constants
    pub const CACHE_DIR_UNKNOWN: &'static str = "Cache directory could not be determined";

    /** Creates a Resolution error with flexible message input
     *
     * # Use Cases
     * - Version catalogs without an entry for the requested toolchain
     * - Forge or server-bridge build numbers absent from their indexes
     * - Static version tables missing the requested release
     */
    pub fn resolution(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Resolution(msg.into())
    }

    /** Creates a Fetch error for a specific artifact kind
     *
     * # Arguments
     * * `kind` - The artifact that was being downloaded
     * * `msg` - Message implementing Into<Cow<'static, str>>
     *
     * # Supported Input Types
     * - `&'static str` for static strings (no allocation)
     * - `String` for dynamic strings
     */
    pub fn fetch(kind: ArtifactKind, msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Fetch {
            kind,
            reason: msg.into(),
        }
    }

    /** Creates a Validation error for a specific artifact kind
     *
     * # Use Cases
     * - Archives that cannot be opened as zip files
     * - Entries whose stored checksums do not match their contents
     * - Artifacts still corrupt after every reattempt
     */
    pub fn validation(kind: ArtifactKind, msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation {
            kind,
            reason: msg.into(),
        }
    }

    /** Creates a Config error with flexible message input
     *
     * # Use Cases
     * - Missing build configuration files
     * - Component flags set without their version fields
     * - Workspace or cache roots that cannot be determined
     */
    pub fn config(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Config(msg.into())
    }

    /** Creates a Tool error with flexible message input
     *
     * # Use Cases
     * - Missing Python interpreter
     * - Toolchain scripts exiting with a non-zero status
     * - Scripts terminated by a signal
     */
    pub fn tool(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Tool(msg.into())
    }

    /** Creates an Abort error with flexible message input
     *
     * # Use Cases
     * - Destructive operations declined at the y/N prompt
     */
    pub fn abort(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Abort(msg.into())
    }

    /** Maps every error to the process exit code reported to CI
     *
     * # Code Table
     * - 1: toolchain archive fetch or validation
     * - 2: version resolution
     * - 3: client or server jar fetch or validation
     * - 4: Forge source archive fetch or validation
     * - 5: LWJGL bundle fetch or validation
     * - 6: configuration
     * - 7: aborted at a confirmation prompt
     * - 8: external toolchain script failure
     * - 9: server-bridge jar fetch or validation
     * - 10: any other I/O or parse failure
     */
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Resolution(_) => 2,
            Self::Fetch { kind, .. } | Self::Validation { kind, .. } => match kind {
                ArtifactKind::McpToolchain => 1,
                ArtifactKind::Client | ArtifactKind::Server => 3,
                ArtifactKind::ForgeSrc => 4,
                ArtifactKind::Lwjgl => 5,
                ArtifactKind::Mcpc => 9,
            },
            Self::Config(_) => 6,
            Self::Abort(_) => 7,
            Self::Tool(_) => 8,
            Self::Io(_) | Self::Json(_) => 10,
        }
    }
}

/*
 * Exit Code Contract:
 *
 * CI jobs key their failure handling off the process exit code, so the
 * mapping above is part of the external interface. Codes 1 through 7
 * keep their historical meanings; 8 through 10 cover failures the
 * pipeline previously swallowed (script exit status, server-bridge
 * downloads, residual I/O). Changing a code changes what downstream
 * jobs retry, so additions go at the end of the table.
 */
