use crate::cache::ComponentSpec;
use crate::result::{McDeployError, Result};
use crate::toolchain::fetcher::Fetcher;
use std::path::Path;
use tokio::fs;

/** Ensures a validated copy of an artifact exists at `dest`
 *
 * # Process
 * 1. Downloads through `fetcher` when `dest` is missing
 * 2. Opens the file as a zip archive and reads every entry to the end,
 *    which checks each stored CRC
 * 3. On a validation failure deletes the file and loops, spending one
 *    reattempt per extra download
 *
 * # Errors
 * - `Validation` once the reattempt budget is spent on corrupt files
 * - `Fetch` immediately when a download fails; network failures never
 *   consume the budget
 *
 * # Notes
 * - With `reattempts = 1` a corrupt download is fetched one more time
 *   before giving up
 * - Jar artifacts pass through the same check; a jar is a zip archive
 */
pub async fn obtain_validated(
    fetcher: &dyn Fetcher,
    spec: &ComponentSpec,
    dest: &Path,
    reattempts: u32,
) -> Result<()> {
    let mut budget = reattempts;

    loop {
        if !dest.exists() {
            log::info!(
                "Downloading {} {} from {}",
                spec.kind,
                spec.version,
                spec.url
            );
            fetcher.fetch(spec, dest).await?;
        }

        match check_archive(dest) {
            Ok(()) => return Ok(()),
            Err(reason) => {
                log::warn!("{} failed validation: {}", dest.display(), reason);
                fs::remove_file(dest).await?;

                if budget == 0 {
                    return Err(McDeployError::validation(
                        spec.kind,
                        format!("{} still corrupt after retrying: {}", spec.file_name, reason),
                    ));
                }
                budget -= 1;
            }
        }
    }
}

// Full structural read; the zip reader verifies entry CRCs at EOF
fn check_archive(path: &Path) -> std::result::Result<(), String> {
    let file = std::fs::File::open(path).map_err(|e| format!("open failed: {}", e))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| format!("not a readable archive: {}", e))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| format!("entry {} unreadable: {}", i, e))?;
        let name = entry.name().to_string();
        std::io::copy(&mut entry, &mut std::io::sink())
            .map_err(|e| format!("entry {} corrupt: {}", name, e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::io::Write;
    use std::sync::atomic::{AtomicU32, Ordering};
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

    // Writes whatever payload it is configured with and counts calls
    struct ScriptedFetcher {
        calls: AtomicU32,
        payload: Payload,
    }

    enum Payload {
        ValidZip,
        Garbage,
        NetworkError,
    }

    impl ScriptedFetcher {
        fn new(payload: Payload) -> Self {
            Self {
                calls: AtomicU32::new(0),
                payload,
            }
        }

        fn count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetcher for ScriptedFetcher {
        async fn fetch(&self, spec: &ComponentSpec, dest: &Path) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.payload {
                Payload::ValidZip => {
                    write_zip(dest, &[("README", b"ok")]);
                    Ok(())
                }
                Payload::Garbage => {
                    std::fs::write(dest, b"this is not an archive").unwrap();
                    Ok(())
                }
                Payload::NetworkError => {
                    Err(McDeployError::fetch(spec.kind, "connection refused"))
                }
            }
        }
    }

    #[tokio::test]
    async fn valid_file_on_disk_is_not_refetched() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("mcp62.zip");
        write_zip(&dest, &[("conf/version.cfg", b"x")]);

        let fetcher = ScriptedFetcher::new(Payload::NetworkError);
        let spec = ComponentSpec::mcp_toolchain("mcp62");

        obtain_validated(&fetcher, &spec, &dest, 1).await.unwrap();
        assert_eq!(fetcher.count(), 0);
    }

    #[tokio::test]
    async fn corrupt_file_is_deleted_and_refetched() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("mcp62.zip");
        std::fs::write(&dest, b"truncated garbage").unwrap();

        let fetcher = ScriptedFetcher::new(Payload::ValidZip);
        let spec = ComponentSpec::mcp_toolchain("mcp62");

        obtain_validated(&fetcher, &spec, &dest, 1).await.unwrap();
        assert_eq!(fetcher.count(), 1);
        assert!(check_archive(&dest).is_ok());
    }

    #[tokio::test]
    async fn budget_limits_extra_downloads() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("mcp62.zip");

        let fetcher = ScriptedFetcher::new(Payload::Garbage);
        let spec = ComponentSpec::mcp_toolchain("mcp62");

        let err = obtain_validated(&fetcher, &spec, &dest, 2)
            .await
            .unwrap_err();

        // One initial download plus exactly two reattempts
        assert_eq!(fetcher.count(), 3);
        assert!(!dest.exists());
        assert!(matches!(err, McDeployError::Validation { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn zero_budget_fails_after_one_download() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("mcp62.zip");

        let fetcher = ScriptedFetcher::new(Payload::Garbage);
        let spec = ComponentSpec::mcp_toolchain("mcp62");

        let err = obtain_validated(&fetcher, &spec, &dest, 0)
            .await
            .unwrap_err();

        assert_eq!(fetcher.count(), 1);
        assert!(matches!(err, McDeployError::Validation { .. }));
    }

    #[tokio::test]
    async fn network_errors_skip_the_budget() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("lwjgl.zip");

        let fetcher = ScriptedFetcher::new(Payload::NetworkError);
        let spec = ComponentSpec::lwjgl();

        let err = obtain_validated(&fetcher, &spec, &dest, 5)
            .await
            .unwrap_err();

        assert_eq!(fetcher.count(), 1);
        assert!(matches!(err, McDeployError::Fetch { .. }));
        assert_eq!(err.exit_code(), 5);
    }
}
