use std::path::Path;

use tokio::fs;

use crate::result::{McDeployError, Result};

/**
Counters reported by the merge and extraction routines.

`files` counts payloads written to disk, `directories` counts directories
created or re-visited, and `skipped` counts files left untouched because a
destination entry already existed and overwriting was disabled.
*/
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    pub files: usize,
    pub directories: usize,
    pub skipped: usize,
}

/**
Merges a directory tree into a destination, nesting it under its own name.

Merging `.../src/main/java/minecraft` into `tree/src` produces
`tree/src/minecraft/...`. Directories are traversed iteratively and the
entries of each directory are visited in name order, so repeated merges of
the same tree touch the destination in the same sequence.

# Arguments

* `source_root` - directory to merge, must exist
* `dest_root` - directory receiving the merged tree
* `overwrite` - when `false`, files already present under `dest_root`
  are kept and counted as skipped

# Errors

Returns `McDeployError::Io` when the source cannot be read or the
destination cannot be written.
*/
pub async fn merge_directory(
    source_root: &Path,
    dest_root: &Path,
    overwrite: bool,
) -> Result<MergeStats> {
    let root_name = match source_root.file_name() {
        Some(name) => name.to_os_string(),
        None => {
            return Err(McDeployError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} has no directory name to merge under", source_root.display()),
            )))
        }
    };

    let base = dest_root.join(&root_name);
    fs::create_dir_all(&base).await?;

    let mut stats = MergeStats::default();
    let mut pending = vec![(source_root.to_path_buf(), base)];

    while let Some((src_dir, dst_dir)) = pending.pop() {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(&src_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name());
        }

        names.sort();

        for name in names {
            let src_path = src_dir.join(&name);
            let dst_path = dst_dir.join(&name);
            let meta = fs::metadata(&src_path).await?;

            if meta.is_dir() {
                fs::create_dir_all(&dst_path).await?;
                stats.directories += 1;
                pending.push((src_path, dst_path));
            } else if meta.is_file() {
                if dst_path.exists() && !overwrite {
                    log::debug!("Keeping existing {}", dst_path.display());
                    stats.skipped += 1;
                } else {
                    log::debug!(
                        "Copying {} -> {}",
                        src_path.display(),
                        dst_path.display()
                    );
                    fs::copy(&src_path, &dst_path).await?;
                    stats.files += 1;
                }
            }
        }
    }

    Ok(stats)
} // merge_directory

/**
Unpacks a zip archive into a destination directory.

Entries are written in archive order. Directory entries are created as
directories, file entries get their parent directories created before the
payload is written. When `overwrite` is `false`, files already present on
disk are kept and counted as skipped.

# Errors

Returns `McDeployError::Io` when the archive cannot be opened or decoded,
or when the destination cannot be written.
*/
pub async fn extract_archive(
    archive: &Path,
    dest_root: &Path,
    overwrite: bool,
) -> Result<MergeStats> {
    let file = std::fs::File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| {
        McDeployError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Failed to open archive {}: {}", archive.display(), e),
        ))
    })?;

    let mut stats = MergeStats::default();

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|e| {
            McDeployError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Failed to read entry {} of {}: {}", i, archive.display(), e),
            ))
        })?;

        let out_path = dest_root.join(entry.name());

        if entry.name().ends_with('/') {
            fs::create_dir_all(&out_path).await?;
            stats.directories += 1;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if out_path.exists() && !overwrite {
            stats.skipped += 1;
            continue;
        }

        let mut payload = Vec::with_capacity(entry.size() as usize);
        std::io::copy(&mut entry, &mut payload)?;
        fs::write(&out_path, payload).await?;
        stats.files += 1;
    }

    Ok(stats)
} // extract_archive
