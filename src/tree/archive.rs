use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::result::{McDeployError, Result};

struct Member {
    arc_name: String,
    // None marks a directory entry.
    source: Option<PathBuf>,
}

enum TreeEntry {
    Dir(String),
    File { arc_name: String, path: PathBuf },
}

impl TreeEntry {
    fn arc_name(&self) -> &str {
        match self {
            TreeEntry::Dir(arc_name) => arc_name,
            TreeEntry::File { arc_name, .. } => arc_name,
        }
    }
}

/**
Assembles a zip archive from one or more directory trees.

Source roots are processed in lexicographic order and the entries of each
root are added in sorted member-name order, so the same trees always
produce the same archive layout. Member names are the paths below each
root with `/` separators, directory members carry a trailing `/`.

When two roots contribute the same member name, the later root's content
replaces the earlier one in its original position and a warning is logged.

Returns the number of members written.

# Errors

Returns `McDeployError::Io` when a root cannot be walked or the output
archive cannot be written.
*/
pub async fn build_archive(source_roots: &[PathBuf], output: &Path) -> Result<usize> {
    let mut roots: Vec<&PathBuf> = source_roots.iter().collect();
    roots.sort();

    let mut members: Vec<Member> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for root in roots {
        for entry in list_tree(root)? {
            let (arc_name, source) = match entry {
                TreeEntry::Dir(arc_name) => (arc_name, None),
                TreeEntry::File { arc_name, path } => (arc_name, Some(path)),
            };

            match by_name.get(&arc_name) {
                Some(&index) => {
                    if source.is_some() {
                        log::warn!(
                            "Archive member {} provided by more than one root, keeping the later content",
                            arc_name
                        );
                    }
                    members[index].source = source;
                }
                None => {
                    by_name.insert(arc_name.clone(), members.len());
                    members.push(Member { arc_name, source });
                }
            }
        }
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).await?;
    }

    let file = std::fs::File::create(output)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();

    for member in &members {
        match &member.source {
            None => {
                zip.add_directory(member.arc_name.trim_end_matches('/'), options)
                    .map_err(|e| archive_error(output, e))?;
            }
            Some(path) => {
                zip.start_file(member.arc_name.as_str(), options)
                    .map_err(|e| archive_error(output, e))?;
                let mut payload = std::fs::File::open(path)?;
                std::io::copy(&mut payload, &mut zip)?;
            }
        }
    }

    zip.finish().map_err(|e| archive_error(output, e))?;

    log::info!(
        "Packaged {} members into {}",
        members.len(),
        output.display()
    );

    Ok(members.len())
} // build_archive

/// Walks a directory tree and returns its entries sorted by member name.
fn list_tree(root: &Path) -> std::io::Result<Vec<TreeEntry>> {
    let mut entries = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for item in std::fs::read_dir(&dir)? {
            let item = item?;
            let path = item.path();
            let arc_name = member_name(root, &path);

            if path.is_dir() {
                entries.push(TreeEntry::Dir(format!("{}/", arc_name)));
                pending.push(path);
            } else if path.is_file() {
                entries.push(TreeEntry::File { arc_name, path });
            }
        }
    }

    entries.sort_by(|a, b| a.arc_name().cmp(b.arc_name()));
    Ok(entries)
}

/// Path below `root` with `/` separators, independent of the host platform.
fn member_name(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let mut name = String::new();

    for component in rel.components() {
        if !name.is_empty() {
            name.push('/');
        }
        name.push_str(&component.as_os_str().to_string_lossy());
    }

    name
}

fn archive_error(output: &Path, e: zip::result::ZipError) -> McDeployError {
    McDeployError::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("Failed to write archive {}: {}", output.display(), e),
    ))
}

/*
Archive Layout

Member order is the sorted entry list of each root, roots themselves in
lexicographic order. Colliding member names keep the position of their
first occurrence and the content of their last. Empty directories are
preserved as explicit directory members.
*/
