//! Source tree traversal and provenance classification.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

const EXTENSION: &str = "yang";
const PRIMARY_KEYWORD: &str = "module ";
const MODELS_SEGMENT: &str = "models";
const IETF_SEGMENT: &str = "ietf";
const MODELS_URL_DIR: &str = "release/models";
const IETF_URL_DIR: &str = "third_party/ietf";

/// Which part of the published source tree a file belongs to. The canonical
/// URL of a file depends on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Zone {
    /// `release/models/<parent>/<file>`.
    Models { parent: String },
    /// `third_party/ietf/<file>`.
    Ietf,
}

impl Zone {
    /// Classify by path segment, `models` taking precedence over `ietf`.
    pub fn classify(path: &Path) -> Option<Self> {
        let has_segment = |segment: &str| {
            path.components()
                .any(|component| matches!(component, Component::Normal(name) if name == segment))
        };
        if has_segment(MODELS_SEGMENT) {
            let parent = path.parent()?.file_name()?.to_str()?.to_string();
            Some(Self::Models { parent })
        } else if has_segment(IETF_SEGMENT) {
            Some(Self::Ietf)
        } else {
            None
        }
    }

    /// Canonical URL of `file_name` in this zone.
    ///
    /// `prefix` is expected to end with `/`; see [`normalize_prefix`].
    pub fn url(&self, prefix: &str, file_name: &str) -> String {
        match self {
            Self::Models { parent } => format!("{prefix}{MODELS_URL_DIR}/{parent}/{file_name}"),
            Self::Ietf => format!("{prefix}{IETF_URL_DIR}/{file_name}"),
        }
    }
}

/// Make sure a non-empty URL prefix ends with a single `/`.
pub fn normalize_prefix(prefix: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('/') {
        prefix.to_string()
    } else {
        format!("{prefix}/")
    }
}

/// A `.yang` file found while walking the roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// File name without the extension.
    pub stem: String,
    pub url: String,
    /// Contents of primary (`module`) documents. Secondary documents
    /// (submodules) are only indexed, so their contents are not kept.
    pub source: Option<String>,
}

/// Whether the first non-blank line declares a module.
pub fn is_primary(source: &str) -> bool {
    source
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .is_some_and(|line| line.starts_with(PRIMARY_KEYWORD))
}

enum WalkEntry {
    File(PathBuf),
    Descend(PathBuf),
    Skip,
}

/// Roots are followed if they are symlinks, entries below them are not.
async fn entry_kind(path: PathBuf, is_root: bool) -> Result<WalkEntry> {
    let metadata = if is_root {
        fs::metadata(&path).await
    } else {
        fs::symlink_metadata(&path).await
    };
    let metadata = metadata.or_raise(|| ErrorKind::Io(path.clone()))?;
    if metadata.is_dir() {
        return Ok(WalkEntry::Descend(path));
    }
    if metadata.is_file() && path.extension() == Some(OsStr::new(EXTENSION)) {
        return Ok(WalkEntry::File(path));
    }
    // Not following symlinks keeps a tree that links back into itself from
    // looping the walk.
    Ok(WalkEntry::Skip)
}

async fn sorted_children(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir).await.or_raise(|| ErrorKind::Io(dir.to_path_buf()))?;
    let mut children = Vec::new();
    while let Some(entry) = entries.next_entry().await.or_raise(|| ErrorKind::Io(dir.to_path_buf()))? {
        children.push(entry.path());
    }
    children.sort();
    Ok(children)
}

async fn read_source_file(path: PathBuf, prefix: &str) -> Result<Option<SourceFile>> {
    let (Some(stem), Some(file_name)) = (
        path.file_stem().and_then(OsStr::to_str),
        path.file_name().and_then(OsStr::to_str),
    ) else {
        tracing::warn!(path = %path.display(), "Skipping file with a non UTF-8 name");
        return Ok(None);
    };
    let zone = match Zone::classify(&path) {
        Some(zone) => zone,
        None => exn::bail!(ErrorKind::Classification(path.clone())),
    };
    let url = zone.url(prefix, file_name);
    let stem = stem.to_string();
    let bytes = fs::read(&path).await.or_raise(|| ErrorKind::Io(path.clone()))?;
    let source = String::from_utf8_lossy(&bytes).into_owned();
    let source = if is_primary(&source) {
        Some(source)
    } else {
        tracing::debug!(path = %path.display(), "Not a module, indexing only");
        None
    };
    Ok(Some(SourceFile { path, stem, url, source }))
}

/// Walk every root, depth first, entries in lexical order, and collect the
/// `.yang` files in the order they are encountered.
///
/// A root may also be a single file. A file outside both zones is a
/// [`Classification`](ErrorKind::Classification) error and ends the walk.
pub async fn discover(roots: &[PathBuf], prefix: &str) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    for root in roots {
        let mut stack = vec![entry_kind(root.clone(), true).await?];
        while let Some(entry) = stack.pop() {
            match entry {
                WalkEntry::File(path) => {
                    if let Some(file) = read_source_file(path, prefix).await? {
                        files.push(file);
                    }
                },
                WalkEntry::Descend(dir) => {
                    for child in sorted_children(&dir).await?.into_iter().rev() {
                        stack.push(entry_kind(child, false).await?);
                    }
                },
                WalkEntry::Skip => {},
            }
        }
    }
    Ok(files)
}
