use crate::error::{ErrorKind, Result};
use crate::walk::{discover, normalize_prefix};
use crate::yang::SourceModule;
use exn::ResultExt;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::PathBuf;
use tracing::instrument;

/// Canonical URL of every crawled file, by file name without extension.
///
/// Built once per crawl. The first file registered under a name keeps it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlIndex(HashMap<String, String>);

impl UrlIndex {
    /// Register a URL; returns `false` (and changes nothing) if the name is
    /// already taken.
    pub fn insert(&mut self, name: impl Into<String>, url: impl Into<String>) -> bool {
        match self.0.entry(name.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(url.into());
                true
            },
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of walking the source trees.
#[derive(Debug, Clone, Default)]
pub struct Crawl {
    /// Parsed modules by module name.
    pub modules: HashMap<String, SourceModule>,
    /// Module names in lexical order.
    pub names: Vec<String>,
    pub urls: UrlIndex,
}

impl Crawl {
    /// Modules in name order.
    pub fn iter(&self) -> impl Iterator<Item = &SourceModule> {
        self.names.iter().filter_map(|name| self.modules.get(name))
    }
}

/// Discover, index and parse every module below the roots.
///
/// Roots are walked in the order given and each tree in lexical order, so
/// when two files declare the same module the one met first is kept. Files
/// that fail to parse are logged and left out.
#[instrument(skip_all, fields(roots = roots.len()))]
pub async fn crawl(roots: &[PathBuf], url_prefix: &str) -> Result<Crawl> {
    let prefix = normalize_prefix(url_prefix);
    let files = discover(roots, &prefix).await?;
    let mut crawl = Crawl::default();
    for file in files {
        if !crawl.urls.insert(file.stem.as_str(), file.url.as_str()) {
            tracing::debug!(name = %file.stem, path = %file.path.display(), "Name already indexed, keeping first URL");
        }
        let Some(source) = &file.source else {
            continue;
        };
        let module = match SourceModule::parse(source).or_raise(|| ErrorKind::Parse(file.path.clone())) {
            Ok(module) => module,
            Err(err) => {
                tracing::warn!(error = ?err, "Skipping unparsable module");
                continue;
            },
        };
        match crawl.modules.entry(module.name.clone()) {
            Entry::Occupied(_) => {
                tracing::info!(name = %module.name, path = %file.path.display(), "Duplicate module ignored");
            },
            Entry::Vacant(entry) => {
                crawl.names.push(module.name.clone());
                entry.insert(module);
            },
        }
    }
    crawl.names.sort();
    tracing::info!(modules = crawl.names.len(), files = crawl.urls.len(), "Crawl complete");
    Ok(crawl)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write(root: &Path, path: &str, contents: &str) {
        let path = root.join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn module(name: &str, version: &str) -> String {
        format!(
            "module {name} {{\n  prefix p;\n  import openconfig-extensions {{ prefix oc-ext; }}\n  oc-ext:openconfig-version \"{version}\";\n}}\n"
        )
    }

    #[test]
    fn test_url_index_first_wins() {
        let mut urls = UrlIndex::default();
        assert!(urls.insert("bgp", "first"));
        assert!(!urls.insert("bgp", "second"));
        assert_eq!(urls.get("bgp"), Some("first"));
        assert_eq!(urls.get("isis"), None);
    }

    #[tokio::test]
    async fn test_crawl() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "release/models/bgp/openconfig-bgp.yang", &module("openconfig-bgp", "9.1.0"));
        write(root, "release/models/bgp/openconfig-bgp-common.yang", "submodule openconfig-bgp-common {}");
        write(root, "release/models/acl/openconfig-acl.yang", &module("openconfig-acl", "1.2.0"));
        write(root, "release/models/acl/broken.yang", "module broken {");
        write(root, "third_party/ietf/ietf-inet-types.yang", "module ietf-inet-types { prefix inet; }");

        let crawl = crawl(&[root.to_path_buf()], "https://example.net").await.unwrap();
        assert_eq!(crawl.names, vec!["ietf-inet-types", "openconfig-acl", "openconfig-bgp"]);
        assert_eq!(crawl.urls.len(), 5);
        assert_eq!(
            crawl.urls.get("openconfig-bgp-common"),
            Some("https://example.net/release/models/bgp/openconfig-bgp-common.yang")
        );
        assert_eq!(
            crawl.urls.get("ietf-inet-types"),
            Some("https://example.net/third_party/ietf/ietf-inet-types.yang")
        );
        let names: Vec<&str> = crawl.iter().map(|module| module.name.as_str()).collect();
        assert_eq!(names, crawl.names);
    }

    #[tokio::test]
    async fn test_duplicate_across_roots_first_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write(first.path(), "models/a/dup.yang", &module("dup", "1.0.0"));
        write(second.path(), "models/b/dup.yang", &module("dup", "2.0.0"));

        let roots = [first.path().to_path_buf(), second.path().to_path_buf()];
        let crawl = crawl(&roots, "").await.unwrap();
        assert_eq!(crawl.names, vec!["dup"]);
        assert_eq!(crawl.modules["dup"].version.as_deref(), Some("1.0.0"));
        assert_eq!(crawl.urls.get("dup"), Some("release/models/a/dup.yang"));

        let reversed = [second.path().to_path_buf(), first.path().to_path_buf()];
        let crawl = super::crawl(&reversed, "").await.unwrap();
        assert_eq!(crawl.modules["dup"].version.as_deref(), Some("2.0.0"));
    }
}
