use crate::crawl::UrlIndex;
use crate::error::{ErrorKind, Result};
use crate::yang::SourceModule;
use exn::OptionExt;
use modcat_document::{Access, Dependencies, Module, Submodule, Submodules};

/// Build the catalog document for a crawled module.
///
/// Modules without an `openconfig-version` can't be keyed and are skipped
/// (`Ok(None)`). Every included submodule must have been crawled as well,
/// otherwise the document is rejected with
/// [`MissingUrl`](ErrorKind::MissingUrl).
pub fn populate(module: &SourceModule, urls: &UrlIndex) -> Result<Option<Module>> {
    let Some(version) = module.version.as_deref().filter(|version| !version.is_empty()) else {
        tracing::info!(name = %module.name, "Module has no openconfig-version, skipping");
        return Ok(None);
    };
    let submodule = module
        .includes
        .iter()
        .map(|name| -> Result<Submodule> {
            let uri = urls.get(name).ok_or_raise(|| ErrorKind::MissingUrl(name.clone()))?;
            Ok(Submodule {
                name: name.clone(),
                access: Some(Access {
                    uri: Some(uri.to_string()),
                }),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let access = match urls.get(&module.name) {
        Some(uri) => Some(Access {
            uri: Some(uri.to_string()),
        }),
        None => {
            tracing::warn!(name = %module.name, "No URL indexed for module");
            None
        },
    };
    Ok(Some(Module {
        name: module.name.clone(),
        version: version.to_string(),
        namespace: module.namespace.clone(),
        prefix: module.prefix.clone(),
        revision: module.latest_revision().map(str::to_string),
        summary: module.description.clone(),
        dependencies: Dependencies {
            required_module: module.imports.iter().map(|import| import.module.clone()).collect(),
        },
        submodules: Submodules { submodule },
        access,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yang::Import;

    fn bgp() -> SourceModule {
        SourceModule {
            name: "openconfig-bgp".to_string(),
            namespace: Some("http://openconfig.net/yang/bgp".to_string()),
            prefix: Some("oc-bgp".to_string()),
            description: Some("BGP".to_string()),
            revisions: vec!["2021-06-16".to_string(), "2022-05-21".to_string()],
            imports: vec![Import {
                module: "openconfig-extensions".to_string(),
                prefix: Some("oc-ext".to_string()),
            }],
            includes: vec!["openconfig-bgp-common".to_string()],
            version: Some("9.1.0".to_string()),
        }
    }

    fn urls() -> UrlIndex {
        let mut urls = UrlIndex::default();
        urls.insert("openconfig-bgp", "https://example.net/release/models/bgp/openconfig-bgp.yang");
        urls.insert("openconfig-bgp-common", "https://example.net/release/models/bgp/openconfig-bgp-common.yang");
        urls
    }

    #[test]
    fn test_populate() {
        let module = populate(&bgp(), &urls()).unwrap().unwrap();
        assert_eq!(module.name, "openconfig-bgp");
        assert_eq!(module.version, "9.1.0");
        assert_eq!(module.summary.as_deref(), Some("BGP"));
        assert_eq!(module.revision.as_deref(), Some("2022-05-21"));
        assert_eq!(module.dependencies.required_module, vec!["openconfig-extensions"]);
        assert_eq!(
            module.submodules.submodule[0].access.as_ref().and_then(|access| access.uri.as_deref()),
            Some("https://example.net/release/models/bgp/openconfig-bgp-common.yang")
        );
        assert_eq!(module.uri(), Some("https://example.net/release/models/bgp/openconfig-bgp.yang"));
    }

    #[test]
    fn test_without_version_is_skipped() {
        let module = SourceModule {
            version: None,
            ..bgp()
        };
        assert_eq!(populate(&module, &urls()).unwrap(), None);
    }

    #[test]
    fn test_missing_submodule_url() {
        let module = SourceModule {
            includes: vec!["openconfig-bgp-neighbor".to_string()],
            ..bgp()
        };
        let err = populate(&module, &urls()).unwrap_err();
        assert_eq!(*err, ErrorKind::MissingUrl("openconfig-bgp-neighbor".to_string()));
    }
}
