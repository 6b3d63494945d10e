//! Just enough YANG to describe a module in the catalog.
//!
//! Only the module header is interpreted: identity, linkage (imports and
//! includes), meta information and revisions, plus the OpenConfig semantic
//! version extension. The schema body is parsed for well-formedness and then
//! ignored.

mod statement;

pub use self::statement::{Statement, parse};

use crate::error::{ErrorKind, Result};
use exn::OptionExt;

/// Module defining the `openconfig-version` extension.
pub const OPENCONFIG_EXTENSIONS: &str = "openconfig-extensions";
const OPENCONFIG_VERSION: &str = "openconfig-version";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub module: String,
    pub prefix: Option<String>,
}

/// Header of a YANG module source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceModule {
    pub name: String,
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub description: Option<String>,
    /// Revision dates, in source order.
    pub revisions: Vec<String>,
    pub imports: Vec<Import>,
    /// Names of included submodules.
    pub includes: Vec<String>,
    /// Semantic version declared with `openconfig-extensions`, if any.
    pub version: Option<String>,
}

impl SourceModule {
    /// Parse the source of a primary (`module`) document.
    pub fn parse(source: &str) -> Result<Self> {
        let statements = parse(source)?;
        let module = match statements.as_slice() {
            [module] if module.keyword == "module" => module,
            [first, ..] => exn::bail!(ErrorKind::Syntax {
                line: first.line,
                reason: "expected a single module statement",
            }),
            [] => exn::bail!(ErrorKind::Syntax {
                line: 1,
                reason: "expected a single module statement",
            }),
        };
        let name = module
            .arg()
            .filter(|name| !name.is_empty())
            .ok_or_raise(|| ErrorKind::Syntax {
                line: module.line,
                reason: "module has no name",
            })?
            .to_string();
        let argument = |keyword: &str| module.child(keyword).and_then(Statement::arg).map(str::to_string);
        let imports: Vec<Import> = module
            .children_named("import")
            .filter_map(|import| {
                Some(Import {
                    module: import.arg()?.to_string(),
                    prefix: import.child("prefix").and_then(Statement::arg).map(str::to_string),
                })
            })
            .collect();
        let version = imports
            .iter()
            .find(|import| import.module == OPENCONFIG_EXTENSIONS)
            .and_then(|import| import.prefix.as_deref())
            .and_then(|prefix| module.child(&format!("{prefix}:{OPENCONFIG_VERSION}")))
            .and_then(Statement::arg)
            .map(str::to_string);
        Ok(Self {
            namespace: argument("namespace"),
            prefix: argument("prefix"),
            description: argument("description"),
            revisions: module
                .children_named("revision")
                .filter_map(Statement::arg)
                .map(str::to_string)
                .collect(),
            includes: module
                .children_named("include")
                .filter_map(Statement::arg)
                .map(str::to_string)
                .collect(),
            imports,
            version,
            name,
        })
    }

    /// Most recent revision date.
    ///
    /// Revisions are dates (`YYYY-MM-DD`), so the lexical maximum is the
    /// latest whichever order the file lists them in.
    pub fn latest_revision(&self) -> Option<&str> {
        self.revisions.iter().max().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BGP: &str = r#"
module openconfig-bgp {
  yang-version "1";
  namespace "http://openconfig.net/yang/bgp";
  prefix "oc-bgp";

  import openconfig-extensions { prefix oc-ext; }
  import openconfig-routing-policy { prefix oc-rpol; }
  include openconfig-bgp-common;
  include openconfig-bgp-global;

  description
    "This module describes a YANG model for BGP protocol
    configuration.";

  oc-ext:openconfig-version "9.1.0";

  revision "2021-06-16" { description "Older"; reference "9.0.0"; }
  revision "2022-05-21" { description "Newer"; reference "9.1.0"; }

  container bgp { uses bgp-top; }
}
"#;

    #[test]
    fn test_header() {
        let module = SourceModule::parse(BGP).unwrap();
        assert_eq!(module.name, "openconfig-bgp");
        assert_eq!(module.namespace.as_deref(), Some("http://openconfig.net/yang/bgp"));
        assert_eq!(module.prefix.as_deref(), Some("oc-bgp"));
        assert_eq!(
            module.description.as_deref(),
            Some("This module describes a YANG model for BGP protocol\nconfiguration.")
        );
        assert_eq!(module.version.as_deref(), Some("9.1.0"));
        assert_eq!(module.latest_revision(), Some("2022-05-21"));
        assert_eq!(module.includes, vec!["openconfig-bgp-common", "openconfig-bgp-global"]);
        assert_eq!(module.imports.len(), 2);
        assert_eq!(module.imports[1].module, "openconfig-routing-policy");
    }

    #[test]
    fn test_version_follows_the_import_prefix() {
        let source = r#"
            module m {
              prefix m;
              import openconfig-extensions { prefix ext; }
              oc-ext:openconfig-version "1.0.0";
              ext:openconfig-version "2.0.0";
            }
        "#;
        assert_eq!(SourceModule::parse(source).unwrap().version.as_deref(), Some("2.0.0"));
    }

    #[test]
    fn test_no_version() {
        let source = r#"module ietf-inet-types { namespace "urn:ietf:params:xml:ns:yang:ietf-inet-types"; prefix inet; }"#;
        let module = SourceModule::parse(source).unwrap();
        assert_eq!(module.version, None);
        assert_eq!(module.latest_revision(), None);
    }

    #[test]
    fn test_submodule_is_not_a_module() {
        let err = SourceModule::parse("submodule s { belongs-to m { prefix m; } }").unwrap_err();
        assert!(matches!(&*err, ErrorKind::Syntax { .. }));
    }
}
