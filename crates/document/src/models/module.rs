use crate::Document;
use serde::{Deserialize, Serialize};

/// Where a module (or submodule) source can be retrieved from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Access {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependencies {
    #[serde(rename = "required-module", default, skip_serializing_if = "Vec::is_empty")]
    pub required_module: Vec<String>,
}

impl Dependencies {
    pub fn is_empty(&self) -> bool {
        self.required_module.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submodules {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub submodule: Vec<Submodule>,
}

impl Submodules {
    pub fn is_empty(&self) -> bool {
        self.submodule.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submodule {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<Access>,
}

/// A versioned schema module as described by the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    #[serde(rename = "openconfig-module-catalog:name", alias = "name", default)]
    pub name: String,
    #[serde(rename = "openconfig-module-catalog:version", alias = "version", default)]
    pub version: String,
    #[serde(
        rename = "openconfig-module-catalog:namespace",
        alias = "namespace",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub namespace: Option<String>,
    #[serde(
        rename = "openconfig-module-catalog:prefix",
        alias = "prefix",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub prefix: Option<String>,
    /// Most recent revision date of the module source.
    #[serde(
        rename = "openconfig-module-catalog:revision",
        alias = "revision",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub revision: Option<String>,
    #[serde(
        rename = "openconfig-module-catalog:summary",
        alias = "summary",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<String>,
    #[serde(
        rename = "openconfig-module-catalog:dependencies",
        alias = "dependencies",
        default,
        skip_serializing_if = "Dependencies::is_empty"
    )]
    pub dependencies: Dependencies,
    #[serde(
        rename = "openconfig-module-catalog:submodules",
        alias = "submodules",
        default,
        skip_serializing_if = "Submodules::is_empty"
    )]
    pub submodules: Submodules,
    #[serde(
        rename = "openconfig-module-catalog:access",
        alias = "access",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub access: Option<Access>,
}

impl Module {
    /// Retrieval URI of the module source, if recorded.
    pub fn uri(&self) -> Option<&str> {
        self.access.as_ref().and_then(|access| access.uri.as_deref())
    }
}

impl Document for Module {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }
}
