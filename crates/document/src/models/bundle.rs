use crate::Document;
use serde::{Deserialize, Serialize};

/// A module pinned by a feature bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleReference {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleModules {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub module: Vec<ModuleReference>,
}

impl BundleModules {
    pub fn is_empty(&self) -> bool {
        self.module.is_empty()
    }
}

/// A named, versioned set of modules that together implement a feature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureBundle {
    #[serde(rename = "openconfig-module-catalog:name", alias = "name", default)]
    pub name: String,
    #[serde(rename = "openconfig-module-catalog:version", alias = "version", default)]
    pub version: String,
    #[serde(
        rename = "openconfig-module-catalog:summary",
        alias = "summary",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<String>,
    #[serde(
        rename = "openconfig-module-catalog:modules",
        alias = "modules",
        default,
        skip_serializing_if = "BundleModules::is_empty"
    )]
    pub modules: BundleModules,
}

impl Document for FeatureBundle {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }
}
