mod bundle;
mod module;

pub use self::bundle::{BundleModules, FeatureBundle, ModuleReference};
pub use self::module::{Access, Dependencies, Module, Submodule, Submodules};
