use crate::error::{Error, ErrorKind, Result};
use derive_more::Display;

/// The two kinds of record the catalog keeps, one table each.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    #[display("module")]
    Module,
    #[display("feature bundle")]
    FeatureBundle,
}

impl RecordKind {
    pub(crate) fn table(self) -> &'static str {
        match self {
            Self::Module => "modules",
            Self::FeatureBundle => "feature_bundles",
        }
    }
}

/// Composite key of a record: unique per [`RecordKind`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    org_name: String,
    name: String,
    version: String,
}

impl RecordKey {
    /// Build a key, rejecting empty components.
    pub fn new(org_name: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Result<Self> {
        let key = Self {
            org_name: org_name.into(),
            name: name.into(),
            version: version.into(),
        };
        for (field, value) in [("org_name", &key.org_name), ("name", &key.name), ("version", &key.version)] {
            if value.is_empty() {
                exn::bail!(ErrorKind::InvalidKey(field));
            }
        }
        Ok(key)
    }

    pub fn org_name(&self) -> &str {
        &self.org_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

/// A stored record: its key and the serialized document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub kind: RecordKind,
    pub key: RecordKey,
    pub data: String,
}

#[derive(sqlx::FromRow)]
pub(crate) struct RecordRow {
    org_name: String,
    name: String,
    version: String,
    data: String,
}

impl RecordRow {
    pub(crate) fn into_record(self, kind: RecordKind) -> Result<Record> {
        let key = RecordKey::new(self.org_name, self.name, self.version)
            .map_err(|err: Error| err.raise(ErrorKind::InvalidData("key")))?;
        Ok(Record { kind, key, data: self.data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "bgp", "1.0.0", "org_name")]
    #[case("openconfig", "", "1.0.0", "name")]
    #[case("openconfig", "bgp", "", "version")]
    fn test_empty_key_component(#[case] org: &str, #[case] name: &str, #[case] version: &str, #[case] field: &'static str) {
        let err = RecordKey::new(org, name, version).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidKey(field));
    }

    #[test]
    fn test_row_to_record() {
        let row = RecordRow {
            org_name: "openconfig".to_string(),
            name: "bgp".to_string(),
            version: "1.0.0".to_string(),
            data: "{}".to_string(),
        };
        let record = row.into_record(RecordKind::Module).unwrap();
        assert_eq!(record.key, RecordKey::new("openconfig", "bgp", "1.0.0").unwrap());
        assert_eq!(record.data, "{}");
    }

    #[test]
    fn test_invalid_row() {
        let row = RecordRow {
            org_name: String::new(),
            name: "bgp".to_string(),
            version: "1.0.0".to_string(),
            data: "{}".to_string(),
        };
        let err = row.into_record(RecordKind::FeatureBundle).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidData("key"));
    }

    #[test]
    fn test_tables() {
        assert_eq!(RecordKind::Module.table(), "modules");
        assert_eq!(RecordKind::FeatureBundle.table(), "feature_bundles");
    }
}
