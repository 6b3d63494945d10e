//! SQL statement text shared by both engines.
//!
//! Statements only ever interpolate table and column names chosen by this
//! crate. Values are bound through `$n` placeholders, which both PostgreSQL
//! and SQLite accept.

use crate::filter::Filter;
use crate::record::RecordKind;

/// The few places where the engines disagree on how `data` is handled.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Dialect {
    /// Placeholder expression used when writing `data`.
    data_param: &'static str,
    /// Expression used when reading `data` back as text.
    data_column: &'static str,
}

pub(crate) const SQLITE: Dialect = Dialect {
    data_param: "$4",
    data_column: "data",
};

pub(crate) const POSTGRES: Dialect = Dialect {
    data_param: "$4::jsonb",
    data_column: "data::text",
};

impl Dialect {
    pub(crate) fn insert(self, kind: RecordKind) -> String {
        format!(
            "INSERT INTO {} (org_name, name, version, data) VALUES ($1, $2, $3, {})",
            kind.table(),
            self.data_param
        )
    }

    pub(crate) fn upsert(self, kind: RecordKind) -> String {
        format!(
            "{} ON CONFLICT (org_name, name, version) DO UPDATE SET data = excluded.data",
            self.insert(kind)
        )
    }

    pub(crate) fn delete(self, kind: RecordKind) -> String {
        format!("DELETE FROM {} WHERE org_name = $1 AND name = $2 AND version = $3", kind.table())
    }

    /// Select statement and the values to bind, in order.
    pub(crate) fn select(self, kind: RecordKind, filter: &Filter) -> (String, Vec<&str>) {
        let (clause, values) = filter.to_sql();
        let statement = format!(
            "SELECT org_name, name, version, {} AS data FROM {}{clause} ORDER BY org_name, name, version",
            self.data_column,
            kind.table()
        );
        (statement, values)
    }
}
