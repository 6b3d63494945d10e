/// Exact-match predicate over the record key.
///
/// Absent fields are not applied, so the default filter matches every record.
/// A present field is always applied, even when empty (and then matches
/// nothing, as no stored key component is empty).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub org_name: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
}

impl Filter {
    /// Filter matching every record.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn org_name(mut self, org_name: impl Into<String>) -> Self {
        self.org_name = Some(org_name.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Applied `(column, value)` pairs, always in key order.
    pub(crate) fn predicates(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("org_name", self.org_name.as_deref()),
            ("name", self.name.as_deref()),
            ("version", self.version.as_deref()),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.map(|value| (column, value)))
    }

    /// `WHERE` clause with numbered placeholders, and the values to bind to
    /// them in order. Empty when nothing is applied.
    pub(crate) fn to_sql(&self) -> (String, Vec<&str>) {
        let mut clause = String::new();
        let mut values = Vec::new();
        for (column, value) in self.predicates() {
            values.push(value);
            let keyword = if values.len() == 1 { " WHERE " } else { " AND " };
            clause.push_str(&format!("{keyword}{column} = ${}", values.len()));
        }
        (clause, values)
    }
}
