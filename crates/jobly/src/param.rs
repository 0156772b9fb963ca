//! Positional parameter storage and placeholder helpers.

use crate::value::SqlValue;
use tokio_postgres::types::ToSql;

/// An ordered collection of bound values.
///
/// The value at position `i` (0-based) belongs to placeholder `$i+1`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamList {
    values: Vec<SqlValue>,
}

impl ParamList {
    /// Create a new empty parameter list.
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Add a value and return its 1-based placeholder index.
    pub fn push(&mut self, value: impl Into<SqlValue>) -> usize {
        self.values.push(value.into());
        self.values.len()
    }

    /// Index the next pushed value will get.
    pub fn next_index(&self) -> usize {
        self.values.len() + 1
    }

    /// Get the current parameter count.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bound values in placeholder order.
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Consume the list, returning the values in placeholder order.
    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }

    /// Get all parameters as references for tokio-postgres.
    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
    }
}

impl From<Vec<SqlValue>> for ParamList {
    fn from(values: Vec<SqlValue>) -> Self {
        Self { values }
    }
}

/// Render the placeholder for a 1-based index: `$1`, `$2`, ...
pub fn placeholder(index: usize) -> String {
    format!("${index}")
}

/// Quote a column name as a Postgres identifier.
///
/// The name is wrapped in double quotes and embedded quotes are doubled, so
/// the result always parses as a single identifier.
pub fn quote_ident(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('"');
    for c in name.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_returns_one_based_index() {
        let mut params = ParamList::new();
        assert_eq!(params.next_index(), 1);
        assert_eq!(params.push("a"), 1);
        assert_eq!(params.push(2), 2);
        assert_eq!(params.next_index(), 3);
        assert_eq!(params.len(), 2);
        assert_eq!(params.as_refs().len(), 2);
    }

    #[test]
    fn quote_ident_doubles_quotes() {
        assert_eq!(quote_ident("age"), "\"age\"");
        assert_eq!(quote_ident("first_name"), "\"first_name\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn placeholder_renders_dollar_index() {
        assert_eq!(placeholder(1), "$1");
        assert_eq!(placeholder(12), "$12");
    }
}
