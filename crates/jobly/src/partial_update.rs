//! Partial-update builder.
//!
//! Turns a runtime-shaped set of field updates into the `SET` part of an
//! `UPDATE` statement plus the values for its placeholders:
//!
//! ```ignore
//! use jobly::{ColumnMap, UpdateData, sql_for_partial_update};
//!
//! let mut data = UpdateData::new();
//! data.set("firstName", "Aliya").set("age", 32);
//!
//! let columns = ColumnMap::from_pairs([("firstName", "first_name")]);
//! let update = sql_for_partial_update(&data, &columns)?;
//!
//! assert_eq!(update.set_cols(), r#""first_name"=$1, "age"=$2"#);
//! ```
//!
//! Column names come from the translation table or from the update keys
//! themselves. Callers must restrict the keys to an allow-list first
//! (see [`UpdateData::ensure_allowed`]).

use crate::error::{JoblyError, JoblyResult};
use crate::param::{ParamList, placeholder, quote_ident};
use crate::value::SqlValue;
use std::collections::HashMap;

/// Field updates in the order they were given.
///
/// Keys are unique: setting a key twice replaces the earlier value but keeps
/// its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateData {
    fields: Vec<(String, SqlValue)>,
}

impl UpdateData {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Set a field value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<SqlValue>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
        self
    }

    /// Build from a JSON object, keeping its key order.
    pub fn from_json(value: &serde_json::Value) -> JoblyResult<Self> {
        let Some(object) = value.as_object() else {
            return Err(JoblyError::bad_request("update data must be a JSON object"));
        };

        let mut data = Self::new();
        for (key, value) in object {
            let value = SqlValue::from_json(value).map_err(|e| match e {
                JoblyError::BadRequest(msg) => {
                    JoblyError::bad_request(format!("field '{key}': {msg}"))
                }
                other => other,
            })?;
            data.set(key.as_str(), value);
        }
        Ok(data)
    }

    /// Reject any key that is not in `allowed`.
    pub fn ensure_allowed(&self, allowed: &[&str]) -> JoblyResult<()> {
        match self.keys().find(|key| !allowed.contains(key)) {
            Some(key) => Err(JoblyError::bad_request(format!(
                "field '{key}' cannot be updated"
            ))),
            None => Ok(()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&SqlValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for UpdateData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = Self::new();
        for (k, v) in iter {
            data.set(k, v);
        }
        data
    }
}

/// Translation from logical field names to physical column names.
///
/// Lookups are exact: `firstname` does not match a `firstName` key.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    columns: HashMap<String, String>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, C>(pairs: impl IntoIterator<Item = (K, C)>) -> Self
    where
        K: Into<String>,
        C: Into<String>,
    {
        Self {
            columns: pairs
                .into_iter()
                .map(|(k, c)| (k.into(), c.into()))
                .collect(),
        }
    }

    pub fn insert(&mut self, field: impl Into<String>, column: impl Into<String>) -> &mut Self {
        self.columns.insert(field.into(), column.into());
        self
    }

    /// Column name for `field`, or `field` itself when it has no translation.
    pub fn resolve<'a>(&'a self, field: &'a str) -> &'a str {
        self.columns.get(field).map_or(field, String::as_str)
    }
}

/// `SET` fragment and the values bound to it.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialUpdate {
    set_cols: String,
    params: ParamList,
}

impl PartialUpdate {
    /// Comma-separated `"column"=$n` assignments.
    pub fn set_cols(&self) -> &str {
        &self.set_cols
    }

    /// Values aligned with `$1..$n`.
    pub fn values(&self) -> &[SqlValue] {
        self.params.values()
    }

    /// Placeholder index for the first parameter after the `SET` values,
    /// e.g. the primary key in `WHERE id = $n`.
    pub fn next_index(&self) -> usize {
        self.params.next_index()
    }

    pub fn into_parts(self) -> (String, ParamList) {
        (self.set_cols, self.params)
    }
}

/// Build the `SET` fragment for a partial update.
///
/// Fails with [`JoblyError::BadRequest`] if `data` is empty.
pub fn sql_for_partial_update(data: &UpdateData, columns: &ColumnMap) -> JoblyResult<PartialUpdate> {
    if data.is_empty() {
        return Err(JoblyError::bad_request("No data"));
    }

    let mut params = ParamList::new();
    let mut assignments = Vec::with_capacity(data.len());
    for (field, value) in data.iter() {
        let idx = params.push(value.clone());
        assignments.push(format!(
            "{}={}",
            quote_ident(columns.resolve(field)),
            placeholder(idx)
        ));
    }

    Ok(PartialUpdate {
        set_cols: assignments.join(", "),
        params,
    })
}
