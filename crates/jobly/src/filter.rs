//! Filter composer for job listings.
//!
//! Each supplied criterion contributes one predicate; predicates are joined
//! with `AND` and their placeholders are numbered from `$1` in the order the
//! predicates are appended (title, then minimum salary). The equity flag
//! compares against a fixed zero and binds nothing.

use crate::error::{JoblyError, JoblyResult};
use crate::param::{ParamList, placeholder};
use crate::value::SqlValue;
use serde::Deserialize;

/// Optional criteria for narrowing a job listing.
///
/// An absent field places no constraint on its dimension. An empty `title`
/// counts as absent; `min_salary` of zero is a real bound.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    /// Case-insensitive substring of the job title.
    pub title: Option<String>,
    /// Inclusive lower bound on salary.
    pub min_salary: Option<f64>,
    /// When `true`, only jobs with equity greater than zero.
    pub has_equity: Option<bool>,
}

impl JobFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn min_salary(mut self, min_salary: f64) -> Self {
        self.min_salary = Some(min_salary);
        self
    }

    pub fn has_equity(mut self, has_equity: bool) -> Self {
        self.has_equity = Some(has_equity);
        self
    }
}

/// `AND`-joined predicates and the values bound to them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterFragment {
    clause: String,
    params: ParamList,
}

impl FilterFragment {
    /// The predicates without a leading `WHERE`; empty when nothing filters.
    pub fn clause(&self) -> &str {
        &self.clause
    }

    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }

    pub fn values(&self) -> &[SqlValue] {
        self.params.values()
    }

    /// ` WHERE <clause>` ready to append to a base `SELECT`, or `""`.
    pub fn where_sql(&self) -> String {
        if self.clause.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clause)
        }
    }

    pub fn into_parts(self) -> (String, ParamList) {
        (self.clause, self.params)
    }
}

/// One above the largest value an `integer` column can hold.
const INT4_CEILING: i64 = i32::MAX as i64 + 1;

/// Accumulates predicates while tracking the next placeholder index.
#[derive(Debug, Default)]
struct Predicates {
    clauses: Vec<String>,
    params: ParamList,
}

impl Predicates {
    /// Append `<lhs> $n`, binding `value` to the new placeholder.
    fn bind(&mut self, lhs: &str, value: impl Into<SqlValue>) {
        let idx = self.params.push(value);
        self.clauses.push(format!("{lhs} {}", placeholder(idx)));
    }

    /// Like [`Predicates::bind`], with the placeholder cast to `ty`.
    fn bind_cast(&mut self, lhs: &str, value: impl Into<SqlValue>, ty: &str) {
        let idx = self.params.push(value);
        self.clauses.push(format!("{lhs} {}::{ty}", placeholder(idx)));
    }

    /// Append a predicate that has no parameters.
    fn literal(&mut self, sql: &str) {
        self.clauses.push(sql.to_string());
    }

    fn finish(self) -> FilterFragment {
        FilterFragment {
            clause: self.clauses.join(" AND "),
            params: self.params,
        }
    }
}

/// Build the `WHERE` fragment for a job listing.
///
/// Fails with [`JoblyError::BadRequest`] when `min_salary` is negative or
/// not finite.
pub fn build_job_filter(filter: &JobFilter) -> JoblyResult<FilterFragment> {
    let mut predicates = Predicates::default();

    if let Some(title) = filter.title.as_deref().filter(|t| !t.is_empty()) {
        predicates.bind("title ILIKE", contains_pattern(title));
    }

    if let Some(min_salary) = filter.min_salary {
        if !min_salary.is_finite() || min_salary < 0.0 {
            return Err(JoblyError::bad_request(format!(
                "minSalary must be a non-negative number, got {min_salary}"
            )));
        }
        // salary is an integer column: `salary >= x` <=> `salary >= ceil(x)`.
        // Bounds past the INT4 range clamp to one above it and still match nothing.
        let bound = min_salary.ceil().min(INT4_CEILING as f64) as i64;
        predicates.bind_cast("salary >=", bound, "int8");
    }

    if filter.has_equity == Some(true) {
        predicates.literal("equity > 0");
    }

    Ok(predicates.finish())
}

/// `%text%` with LIKE metacharacters in `text` escaped.
fn contains_pattern(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}
