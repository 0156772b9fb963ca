//! Job postings.
//!
//! Every operation takes a [`GenericClient`], so it runs the same way on a
//! plain connection, a pooled connection, or a transaction the caller owns.

use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::filter::{JobFilter, build_job_filter};
use crate::param::placeholder;
use crate::partial_update::{ColumnMap, UpdateData, sql_for_partial_update};
use crate::row::{FromRow, RowExt};
use crate::value::SqlValue;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tokio_postgres::Row;

/// Columns returned by every job query, in [`Job`] field order.
pub const JOB_COLUMNS: &str = "id, title, salary, equity, company_handle";

/// Fields [`Job::update`] accepts. The id and the owning company are fixed.
pub const UPDATABLE_FIELDS: &[&str] = &["title", "salary", "equity"];

/// A job posting as stored in the `jobs` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    /// Fraction of the company offered, `0..=1`.
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

/// Payload for [`Job::create`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl NewJob {
    pub fn new(title: impl Into<String>, company_handle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            salary: None,
            equity: None,
            company_handle: company_handle.into(),
        }
    }

    pub fn salary(mut self, salary: i32) -> Self {
        self.salary = Some(salary);
        self
    }

    pub fn equity(mut self, equity: Decimal) -> Self {
        self.equity = Some(equity);
        self
    }

    /// Check the payload before it reaches the database.
    pub fn validate(&self) -> JoblyResult<()> {
        if self.title.trim().is_empty() {
            return Err(JoblyError::bad_request("title must not be empty"));
        }
        if self.company_handle.trim().is_empty() {
            return Err(JoblyError::bad_request("companyHandle must not be empty"));
        }
        if let Some(salary) = self.salary {
            check_salary(i64::from(salary))?;
        }
        if let Some(equity) = self.equity {
            check_equity(equity)?;
        }
        Ok(())
    }
}

fn check_salary(salary: i64) -> JoblyResult<()> {
    if salary < 0 {
        return Err(JoblyError::bad_request(format!(
            "salary must be non-negative, got {salary}"
        )));
    }
    Ok(())
}

fn check_equity(equity: Decimal) -> JoblyResult<()> {
    if equity < Decimal::ZERO || equity > Decimal::ONE {
        return Err(JoblyError::bad_request(format!(
            "equity must be between 0 and 1, got {equity}"
        )));
    }
    Ok(())
}

/// Range checks for update values whose type is already known.
///
/// Values of other shapes are left to the server, which rejects them at
/// encode time.
fn check_update_values(data: &UpdateData) -> JoblyResult<()> {
    for (field, value) in data.iter() {
        match (field, value) {
            ("title", SqlValue::Text(title)) if title.trim().is_empty() => {
                return Err(JoblyError::bad_request("title must not be empty"));
            }
            ("title", SqlValue::Null) => {
                return Err(JoblyError::bad_request("title cannot be null"));
            }
            ("title", SqlValue::Text(_)) => {}
            ("title", other) => {
                return Err(JoblyError::bad_request(format!(
                    "title must be a string, got {other}"
                )));
            }
            ("salary", SqlValue::Int(salary)) => check_salary(*salary)?,
            ("salary", SqlValue::Float(salary)) if *salary < 0.0 => {
                return Err(JoblyError::bad_request(format!(
                    "salary must be non-negative, got {salary}"
                )));
            }
            // Same parsing the encoder applies to text bound to an integer column.
            ("salary", SqlValue::Text(salary)) => {
                if let Ok(salary) = salary.trim().parse::<i64>() {
                    check_salary(salary)?;
                }
            }
            ("equity", SqlValue::Numeric(equity)) => check_equity(*equity)?,
            ("equity", SqlValue::Int(equity)) => check_equity(Decimal::from(*equity))?,
            ("equity", SqlValue::Float(equity)) => {
                let equity = Decimal::try_from(*equity)
                    .map_err(|e| JoblyError::bad_request(format!("equity: {e}")))?;
                check_equity(equity)?;
            }
            ("equity", SqlValue::Text(equity)) => {
                let equity = Decimal::from_str(equity.trim())
                    .map_err(|e| JoblyError::bad_request(format!("equity: {e}")))?;
                check_equity(equity)?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Translation from update keys to `jobs` columns.
pub fn column_map() -> ColumnMap {
    ColumnMap::from_pairs([("companyHandle", "company_handle")])
}

impl Job {
    /// Insert a job and return the stored row.
    ///
    /// Fails with [`JoblyError::BadRequest`] if the payload is invalid.
    pub async fn create(conn: &impl GenericClient, data: &NewJob) -> JoblyResult<Job> {
        data.validate()?;

        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {JOB_COLUMNS}"
        );
        let row = conn
            .query_one(
                &sql,
                &[&data.title, &data.salary, &data.equity, &data.company_handle],
            )
            .await?;
        Job::from_row(&row)
    }

    /// All jobs matching `filter`, ordered by title.
    pub async fn find_all(
        conn: &impl GenericClient,
        filter: Option<&JobFilter>,
    ) -> JoblyResult<Vec<Job>> {
        let fragment = match filter {
            Some(filter) => build_job_filter(filter)?,
            None => Default::default(),
        };

        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs{} ORDER BY title, id",
            fragment.where_sql()
        );
        let (_, params) = fragment.into_parts();
        let rows = conn.query(&sql, &params.as_refs()).await?;
        rows.iter().map(Job::from_row).collect()
    }

    /// Fetch one job by id.
    pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<Job> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1");
        match conn.query_opt(&sql, &[&id]).await? {
            Some(row) => Job::from_row(&row),
            None => Err(no_job(id)),
        }
    }

    /// Apply a partial update and return the updated row.
    ///
    /// Only [`UPDATABLE_FIELDS`] may appear in `data`; a null value clears
    /// the column. Fails with [`JoblyError::BadRequest`] for empty or
    /// disallowed data and [`JoblyError::NotFound`] if the job is missing.
    pub async fn update(conn: &impl GenericClient, id: i32, data: &UpdateData) -> JoblyResult<Job> {
        data.ensure_allowed(UPDATABLE_FIELDS)?;
        check_update_values(data)?;

        let update = sql_for_partial_update(data, &column_map())?;
        let id_idx = update.next_index();
        let (set_cols, mut params) = update.into_parts();
        params.push(id);

        let sql = format!(
            "UPDATE jobs SET {set_cols} WHERE id = {} RETURNING {JOB_COLUMNS}",
            placeholder(id_idx)
        );
        match conn.query_opt(&sql, &params.as_refs()).await? {
            Some(row) => Job::from_row(&row),
            None => Err(no_job(id)),
        }
    }

    /// Delete a job, returning its id.
    pub async fn remove(conn: &impl GenericClient, id: i32) -> JoblyResult<i32> {
        let row = conn
            .query_opt("DELETE FROM jobs WHERE id = $1 RETURNING id", &[&id])
            .await?
            .ok_or_else(|| no_job(id))?;
        row.try_get_column("id")
    }
}

fn no_job(id: i32) -> JoblyError {
    JoblyError::not_found(format!("No job: {id}"))
}
