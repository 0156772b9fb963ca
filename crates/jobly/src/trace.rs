//! `tracing` instrumentation for SQL statements.

use crate::client::GenericClient;
use crate::error::JoblyResult;
use std::time::{Duration, Instant};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::Level;

/// Wraps a [`GenericClient`] and emits one `tracing` event per statement.
///
/// Events use the `jobly.sql` target and carry the SQL, parameter count,
/// elapsed time and row count. Failed statements are reported at `WARN`
/// with the error.
///
/// ```ignore
/// let client = TracedClient::new(pool.get().await?).level(Level::INFO);
/// let job = Job::get(&client, 7).await?;
/// ```
#[derive(Debug, Clone)]
pub struct TracedClient<C> {
    inner: C,
    level: Level,
    max_sql_length: Option<usize>,
}

impl<C: GenericClient> TracedClient<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }

    /// Override the tracing event level for successful statements.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    fn record<T>(
        &self,
        sql: &str,
        param_count: usize,
        elapsed: Duration,
        result: &JoblyResult<T>,
        rows: impl FnOnce(&T) -> u64,
    ) {
        let sql = truncate_sql(sql, self.max_sql_length);
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;

        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        match result {
            Ok(value) => {
                let rows = rows(value);
                emit_at_level!(
                    self.level,
                    target: "jobly.sql",
                    sql = %sql,
                    param_count,
                    elapsed_ms,
                    rows,
                )
            }
            Err(err) => tracing::warn!(
                target: "jobly.sql",
                sql = %sql,
                param_count,
                elapsed_ms,
                error = %err,
                "statement failed"
            ),
        }
    }
}

impl<C: GenericClient> GenericClient for TracedClient<C> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<Vec<Row>> {
        let start = Instant::now();
        let result = self.inner.query(sql, params).await;
        self.record(sql, params.len(), start.elapsed(), &result, |rows| {
            rows.len() as u64
        });
        result
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> JoblyResult<u64> {
        let start = Instant::now();
        let result = self.inner.execute(sql, params).await;
        self.record(sql, params.len(), start.elapsed(), &result, |n| *n);
        result
    }
}

/// Truncate `sql` to at most `max` bytes on a char boundary, marking the cut.
fn truncate_sql(sql: &str, max: Option<usize>) -> String {
    match max {
        Some(max) if sql.len() > max => {
            let mut end = max;
            while !sql.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &sql[..end])
        }
        _ => sql.to_string(),
    }
}
