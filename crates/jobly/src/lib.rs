//! # jobly
//!
//! Data access for job postings on PostgreSQL.
//!
//! ## Features
//!
//! - **Partial updates**: turn a runtime-shaped set of fields into a
//!   parameterized `SET` fragment with [`sql_for_partial_update`]
//! - **Filtered listings**: compose optional criteria into one `WHERE`
//!   fragment with [`build_job_filter`]
//! - **Job resource**: [`Job::create`], [`Job::find_all`], [`Job::get`],
//!   [`Job::update`] and [`Job::remove`] over any [`GenericClient`]
//! - **SQL tracing**: [`TracedClient`] logs every statement through `tracing`
//!
//! ```ignore
//! use jobly::{Job, JobFilter, UpdateData};
//!
//! let pool = jobly::create_pool(&database_url)?;
//! let client = pool.get().await?;
//!
//! let filter = JobFilter::new().title("manage").min_salary(75000.0);
//! let jobs = Job::find_all(&client, Some(&filter)).await?;
//!
//! let mut data = UpdateData::new();
//! data.set("salary", 95000);
//! let job = Job::update(&client, jobs[0].id, &data).await?;
//! ```

pub mod client;
pub mod error;
pub mod filter;
pub mod job;
pub mod param;
pub mod partial_update;
pub mod row;
pub mod trace;
pub mod value;

pub use client::GenericClient;
pub use error::{JoblyError, JoblyResult};
pub use filter::{FilterFragment, JobFilter, build_job_filter};
pub use job::{Job, NewJob};
pub use param::{ParamList, placeholder, quote_ident};
pub use partial_update::{ColumnMap, PartialUpdate, UpdateData, sql_for_partial_update};
pub use row::{FromRow, RowExt};
pub use trace::TracedClient;
pub use value::SqlValue;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};

// Re-export tokio_postgres types for convenience
pub use tokio_postgres;
pub use tokio_postgres::Row;
