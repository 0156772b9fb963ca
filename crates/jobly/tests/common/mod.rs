//! Shared fixtures for database-backed tests.
//!
//! Every fixture opens its own connection and creates `companies` and `jobs`
//! as temporary tables, so tests never see each other's rows and nothing
//! outlives the session.

#![allow(dead_code)]

use jobly::{Job, NewJob};
use rust_decimal::Decimal;

pub async fn try_connect() -> Option<tokio_postgres::Client> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").ok()?;
    let (client, connection) = tokio_postgres::connect(&database_url, tokio_postgres::NoTls)
        .await
        .expect("Failed to connect to DATABASE_URL with NoTls");
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("tokio-postgres connection error: {e}");
        }
    });
    Some(client)
}

pub struct Fixture {
    pub client: tokio_postgres::Client,
    /// `worker`, salary 50000, equity 0, company `c1`.
    pub worker_id: i32,
    /// `manager`, salary 90000, equity 0.01, company `c1`.
    pub manager_id: i32,
}

/// Connect and seed two companies and two jobs, or `None` without a database.
pub async fn setup() -> Option<Fixture> {
    let client = try_connect().await?;

    client
        .batch_execute(
            "CREATE TEMP TABLE companies (
                 handle TEXT PRIMARY KEY,
                 name TEXT NOT NULL
             );
             CREATE TEMP TABLE jobs (
                 id SERIAL PRIMARY KEY,
                 title TEXT NOT NULL,
                 salary INTEGER CHECK (salary >= 0),
                 equity NUMERIC CHECK (equity <= 1.0),
                 company_handle TEXT NOT NULL REFERENCES companies ON DELETE CASCADE
             );
             INSERT INTO companies (handle, name) VALUES ('c1', 'C1'), ('c2', 'C2');",
        )
        .await
        .expect("create fixture tables");

    let worker = Job::create(
        &client,
        &NewJob::new("worker", "c1").salary(50000).equity(Decimal::ZERO),
    )
    .await
    .expect("seed worker");
    let manager = Job::create(
        &client,
        &NewJob::new("manager", "c1")
            .salary(90000)
            .equity(Decimal::new(1, 2)),
    )
    .await
    .expect("seed manager");

    Some(Fixture {
        client,
        worker_id: worker.id,
        manager_id: manager.id,
    })
}
