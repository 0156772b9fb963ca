//! Job resource layer against a live database.
//!
//! Requires `DATABASE_URL`; every test returns early without it.

mod common;

use jobly::{Job, JobFilter, NewJob, SqlValue, TracedClient, UpdateData};
use rust_decimal::Decimal;
use serde_json::json;

fn titles(jobs: &[Job]) -> Vec<&str> {
    jobs.iter().map(|j| j.title.as_str()).collect()
}

// ==================== create ====================

#[tokio::test]
async fn create_then_get_roundtrips() {
    let Some(fx) = common::setup().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let new_job = NewJob::new("Nice One", "c2")
        .salary(100000)
        .equity(Decimal::new(5, 2));
    let job = Job::create(&fx.client, &new_job).await.unwrap();

    assert_eq!(job.title, "Nice One");
    assert_eq!(job.salary, Some(100000));
    assert_eq!(job.equity, Some(Decimal::new(5, 2)));
    assert_eq!(job.company_handle, "c2");

    let fetched = Job::get(&fx.client, job.id).await.unwrap();
    assert_eq!(fetched, job);
}

#[tokio::test]
async fn create_rejects_invalid_payload_without_inserting() {
    let Some(fx) = common::setup().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let err = Job::create(&fx.client, &NewJob::new("", "c1"))
        .await
        .unwrap_err();
    assert!(err.is_bad_request());

    let jobs = Job::find_all(&fx.client, None).await.unwrap();
    assert_eq!(jobs.len(), 2);
}

#[tokio::test]
async fn create_for_unknown_company_propagates_database_error() {
    let Some(fx) = common::setup().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let err = Job::create(&fx.client, &NewJob::new("ghost", "nope"))
        .await
        .unwrap_err();
    // foreign_key_violation
    assert_eq!(err.sql_state(), Some("23503"));
    assert_eq!(err.status_code(), 500);
}

// ==================== find_all ====================

#[tokio::test]
async fn find_all_without_filter_is_ordered_by_title() {
    let Some(fx) = common::setup().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let jobs = Job::find_all(&fx.client, None).await.unwrap();
    assert_eq!(titles(&jobs), ["manager", "worker"]);
    assert_eq!(jobs[1].salary, Some(50000));
    assert_eq!(jobs[1].equity, Some(Decimal::ZERO));
    assert_eq!(jobs[1].company_handle, "c1");

    let empty = Job::find_all(&fx.client, Some(&JobFilter::new()))
        .await
        .unwrap();
    assert_eq!(empty, jobs);
}

#[tokio::test]
async fn find_all_with_every_filter() {
    let Some(fx) = common::setup().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let filter = JobFilter::new()
        .title("manage")
        .min_salary(75000.0)
        .has_equity(true);
    let jobs = Job::find_all(&fx.client, Some(&filter)).await.unwrap();

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].id, fx.manager_id);
    assert_eq!(jobs[0].salary, Some(90000));
    assert_eq!(jobs[0].equity, Some(Decimal::new(1, 2)));
}

#[tokio::test]
async fn find_all_with_single_filters() {
    let Some(fx) = common::setup().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let by_title = Job::find_all(&fx.client, Some(&JobFilter::new().title("MANAGE")))
        .await
        .unwrap();
    assert_eq!(titles(&by_title), ["manager"]);

    let by_salary = Job::find_all(&fx.client, Some(&JobFilter::new().min_salary(90000.0)))
        .await
        .unwrap();
    assert_eq!(titles(&by_salary), ["manager"]);

    let by_equity = Job::find_all(&fx.client, Some(&JobFilter::new().has_equity(true)))
        .await
        .unwrap();
    assert_eq!(titles(&by_equity), ["manager"]);

    let nothing = Job::find_all(&fx.client, Some(&JobFilter::new().title("ceo")))
        .await
        .unwrap();
    assert!(nothing.is_empty());
}

#[tokio::test]
async fn title_filter_matches_wildcards_literally() {
    let Some(fx) = common::setup().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let jobs = Job::find_all(&fx.client, Some(&JobFilter::new().title("%")))
        .await
        .unwrap();
    assert!(jobs.is_empty());
}

#[tokio::test]
async fn min_salary_above_integer_range_matches_nothing() {
    let Some(fx) = common::setup().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    for bound in [3.0e9, 1.0e300] {
        let jobs = Job::find_all(&fx.client, Some(&JobFilter::new().min_salary(bound)))
            .await
            .unwrap();
        assert!(jobs.is_empty(), "{bound} should match nothing");
    }
}

#[tokio::test]
async fn find_all_rejects_negative_min_salary() {
    let Some(fx) = common::setup().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let err = Job::find_all(&fx.client, Some(&JobFilter::new().min_salary(-5.0)))
        .await
        .unwrap_err();
    assert!(err.is_bad_request());
}

// ==================== get ====================

#[tokio::test]
async fn get_returns_seeded_jobs() {
    let Some(fx) = common::setup().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let worker = Job::get(&fx.client, fx.worker_id).await.unwrap();
    assert_eq!(worker.title, "worker");
    assert_eq!(worker.salary, Some(50000));

    let manager = Job::get(&fx.client, fx.manager_id).await.unwrap();
    assert_eq!(manager.title, "manager");
    assert_eq!(manager.equity, Some(Decimal::new(1, 2)));
}

#[tokio::test]
async fn get_missing_job_is_not_found() {
    let Some(fx) = common::setup().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let err = Job::get(&fx.client, 0).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.status_code(), 404);
}

// ==================== update ====================

#[tokio::test]
async fn update_sets_fields() {
    let Some(fx) = common::setup().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let data = UpdateData::from_json(&json!({
        "title": "skilled worker",
        "salary": 75000,
        "equity": "0"
    }))
    .unwrap();
    let job = Job::update(&fx.client, fx.worker_id, &data).await.unwrap();

    assert_eq!(job.id, fx.worker_id);
    assert_eq!(job.title, "skilled worker");
    assert_eq!(job.salary, Some(75000));
    assert_eq!(job.equity, Some(Decimal::ZERO));
    assert_eq!(job.company_handle, "c1");

    assert_eq!(Job::get(&fx.client, fx.worker_id).await.unwrap(), job);
}

#[tokio::test]
async fn update_with_nulls_clears_columns() {
    let Some(fx) = common::setup().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let mut data = UpdateData::new();
    data.set("title", "skilled worker")
        .set("salary", SqlValue::Null)
        .set("equity", SqlValue::Null);
    let job = Job::update(&fx.client, fx.worker_id, &data).await.unwrap();

    assert_eq!(job.title, "skilled worker");
    assert_eq!(job.salary, None);
    assert_eq!(job.equity, None);
}

#[tokio::test]
async fn update_single_field_leaves_others() {
    let Some(fx) = common::setup().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let mut data = UpdateData::new();
    data.set("equity", Decimal::new(2, 2));
    let job = Job::update(&fx.client, fx.manager_id, &data).await.unwrap();

    assert_eq!(job.title, "manager");
    assert_eq!(job.salary, Some(90000));
    assert_eq!(job.equity, Some(Decimal::new(2, 2)));
}

#[tokio::test]
async fn update_missing_job_is_not_found() {
    let Some(fx) = common::setup().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let mut data = UpdateData::new();
    data.set("title", "skilled worker");
    let err = Job::update(&fx.client, 0, &data).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn update_without_data_is_bad_request() {
    let Some(fx) = common::setup().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let err = Job::update(&fx.client, fx.worker_id, &UpdateData::new())
        .await
        .unwrap_err();
    assert!(err.is_bad_request());
}

#[tokio::test]
async fn update_rejects_fields_outside_allow_list() {
    let Some(fx) = common::setup().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    for field in ["id", "companyHandle", "title\" = 'x', \"salary"] {
        let mut data = UpdateData::new();
        data.set(field, "c2");
        let err = Job::update(&fx.client, fx.worker_id, &data)
            .await
            .unwrap_err();
        assert!(err.is_bad_request(), "{field} should be rejected");
    }

    let job = Job::get(&fx.client, fx.worker_id).await.unwrap();
    assert_eq!(job.company_handle, "c1");
}

#[tokio::test]
async fn update_rejects_negative_salary_in_any_shape() {
    let Some(fx) = common::setup().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    for data in [json!({"salary": -5.0}), json!({"salary": "-5"}), json!({"title": 5})] {
        let data = UpdateData::from_json(&data).unwrap();
        let err = Job::update(&fx.client, fx.worker_id, &data)
            .await
            .unwrap_err();
        assert!(err.is_bad_request());
    }

    let worker = Job::get(&fx.client, fx.worker_id).await.unwrap();
    assert_eq!(worker.salary, Some(50000));
    assert_eq!(worker.title, "worker");
}

// ==================== remove ====================

#[tokio::test]
async fn remove_deletes_job() {
    let Some(fx) = common::setup().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let removed = Job::remove(&fx.client, fx.manager_id).await.unwrap();
    assert_eq!(removed, fx.manager_id);

    let err = Job::get(&fx.client, fx.manager_id).await.unwrap_err();
    assert!(err.is_not_found());

    let jobs = Job::find_all(&fx.client, None).await.unwrap();
    assert_eq!(titles(&jobs), ["worker"]);
}

#[tokio::test]
async fn remove_missing_job_is_not_found() {
    let Some(fx) = common::setup().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let err = Job::remove(&fx.client, 0).await.unwrap_err();
    assert!(err.is_not_found());
}

// ==================== clients ====================

#[tokio::test]
async fn operations_run_inside_caller_transaction() {
    let Some(mut fx) = common::setup().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let tx = fx.client.transaction().await.unwrap();
    Job::remove(&tx, fx.worker_id).await.unwrap();
    assert!(Job::get(&tx, fx.worker_id).await.unwrap_err().is_not_found());
    tx.rollback().await.unwrap();

    let worker = Job::get(&fx.client, fx.worker_id).await.unwrap();
    assert_eq!(worker.title, "worker");
}

#[tokio::test]
async fn traced_client_passes_results_through() {
    let Some(fx) = common::setup().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };

    let traced = TracedClient::new(&fx.client).max_sql_length(40);
    let jobs = Job::find_all(&traced, Some(&JobFilter::new().has_equity(true)))
        .await
        .unwrap();
    assert_eq!(titles(&jobs), ["manager"]);

    let err = Job::get(&traced, 0).await.unwrap_err();
    assert!(err.is_not_found());
}
