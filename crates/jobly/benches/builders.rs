use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use jobly::{ColumnMap, JobFilter, UpdateData, build_job_filter, sql_for_partial_update};

/// Update data with `n` fields: field0 = 0, field1 = 1, ...
fn build_update_data(n: usize) -> UpdateData {
    (0..n).map(|i| (format!("field{i}"), i as i64)).collect()
}

/// Column map translating every other field.
fn build_column_map(n: usize) -> ColumnMap {
    ColumnMap::from_pairs((0..n).step_by(2).map(|i| (format!("field{i}"), format!("col_{i}"))))
}

fn bench_partial_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("builders/partial_update");

    for n in [1, 5, 10, 50, 100] {
        let data = build_update_data(n);
        let columns = build_column_map(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            b.iter(|| black_box(sql_for_partial_update(data, &columns)));
        });
    }

    group.finish();
}

fn bench_update_from_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("builders/update_from_json");

    for n in [5, 20, 100] {
        let object: serde_json::Map<String, serde_json::Value> = (0..n)
            .map(|i| (format!("field{i}"), serde_json::Value::from(i)))
            .collect();
        let value = serde_json::Value::Object(object);
        group.bench_with_input(BenchmarkId::from_parameter(n), &value, |b, value| {
            b.iter(|| black_box(UpdateData::from_json(value)));
        });
    }

    group.finish();
}

fn bench_job_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("builders/job_filter");

    let cases = [
        ("none", JobFilter::new()),
        ("title", JobFilter::new().title("manage")),
        (
            "all",
            JobFilter::new()
                .title("manage")
                .min_salary(75000.0)
                .has_equity(true),
        ),
    ];
    for (name, filter) in &cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), filter, |b, filter| {
            b.iter(|| black_box(build_job_filter(filter)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_partial_update,
    bench_update_from_json,
    bench_job_filter
);
criterion_main!(benches);
