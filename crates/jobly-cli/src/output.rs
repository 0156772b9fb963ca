use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use jobly::Job;
use serde::Serialize;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_jobs(jobs: &[Job]) {
    if jobs.is_empty() {
        println!("no jobs found");
        return;
    }
    println!("{}", jobs_table(jobs));
}

pub fn jobs_table(jobs: &[Job]) -> Table {
    let header = ["ID", "Title", "Salary", "Equity", "Company"]
        .into_iter()
        .map(|h| Cell::new(h).add_attribute(Attribute::Bold).fg(Color::Cyan));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for job in jobs {
        table.add_row(vec![
            Cell::new(job.id).fg(Color::Yellow),
            Cell::new(&job.title),
            Cell::new(or_dash(job.salary)),
            Cell::new(or_dash(job.equity)),
            Cell::new(&job.company_handle).fg(Color::Magenta),
        ]);
    }
    table
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
