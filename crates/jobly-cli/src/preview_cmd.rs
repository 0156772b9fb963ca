//! SQL fragment previews. Nothing here touches the database.

use crate::cli::{FilterArgs, PreviewUpdateArgs};
use jobly::{ColumnMap, SqlValue, UpdateData, build_job_filter, placeholder, sql_for_partial_update};
use std::fmt::Write as _;

pub fn update(args: PreviewUpdateArgs) -> anyhow::Result<()> {
    print!("{}", render_update(&args)?);
    Ok(())
}

pub fn filter(args: FilterArgs) -> anyhow::Result<()> {
    print!("{}", render_filter(&args)?);
    Ok(())
}

fn render_update(args: &PreviewUpdateArgs) -> anyhow::Result<String> {
    let value: serde_json::Value = serde_json::from_str(&args.data)
        .map_err(|e| anyhow::anyhow!("--data is not valid JSON: {e}"))?;
    let data = UpdateData::from_json(&value)?;
    let columns = ColumnMap::from_pairs(args.columns.iter().cloned());

    let update = sql_for_partial_update(&data, &columns)?;

    let mut out = format!("SET {}\n", update.set_cols());
    write_params(&mut out, update.values());
    let _ = writeln!(out, "next placeholder: {}", placeholder(update.next_index()));
    Ok(out)
}

fn render_filter(args: &FilterArgs) -> anyhow::Result<String> {
    let fragment = build_job_filter(&args.to_filter())?;

    let mut out = if fragment.is_empty() {
        "(no filter)\n".to_string()
    } else {
        format!("WHERE {}\n", fragment.clause())
    };
    write_params(&mut out, fragment.values());
    Ok(out)
}

fn write_params(out: &mut String, values: &[SqlValue]) {
    for (i, value) in values.iter().enumerate() {
        let _ = writeln!(out, "  {} = {value}", placeholder(i + 1));
    }
}
