use crate::error::Result;
use crate::pipeline::AnalysisReport;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    fs::write(path, s)?;
    Ok(())
}

/// Markdown rendering of the first `max_rows` rows.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    println!("{}\n", render_table(rows, max_rows));
}

/// Export every table of a report into `dir`, one CSV each plus
/// `summary.json`. Returns the files written.
pub fn write_report(dir: &Path, report: &AnalysisReport) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    let mut target = |name: &str| {
        let path = dir.join(name);
        written.push(path.clone());
        path
    };

    write_csv(&target("neighbourhood_counts.csv"), &report.neighbourhood_counts)?;
    write_csv(&target("district_counts.csv"), &report.district_counts)?;
    write_csv(&target("roomy_listings.csv"), &report.roomy_listings)?;
    write_csv(&target("cheapest_listings.csv"), &report.cheapest)?;
    write_csv(&target("owner_counts.csv"), &report.owner_counts)?;
    write_csv(&target("owner_counts_focus.csv"), &report.owner_counts_in_focus)?;
    write_csv(&target("owner_concentration.csv"), &report.concentration)?;
    write_csv(&target("type_share_focus.csv"), &report.type_share_in_focus)?;
    write_csv(&target("type_mix.csv"), &report.type_mix)?;
    write_csv(&target("price_per_person.csv"), &report.price_per_person)?;
    write_csv(&target("price_vs_rating.csv"), &report.price_vs_rating)?;
    write_json(&target("summary.json"), &report.summary)?;

    info!(dir = %dir.display(), files = written.len(), "report written");
    Ok(written)
}
