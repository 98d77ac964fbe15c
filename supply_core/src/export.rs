//! CSV inventory report.
//!
//! The report is a snapshot for spreadsheets; it is never read back.

use crate::{Result, Supplement};
use std::path::Path;
use tempfile::NamedTempFile;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    name: String,
    current_count: f64,
    initial_count: f64,
    cost: f64,
    tags: String,
    link: Option<String>,
    daily_dose: f64,
    auto_decrement: bool,
    days_remaining: Option<f64>,
    cost_per_day: Option<f64>,
}

impl From<&Supplement> for CsvRow {
    fn from(supplement: &Supplement) -> Self {
        CsvRow {
            name: supplement.name.clone(),
            current_count: supplement.current_count,
            initial_count: supplement.initial_count,
            cost: supplement.cost,
            tags: supplement.tags.join(";"),
            link: supplement.link.clone(),
            daily_dose: supplement.daily_dose,
            auto_decrement: supplement.auto_decrement,
            days_remaining: supplement.days_remaining(),
            cost_per_day: supplement.cost_per_day(),
        }
    }
}

/// Write one row per supplement to `path`, replacing any existing file.
///
/// Returns the number of rows written.
pub fn write_csv<'a, I>(supplements: I, path: &Path) -> Result<usize>
where
    I: IntoIterator<Item = &'a Supplement>,
{
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(temp.as_file());

    let mut count = 0;
    for supplement in supplements {
        writer.serialize(CsvRow::from(supplement))?;
        count += 1;
    }

    // Headers come from the first serialized row, so an empty export
    // still needs them written by hand
    if count == 0 {
        writer.write_record([
            "name",
            "current_count",
            "initial_count",
            "cost",
            "tags",
            "link",
            "daily_dose",
            "auto_decrement",
            "days_remaining",
            "cost_per_day",
        ])?;
    }

    writer.flush()?;
    drop(writer);
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| crate::Error::Io(e.error))?;

    tracing::info!("Exported {} supplements to {:?}", count, path);
    Ok(count)
}
