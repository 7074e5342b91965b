use std::path::Path;

use crate::error::Result;
use crate::model::ScheduleData;

use super::csv_import;

/// Load a schedule document, choosing the format by file extension:
/// `.csv`/`.tsv`/`.txt` go through the CSV importer, anything else is JSON.
pub fn load_schedule(path: &Path) -> Result<ScheduleData> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("csv" | "tsv" | "txt") => csv_import::import_csv(path),
        _ => {
            let json = std::fs::read_to_string(path)?;
            let data = parse_json(&json)?;
            log::info!("Read {} job record(s) from {:?}", data.jobs.len(), path);
            Ok(data)
        }
    }
}

pub fn parse_json(json: &str) -> Result<ScheduleData> {
    Ok(serde_json::from_str(json)?)
}
