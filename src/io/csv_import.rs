use std::path::Path;

use crate::error::{ChartError, Result};
use crate::model::schedule::{JobRecord, ResourceRecord, TimeValue};
use crate::model::ScheduleData;

/// Columns with a fixed meaning. Anything else becomes a display field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Id,
    Name,
    Resource,
    Start,
    End,
    Color,
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs && semicolons > 0 {
        b';'
    } else if tabs >= commas && tabs > 0 {
        b'\t'
    } else {
        b','
    }
}

/// Normalize a header string to a canonical column key.
fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace([' ', '-', '_'], "")
}

fn header_to_column(normalized: &str) -> Option<Column> {
    match normalized {
        "id" | "jobid" | "job" | "key" | "wellid" => Some(Column::Id),

        "name" | "jobname" | "label" | "title" | "activity" | "task" => Some(Column::Name),

        "resource" | "resourceid" | "rig" | "row" | "lane" | "crew" | "equipment" | "unit" => {
            Some(Column::Resource)
        }

        "start" | "startdate" | "from" | "begin" | "begindate" => Some(Column::Start),

        "end" | "enddate" | "to" | "finish" | "finishdate" | "due" | "duedate" => Some(Column::End),

        "color" | "colour" => Some(Column::Color),

        _ => None,
    }
}

/// Import jobs from a CSV file. See [`parse_csv`].
pub fn import_csv(path: &Path) -> Result<ScheduleData> {
    let content = std::fs::read_to_string(path)?;
    let data = parse_csv(&content)?;
    log::info!("Imported {} CSV row(s) from {:?}", data.jobs.len(), path);
    Ok(data)
}

/// Turn CSV text into a schedule document.
///
/// Auto-detects the delimiter (comma, semicolon, tab) and matches headers
/// flexibly ("Job ID", "Start Date", "Rig", ...). Resources are the distinct
/// resource values in order of first appearance. Rows are not validated here;
/// they go through the same checks as JSON jobs when loaded.
pub fn parse_csv(content: &str) -> Result<ScheduleData> {
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let columns: Vec<Option<Column>> = headers
        .iter()
        .map(|h| header_to_column(&normalize_header(h)))
        .collect();

    let has = |wanted: Column| columns.iter().any(|c| *c == Some(wanted));
    if !has(Column::Id) || !has(Column::Resource) || !has(Column::Start) || !has(Column::End) {
        let found: Vec<&str> = headers.iter().collect();
        return Err(ChartError::InvalidData(format!(
            "CSV is missing required columns. Found headers: {:?}. \
             Need columns for: id, resource, start, end.",
            found
        )));
    }

    let mut resources: Vec<String> = Vec::new();
    let mut jobs = Vec::new();

    for (i, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Skipping CSV row {}: {}", i + 2, e);
                continue;
            }
        };

        let mut job = JobRecord::default();
        for (field, value) in record.iter().enumerate() {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let text = Some(value.to_string());
            match columns.get(field).copied().flatten() {
                Some(Column::Id) => job.id = text,
                Some(Column::Name) => job.name = text,
                Some(Column::Resource) => job.resource = text,
                Some(Column::Start) => job.start = Some(TimeValue::Text(value.to_string())),
                Some(Column::End) => job.end = Some(TimeValue::Text(value.to_string())),
                Some(Column::Color) => job.color = text,
                None => {
                    if let Some(header) = headers.get(field) {
                        job.fields.insert(
                            header.to_string(),
                            serde_json::Value::String(value.to_string()),
                        );
                    }
                }
            }
        }

        if let Some(resource) = &job.resource {
            if !resources.contains(resource) {
                resources.push(resource.clone());
            }
        }
        jobs.push(job.into());
    }

    if jobs.is_empty() {
        return Err(ChartError::InvalidData(
            "CSV file is empty or has no data rows".to_string(),
        ));
    }

    Ok(ScheduleData {
        jobs,
        resources: resources
            .into_iter()
            .map(|name| ResourceRecord::Name(name).into())
            .collect(),
        ..Default::default()
    })
}
