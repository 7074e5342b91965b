//! The job/resource set of one chart, and how raw documents become one.
//!
//! Loading never fails on a single bad job: malformed entries are skipped and
//! reported as [`LoadWarning`]s so the rest of the schedule still renders.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use super::job::parse_hex_color;
use super::timeline::ViewWindow;
use super::{Job, Resource};
use crate::ui::theme;

/// A timestamp as it appears in input documents.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TimeValue {
    /// Milliseconds since the Unix epoch.
    Millis(i64),
    Fractional(f64),
    Text(String),
}

impl TimeValue {
    pub fn to_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            TimeValue::Millis(ms) => DateTime::from_timestamp_millis(*ms),
            TimeValue::Fractional(ms) if ms.is_finite() => {
                DateTime::from_timestamp_millis(ms.round() as i64)
            }
            TimeValue::Fractional(_) => None,
            TimeValue::Text(s) => parse_instant(s),
        }
    }
}

/// Try parsing a timestamp string with several common formats.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }
    for fmt in &["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| Utc.from_utc_datetime(&dt));
        }
    }
    if let Ok(ms) = s.parse::<i64>() {
        return DateTime::from_timestamp_millis(ms);
    }
    None
}

/// One element of a document list. An element of the wrong shape is kept as
/// the reason it failed instead of failing the whole document.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry<T> {
    Valid(T),
    Malformed(String),
}

impl<T> Entry<T> {
    pub fn valid(&self) -> Option<&T> {
        match self {
            Entry::Valid(value) => Some(value),
            Entry::Malformed(_) => None,
        }
    }
}

impl<T> From<T> for Entry<T> {
    fn from(value: T) -> Self {
        Entry::Valid(value)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Entry<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(match serde_json::from_value(value) {
            Ok(parsed) => Entry::Valid(parsed),
            Err(e) => Entry::Malformed(e.to_string()),
        })
    }
}

/// Ids may be written as strings or numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }
    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    }))
}

/// One job entry as found in a JSON or CSV document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub name: Option<String>,
    /// Row index of the resource.
    pub y: Option<i64>,
    /// Resource id; takes precedence over `y`.
    pub resource: Option<String>,
    pub start: Option<TimeValue>,
    pub end: Option<TimeValue>,
    pub color: Option<String>,
    /// Everything else, shown as display fields.
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

/// A resource entry: a bare name or an `{id, name}` object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ResourceRecord {
    Name(String),
    Entry {
        id: String,
        #[serde(default)]
        name: Option<String>,
    },
}

impl From<ResourceRecord> for Resource {
    fn from(record: ResourceRecord) -> Self {
        match record {
            ResourceRecord::Name(id) => Resource::new(id),
            ResourceRecord::Entry { id, name: Some(name) } => Resource::with_name(id, name),
            ResourceRecord::Entry { id, name: None } => Resource::new(id),
        }
    }
}

/// The full-replace payload accepted by the chart.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduleData {
    pub jobs: Vec<Entry<JobRecord>>,
    pub resources: Vec<Entry<ResourceRecord>>,
    pub view_start: Option<Entry<TimeValue>>,
    pub view_end: Option<Entry<TimeValue>>,
}

/// Why a job was left out of the schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// The job entry has the wrong shape (e.g. a string where a row index belongs).
    MalformedJob { position: usize, reason: String },
    /// Dropped; rows after it move up by one.
    MalformedResource { position: usize, reason: String },
    MissingId { position: usize },
    DuplicateId { id: String },
    InvalidTimestamp { id: String, field: &'static str },
    /// `end` is not after `start`.
    InvalidInterval { id: String },
    UnknownResource { id: String, reference: String },
    /// Kept, but lookups by id resolve to the first row with this id.
    DuplicateResource { id: String },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::MalformedJob { position, reason } => {
                write!(f, "Job #{} skipped: {}", position + 1, reason)
            }
            LoadWarning::MalformedResource { position, reason } => {
                write!(f, "Resource #{} skipped: {}", position + 1, reason)
            }
            LoadWarning::MissingId { position } => {
                write!(f, "Job #{} skipped: missing id", position + 1)
            }
            LoadWarning::DuplicateId { id } => write!(f, "Job '{}' skipped: duplicate id", id),
            LoadWarning::InvalidTimestamp { id, field } => {
                write!(f, "Job '{}' skipped: missing or invalid {}", id, field)
            }
            LoadWarning::InvalidInterval { id } => {
                write!(f, "Job '{}' skipped: end is not after start", id)
            }
            LoadWarning::UnknownResource { id, reference } => {
                write!(f, "Job '{}' skipped: unknown resource '{}'", id, reference)
            }
            LoadWarning::DuplicateResource { id } => {
                write!(f, "Resource '{}' appears more than once", id)
            }
        }
    }
}

/// Result of turning a [`ScheduleData`] document into a [`Schedule`].
#[derive(Debug, Clone)]
pub struct LoadedSchedule {
    pub schedule: Schedule,
    /// Explicit window from the document, if it carried a valid one.
    pub view: Option<ViewWindow>,
    pub warnings: Vec<LoadWarning>,
}

/// Jobs and the resource rows they sit on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    pub jobs: Vec<Job>,
    pub resources: Vec<Resource>,
}

impl Schedule {
    pub fn new(resources: Vec<Resource>, jobs: Vec<Job>) -> Self {
        Self { jobs, resources }
    }

    /// Validate a document, skipping (and reporting) malformed jobs.
    pub fn load(data: ScheduleData) -> LoadedSchedule {
        let mut warnings = Vec::new();

        let mut resources: Vec<Resource> = Vec::with_capacity(data.resources.len());
        for (position, entry) in data.resources.into_iter().enumerate() {
            match entry {
                Entry::Valid(record) => resources.push(Resource::from(record)),
                Entry::Malformed(reason) => {
                    warnings.push(LoadWarning::MalformedResource { position, reason })
                }
            }
        }
        let mut seen_resources = HashSet::new();
        for resource in &resources {
            if !seen_resources.insert(resource.id.as_str()) {
                warnings.push(LoadWarning::DuplicateResource {
                    id: resource.id.clone(),
                });
            }
        }

        let mut jobs = Vec::with_capacity(data.jobs.len());
        let mut seen_jobs: HashSet<String> = HashSet::new();
        for (position, entry) in data.jobs.into_iter().enumerate() {
            let record = match entry {
                Entry::Valid(record) => record,
                Entry::Malformed(reason) => {
                    warnings.push(LoadWarning::MalformedJob { position, reason });
                    continue;
                }
            };
            match build_job(record, position, &resources, jobs.len()) {
                Ok(job) => {
                    if seen_jobs.insert(job.id.clone()) {
                        jobs.push(job);
                    } else {
                        warnings.push(LoadWarning::DuplicateId { id: job.id });
                    }
                }
                Err(warning) => warnings.push(warning),
            }
        }

        for warning in &warnings {
            log::warn!("{}", warning);
        }

        let view = match (
            data.view_start
                .as_ref()
                .and_then(Entry::valid)
                .and_then(TimeValue::to_instant),
            data.view_end
                .as_ref()
                .and_then(Entry::valid)
                .and_then(TimeValue::to_instant),
        ) {
            (Some(start), Some(end)) if end > start => Some(ViewWindow::new(start, end)),
            _ => None,
        };

        LoadedSchedule {
            schedule: Schedule { jobs, resources },
            view,
            warnings,
        }
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    pub fn resource_id(&self, index: usize) -> Option<&str> {
        self.resources.get(index).map(|r| r.id.as_str())
    }

    pub fn resource_index(&self, id: &str) -> Option<usize> {
        self.resources.iter().position(|r| r.id == id)
    }

    pub fn job_index(&self, id: &str) -> Option<usize> {
        self.jobs.iter().position(|j| j.id == id)
    }

    pub fn job(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    /// Indices of the jobs on `resource_index`, ordered by start. Ties keep
    /// their order in `jobs`.
    pub fn jobs_on(&self, resource_index: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.jobs.len())
            .filter(|&i| self.jobs[i].resource_index == resource_index)
            .collect();
        indices.sort_by_key(|&i| self.jobs[i].start);
        indices
    }

    /// Earliest start and latest end over all jobs.
    pub fn extent(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.jobs.iter().map(|j| j.start).min()?;
        let end = self.jobs.iter().map(|j| j.end).max()?;
        Some((start, end))
    }
}

fn build_job(
    record: JobRecord,
    position: usize,
    resources: &[Resource],
    color_slot: usize,
) -> Result<Job, LoadWarning> {
    let id = match record.id.map(|s| s.trim().to_string()) {
        Some(id) if !id.is_empty() => id,
        _ => return Err(LoadWarning::MissingId { position }),
    };

    let resource_index = match (&record.resource, record.y) {
        (Some(reference), _) => resources
            .iter()
            .position(|r| r.id == *reference)
            .ok_or_else(|| LoadWarning::UnknownResource {
                id: id.clone(),
                reference: reference.clone(),
            })?,
        (None, Some(y)) if y >= 0 && (y as usize) < resources.len() => y as usize,
        (None, Some(y)) => {
            return Err(LoadWarning::UnknownResource {
                id,
                reference: format!("row {}", y),
            })
        }
        (None, None) => {
            return Err(LoadWarning::UnknownResource {
                id,
                reference: "<none>".to_string(),
            })
        }
    };

    let start = record
        .start
        .as_ref()
        .and_then(TimeValue::to_instant)
        .ok_or_else(|| LoadWarning::InvalidTimestamp {
            id: id.clone(),
            field: "start",
        })?;
    let end = record
        .end
        .as_ref()
        .and_then(TimeValue::to_instant)
        .ok_or_else(|| LoadWarning::InvalidTimestamp {
            id: id.clone(),
            field: "end",
        })?;
    if end <= start {
        return Err(LoadWarning::InvalidInterval { id });
    }

    let color = match record.color.as_deref().map(parse_hex_color) {
        Some(Ok(color)) => color,
        Some(Err(e)) => {
            log::warn!("Job '{}': {}, using palette colour", id, e);
            theme::job_color(color_slot)
        }
        None => theme::job_color(color_slot),
    };

    let fields = record
        .fields
        .into_iter()
        .filter_map(|(key, value)| display_value(&value).map(|v| (key, v)))
        .collect();

    let mut job = Job::new(id, resource_index, start, end);
    if let Some(name) = record.name.filter(|n| !n.trim().is_empty()) {
        job.name = name;
    }
    job.color = color;
    job.fields = fields;
    Ok(job)
}

fn display_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.is_empty() => None,
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(display_value).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        other => Some(other.to_string()),
    }
}
