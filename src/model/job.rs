use chrono::{DateTime, Duration, Utc};
use egui::Color32;

/// A unit of work placed on one resource row for a time interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: String,
    pub name: String,
    /// Row of the owning resource; the sole join key to `Schedule::resources`.
    pub resource_index: usize,
    pub start: DateTime<Utc>,
    /// Always strictly after `start`.
    pub end: DateTime<Utc>,
    pub color: Color32,
    /// Extra key/value pairs shown in the tooltip (scope, team, location, ...).
    pub fields: Vec<(String, String)>,
}

impl Job {
    pub fn new(
        id: impl Into<String>,
        resource_index: usize,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            resource_index,
            start,
            end,
            color: Color32::from_rgb(90, 138, 163),
            fields: Vec::new(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// True when `instant` lies inside the job, both ends inclusive.
    pub fn covers(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Parse `#RRGGBB` / `#RRGGBBAA` colour strings.
pub fn parse_hex_color(s: &str) -> Result<Color32, String> {
    let s = s.trim().trim_start_matches('#');
    let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).map_err(|e| e.to_string());
    if !s.is_ascii() {
        return Err(format!("Invalid hex color '{}'", s));
    }
    match s.len() {
        6 => Ok(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?)),
        8 => Ok(Color32::from_rgba_unmultiplied(
            channel(0)?,
            channel(2)?,
            channel(4)?,
            channel(6)?,
        )),
        _ => Err(format!(
            "Invalid hex color '{}': expected 6 or 8 hex digits",
            s
        )),
    }
}
