//! Outbound events and the sinks that receive them.
//!
//! The chart never reaches into a host framework. It hands plain-data
//! [`ChartEvent`]s to whatever [`NotificationSink`] it was given.

use std::io::Write;
use std::sync::mpsc::Sender;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::selection::SelectionSnapshot;
use crate::error::{ChartError, Result};

/// Payload of a committed drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropEvent {
    pub job_id: String,
    pub source_resource_id: String,
    pub target_resource_id: String,
    pub new_start: DateTime<Utc>,
    pub new_end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChartEvent {
    SelectionChanged(SelectionSnapshot),
    JobDropped(DropEvent),
    DragCancelled {
        #[serde(rename = "jobId")]
        job_id: String,
    },
}

pub trait NotificationSink {
    fn notify(&mut self, event: &ChartEvent) -> Result<()>;
}

impl<F> NotificationSink for F
where
    F: FnMut(&ChartEvent) -> Result<()>,
{
    fn notify(&mut self, event: &ChartEvent) -> Result<()> {
        self(event)
    }
}

/// Writes each event to the log at info level.
#[derive(Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&mut self, event: &ChartEvent) -> Result<()> {
        match event {
            ChartEvent::SelectionChanged(snapshot) => log::info!(
                "Selection changed: {} job(s), {} resource(s)",
                snapshot.selected_job_ids.len(),
                snapshot.selected_resource_ids.len()
            ),
            ChartEvent::JobDropped(drop) => log::info!(
                "Job {} dropped on {} ({} .. {})",
                drop.job_id,
                drop.target_resource_id,
                drop.new_start,
                drop.new_end
            ),
            ChartEvent::DragCancelled { job_id } => log::info!("Drag of {} cancelled", job_id),
        }
        Ok(())
    }
}

/// Serializes each event as one line of JSON.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> NotificationSink for JsonLinesSink<W> {
    fn notify(&mut self, event: &ChartEvent) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Forwards events over a channel, e.g. to the UI thread.
pub struct ChannelSink {
    sender: Sender<ChartEvent>,
}

impl ChannelSink {
    pub fn new(sender: Sender<ChartEvent>) -> Self {
        Self { sender }
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&mut self, event: &ChartEvent) -> Result<()> {
        self.sender
            .send(event.clone())
            .map_err(|_| ChartError::Notify("event receiver disconnected".to_string()))
    }
}

/// Delivers to several sinks. A failing sink does not keep the others from
/// receiving the event; the first error is returned afterwards.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl NotificationSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn push(&mut self, sink: Box<dyn NotificationSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl NotificationSink for FanoutSink {
    fn notify(&mut self, event: &ChartEvent) -> Result<()> {
        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(err) = sink.notify(event) {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
