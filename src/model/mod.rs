pub mod job;
pub mod resource;
pub mod sample;
pub mod schedule;
pub mod timeline;

pub use job::Job;
pub use resource::Resource;
pub use schedule::{LoadWarning, LoadedSchedule, Schedule, ScheduleData};
pub use timeline::{CoordinateMapper, GridInterval, ViewWindow, ZoomPreset};
