//! Interactive resource schedule board.
//!
//! [`chart`] holds the toolkit-independent interaction core: coordinate
//! mapping, hit testing, selection, drag and drop with resequencing.
//! [`ui`] and [`app`] put it on screen with egui.

pub mod app;
pub mod chart;
pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod ui;
