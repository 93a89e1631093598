//! Perception Survey - Paired-comparison image survey engine
//!
//! Participants are shown two images side by side with a perceptual prompt
//! ("Which street looks more safe?") and pick one. Each session draws a
//! fixed number of balanced trials, supports undo and skip, and records an
//! ordered decision log to CSV files or a remote worksheet.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
