//! Common types and utilities shared across the festival-guide workspace.

pub mod dataset;
pub mod ranking;
pub mod time;

pub use dataset::{DatasetKind, DatasetPaths};
pub use ranking::Ranking;
pub use time::{event_epoch, EVENT_TIME_FORMAT};
