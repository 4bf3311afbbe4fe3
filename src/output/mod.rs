//! Run reports
//!
//! - `text`: console lines for walkers and the coordinator
//! - `json`: machine-readable summary of a completed run

pub mod json;
pub mod text;
