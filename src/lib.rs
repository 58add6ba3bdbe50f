//! Watches a student's transcript on the university portal and reports
//! courses whose results appeared or changed since the last run.

pub mod config;
pub mod error;
pub mod models;
pub mod runner;
pub mod utils;

pub use error::TranscriptError;
pub use models::*;
