// src/models/mod.rs

//! Domain models for the harvester application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod record;
mod source;

// Re-export all public types
pub use config::{ClassifierConfig, Config, CrawlerConfig, OutputConfig, SourceConfig};
pub use record::{RawRow, Record, SourceStats};
pub use source::Source;

use crate::error::{AppError, Result};

/// The single day code being harvested in one run.
///
/// `MMDD`, zero-padded. Immutable and process-wide for the duration of one
/// invocation; typically "yesterday" in KST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    day_code: String,
}

impl Target {
    /// Build a target from an `MMDD` day code.
    pub fn new(day_code: impl Into<String>) -> Result<Self> {
        let day_code = day_code.into();
        if day_code.len() != 4 || !day_code.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::config(format!(
                "Target day must be 4 digits (MMDD), got '{day_code}'"
            )));
        }
        let month: u32 = day_code[..2].parse().unwrap_or(0);
        let day: u32 = day_code[2..].parse().unwrap_or(0);
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(AppError::config(format!(
                "Target day '{day_code}' is not a valid calendar day"
            )));
        }
        Ok(Self { day_code })
    }

    /// Yesterday relative to the given KST instant.
    pub fn yesterday(now_kst: chrono::DateTime<chrono::FixedOffset>) -> Self {
        let yesterday = now_kst.date_naive() - chrono::Duration::days(1);
        Self {
            day_code: yesterday.format("%m%d").to_string(),
        }
    }

    /// The `MMDD` day code.
    pub fn day_code(&self) -> &str {
        &self.day_code
    }
}
