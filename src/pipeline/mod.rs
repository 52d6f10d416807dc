// src/pipeline/mod.rs

//! Run orchestration: crawl every enabled source, score, report, store.

pub mod harvest;
pub mod report;

pub use harvest::{run_harvest, HarvestReport};
pub use report::{artifact_name, to_csv, RunSummary};
