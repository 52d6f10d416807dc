// src/services/mod.rs

//! Crawl-side services: boundary scan, pagination, scoring, classification.

pub mod boundary;
pub mod classify;
pub mod crawler;
pub mod score;

pub use boundary::BoundaryScanner;
pub use classify::TitleClassifier;
pub use crawler::{CrawlOutcome, PaginationCrawler, StopReason};
pub use score::HotScoreCalculator;
