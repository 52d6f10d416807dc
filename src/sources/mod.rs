// src/sources/mod.rs

//! Source adapters: one per community site.
//!
//! Every site implements the same capability set (fetch a listing page,
//! extract candidate rows, normalize dates, decide continue/stop, shape a
//! record). Adapters are selected at startup by [`build_adapters`], never by
//! runtime type inspection.

mod dcinside;
mod fmkorea;
mod instiz;
mod theqoo;

pub use dcinside::DcInsideAdapter;
pub use fmkorea::FmKoreaAdapter;
pub use instiz::InstizAdapter;
pub use theqoo::TheqooAdapter;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use scraper::Html;

use crate::dates;
use crate::error::Result;
use crate::models::{Config, RawRow, Record, Source};
use crate::utils::http;

/// What to do with a page whose fetch still fails after bounded retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailurePolicy {
    /// Terminal for the source; keep what was collected so far.
    Stop,
    /// Advance to the next page (counts as a miss on miss-streak sources).
    Skip,
}

/// Paging behavior of one source, derived from its configuration.
#[derive(Debug, Clone)]
pub struct PagePolicy {
    /// Locate the starting page with a boundary scan before collecting
    pub boundary_scan: bool,

    /// Page the boundary scan starts probing from
    pub start_hint: u32,

    /// Consecutive target-day misses before stopping, when set
    pub miss_limit: Option<u32>,

    /// Hard ceiling on accumulated results
    pub max_results: Option<usize>,

    /// Hard ceiling on pages visited
    pub max_pages: Option<u32>,

    /// Randomized inter-request delay bounds in milliseconds
    pub delay_ms: (u64, u64),

    pub on_fetch_failure: FetchFailurePolicy,
}

/// Capability set every source adapter implements.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Which site this adapter pages through.
    fn source(&self) -> Source;

    /// Paging behavior for the crawler driving this adapter.
    fn policy(&self) -> PagePolicy;

    /// Listing URL for one page.
    fn page_url(&self, page: u32) -> String;

    /// One network round trip for a listing page.
    async fn fetch_page(&self, client: &Client, page: u32) -> Result<String> {
        http::fetch_text(client, &self.page_url(page)).await
    }

    /// Extract candidate rows exactly as present in the document.
    ///
    /// Rows with missing required elements are dropped here (a parse miss
    /// affects that row only). Notice/pinned rows are either dropped or
    /// returned with the `notice` flag set.
    fn extract_rows(&self, doc: &Html, page: u32) -> Vec<RawRow>;

    /// Normalize one row's date text into an `MMDD` day code.
    fn day_code(&self, row: &RawRow, reference: DateTime<FixedOffset>) -> String {
        dates::normalize(&row.raw_date, reference)
    }

    /// Pinned/notice rows never count toward extraction or stop decisions.
    fn is_notice(&self, row: &RawRow) -> bool {
        row.notice
    }

    /// Site-specific stop rule, given the normalized day codes of every
    /// non-notice row on the current page.
    fn should_stop(&self, page_day_codes: &[String], target: &str, started: bool) -> bool;

    /// Final shaping: title cleanup, URL absolutization, numeric coercion.
    /// `None` drops the row (parse miss), never aborts the page.
    fn to_record(&self, row: &RawRow, day_code: &str) -> Option<Record>;

    /// Post-extraction enrichment requiring an extra round trip, e.g. a
    /// detail-page view count. The default is a no-op.
    async fn enrich(&self, _client: &Client, _record: &mut Record) -> Result<()> {
        Ok(())
    }
}

/// True when every parseable day code on the page is provably older than the
/// target. Sentinel codes prove nothing and are skipped; a page of nothing
/// but sentinels proves nothing either.
///
/// Lexicographic `MMDD` comparison is valid because both operands share the
/// encoding and a crawl window never spans a year boundary.
pub fn all_before_target(page_day_codes: &[String], target: &str) -> bool {
    let mut saw_real = false;
    for code in page_day_codes {
        if code == dates::NO_MATCH {
            continue;
        }
        saw_real = true;
        if code.as_str() >= target {
            return false;
        }
    }
    saw_real
}

/// Build the adapters for every enabled source, in registry order.
pub fn build_adapters(config: &Config) -> Vec<Box<dyn SourceAdapter>> {
    config
        .enabled_sources()
        .into_iter()
        .map(|source| -> Box<dyn SourceAdapter> {
            let sc = config.source(source).clone();
            match source {
                Source::DcInside => Box::new(DcInsideAdapter::new(sc)),
                Source::FmKorea => Box::new(FmKoreaAdapter::new(sc)),
                Source::Theqoo => Box::new(TheqooAdapter::new(sc)),
                Source::Instiz => Box::new(InstizAdapter::new(sc)),
            }
        })
        .collect()
}
