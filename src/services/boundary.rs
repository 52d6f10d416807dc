// src/services/boundary.rs

//! Boundary scan: locate the page whose content window contains the target
//! day without walking the listing from page 1.
//!
//! The probe reads the oldest row on a page. Newer than target means the
//! window is still too recent (move deeper); older means we overshot (move
//! back, clamped to page 1); equal means this is the start page. Pages with
//! no readable row are skipped forward without changing direction. A probe
//! budget bounds the scan when the listing mutates under us.

use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use scraper::Html;

use crate::dates;
use crate::models::Target;
use crate::sources::SourceAdapter;

pub struct BoundaryScanner<'a> {
    adapter: &'a dyn SourceAdapter,
    client: &'a Client,
    reference: DateTime<FixedOffset>,
    probe_limit: u32,
}

impl<'a> BoundaryScanner<'a> {
    pub fn new(
        adapter: &'a dyn SourceAdapter,
        client: &'a Client,
        reference: DateTime<FixedOffset>,
        probe_limit: u32,
    ) -> Self {
        Self {
            adapter,
            client,
            reference,
            probe_limit,
        }
    }

    /// Find the page to start collecting from.
    ///
    /// Always returns a usable page number: on probe-budget exhaustion the
    /// current probe position is returned and the crawler's own stop rules
    /// take over from there.
    pub async fn find_start_page(&self, target: &Target, start_hint: u32) -> u32 {
        let mut page = start_hint.max(1);

        for _ in 0..self.probe_limit {
            let Some(last_code) = self.page_tail_day_code(page).await else {
                // Unreadable page: skip forward without changing direction
                page += 1;
                continue;
            };

            if last_code.as_str() > target.day_code() {
                page += 1;
            } else if last_code.as_str() < target.day_code() {
                page = page.saturating_sub(1).max(1);
            } else {
                log::debug!("{}: boundary scan settled on page {page}", self.adapter.source());
                return page;
            }
        }

        log::warn!(
            "{}: boundary scan exhausted {} probes, starting at page {page}",
            self.adapter.source(),
            self.probe_limit
        );
        page
    }

    /// Day code of the oldest readable row on a page, or `None` when the
    /// fetch fails or no row yields a real code.
    async fn page_tail_day_code(&self, page: u32) -> Option<String> {
        let body = match self.adapter.fetch_page(self.client, page).await {
            Ok(body) => body,
            Err(error) => {
                log::debug!("{}: probe of page {page} failed: {error}", self.adapter.source());
                return None;
            }
        };

        let doc = Html::parse_document(&body);
        let rows = self.adapter.extract_rows(&doc, page);
        rows.iter()
            .rev()
            .filter(|row| !self.adapter.is_notice(row))
            .map(|row| self.adapter.day_code(row, self.reference))
            .find(|code| code != dates::NO_MATCH)
    }
}
