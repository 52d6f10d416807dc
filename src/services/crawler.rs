// src/services/crawler.rs

//! Pagination state machine driving one source adapter.
//!
//! `Scanning → Collecting → Stopped`, with every terminal condition named so
//! each stop reason can be tested independently. A bad row or a bad page is
//! logged and skipped; it never aborts a source already in progress.

use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use scraper::Html;

use crate::models::{CrawlerConfig, RawRow, Record, Target};
use crate::services::BoundaryScanner;
use crate::sources::{FetchFailurePolicy, SourceAdapter};

/// Why a source's page loop terminated. Exhaustion is normal, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The adapter's stop rule fired (page past target, or no rows at all)
    SourceRule,
    /// Too many consecutive pages without a target-day row
    MissLimit,
    /// Accumulated result ceiling reached
    ResultCeiling,
    /// Page-count ceiling reached
    PageLimit,
    /// A page fetch failed terminally under the source's stop-on-failure policy
    FetchFailure,
}

/// Accumulated result of crawling one source.
#[derive(Debug)]
pub struct CrawlOutcome {
    pub records: Vec<Record>,
    pub pages_visited: u32,
    pub stop: StopReason,
}

pub struct PaginationCrawler<'a> {
    adapter: &'a dyn SourceAdapter,
    client: &'a Client,
    config: &'a CrawlerConfig,
    /// Reference instant for relative-time normalization
    reference: DateTime<FixedOffset>,
}

impl<'a> PaginationCrawler<'a> {
    pub fn new(
        adapter: &'a dyn SourceAdapter,
        client: &'a Client,
        config: &'a CrawlerConfig,
        reference: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            adapter,
            client,
            config,
            reference,
        }
    }

    /// Crawl pages until a terminal condition fires.
    ///
    /// Records come back in discovery order, not necessarily chronological.
    pub async fn run(&self, target: &Target) -> CrawlOutcome {
        let source = self.adapter.source();
        let policy = self.adapter.policy();

        let mut page = if policy.boundary_scan {
            let scanner = BoundaryScanner::new(
                self.adapter,
                self.client,
                self.reference,
                self.config.boundary_probe_limit,
            );
            scanner.find_start_page(target, policy.start_hint).await
        } else {
            1
        };

        let mut records: Vec<Record> = Vec::new();
        let mut started = false;
        let mut misses: u32 = 0;
        let mut pages_visited: u32 = 0;

        let stop = loop {
            if let Some(max_pages) = policy.max_pages {
                if pages_visited >= max_pages {
                    break StopReason::PageLimit;
                }
            }
            pages_visited += 1;

            let body = match self.fetch_with_retry(page).await {
                Ok(body) => body,
                Err(error) => {
                    log::warn!("{source}: page {page} failed after retries: {error}");
                    match policy.on_fetch_failure {
                        FetchFailurePolicy::Stop => break StopReason::FetchFailure,
                        FetchFailurePolicy::Skip => {
                            if let Some(limit) = policy.miss_limit {
                                misses += 1;
                                if misses >= limit {
                                    break StopReason::MissLimit;
                                }
                            }
                            page += 1;
                            self.pause(policy.delay_ms).await;
                            continue;
                        }
                    }
                }
            };

            // Parse and extract inside a block so the document is gone
            // before the next suspension point.
            let (rows, day_codes) = {
                let doc = Html::parse_document(&body);
                let rows: Vec<RawRow> = self
                    .adapter
                    .extract_rows(&doc, page)
                    .into_iter()
                    .filter(|row| !self.adapter.is_notice(row))
                    .collect();
                let day_codes: Vec<String> = rows
                    .iter()
                    .map(|row| self.adapter.day_code(row, self.reference))
                    .collect();
                (rows, day_codes)
            };

            if self
                .adapter
                .should_stop(&day_codes, target.day_code(), started)
            {
                break StopReason::SourceRule;
            }

            let has_target = day_codes.iter().any(|code| code == target.day_code());
            let mut page_count = 0usize;

            if has_target {
                started = true;
                for (row, code) in rows.iter().zip(&day_codes) {
                    if code != target.day_code() {
                        continue;
                    }
                    let Some(mut record) = self.adapter.to_record(row, code) else {
                        // Parse miss drops the row, nothing else
                        continue;
                    };
                    if let Err(error) = self.adapter.enrich(self.client, &mut record).await {
                        log::debug!("{source}: enrich failed for {}: {error}", record.url);
                    }
                    records.push(record);
                    page_count += 1;
                }
                log::debug!("{source}: page {page} yielded {page_count} records");
            } else {
                log::debug!("{source}: page {page} has no target-day rows");
            }

            if let Some(limit) = policy.miss_limit {
                if page_count > 0 {
                    misses = 0;
                } else {
                    misses += 1;
                    if misses >= limit {
                        break StopReason::MissLimit;
                    }
                }
            }

            if let Some(ceiling) = policy.max_results {
                // Exceeded, not reached: a run that lands exactly on the
                // ceiling keeps paging.
                if records.len() > ceiling {
                    break StopReason::ResultCeiling;
                }
            }

            page += 1;
            self.pause(policy.delay_ms).await;
        };

        log::info!(
            "{source}: stopped after {pages_visited} pages with {} records ({stop:?})",
            records.len()
        );

        CrawlOutcome {
            records,
            pages_visited,
            stop,
        }
    }

    async fn fetch_with_retry(&self, page: u32) -> crate::error::Result<String> {
        let mut attempt = 0;
        loop {
            match self.adapter.fetch_page(self.client, page).await {
                Ok(body) => return Ok(body),
                Err(error) if attempt < self.config.retries => {
                    attempt += 1;
                    log::debug!(
                        "{}: retrying page {page} (attempt {attempt}): {error}",
                        self.adapter.source()
                    );
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Randomized inter-request delay. Resource citizenship, not correctness.
    async fn pause(&self, (min_ms, max_ms): (u64, u64)) {
        if !self.config.delay_enabled || max_ms == 0 {
            return;
        }
        let ms = if min_ms >= max_ms {
            min_ms
        } else {
            fastrand::u64(min_ms..=max_ms)
        };
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
