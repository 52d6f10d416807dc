//! DC Inside best-board adapter.
//!
//! Plain HTTP listing, newest-first by page, absolute-or-clock date column.
//! The listing is monotone enough that "every row on the page is older than
//! the target" is a safe stop signal once collection has started.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::models::{RawRow, Record, Source, SourceConfig};
use crate::sources::{all_before_target, FetchFailurePolicy, PagePolicy, SourceAdapter};
use crate::utils::{parse_count, resolve};

static ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr.ub-content").expect("valid selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.gall_tit.ub-word a").expect("valid selector"));
static DATE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.gall_date").expect("valid selector"));
static VIEWS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.gall_count").expect("valid selector"));
static COMMENTS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.reply_numbox span.reply_num").expect("valid selector"));

/// Leading short bracketed tag, e.g. `[속보] ` or `(펌) `.
static TAG_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\[\(][^\]\)]{1,3}[\]\)]\s*").expect("valid regex"));
static COMMENT_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)").expect("valid regex"));

pub struct DcInsideAdapter {
    config: SourceConfig,
}

impl DcInsideAdapter {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }
}

impl SourceAdapter for DcInsideAdapter {
    fn source(&self) -> Source {
        Source::DcInside
    }

    fn policy(&self) -> PagePolicy {
        PagePolicy {
            boundary_scan: false,
            start_hint: 1,
            miss_limit: self.config.miss_limit,
            max_results: self.config.max_results,
            max_pages: self.config.max_pages,
            delay_ms: (self.config.delay_min_ms, self.config.delay_max_ms),
            on_fetch_failure: FetchFailurePolicy::Skip,
        }
    }

    fn page_url(&self, page: u32) -> String {
        format!("{}&page={page}", self.config.base_url)
    }

    fn extract_rows(&self, doc: &Html, page: u32) -> Vec<RawRow> {
        // The first rows are board notices: two on page 1, one afterwards.
        let skip = if page == 1 { 2 } else { 1 };

        doc.select(&ROW)
            .skip(skip)
            .filter_map(|row| {
                let title_elem = row.select(&TITLE).next()?;
                let date_elem = row.select(&DATE).next()?;

                let views_text = row
                    .select(&VIEWS)
                    .next()
                    .map(|e| e.text().collect::<String>())
                    .unwrap_or_default();
                let comments_text = row
                    .select(&COMMENTS)
                    .next()
                    .map(|e| e.text().collect::<String>())
                    .unwrap_or_default();

                Some(RawRow {
                    title: title_elem.text().collect::<String>().trim().to_string(),
                    href: title_elem.value().attr("href").unwrap_or("").to_string(),
                    raw_date: date_elem.text().collect::<String>().trim().to_string(),
                    views_text,
                    comments_text,
                    notice: false,
                })
            })
            .collect()
    }

    fn should_stop(&self, page_day_codes: &[String], target: &str, started: bool) -> bool {
        if page_day_codes.is_empty() {
            return true;
        }
        started && all_before_target(page_day_codes, target)
    }

    fn to_record(&self, row: &RawRow, day_code: &str) -> Option<Record> {
        let title = TAG_PREFIX.replace(&row.title, "").trim().to_string();
        if title.is_empty() || row.href.is_empty() {
            return None;
        }
        let url = resolve(&self.config.base_url, &row.href)?;

        let comments = COMMENT_COUNT
            .captures(&row.comments_text)
            .and_then(|caps| caps[1].parse().ok())
            .unwrap_or(0);

        Some(Record {
            title,
            url,
            raw_date: row.raw_date.clone(),
            day_code: day_code.to_string(),
            source: Source::DcInside,
            views: parse_count(&row.views_text),
            comments,
            hot_score: None,
        })
    }
}
