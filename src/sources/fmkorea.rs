//! FM Korea best-board adapter.
//!
//! Newest-first pagination, but the target day sits tens of pages in, so a
//! boundary scan locates the starting page first. The most recent pages
//! render only a clock time, hidden inside an HTML comment in the regdate
//! span. View counts are not on the listing at all and require a detail-page
//! lookup per record.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::Result;
use crate::models::{RawRow, Record, Source, SourceConfig};
use crate::sources::{FetchFailurePolicy, PagePolicy, SourceAdapter};
use crate::utils::{http, parse_count, resolve, strip_comment_suffix};

static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.li").expect("valid selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3.title a").expect("valid selector"));
static REGDATE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.regdate").expect("valid selector"));
static SIDE_SPAN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.side.fr span").expect("valid selector"));

/// Clock time hidden in an HTML comment, e.g. `<!-- 14:05 -->`.
static COMMENT_CLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--\s*(\d{1,2}:\d{2})\s*-->").expect("valid regex"));
static TITLE_COMMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)\]").expect("valid regex"));
static DETAIL_VIEWS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"조회\s*([\d,]+)").expect("valid regex"));

pub struct FmKoreaAdapter {
    config: SourceConfig,
}

impl FmKoreaAdapter {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    /// Pull the date text out of a regdate span, preferring the clock time
    /// the site hides in an HTML comment.
    fn regdate_text(elem: scraper::ElementRef<'_>) -> String {
        let inner = elem.inner_html();
        if let Some(caps) = COMMENT_CLOCK.captures(&inner) {
            return caps[1].trim().to_string();
        }
        elem.text().collect::<String>().trim().to_string()
    }

    /// Read the view count from a fetched detail page.
    fn parse_detail_views(doc: &Html) -> u64 {
        let mut first_span_fallback = 0;
        for (i, span) in doc.select(&SIDE_SPAN).enumerate() {
            let text: String = span.text().collect();
            if let Some(caps) = DETAIL_VIEWS.captures(&text) {
                return parse_count(&caps[1]);
            }
            if i == 0 {
                first_span_fallback = parse_count(&text);
            }
        }
        first_span_fallback
    }
}

#[async_trait]
impl SourceAdapter for FmKoreaAdapter {
    fn source(&self) -> Source {
        Source::FmKorea
    }

    fn policy(&self) -> PagePolicy {
        PagePolicy {
            boundary_scan: true,
            start_hint: self.config.start_hint.unwrap_or(1),
            miss_limit: self.config.miss_limit,
            max_results: self.config.max_results,
            max_pages: self.config.max_pages,
            delay_ms: (self.config.delay_min_ms, self.config.delay_max_ms),
            on_fetch_failure: FetchFailurePolicy::Stop,
        }
    }

    fn page_url(&self, page: u32) -> String {
        format!("{}&page={page}", self.config.base_url)
    }

    fn extract_rows(&self, doc: &Html, _page: u32) -> Vec<RawRow> {
        doc.select(&ROW)
            .filter_map(|row| {
                let title_elem = row.select(&TITLE).next()?;
                let date_elem = row.select(&REGDATE).next()?;

                let title_text = title_elem.text().collect::<String>().trim().to_string();
                Some(RawRow {
                    comments_text: title_text.clone(),
                    title: title_text,
                    href: title_elem.value().attr("href").unwrap_or("").to_string(),
                    raw_date: Self::regdate_text(date_elem),
                    views_text: String::new(),
                    notice: false,
                })
            })
            .collect()
    }

    fn should_stop(&self, page_day_codes: &[String], target: &str, _started: bool) -> bool {
        if page_day_codes.is_empty() {
            return true;
        }
        // The boundary scan already positioned us on the target window; the
        // first page without a single target-day row means we are past it.
        !page_day_codes.iter().any(|code| code == target)
    }

    fn to_record(&self, row: &RawRow, day_code: &str) -> Option<Record> {
        let title = strip_comment_suffix(&row.title);
        if title.is_empty() || row.href.is_empty() {
            return None;
        }
        let url = resolve(&self.config.base_url, &row.href)?;

        let comments = TITLE_COMMENTS
            .captures(&row.comments_text)
            .and_then(|caps| caps[1].parse().ok())
            .unwrap_or(0);

        Some(Record {
            title,
            url,
            raw_date: row.raw_date.clone(),
            day_code: day_code.to_string(),
            source: Source::FmKorea,
            views: 0, // filled by enrich
            comments,
            hot_score: None,
        })
    }

    /// Open the post once, read its view count, and tear the request down
    /// regardless of outcome. The record keeps `views = 0` on any failure.
    async fn enrich(&self, client: &Client, record: &mut Record) -> Result<()> {
        let body = http::fetch_text(client, &record.url).await?;
        let doc = Html::parse_document(&body);
        record.views = Self::parse_detail_views(&doc);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Config;

    fn adapter() -> FmKoreaAdapter {
        FmKoreaAdapter::new(Config::default().sources.fmkorea)
    }

    fn listing(rows: &str) -> Html {
        Html::parse_document(&format!("<div class=\"fm_best_widget\">{rows}</div>"))
    }

    fn row(title: &str, href: &str, regdate_inner: &str) -> String {
        format!(
            r#"<div class="li">
                <h3 class="title"><a href="{href}">{title}</a></h3>
                <span class="regdate">{regdate_inner}</span>
            </div>"#
        )
    }

    #[test]
    fn test_extract_prefers_comment_clock() {
        let html = listing(&row(
            "화제의 글 [34]",
            "/7811111111",
            "<!-- 14:05 --> 8시간 전",
        ));
        let rows = adapter().extract_rows(&html, 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].raw_date, "14:05");
    }

    #[test]
    fn test_extract_falls_back_to_text_date() {
        let html = listing(&row("지난 글", "/780", "2024.05.08"));
        let rows = adapter().extract_rows(&html, 1);
        assert_eq!(rows[0].raw_date, "2024.05.08");
    }

    #[test]
    fn test_to_record_strips_suffix_and_reads_comments() {
        let html = listing(&row("화제의 글 [34]", "/7811111111", "<!-- 14:05 -->"));
        let rows = adapter().extract_rows(&html, 1);
        let record = adapter().to_record(&rows[0], "0509").unwrap();

        assert_eq!(record.title, "화제의 글");
        assert_eq!(record.comments, 34);
        assert_eq!(record.views, 0);
        assert_eq!(record.url, "https://www.fmkorea.com/7811111111");
    }

    #[test]
    fn test_stop_on_first_page_without_target() {
        let a = adapter();
        let on_target = vec!["0509".to_string(), "0509".to_string()];
        let past = vec!["0508".to_string(), "0508".to_string()];

        assert!(!a.should_stop(&on_target, "0509", true));
        assert!(a.should_stop(&past, "0509", true));
        assert!(a.should_stop(&[], "0509", false));
    }

    #[test]
    fn test_parse_detail_views() {
        let doc = Html::parse_document(
            r#"<div class="side fr"><span>조회 1,234</span><span>추천 56</span></div>"#,
        );
        assert_eq!(FmKoreaAdapter::parse_detail_views(&doc), 1234);

        let doc = Html::parse_document(r#"<div class="side fr"><span>4,567</span></div>"#);
        assert_eq!(FmKoreaAdapter::parse_detail_views(&doc), 4567);
    }
}
