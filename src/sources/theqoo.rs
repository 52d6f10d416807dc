//! Theqoo hot-board adapter.
//!
//! The hot listing is only loosely reverse-chronological, so no monotone
//! stop rule applies: the crawler keeps paging until two consecutive pages
//! yield no target-day row (miss streak). Pinned notice rows appear inline
//! and are flagged so they never count toward stop decisions.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::models::{RawRow, Record, Source, SourceConfig};
use crate::sources::{FetchFailurePolicy, PagePolicy, SourceAdapter};
use crate::utils::{parse_count, resolve};

static ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.theqoo_board_table tbody tr").expect("valid selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.title a[href]").expect("valid selector"));
static REPLY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.title a.replyNum").expect("valid selector"));
static TIME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.time").expect("valid selector"));
static VIEWS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.m_no").expect("valid selector"));

pub struct TheqooAdapter {
    config: SourceConfig,
}

impl TheqooAdapter {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    fn is_notice_row(row: scraper::ElementRef<'_>) -> bool {
        let value = row.value();
        let by_class = value
            .classes()
            .any(|c| c.to_ascii_lowercase().contains("notice") || c.eq_ignore_ascii_case("sticky"));
        by_class || value.attr("data-permanent-notice") == Some("Y")
    }
}

impl SourceAdapter for TheqooAdapter {
    fn source(&self) -> Source {
        Source::Theqoo
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
        let separator = if self.config.base_url.contains('?') { '&' } else { '?' };
        format!("{}{separator}page={page}", self.config.base_url)
    }

    fn extract_rows(&self, doc: &Html, _page: u32) -> Vec<RawRow> {
        doc.select(&ROW)
            .filter_map(|row| {
                let notice = Self::is_notice_row(row);

                let title_elem = row.select(&TITLE).next()?;
                let date_text = row
                    .select(&TIME)
                    .next()
                    .map(|e| e.text().collect::<String>().trim().to_string())?;
                if date_text.is_empty() {
                    return None;
                }

                let comments_text = row
                    .select(&REPLY)
                    .next()
                    .map(|e| e.text().collect::<String>())
                    .unwrap_or_default();
                let views_text = row
                    .select(&VIEWS)
                    .next()
                    .map(|e| e.text().collect::<String>())
                    .unwrap_or_default();

                Some(RawRow {
                    title: title_elem.text().collect::<String>().trim().to_string(),
                    href: title_elem.value().attr("href").unwrap_or("").to_string(),
                    raw_date: date_text,
                    views_text,
                    comments_text,
                    notice,
                })
            })
            .collect()
    }

    fn should_stop(&self, page_day_codes: &[String], _target: &str, _started: bool) -> bool {
        // Ranking order is too weak for a monotone rule; the miss-streak
        // limiter in the crawler decides when to give up.
        page_day_codes.is_empty()
    }

    fn to_record(&self, row: &RawRow, day_code: &str) -> Option<Record> {
        if row.title.is_empty() || row.href.is_empty() {
            return None;
        }
        let url = resolve(&self.config.base_url, &row.href)?;

        Some(Record {
            title: row.title.clone(),
            url,
            raw_date: row.raw_date.clone(),
            day_code: day_code.to_string(),
            source: Source::Theqoo,
            views: parse_count(&row.views_text),
            comments: parse_count(&row.comments_text),
            hot_score: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Config;

    fn adapter() -> TheqooAdapter {
        TheqooAdapter::new(Config::default().sources.theqoo)
    }

    fn listing(rows: &str) -> Html {
        Html::parse_document(&format!(
            "<table class=\"theqoo_board_table\"><tbody>{rows}</tbody></table>"
        ))
    }

    #[test]
    fn test_extract_flags_notice_rows() {
        let html = listing(
            r#"<tr class="notice"><td class="title"><a href="/1">공지</a></td><td class="time">05.01</td></tr>
               <tr data-permanent-notice="Y"><td class="title"><a href="/2">고정</a></td><td class="time">05.01</td></tr>
               <tr><td class="m_no">2,345</td><td class="title"><a href="/hot/3">실시간 인기글</a>
                   <a class="replyNum" href="/hot/3">128</a></td><td class="time">05.09</td></tr>"#,
        );
        let rows = adapter().extract_rows(&html, 1);
        assert_eq!(rows.len(), 3);
        assert!(rows[0].notice);
        assert!(rows[1].notice);
        assert!(!rows[2].notice);
    }

    #[test]
    fn test_to_record() {
        let html = listing(
            r#"<tr><td class="m_no">2,345</td><td class="title"><a href="/hot/3">실시간 인기글</a>
                   <a class="replyNum" href="/hot/3">128</a></td><td class="time">14:05</td></tr>"#,
        );
        let rows = adapter().extract_rows(&html, 1);
        let record = adapter().to_record(&rows[0], "0509").unwrap();

        assert_eq!(record.title, "실시간 인기글");
        assert_eq!(record.url, "https://theqoo.net/hot/3");
        assert_eq!(record.views, 2345);
        assert_eq!(record.comments, 128);
    }

    #[test]
    fn test_stop_only_on_empty_page() {
        let a = adapter();
        let past = vec!["0101".to_string()];
        assert!(!a.should_stop(&past, "0509", true));
        assert!(a.should_stop(&[], "0509", true));
    }
}
