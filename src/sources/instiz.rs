//! Instiz rate-ranked adapter.
//!
//! The listing is a near-real-time popularity ranking, not a strict recency
//! feed, so there is no ordering to exploit: the crawler walks pages with a
//! hard page cap and a miss-streak limiter. Date and view count share one
//! info cell (`05.09 조회 1,234`).

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::models::{RawRow, Record, Source, SourceConfig};
use crate::sources::{FetchFailurePolicy, PagePolicy, SourceAdapter};
use crate::utils::{parse_count, resolve, strip_comment_suffix};

static ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.listsubject").expect("valid selector"));
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("valid selector"));
static SUBJECT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.sbj").expect("valid selector"));
static COMMENTS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.cmt2").expect("valid selector"));
static INFO: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.listno.regdate").expect("valid selector"));

static INFO_VIEWS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"조회\s*([\d,]+)").expect("valid regex"));

pub struct InstizAdapter {
    config: SourceConfig,
}

impl InstizAdapter {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }
}

impl SourceAdapter for InstizAdapter {
    fn source(&self) -> Source {
        Source::Instiz
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

    fn extract_rows(&self, doc: &Html, _page: u32) -> Vec<RawRow> {
        doc.select(&ROW)
            .filter_map(|cell| {
                // Ranked rows carry an r-prefixed class; everything else in
                // the table is chrome.
                if !cell.value().classes().any(|c| c.starts_with('r')) {
                    return None;
                }

                let link = cell.select(&LINK).next()?;
                let subject = link.select(&SUBJECT).next()?;
                let info = cell.select(&INFO).next()?;

                let comments_text = subject
                    .select(&COMMENTS)
                    .next()
                    .map(|e| e.text().collect::<String>())
                    .unwrap_or_default();
                let info_text = info
                    .text()
                    .collect::<String>()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ");

                Some(RawRow {
                    title: subject.text().collect::<String>().trim().to_string(),
                    href: link.value().attr("href").unwrap_or("").to_string(),
                    raw_date: info_text.clone(),
                    views_text: info_text,
                    comments_text,
                    notice: false,
                })
            })
            .collect()
    }

    fn should_stop(&self, page_day_codes: &[String], _target: &str, _started: bool) -> bool {
        // Rate-ranked ordering carries no recency guarantee; rely on the
        // miss streak and the page cap.
        page_day_codes.is_empty()
    }

    fn to_record(&self, row: &RawRow, day_code: &str) -> Option<Record> {
        // Drop the comment-count suffix the subject div appends, then any
        // parenthesized author tail.
        let base = row.title.split('(').next().unwrap_or("").trim();
        let title = strip_comment_suffix(base);
        if title.is_empty() || row.href.is_empty() {
            return None;
        }
        let url = resolve(&self.config.base_url, &row.href)?;

        let views = INFO_VIEWS
            .captures(&row.views_text)
            .map(|caps| parse_count(&caps[1]))
            .unwrap_or(0);

        Some(Record {
            title,
            url,
            raw_date: row.raw_date.clone(),
            day_code: day_code.to_string(),
            source: Source::Instiz,
            views,
            comments: parse_count(&row.comments_text),
            hot_score: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Config;

    fn adapter() -> InstizAdapter {
        InstizAdapter::new(Config::default().sources.instiz)
    }

    fn listing(cells: &str) -> Html {
        Html::parse_document(&format!("<table><tbody><tr>{cells}</tr></tbody></table>"))
    }

    #[test]
    fn test_extract_requires_rank_class() {
        let html = listing(
            r#"<td class="listsubject"><a href="/pt/1"><div class="sbj">랭크 없는 행</div></a>
                   <div class="listno regdate">05.09</div></td>
               <td class="listsubject r3"><a href="/pt/2"><div class="sbj">인기글 제목 <span class="cmt2">45</span></div></a>
                   <div class="listno regdate">05.09 조회 9,876</div></td>"#,
        );
        let rows = adapter().extract_rows(&html, 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].href, "/pt/2");
    }

    #[test]
    fn test_to_record_parses_shared_info_cell() {
        let html = listing(
            r#"<td class="listsubject r1"><a href="pt/77"><div class="sbj">인기글 제목 (익명) [45]<span class="cmt2">45</span></div></a>
                   <div class="listno regdate">05.09 조회 9,876</div></td>"#,
        );
        let rows = adapter().extract_rows(&html, 1);
        let record = adapter().to_record(&rows[0], "0509").unwrap();

        assert_eq!(record.title, "인기글 제목");
        assert_eq!(record.url, "https://www.instiz.net/pt/77");
        assert_eq!(record.views, 9876);
        assert_eq!(record.comments, 45);
        assert_eq!(record.day_code, "0509");
    }

    #[test]
    fn test_clock_only_info_cell_is_clock_time() {
        let html = listing(
            r#"<td class="listsubject r2"><a href="/pt/9"><div class="sbj">방금 올라온 글</div></a>
                   <div class="listno regdate">14:05 조회 120</div></td>"#,
        );
        let rows = adapter().extract_rows(&html, 1);
        assert!(crate::dates::is_clock_time(&rows[0].raw_date));
    }
}
