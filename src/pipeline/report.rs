// src/pipeline/report.rs

//! CSV artifact encoding and run-level statistics.

use chrono::{DateTime, FixedOffset};

use crate::error::Result;
use crate::models::{Record, Source, Target};

/// UTF-8 byte order mark. Spreadsheet tools on Windows misread Korean
/// titles without it.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Scores at or above this count as "high" in the run summary.
const HIGH_SCORE_THRESHOLD: f64 = 5.5;

/// Artifact file name: `community_crawling_<MMDD>_<YYYYMMDD_HHMM>.csv`.
///
/// The first stamp is the harvested day, the second the generation instant.
pub fn artifact_name(target: &Target, now: DateTime<FixedOffset>) -> String {
    format!(
        "community_crawling_{}_{}.csv",
        target.day_code(),
        now.format("%Y%m%d_%H%M")
    )
}

/// Encode records as a BOM-prefixed CSV document.
///
/// Column order is part of the artifact contract; `content` is reserved and
/// always empty.
pub fn to_csv(records: &[Record]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "title", "url", "date", "source", "content", "views", "comments", "hot_score",
    ])?;
    for record in records {
        writer.write_record([
            record.title.as_str(),
            record.url.as_str(),
            record.raw_date.as_str(),
            record.source.label(),
            "",
            &record.views.to_string(),
            &record.comments.to_string(),
            &format!("{:.2}", record.hot_score.unwrap_or(0.0)),
        ])?;
    }
    let body = writer
        .into_inner()
        .map_err(|e| crate::error::AppError::crawl("csv", e))?;

    let mut bytes = Vec::with_capacity(UTF8_BOM.len() + body.len());
    bytes.extend_from_slice(UTF8_BOM);
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Aggregate statistics for one run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub total: usize,
    /// Record counts per source, in registry order (zero entries included)
    pub per_source: Vec<(Source, usize)>,
    pub mean_score: f64,
    pub max_score: f64,
    pub min_score: f64,
    /// Records scoring at or above the high-score threshold
    pub high_count: usize,
}

impl RunSummary {
    pub fn from_records(records: &[Record]) -> Self {
        let per_source = Source::ALL
            .into_iter()
            .map(|s| (s, records.iter().filter(|r| r.source == s).count()))
            .collect();

        let scores: Vec<f64> = records
            .iter()
            .map(|r| r.hot_score.unwrap_or(0.0))
            .collect();
        let (mean_score, max_score, min_score) = if scores.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            (
                scores.iter().sum::<f64>() / scores.len() as f64,
                scores.iter().cloned().fold(f64::MIN, f64::max),
                scores.iter().cloned().fold(f64::MAX, f64::min),
            )
        };

        Self {
            total: records.len(),
            per_source,
            mean_score,
            max_score,
            min_score,
            high_count: scores
                .iter()
                .filter(|s| **s >= HIGH_SCORE_THRESHOLD)
                .count(),
        }
    }

    pub fn log(&self) {
        log::info!("Harvested {} records", self.total);
        for (source, count) in &self.per_source {
            log::info!("  {}: {} records", source.label(), count);
        }
        log::info!(
            "Scores: mean {:.2}, max {:.2}, min {:.2}; {} at or above {HIGH_SCORE_THRESHOLD}",
            self.mean_score,
            self.max_score,
            self.min_score,
            self.high_count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(source: Source, title: &str, score: f64) -> Record {
        Record {
            title: title.into(),
            url: format!("https://example.com/{title}"),
            raw_date: "05.09".into(),
            day_code: "0509".into(),
            source,
            views: 100,
            comments: 10,
            hot_score: Some(score),
        }
    }

    #[test]
    fn test_artifact_name_format() {
        let target = Target::new("0509").unwrap();
        let now = crate::dates::kst()
            .with_ymd_and_hms(2024, 5, 10, 7, 5, 0)
            .unwrap();
        assert_eq!(
            artifact_name(&target, now),
            "community_crawling_0509_20240510_0705.csv"
        );
    }

    #[test]
    fn test_csv_starts_with_bom_and_header() {
        let bytes = to_csv(&[record(Source::Theqoo, "글", 1.0)]).unwrap();
        assert_eq!(&bytes[..3], b"\xEF\xBB\xBF");
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("title,url,date,source,content,views,comments,hot_score")
        );
        let row = lines.next().unwrap();
        assert!(row.contains("더쿠"));
        assert!(row.ends_with(",1.00"));
    }

    #[test]
    fn test_csv_quotes_embedded_commas() {
        let bytes = to_csv(&[record(Source::Instiz, "a, b", 2.5)]).unwrap();
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert!(text.contains("\"a, b\""));
    }

    #[test]
    fn test_csv_row_count_across_sources() {
        // Two sources with records, one empty: rows for the seven records only.
        let mut records = Vec::new();
        for i in 0..2 {
            records.push(record(Source::DcInside, &format!("d{i}"), 3.0));
        }
        for i in 0..5 {
            records.push(record(Source::Instiz, &format!("i{i}"), 4.0));
        }
        let bytes = to_csv(&records).unwrap();
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        assert_eq!(text.lines().count(), 8); // header + 7 rows
    }

    #[test]
    fn test_summary_counts_every_source() {
        let records = vec![
            record(Source::DcInside, "a", 6.0),
            record(Source::DcInside, "b", 2.0),
            record(Source::Instiz, "c", 5.5),
        ];
        let summary = RunSummary::from_records(&records);

        assert_eq!(summary.total, 3);
        assert!(summary.per_source.contains(&(Source::DcInside, 2)));
        assert!(summary.per_source.contains(&(Source::FmKorea, 0)));
        assert_eq!(summary.high_count, 2); // 6.0 and the threshold-equal 5.5
        assert_eq!(summary.max_score, 6.0);
        assert_eq!(summary.min_score, 2.0);
        assert!((summary.mean_score - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_summary_of_nothing() {
        let summary = RunSummary::from_records(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.mean_score, 0.0);
        assert_eq!(summary.high_count, 0);
    }
}
