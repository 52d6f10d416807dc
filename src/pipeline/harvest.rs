// src/pipeline/harvest.rs

//! One full harvest run: crawl, score, encode, store.

use chrono::Utc;
use futures::future::join_all;

use crate::dates;
use crate::error::{AppError, Result};
use crate::models::{Config, Record, Target};
use crate::pipeline::report::{artifact_name, to_csv, RunSummary};
use crate::services::{HotScoreCalculator, PaginationCrawler, TitleClassifier};
use crate::sources::build_adapters;
use crate::storage::{ArtifactStore, LocalStore};
use crate::utils::http;

/// What a completed run produced and where it went.
#[derive(Debug)]
pub struct HarvestReport {
    pub summary: RunSummary,
    pub artifact: String,
    pub locator: String,
}

/// Execute one harvest for the given target day.
///
/// Source failures are isolated; the run fails only when configuration is
/// invalid, every source comes back empty, or the artifact cannot be stored
/// anywhere.
pub async fn run_harvest(config: &Config, target: &Target) -> Result<HarvestReport> {
    config.validate()?;

    let client = http::create_client(&config.crawler)?;
    let reference = Utc::now().with_timezone(&dates::kst());
    let adapters = build_adapters(config);

    log::info!(
        "Harvesting day {} across {} sources",
        target.day_code(),
        adapters.len()
    );

    let outcomes = join_all(adapters.iter().map(|adapter| {
        let crawler = PaginationCrawler::new(adapter.as_ref(), &client, &config.crawler, reference);
        async move { crawler.run(target).await }
    }))
    .await;

    let mut records: Vec<Record> = Vec::new();
    for outcome in outcomes {
        records.extend(outcome.records);
    }
    if records.is_empty() {
        return Err(AppError::NoData);
    }

    score_and_sort(&mut records);

    if let Some(classifier) = TitleClassifier::from_config(&config.classifier) {
        let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
        classifier.summarize(&titles).await;
    }

    let now = Utc::now().with_timezone(&dates::kst());
    let artifact = artifact_name(target, now);
    let bytes = to_csv(&records)?;
    let locator = store_artifact(config, &artifact, &bytes).await?;

    let summary = RunSummary::from_records(&records);
    summary.log();
    log::info!("Artifact stored at {locator}");

    Ok(HarvestReport {
        summary,
        artifact,
        locator,
    })
}

/// Score the merged batch against per-source maxima, then order it by score
/// descending. The sort is stable: equal scores keep discovery order.
fn score_and_sort(records: &mut [Record]) {
    let calculator = HotScoreCalculator::collect_stats(records);
    calculator.score_all(records);
    records.sort_by(|a, b| {
        b.hot_score
            .partial_cmp(&a.hot_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Store the artifact, preferring S3 when configured but never losing the
/// run to an upload failure.
async fn store_artifact(config: &Config, name: &str, bytes: &[u8]) -> Result<String> {
    #[cfg(feature = "s3")]
    if let Some(bucket) = &config.output.s3_bucket {
        let store = crate::storage::S3Store::from_env(bucket, &config.output.s3_prefix).await;
        match store.store(name, bytes).await {
            Ok(locator) => return Ok(locator),
            Err(error) => {
                log::warn!("Upload failed, falling back to local storage: {error}");
            }
        }
    }
    #[cfg(not(feature = "s3"))]
    if config.output.s3_bucket.is_some() {
        log::warn!("S3 output configured but the s3 feature is disabled; storing locally");
    }

    LocalStore::new(&config.output.dir).store(name, bytes).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;

    fn record(source: Source, title: &str, views: u64, comments: u64) -> Record {
        Record {
            title: title.into(),
            url: format!("https://example.com/{title}"),
            raw_date: "05.09".into(),
            day_code: "0509".into(),
            source,
            views,
            comments,
            hot_score: None,
        }
    }

    #[test]
    fn test_equal_scores_keep_discovery_order() {
        // Each record is its own source's maximum, so all three tie at 11.0.
        let mut records = vec![
            record(Source::DcInside, "first", 100, 10),
            record(Source::Theqoo, "second", 7, 3),
            record(Source::Instiz, "third", 9999, 500),
        ];
        score_and_sort(&mut records);

        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
        assert!(records.iter().all(|r| r.hot_score == Some(11.0)));
    }

    #[test]
    fn test_merged_batch_scores_sorts_and_summarizes() {
        // Two sources contribute 2 and 5 records, a third contributes none.
        let mut records = vec![
            record(Source::DcInside, "d-top", 1000, 50),
            record(Source::DcInside, "d-low", 100, 5),
            record(Source::Instiz, "i0", 10, 1),
            record(Source::Instiz, "i1", 20, 2),
            record(Source::Instiz, "i2", 500, 40),
            record(Source::Instiz, "i3", 30, 3),
            record(Source::Instiz, "i4", 40, 4),
        ];
        score_and_sort(&mut records);

        assert_eq!(records.len(), 7);
        let scores: Vec<f64> = records.iter().map(|r| r.hot_score.unwrap()).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        // Per-source maxima both land at the top of the ordering.
        assert_eq!(records[0].hot_score, Some(11.0));
        assert_eq!(records[1].hot_score, Some(11.0));

        let summary = crate::pipeline::RunSummary::from_records(&records);
        assert_eq!(summary.total, 7);
        assert!(summary.per_source.contains(&(Source::DcInside, 2)));
        assert!(summary.per_source.contains(&(Source::FmKorea, 0)));
        assert!(summary.per_source.contains(&(Source::Instiz, 5)));
    }

    #[tokio::test]
    async fn test_invalid_config_fails_before_any_fetch() {
        let mut config = Config::default();
        for source in crate::models::Source::ALL {
            match source {
                crate::models::Source::DcInside => config.sources.dcinside.enabled = false,
                crate::models::Source::FmKorea => config.sources.fmkorea.enabled = false,
                crate::models::Source::Theqoo => config.sources.theqoo.enabled = false,
                crate::models::Source::Instiz => config.sources.instiz.enabled = false,
            }
        }
        let target = Target::new("0509").unwrap();
        let error = run_harvest(&config, &target).await.unwrap_err();
        assert!(matches!(error, AppError::Config(_)));
    }

    #[tokio::test]
    async fn test_local_fallback_writes_artifact() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.output.dir = tmp.path().display().to_string();
        config.output.s3_bucket = None;

        let locator = store_artifact(&config, "run.csv", b"data").await.unwrap();
        assert!(std::path::Path::new(&locator).exists());
    }
}
