// src/services/score.rs

//! Two-phase hotness scoring.
//!
//! Phase one observes per-source maxima over the whole harvest; phase two
//! scores each record relative to its own source's maxima, so sites with
//! different traffic magnitudes stay comparable.

use std::collections::HashMap;

use crate::models::{Record, Source, SourceStats};

/// Score for a record whose source produced no statistics.
const UNSEEN_SCORE: f64 = 0.0;

#[derive(Debug, Default)]
pub struct HotScoreCalculator {
    stats: HashMap<Source, SourceStats>,
}

impl HotScoreCalculator {
    /// Phase one: observe per-source maxima across the full record set.
    pub fn collect_stats(records: &[Record]) -> Self {
        let mut stats: HashMap<Source, SourceStats> = HashMap::new();
        for source in Source::ALL {
            if !records.iter().any(|r| r.source == source) {
                continue;
            }
            let per_source = records.iter().filter(|r| r.source == source);
            stats.insert(source, SourceStats::from_records(per_source));
        }
        Self { stats }
    }

    /// Phase two: score one record against its source's maxima.
    ///
    /// `min(views / max_views, 1) + min(comments / max_comments * 10, 10)`,
    /// rounded to two decimals. Range is `[0, 11]`; a record from a source
    /// with no statistics scores 0.
    pub fn score(&self, record: &Record) -> f64 {
        let Some(stats) = self.stats.get(&record.source) else {
            return UNSEEN_SCORE;
        };
        let view_score = (record.views as f64 / stats.max_views as f64).min(1.0);
        let comment_score = (record.comments as f64 / stats.max_comments as f64 * 10.0).min(10.0);
        round2(view_score + comment_score)
    }

    /// Stamp every record's `hot_score` in place.
    pub fn score_all(&self, records: &mut [Record]) {
        for record in records.iter_mut() {
            record.hot_score = Some(self.score(record));
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
