//! Harvested post data structures.

use serde::{Deserialize, Serialize};

use super::Source;

/// One harvested post.
///
/// Created by a source adapter during row extraction. `url` is absolute and
/// `day_code` is always four ASCII digits by the time the record leaves its
/// adapter. `hot_score` is filled in exactly once by the score calculator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    /// Cleaned post title
    pub title: String,

    /// Absolute URL to the post
    pub url: String,

    /// Date text exactly as rendered on the listing page
    pub raw_date: String,

    /// Canonical `MMDD` day code
    pub day_code: String,

    /// Site the post was harvested from
    pub source: Source,

    /// View count (0 when the site does not expose one)
    pub views: u64,

    /// Comment count
    pub comments: u64,

    /// Cross-source hotness score in [0, 11]; absent until scored
    pub hot_score: Option<f64>,
}

/// One candidate row as present in a fetched listing page, before
/// normalization. Field contents are adapter-specific raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub title: String,
    pub href: String,
    pub raw_date: String,
    pub views_text: String,
    pub comments_text: String,
    /// Pinned/notice rows are excluded from extraction and stop decisions.
    pub notice: bool,
}

/// Per-source normalization basis for hot scoring.
///
/// Maxima are floored at 1 so scoring never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceStats {
    pub max_views: u64,
    pub max_comments: u64,
}

impl SourceStats {
    /// Collect maxima over one source's records.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut max_views = 1;
        let mut max_comments = 1;
        for record in records {
            max_views = max_views.max(record.views);
            max_comments = max_comments.max(record.comments);
        }
        Self {
            max_views,
            max_comments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(views: u64, comments: u64) -> Record {
        Record {
            title: "테스트 게시물".to_string(),
            url: "https://example.com/post/1".to_string(),
            raw_date: "05.09".to_string(),
            day_code: "0509".to_string(),
            source: Source::Theqoo,
            views,
            comments,
            hot_score: None,
        }
    }

    #[test]
    fn test_stats_floor_at_one() {
        let records = vec![sample(0, 0)];
        let stats = SourceStats::from_records(&records);
        assert_eq!(stats.max_views, 1);
        assert_eq!(stats.max_comments, 1);
    }

    #[test]
    fn test_stats_take_maxima() {
        let records = vec![sample(120, 3), sample(48, 17)];
        let stats = SourceStats::from_records(&records);
        assert_eq!(stats.max_views, 120);
        assert_eq!(stats.max_comments, 17);
    }
}
