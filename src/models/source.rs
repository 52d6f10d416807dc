//! Source site identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the community sites the harvester knows how to page through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    DcInside,
    FmKorea,
    Theqoo,
    Instiz,
}

impl Source {
    /// All known sources, in registry order.
    pub const ALL: [Source; 4] = [
        Source::DcInside,
        Source::FmKorea,
        Source::Theqoo,
        Source::Instiz,
    ];

    /// Stable key used in configuration and logs.
    pub fn key(&self) -> &'static str {
        match self {
            Source::DcInside => "dcinside",
            Source::FmKorea => "fmkorea",
            Source::Theqoo => "theqoo",
            Source::Instiz => "instiz",
        }
    }

    /// Display name written into the artifact's `source` column.
    pub fn label(&self) -> &'static str {
        match self {
            Source::DcInside => "디시인사이드",
            Source::FmKorea => "FM코리아",
            Source::Theqoo => "더쿠",
            Source::Instiz => "인스티즈",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
