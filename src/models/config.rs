//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Source;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Artifact destination settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Optional title classification collaborator
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Per-source settings
    #[serde(default)]
    pub sources: SourcesConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Settings for one source site.
    pub fn source(&self, source: Source) -> &SourceConfig {
        match source {
            Source::DcInside => &self.sources.dcinside,
            Source::FmKorea => &self.sources.fmkorea,
            Source::Theqoo => &self.sources.theqoo,
            Source::Instiz => &self.sources.instiz,
        }
    }

    /// Sources enabled for this run, in registry order.
    pub fn enabled_sources(&self) -> Vec<Source> {
        Source::ALL
            .into_iter()
            .filter(|s| self.source(*s).enabled)
            .collect()
    }

    /// Validate configuration values for basic sanity.
    ///
    /// This runs before any network activity; a failure here is fatal.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::config("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::config("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.boundary_probe_limit == 0 {
            return Err(AppError::config(
                "crawler.boundary_probe_limit must be > 0",
            ));
        }
        if self.output.dir.trim().is_empty() {
            return Err(AppError::config("output.dir is empty"));
        }
        if self.enabled_sources().is_empty() {
            return Err(AppError::config("No sources enabled"));
        }
        for source in Source::ALL {
            let sc = self.source(source);
            if !sc.enabled {
                continue;
            }
            if !sc.base_url.starts_with("http") {
                return Err(AppError::config(format!(
                    "sources.{}.base_url must be absolute",
                    source.key()
                )));
            }
            if sc.delay_min_ms > sc.delay_max_ms {
                return Err(AppError::config(format!(
                    "sources.{}: delay_min_ms > delay_max_ms",
                    source.key()
                )));
            }
            if sc.miss_limit == Some(0) {
                return Err(AppError::config(format!(
                    "sources.{}.miss_limit must be > 0 when set",
                    source.key()
                )));
            }
        }
        Ok(())
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Bounded retries per page before the fetch is treated as terminal
    #[serde(default = "defaults::retries")]
    pub retries: u32,

    /// Disable to skip the randomized inter-request delay (tests, dry runs)
    #[serde(default = "defaults::delay_enabled")]
    pub delay_enabled: bool,

    /// Probe budget for the boundary scan before it gives up on equality
    #[serde(default = "defaults::boundary_probe_limit")]
    pub boundary_probe_limit: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            retries: defaults::retries(),
            delay_enabled: defaults::delay_enabled(),
            boundary_probe_limit: defaults::boundary_probe_limit(),
        }
    }
}

/// Artifact destination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Local directory the artifact is written to (also the upload fallback)
    #[serde(default = "defaults::output_dir")]
    pub dir: String,

    /// S3 bucket for upload; local-only when absent
    #[serde(default)]
    pub s3_bucket: Option<String>,

    /// Key prefix inside the bucket
    #[serde(default = "defaults::s3_prefix")]
    pub s3_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: defaults::output_dir(),
            s3_bucket: None,
            s3_prefix: defaults::s3_prefix(),
        }
    }
}

/// Best-effort title classifier collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// HTTP endpoint accepting a list of titles; classification is skipped
    /// when absent
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "defaults::classifier_timeout")]
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: defaults::classifier_timeout(),
        }
    }
}

/// Per-source settings, one block per site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "defaults::dcinside")]
    pub dcinside: SourceConfig,

    #[serde(default = "defaults::fmkorea")]
    pub fmkorea: SourceConfig,

    #[serde(default = "defaults::theqoo")]
    pub theqoo: SourceConfig,

    #[serde(default = "defaults::instiz")]
    pub instiz: SourceConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            dcinside: defaults::dcinside(),
            fmkorea: defaults::fmkorea(),
            theqoo: defaults::theqoo(),
            instiz: defaults::instiz(),
        }
    }
}

/// Settings for one source site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Skip this source entirely when false
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,

    /// Listing URL without the page parameter
    pub base_url: String,

    /// Consecutive pages without a target-day row before stopping;
    /// unset for sources with a monotone newest-first stop rule
    #[serde(default)]
    pub miss_limit: Option<u32>,

    /// Hard ceiling on accumulated results for unbounded backlogs
    #[serde(default)]
    pub max_results: Option<usize>,

    /// Hard ceiling on pages visited
    #[serde(default)]
    pub max_pages: Option<u32>,

    /// Inter-request delay bounds in milliseconds
    #[serde(default = "defaults::delay_min")]
    pub delay_min_ms: u64,

    #[serde(default = "defaults::delay_max")]
    pub delay_max_ms: u64,

    /// Page number the boundary scan starts probing from
    #[serde(default)]
    pub start_hint: Option<u32>,
}

mod defaults {
    use super::SourceConfig;

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into()
    }
    pub fn timeout() -> u64 {
        60
    }
    pub fn retries() -> u32 {
        2
    }
    pub fn delay_enabled() -> bool {
        true
    }
    pub fn boundary_probe_limit() -> u32 {
        60
    }

    // Output defaults
    pub fn output_dir() -> String {
        "output".into()
    }
    pub fn s3_prefix() -> String {
        "hotboard".into()
    }
    pub fn classifier_timeout() -> u64 {
        30
    }

    // Source defaults
    pub fn enabled() -> bool {
        true
    }
    pub fn delay_min() -> u64 {
        500
    }
    pub fn delay_max() -> u64 {
        1000
    }

    pub fn dcinside() -> SourceConfig {
        SourceConfig {
            enabled: true,
            base_url: "https://gall.dcinside.com/board/lists/?id=dcbest&list_num=100&_dcbest=9"
                .into(),
            miss_limit: None,
            max_results: Some(300),
            max_pages: None,
            delay_min_ms: 500,
            delay_max_ms: 1000,
            start_hint: None,
        }
    }

    pub fn fmkorea() -> SourceConfig {
        SourceConfig {
            enabled: true,
            base_url: "https://www.fmkorea.com/index.php?mid=best".into(),
            miss_limit: None,
            max_results: None,
            max_pages: None,
            delay_min_ms: 1500,
            delay_max_ms: 2500,
            start_hint: Some(5),
        }
    }

    pub fn theqoo() -> SourceConfig {
        SourceConfig {
            enabled: true,
            base_url: "https://theqoo.net/hot".into(),
            miss_limit: Some(2),
            max_results: None,
            max_pages: None,
            delay_min_ms: 5000,
            delay_max_ms: 10000,
            start_hint: None,
        }
    }

    pub fn instiz() -> SourceConfig {
        SourceConfig {
            enabled: true,
            base_url: "https://www.instiz.net/pt?srt=3&srd=4".into(),
            miss_limit: Some(3),
            max_results: None,
            max_pages: Some(30),
            delay_min_ms: 5000,
            delay_max_ms: 10000,
            start_hint: None,
        }
    }
}
