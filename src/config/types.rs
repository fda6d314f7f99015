use serde::Deserialize;

/// Browser-like User-Agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration structure for FAQ Harvester
///
/// Every section is optional; a missing section falls back to the values the
/// harvester was designed around.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub markers: MarkerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler pacing and retry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Pause before every category or question fetch (milliseconds)
    #[serde(rename = "politeness-delay-ms")]
    pub politeness_delay_ms: u64,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    /// Total attempts per URL, including the first
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Pause between failed attempts (milliseconds)
    #[serde(rename = "retry-delay-ms")]
    pub retry_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            politeness_delay_ms: 1_000,
            request_timeout_ms: 10_000,
            max_attempts: 3,
            retry_delay_ms: 5_000,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Full User-Agent header value
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Substrings and classes used to recognise FAQ structure
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Link substring identifying a category listing page
    #[serde(rename = "category-path")]
    pub category_path: String,

    /// Link substring identifying a single question page
    #[serde(rename = "question-path")]
    pub question_path: String,

    /// CSS class of the element holding question text
    #[serde(rename = "question-class")]
    pub question_class: String,

    /// CSS class of the element holding answer text
    #[serde(rename = "answer-class")]
    pub answer_class: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            category_path: "/category/show/".to_string(),
            question_path: "/faq/show/".to_string(),
            question_class: "faq_qstCont_ttl".to_string(),
            answer_class: "faq_ansCont_txt".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown question/answer table
    #[serde(rename = "table-path")]
    pub table_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "./faq.db".to_string(),
            table_path: "./qa.md".to_string(),
        }
    }
}
