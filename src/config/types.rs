use serde::Deserialize;
use std::time::Duration;

/// Default explorer the harvester points at
pub const DEFAULT_BASE_URL: &str = "https://ethplorer.io";

/// Provenance written to `unified_addresses.source`
pub const DEFAULT_PROVENANCE: &str = "ethplorer";

/// Main configuration structure for Tag-Harvester
///
/// Every section has defaults, so an empty file (or no file at all) yields a
/// usable configuration pointed at the public explorer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub navigator: NavigatorConfig,
    pub selectors: SelectorConfig,
    pub checkpoint: CheckpointConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// The crawled site
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Site root; tag cloud lives at `{base-url}/tag`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Provenance tag stored with every unified address row
    pub provenance: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            provenance: DEFAULT_PROVENANCE.to_string(),
        }
    }
}

/// Page navigator behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Run the navigator without a visible window
    pub headless: bool,

    /// User agent sent with every page and icon request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// How long to wait for the listing to render (milliseconds)
    #[serde(rename = "render-timeout-ms")]
    pub render_timeout_ms: u64,

    /// Interval between render checks (milliseconds)
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,

    /// Pause after a page renders, before blocks are read (milliseconds)
    #[serde(rename = "settle-delay-ms")]
    pub settle_delay_ms: u64,

    /// Pause after following the next-page control (milliseconds)
    #[serde(rename = "page-delay-ms")]
    pub page_delay_ms: u64,
}

impl NavigatorConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            headless: true,
            user_agent: format!("tag-harvester/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 30,
            render_timeout_ms: 30_000,
            poll_interval_ms: 1_000,
            settle_delay_ms: 500,
            page_delay_ms: 1_000,
        }
    }
}

/// CSS selectors describing the explorer's markup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Tag links on the tag cloud page
    #[serde(rename = "tag-cloud")]
    pub tag_cloud: String,

    /// One address block on a listing page
    #[serde(rename = "listing-block")]
    pub listing_block: String,

    /// Address text, relative to a block
    pub address: String,

    /// Token/contract name, relative to a block
    pub name: String,

    /// Public tag labels, relative to a block
    #[serde(rename = "tag-name")]
    pub tag_name: String,

    /// Icon image, relative to a block
    pub icon: String,

    /// Enabled pagination links
    #[serde(rename = "next-page")]
    pub next_page: String,

    /// Text of the pagination link that advances one page
    #[serde(rename = "next-label")]
    pub next_label: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            tag_cloud: ".word-cloud-item a".to_string(),
            listing_block: ".d-flex.flex-column.flex-fill".to_string(),
            address: ".tags-table-address .overflow-center-elips".to_string(),
            name: ".tags-table-token a".to_string(),
            tag_name: ".tags-list .tag__public .tag_name".to_string(),
            icon: ".tags-table-token-icon".to_string(),
            next_page: "li.page-item:not(.disabled) a.page-link".to_string(),
            next_label: "›".to_string(),
        }
    }
}

impl SelectorConfig {
    /// All selectors paired with their config key, for validation
    pub fn entries(&self) -> [(&'static str, &str); 7] {
        [
            ("tag-cloud", &self.tag_cloud),
            ("listing-block", &self.listing_block),
            ("address", &self.address),
            ("name", &self.name),
            ("tag-name", &self.tag_name),
            ("icon", &self.icon),
            ("next-page", &self.next_page),
        ]
    }
}

/// Pending-tag checkpoint location
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    /// Path to the newline-delimited checkpoint file
    pub path: String,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            path: "data/remaining_tags.txt".to_string(),
        }
    }
}

/// Database connection parameters
///
/// The embedded SQLite backend only uses `name`, which is the database file path.
/// The network parameters are accepted so deployments sharing an environment
/// with a server-backed store keep working.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite database file path
    pub name: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
}

impl DatabaseConfig {
    /// Returns true if any server connection parameter was supplied
    pub fn has_network_params(&self) -> bool {
        self.user.is_some() || self.password.is_some() || self.host.is_some() || self.port.is_some()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: "data/addresses.db".to_string(),
            user: None,
            password: None,
            host: None,
            port: None,
        }
    }
}

/// Log output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level name (`trace`..`error`; `WARNING` and `CRITICAL` are accepted too)
    pub level: String,

    /// Directory holding the log file
    pub directory: String,

    /// Log file name inside `directory`
    pub file: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: "data".to_string(),
            file: "parser.log".to_string(),
        }
    }
}
