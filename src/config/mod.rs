use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::error;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_WEBDRIVER_URL: &str = "http://127.0.0.1:4444";
const DEFAULT_PRUNE_DAYS: u32 = 90;

/// The tracked keywords when none are configured.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "Ethereum", "ETH", "Bitcoin", "BTC", "SOL", "Bored Ape", "BAYC", "Polygon", "Chainlink",
    "LINK", "Shiba Inu", "SHIB", "Uniswap", "UNI",
];

/// User agent presented to the site.  A mobile profile gets the lighter
/// markup the card extraction selectors are written against.
const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 11; SM-G998B) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/109.0.5414.87 Mobile Safari/537.36";

fn default_bind_address() -> String {
    // The analytics API is meant to be reachable from outside the host
    // (container deployments) — loopback-only operators override this.
    "0.0.0.0".to_string()
}

// ─── ScheduleConfig ───────────────────────────────────────────────────────────

/// Daily run schedule (`[schedule]` in config.toml).
///
/// The job fires at `hour:minute` in the fixed-offset timezone given by
/// `utc_offset_minutes`.  Defaults to 08:05 at UTC+05:30.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Hour of day, 0-23.
    pub hour: u32,
    /// Minute of hour, 0-59.
    pub minute: u32,
    /// Offset from UTC in minutes (e.g. 330 for UTC+05:30, -300 for UTC-05:00).
    pub utc_offset_minutes: i32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            hour: 8,
            minute: 5,
            utc_offset_minutes: 330,
        }
    }
}

// ─── ScraperConfig ────────────────────────────────────────────────────────────

/// Scraper tuning (`[scraper]` in config.toml).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Base URL of the WebDriver endpoint (geckodriver). Default: http://127.0.0.1:4444.
    pub webdriver_url: String,
    /// Run the browser headless. Default: true. The `HEADLESS` env var
    /// ("yes"/"no") overrides this for parity with container deployments.
    pub headless: bool,
    /// Stop collecting once this many tweets are held for a keyword. Default: 50.
    pub max_tweets: usize,
    /// Give up on a keyword after this many consecutive scrolls that surface
    /// nothing new. Default: 10.
    pub max_scroll_attempts: u32,
    /// Search window: tweets from the last N days. Default: 3.
    pub search_window_days: u32,
    /// User agent override for the browser session.
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            headless: true,
            max_tweets: 50,
            max_scroll_attempts: 10,
            search_window_days: 3,
            user_agent: MOBILE_USER_AGENT.to_string(),
        }
    }
}

// ─── ObservabilityConfig ──────────────────────────────────────────────────────

/// Daemon observability configuration (`[observability]` in config.toml).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log SQLite queries that exceed this threshold (milliseconds). Default: 100.
    /// Set to 0 to disable slow query logging.
    pub slow_query_threshold_ms: u64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            slow_query_threshold_ms: 100,
        }
    }
}

// ─── Credentials ──────────────────────────────────────────────────────────────

/// Login credentials for the scraped account.
///
/// Sourced from env only (`TWITTER_MAIL`, `TWITTER_USERNAME`,
/// `TWITTER_PASSWORD`) — never from config.toml, never logged.
#[derive(Clone)]
pub struct Credentials {
    pub mail: String,
    pub username: String,
    pub password: String,
}

// Manual impl so accidental `{:?}` formatting cannot leak the password.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("mail", &self.mail)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Build credentials from the three values; all must be present and
    /// non-empty, otherwise the account is treated as unconfigured.
    pub fn from_values(
        mail: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Option<Self> {
        let mail = mail.filter(|s| !s.is_empty())?;
        let username = username.filter(|s| !s.is_empty())?;
        let password = password.filter(|s| !s.is_empty())?;
        Some(Self {
            mail,
            username,
            password,
        })
    }

    fn from_env() -> Option<Self> {
        Self::from_values(
            std::env::var("TWITTER_MAIL").ok(),
            std::env::var("TWITTER_USERNAME").ok(),
            std::env::var("TWITTER_PASSWORD").ok(),
        )
    }
}

// ─── TOML config file ─────────────────────────────────────────────────────────

/// `{data_dir}/config.toml` — all fields are optional overrides.
/// Priority: CLI / env var  >  TOML  >  built-in default.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// REST server port (default: 8000).
    port: Option<u16>,
    /// Bind address for the REST server (default: "0.0.0.0").
    bind_address: Option<String>,
    /// Log level filter string, e.g. "debug", "info,pulsed=trace" (default: "info").
    log: Option<String>,
    /// Log output format: "pretty" (default) | "json" (structured for log aggregators).
    log_format: Option<String>,
    /// Keywords to track (default: the built-in crypto list).
    keywords: Option<Vec<String>>,
    /// How many days of stored snapshots to keep before pruning (default: 90; 0 = never).
    snapshot_prune_days: Option<u32>,
    /// Daily run schedule (`[schedule]`).
    schedule: Option<ScheduleConfig>,
    /// Scraper tuning (`[scraper]`).
    scraper: Option<ScraperConfig>,
    /// Observability configuration (`[observability]`).
    observability: Option<ObservabilityConfig>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config.toml — using defaults");
            None
        }
    }
}

// ─── PulseConfig ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PulseConfig {
    pub port: u16,
    /// Bind address for the REST server (PULSED_BIND env var, default: "0.0.0.0").
    pub bind_address: String,
    pub data_dir: PathBuf,
    pub log: String,
    /// Log output format: "pretty" (default) | "json".
    pub log_format: String,
    /// Keywords tracked by every analytics run.
    pub keywords: Vec<String>,
    /// How many days before stored snapshots are pruned (0 = never).
    pub snapshot_prune_days: u32,
    pub schedule: ScheduleConfig,
    pub scraper: ScraperConfig,
    pub observability: ObservabilityConfig,
    /// Scraper account credentials. None = unconfigured: scheduled runs are
    /// skipped and `/analytics` answers with an error body.
    pub credentials: Option<Credentials>,
}

impl PulseConfig {
    /// Build config from CLI/env args + optional TOML file.
    ///
    /// Priority (highest to lowest):
    ///   1. CLI / env — passed as `Some(value)` from clap
    ///   2. TOML file at `{data_dir}/config.toml`
    ///   3. Built-in defaults
    pub fn new(
        port: Option<u16>,
        data_dir: Option<PathBuf>,
        log: Option<String>,
        bind_address: Option<String>,
    ) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);

        // Load TOML as the lowest-priority override layer
        let toml = load_toml(&data_dir).unwrap_or_default();

        let port = port.or(toml.port).unwrap_or(DEFAULT_PORT);
        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());

        let bind_address = bind_address
            .or(std::env::var("PULSED_BIND").ok().filter(|s| !s.is_empty()))
            .or(toml.bind_address)
            .unwrap_or_else(default_bind_address);

        let log_format = std::env::var("PULSED_LOG_FORMAT")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.log_format)
            .unwrap_or_else(|| "pretty".to_string());

        let keywords = toml
            .keywords
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect());

        let snapshot_prune_days = toml.snapshot_prune_days.unwrap_or(DEFAULT_PRUNE_DAYS);
        let schedule = toml.schedule.unwrap_or_default();
        let observability = toml.observability.unwrap_or_default();

        let mut scraper = toml.scraper.unwrap_or_default();
        // HEADLESS=no (or false/0) forces a visible browser; any other value
        // leaves the configured default in place.
        if let Ok(v) = std::env::var("HEADLESS") {
            scraper.headless = !matches!(v.to_lowercase().as_str(), "no" | "false" | "0");
        }

        Self {
            port,
            bind_address,
            data_dir,
            log,
            log_format,
            keywords,
            snapshot_prune_days,
            schedule,
            scraper,
            observability,
            credentials: Credentials::from_env(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/pulsed
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("pulsed");
        }
    }
    #[cfg(target_os = "linux")]
    {
        // $XDG_DATA_HOME/pulsed or ~/.local/share/pulsed
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            if !xdg.is_empty() {
                return PathBuf::from(xdg).join("pulsed");
            }
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("pulsed");
        }
    }
    PathBuf::from("pulsed-data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_published_contract() {
        let cfg = PulseConfig::new(None, Some(PathBuf::from("/nonexistent")), None, None);
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.bind_address, "0.0.0.0");
        assert_eq!(cfg.keywords.len(), DEFAULT_KEYWORDS.len());
        assert_eq!(cfg.schedule.hour, 8);
        assert_eq!(cfg.schedule.minute, 5);
        assert_eq!(cfg.schedule.utc_offset_minutes, 330);
        assert_eq!(cfg.scraper.max_tweets, 50);
        assert_eq!(cfg.scraper.max_scroll_attempts, 10);
    }

    #[test]
    fn cli_port_beats_toml_and_default() {
        let cfg = PulseConfig::new(Some(9000), Some(PathBuf::from("/nonexistent")), None, None);
        assert_eq!(cfg.port, 9000);
    }

    #[test]
    fn toml_layer_overrides_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            r#"
port = 8080
keywords = ["DOGE", "ADA"]

[schedule]
hour = 6
minute = 30
utc_offset_minutes = 0

[scraper]
max_tweets = 10
"#,
        )
        .unwrap();

        let cfg = PulseConfig::new(None, Some(dir.path().to_path_buf()), None, None);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.keywords, vec!["DOGE".to_string(), "ADA".to_string()]);
        assert_eq!(cfg.schedule.hour, 6);
        assert_eq!(cfg.schedule.minute, 30);
        assert_eq!(cfg.scraper.max_tweets, 10);
        // Untouched sections keep their defaults.
        assert_eq!(cfg.scraper.max_scroll_attempts, 10);
    }

    #[test]
    fn malformed_toml_falls_back_to_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "port = \"not a number").unwrap();

        let cfg = PulseConfig::new(None, Some(dir.path().to_path_buf()), None, None);
        assert_eq!(cfg.port, 8000);
    }

    #[test]
    fn credentials_require_all_three_values() {
        assert!(Credentials::from_values(
            Some("m@example.com".into()),
            Some("user".into()),
            Some("pw".into())
        )
        .is_some());
        assert!(Credentials::from_values(None, Some("user".into()), Some("pw".into())).is_none());
        assert!(Credentials::from_values(
            Some("m@example.com".into()),
            Some(String::new()),
            Some("pw".into())
        )
        .is_none());
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let creds = Credentials {
            mail: "m@example.com".into(),
            username: "user".into(),
            password: "hunter2".into(),
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
