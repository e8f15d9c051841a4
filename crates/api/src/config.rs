//! Process configuration read from the environment (and `.env` via dotenvy).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Days, NaiveTime, TimeZone};
use site::{BuildOptions, Labels};
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_BUILD_DEBOUNCE: Duration = Duration::from_secs(10);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_NIGHTLY_AT: &str = "03:00";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be set")]
    Missing { name: &'static str },

    #[error("BUILD_NIGHTLY_AT must be HH:MM")]
    NightlyFormat,

    #[error("BUILD_NIGHTLY_AT hour invalid")]
    NightlyHour,

    #[error("BUILD_NIGHTLY_AT minute invalid")]
    NightlyMinute,

    #[error("invalid duration: {0}")]
    Duration(String),
}

// ── Env helpers ─────────────────────────────────────────────────────

/// Trimmed value, `None` when unset or blank.
pub fn env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

pub fn env_required(key: &'static str) -> Result<String, ConfigError> {
    env_opt(key).ok_or(ConfigError::Missing { name: key })
}

pub fn env_bool(key: &str, default: bool) -> bool {
    match env_opt(key) {
        Some(value) => matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

pub fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env_opt(key) {
        Some(value) => value.parse().unwrap_or_else(|_| {
            warn!(key, value = %value, "invalid value, using default");
            default
        }),
        None => default,
    }
}

/// Duration from the environment; invalid values fall back to `default`.
pub fn env_duration(key: &str, default: Duration) -> Duration {
    env_opt(key)
        .map(|value| {
            parse_duration(&value).unwrap_or_else(|err| {
                warn!(key, error = %err, "invalid duration, using default");
                default
            })
        })
        .unwrap_or(default)
}

/// Like [`env_duration`], but zero also falls back to `default`.
pub fn env_nonzero_duration(key: &str, default: Duration) -> Duration {
    nonzero_or(key, env_duration(key, default), default)
}

fn nonzero_or(key: &str, value: Duration, default: Duration) -> Duration {
    if value.is_zero() {
        warn!(key, default = ?default, "duration must be non-zero, using default");
        return default;
    }
    value
}

/// Parse `250ms`, `30s`, `5m`, `1h`, `1d` or a bare number of seconds.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let s = s.trim();
    let invalid = || ConfigError::Duration(s.to_string());
    if s.is_empty() {
        return Err(invalid());
    }

    let (num_str, suffix) = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| (&s[..i], &s[i..]))
        .unwrap_or((s, ""));

    let num: u64 = num_str.parse().map_err(|_| invalid())?;

    let multiplier: u64 = match suffix.trim() {
        "ms" => return Ok(Duration::from_millis(num)),
        "" | "s" => 1,
        "m" => 60,
        "h" => 3600,
        "d" => 86400,
        _ => return Err(invalid()),
    };

    num.checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(invalid)
}

// ── Nightly schedule ────────────────────────────────────────────────

/// Local wall-clock time of the nightly rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NightlyTime {
    time: NaiveTime,
}

impl NightlyTime {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let (hour, minute) = value
            .trim()
            .split_once(':')
            .ok_or(ConfigError::NightlyFormat)?;
        if minute.contains(':') {
            return Err(ConfigError::NightlyFormat);
        }

        let hour: u32 = hour
            .parse()
            .ok()
            .filter(|h| *h <= 23)
            .ok_or(ConfigError::NightlyHour)?;
        let minute: u32 = minute
            .parse()
            .ok()
            .filter(|m| *m <= 59)
            .ok_or(ConfigError::NightlyMinute)?;

        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(|time| Self { time })
            .ok_or(ConfigError::NightlyFormat)
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// The next occurrence strictly after `now`: today if still ahead,
    /// otherwise tomorrow.
    pub fn next_run<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let tz = now.timezone();
        let today = now.date_naive();

        [Some(today), today.checked_add_days(Days::new(1)), today.checked_add_days(Days::new(2))]
            .into_iter()
            .flatten()
            .filter_map(|day| tz.from_local_datetime(&day.and_time(self.time)).earliest())
            .find(|candidate| candidate > now)
            .unwrap_or_else(|| now.clone() + chrono::Duration::days(1))
    }
}

impl std::fmt::Display for NightlyTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.time.format("%H:%M"))
    }
}

// ── Sections ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub skip_migrations: bool,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env_required("DATABASE_URL")?,
            max_connections: env_parse("DATABASE_MAX_CONNECTIONS", 10),
            skip_migrations: env_bool("SKIP_MIGRATIONS", false),
        })
    }
}

/// Where the static site is generated and which labels it uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub output_dir: PathBuf,
    pub template_dir: PathBuf,
    pub asset_dir: PathBuf,
    pub locale: String,
}

impl SiteConfig {
    pub fn from_env() -> Self {
        Self {
            output_dir: env_or("OUTPUT_DIR", site::DEFAULT_OUTPUT_DIR).into(),
            template_dir: env_or("TEMPLATE_DIR", site::DEFAULT_TEMPLATE_DIR).into(),
            asset_dir: env_or("ASSET_DIR", site::DEFAULT_ASSET_DIR).into(),
            locale: env_or("SITE_LOCALE", site::i18n::DEFAULT_LOCALE),
        }
    }

    pub fn labels(&self) -> Labels {
        Labels::new(self.locale.clone())
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            output_dir: self.output_dir.clone(),
            template_dir: self.template_dir.clone(),
            asset_dir: self.asset_dir.clone(),
            labels: self.labels(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            output_dir: site::DEFAULT_OUTPUT_DIR.into(),
            template_dir: site::DEFAULT_TEMPLATE_DIR.into(),
            asset_dir: site::DEFAULT_ASSET_DIR.into(),
            locale: site::i18n::DEFAULT_LOCALE.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub build_debounce: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT", 8080),
            build_debounce: env_duration("BUILD_DEBOUNCE", DEFAULT_BUILD_DEBOUNCE),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            build_debounce: DEFAULT_BUILD_DEBOUNCE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub poll_interval: Duration,
    pub retry_delay: Duration,
    pub nightly_at: NightlyTime,
    /// Claim lease; `None` keeps crashed runs in `running`.
    pub lease: Option<Duration>,
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let lease = env_opt("BUILD_LEASE").and_then(|value| match parse_duration(&value) {
            Ok(lease) if lease.is_zero() => {
                warn!("BUILD_LEASE must be non-zero, running without lease");
                None
            }
            Ok(lease) => Some(lease),
            Err(err) => {
                warn!(error = %err, "invalid BUILD_LEASE, running without lease");
                None
            }
        });

        Ok(Self {
            poll_interval: env_nonzero_duration("BUILD_POLL_INTERVAL", DEFAULT_POLL_INTERVAL),
            retry_delay: env_duration("BUILD_RETRY_DELAY", DEFAULT_RETRY_DELAY),
            nightly_at: NightlyTime::parse(&env_or("BUILD_NIGHTLY_AT", DEFAULT_NIGHTLY_AT))?,
            lease,
        })
    }
}
