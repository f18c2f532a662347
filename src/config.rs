use crate::error::{config_error, env_error, BoardResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use url::Url;

/// Default target time zone for shift computation
pub const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Name used for calendar events that carry no SUMMARY
pub const DEFAULT_UNNAMED_SHIFT: &str = "Unnamed Shift";

/// Route groups that can be toggled from `config/components.toml`
pub const COMPONENT_NAMES: [&str; 3] = ["shifts", "tickets", "asset_search"];

const COMPONENTS_FILE: &str = "config/components.toml";

/// Which occurrence-correction policy the shift engine runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DriftMode {
    /// Reassign the UTC wall-clock digits of rule-generated occurrences to the target zone
    #[default]
    Recurring,
    /// Trust the feed; plain zone conversion for every occurrence
    Off,
    /// Reassign any occurrence whose local hour falls before a threshold
    EarlyHours,
}

impl DriftMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "recurring" | "on" | "true" => Some(Self::Recurring),
            "off" | "none" | "false" => Some(Self::Off),
            "early-hours" | "early_hours" => Some(Self::EarlyHours),
            _ => None,
        }
    }
}

/// Shape of the `/api/shifts` response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ShiftView {
    /// `{ today: [...], tomorrow: [...] }`
    #[default]
    Buckets,
    /// Flat array of today's shifts
    Today,
}

impl ShiftView {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "buckets" | "two-bucket" => Some(Self::Buckets),
            "today" | "today-only" => Some(Self::Today),
            _ => None,
        }
    }
}

/// Main configuration structure for the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// ICS feed the shifts are read from
    pub calendar_url: String,
    /// IANA time zone all shifts are computed in
    pub timezone: String,
    /// Occurrence-correction policy
    pub drift_correction: DriftMode,
    /// Hour threshold used by [`DriftMode::EarlyHours`]
    pub drift_early_hour: u32,
    /// Placeholder for events without a summary
    pub unnamed_shift_name: String,
    /// Response shape of `/api/shifts`
    pub shift_view: ShiftView,
    /// Upper bound on a single feed download
    pub feed_timeout_secs: u64,
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Port the HTTP server listens on
    pub port: u16,
    /// Directory with the dashboard's static assets
    pub static_dir: String,
    /// Interpreter used to run the lookup bridge scripts
    pub python_bin: String,
    /// Directory holding the lookup bridge scripts
    pub bridge_dir: String,
    /// Upper bound on a single bridge script run
    pub bridge_timeout_secs: u64,
    /// Map of component names to their enabled status
    pub components: HashMap<String, bool>,
}

impl Config {
    /// Configuration with defaults for everything but the feed
    pub fn new(calendar_url: impl Into<String>) -> Self {
        let components = COMPONENT_NAMES
            .iter()
            .map(|name| (name.to_string(), true))
            .collect();

        Self {
            calendar_url: calendar_url.into(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            drift_correction: DriftMode::default(),
            drift_early_hour: 6,
            unnamed_shift_name: DEFAULT_UNNAMED_SHIFT.to_string(),
            shift_view: ShiftView::default(),
            feed_timeout_secs: 20,
            bind_address: "127.0.0.1".to_string(),
            port: 3000,
            static_dir: "public".to_string(),
            python_bin: ".venv/bin/python3".to_string(),
            bridge_dir: "python".to_string(),
            bridge_timeout_secs: 60,
            components,
        }
    }

    /// Load configuration from environment and config file
    pub fn load() -> BoardResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let raw_url = env::var("CALENDAR_ICS_URL").map_err(|_| env_error("CALENDAR_ICS_URL"))?;
        let mut config = Config::new(normalize_feed_url(&raw_url)?);

        if let Ok(timezone) = env::var("TIMEZONE") {
            config.timezone = timezone;
        }
        config.target_zone()?;

        if let Ok(mode) = env::var("DRIFT_CORRECTION") {
            config.drift_correction = DriftMode::parse(&mode)
                .ok_or_else(|| config_error(&format!("Unknown DRIFT_CORRECTION '{}'", mode)))?;
        }

        if let Ok(hour) = env::var("DRIFT_EARLY_HOUR") {
            config.drift_early_hour = hour
                .parse::<u32>()
                .ok()
                .filter(|h| *h <= 23)
                .ok_or_else(|| config_error("Invalid DRIFT_EARLY_HOUR format"))?;
        }

        if let Ok(name) = env::var("UNNAMED_SHIFT_NAME") {
            config.unnamed_shift_name = name;
        }

        if let Ok(view) = env::var("SHIFT_VIEW") {
            config.shift_view = ShiftView::parse(&view)
                .ok_or_else(|| config_error(&format!("Unknown SHIFT_VIEW '{}'", view)))?;
        }

        if let Ok(secs) = env::var("FEED_TIMEOUT_SECS") {
            config.feed_timeout_secs = secs
                .parse::<u64>()
                .map_err(|_| config_error("Invalid FEED_TIMEOUT_SECS format"))?;
        }

        if let Ok(port) = env::var("PORT") {
            config.port = port
                .parse::<u16>()
                .map_err(|_| config_error("Invalid PORT format"))?;
        }

        if let Ok(address) = env::var("BIND_ADDRESS") {
            config.bind_address = address;
        }
        if let Ok(dir) = env::var("STATIC_DIR") {
            config.static_dir = dir;
        }
        if let Ok(bin) = env::var("PYTHON_BIN") {
            config.python_bin = bin;
        }
        if let Ok(dir) = env::var("BRIDGE_DIR") {
            config.bridge_dir = dir;
        }
        if let Ok(secs) = env::var("BRIDGE_TIMEOUT_SECS") {
            config.bridge_timeout_secs = secs
                .parse::<u64>()
                .map_err(|_| config_error("Invalid BRIDGE_TIMEOUT_SECS format"))?;
        }

        // Load components configuration from file if it exists
        if let Ok(content) = fs::read_to_string(COMPONENTS_FILE) {
            let file_components = toml::from_str::<HashMap<String, bool>>(&content)?;
            config.merge_components(file_components);
        }

        Ok(config)
    }

    /// Parsed target time zone
    pub fn target_zone(&self) -> BoardResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Unknown time zone '{}'", self.timezone)))
    }

    /// Check if a component is enabled
    pub fn is_component_enabled(&self, name: &str) -> bool {
        *self.components.get(name).unwrap_or(&false)
    }

    /// Override component toggles, keeping defaults for names not given
    pub fn merge_components(&mut self, overrides: HashMap<String, bool>) {
        for (key, value) in overrides {
            self.components.insert(key, value);
        }
    }
}

/// Validate the feed URL; calendar apps hand out `webcal://` links for plain HTTPS feeds
pub fn normalize_feed_url(raw: &str) -> BoardResult<String> {
    let trimmed = raw.trim();
    let rewritten = match trimmed.strip_prefix("webcal://") {
        Some(rest) => format!("https://{}", rest),
        None => trimmed.to_string(),
    };

    let url = Url::parse(&rewritten)
        .map_err(|e| config_error(&format!("Invalid CALENDAR_ICS_URL: {}", e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url.to_string()),
        other => Err(config_error(&format!(
            "Unsupported CALENDAR_ICS_URL scheme '{}'",
            other
        ))),
    }
}
