//! Configuration loading and typed config structures for the overlay.
//!
//! The canonical configuration lives in `streamgarden.yaml` next to the
//! binary. Every field has a default matching the garden's documented
//! rules, so a missing file (or a missing section) is valid. Secrets and
//! connection strings can be supplied through environment variables
//! instead of the file.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override held an unusable value.
    #[error("invalid value for {name}: {reason}")]
    InvalidOverride {
        /// Environment variable name.
        name: String,
        /// What was wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level overlay configuration, mirroring `streamgarden.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OverlayConfig {
    /// Garden rules (capacity, allowances, timings).
    #[serde(default)]
    pub garden: GardenRules,

    /// How often each periodic garden job runs.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Database connection.
    #[serde(default)]
    pub infrastructure: InfrastructureConfig,

    /// Chat command cooldowns.
    #[serde(default)]
    pub chat: ChatConfig,

    /// StreamElements credentials for the bot and the tip feed.
    #[serde(default)]
    pub streamelements: StreamElementsConfig,
}

impl OverlayConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidOverride`] if an override is malformed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Parse configuration from a YAML string (no environment overrides).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides from a variable lookup (normally the process
    /// environment):
    ///
    /// - `DATABASE_URL` sets `infrastructure.database_url`
    /// - `OVERLAY_PORT` sets `server.port`
    /// - `SE_JWT_TOKEN` sets `streamelements.jwt_token`
    /// - `SE_CHANNEL_ID` sets `streamelements.channel_id`
    /// - `SE_ACCOUNT_TOKEN` sets `streamelements.account_token`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] if `OVERLAY_PORT` is not a
    /// port number.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.infrastructure.database_url = Some(url);
        }
        if let Some(raw) = lookup("OVERLAY_PORT") {
            self.server.port = raw.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidOverride {
                    name: "OVERLAY_PORT".to_owned(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(token) = lookup("SE_JWT_TOKEN") {
            self.streamelements.jwt_token = Some(token);
        }
        if let Some(channel) = lookup("SE_CHANNEL_ID") {
            self.streamelements.channel_id = Some(channel);
        }
        if let Some(token) = lookup("SE_ACCOUNT_TOKEN") {
            self.streamelements.account_token = Some(token);
        }
        Ok(())
    }
}

/// Garden rules. Durations are milliseconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GardenRules {
    /// Maximum flowers in the garden at once.
    #[serde(default = "default_max_flowers")]
    pub max_flowers: usize,

    /// Young flowers a single user may hold at once.
    #[serde(default = "default_plant_allowance")]
    pub plant_allowance: usize,

    /// A flower counts against its planter's allowance while younger than this.
    #[serde(default = "default_five_minutes_ms")]
    pub allowance_window_ms: i64,

    /// Minimum flower age before its planter may pick it.
    #[serde(default = "default_five_minutes_ms")]
    pub pick_min_age_ms: i64,

    /// Flowers older than this are cleared by `!pickold`.
    #[serde(default = "default_pick_old_age_ms")]
    pub pick_old_age_ms: i64,

    /// Minimum gap between two garden-full bee parades.
    #[serde(default = "default_five_minutes_ms")]
    pub bee_parade_cooldown_ms: i64,

    /// Gap between automatic bunny visits.
    #[serde(default = "default_bunny_interval_ms")]
    pub bunny_interval_ms: i64,

    /// Upper bound on flowers eaten per bunny visit.
    #[serde(default = "default_bunny_max_eaten")]
    pub bunny_max_eaten: u32,

    /// Water level gained per `!water`.
    #[serde(default = "default_water_step")]
    pub water_step: u32,

    /// Water level when the garden starts.
    #[serde(default = "default_initial_water_level")]
    pub initial_water_level: u32,

    /// Length of the rain shower after watering.
    #[serde(default = "default_rain_duration_ms")]
    pub rain_duration_ms: i64,

    /// Saturation holds at 100% for this long after watering.
    #[serde(default = "default_five_minutes_ms")]
    pub saturation_hold_ms: i64,

    /// Then decays linearly to the floor over this long.
    #[serde(default = "default_five_minutes_ms")]
    pub saturation_decay_ms: i64,

    /// Lowest saturation percentage.
    #[serde(default = "default_saturation_floor")]
    pub saturation_floor: f64,

    /// Preferred minimum horizontal distance between flowers.
    #[serde(default = "default_placement_spacing")]
    pub placement_spacing: f64,

    /// Placement candidates tried before settling for an overlap.
    #[serde(default = "default_placement_attempts")]
    pub placement_attempts: u32,

    /// How long the owner/type reveal label stays up.
    #[serde(default = "default_reveal_ms")]
    pub reveal_ms: i64,

    /// Flowers planted by `!testspawn`.
    #[serde(default = "default_test_spawn_count")]
    pub test_spawn_count: usize,

    /// Rows in the leaderboard.
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,
}

impl Default for GardenRules {
    fn default() -> Self {
        Self {
            max_flowers: default_max_flowers(),
            plant_allowance: default_plant_allowance(),
            allowance_window_ms: default_five_minutes_ms(),
            pick_min_age_ms: default_five_minutes_ms(),
            pick_old_age_ms: default_pick_old_age_ms(),
            bee_parade_cooldown_ms: default_five_minutes_ms(),
            bunny_interval_ms: default_bunny_interval_ms(),
            bunny_max_eaten: default_bunny_max_eaten(),
            water_step: default_water_step(),
            initial_water_level: default_initial_water_level(),
            rain_duration_ms: default_rain_duration_ms(),
            saturation_hold_ms: default_five_minutes_ms(),
            saturation_decay_ms: default_five_minutes_ms(),
            saturation_floor: default_saturation_floor(),
            placement_spacing: default_placement_spacing(),
            placement_attempts: default_placement_attempts(),
            reveal_ms: default_reveal_ms(),
            test_spawn_count: default_test_spawn_count(),
            leaderboard_size: default_leaderboard_size(),
        }
    }
}

/// Periodic job cadence, in milliseconds.
///
/// The host calls the engine's `tick` every `tick_interval_ms`; the engine
/// runs each job once its own interval has elapsed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleConfig {
    /// Host tick cadence (animations, banners, celebrations, bunny phases).
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Growth stage refresh.
    #[serde(default = "default_growth_interval_ms")]
    pub growth_interval_ms: i64,

    /// Bunny eligibility check.
    #[serde(default = "default_bunny_check_interval_ms")]
    pub bunny_check_interval_ms: i64,

    /// Saturation decay.
    #[serde(default = "default_saturation_interval_ms")]
    pub saturation_interval_ms: i64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            growth_interval_ms: default_growth_interval_ms(),
            bunny_check_interval_ms: default_bunny_check_interval_ms(),
            saturation_interval_ms: default_saturation_interval_ms(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Infrastructure connection strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InfrastructureConfig {
    /// `PostgreSQL` URL for the guardians table. Without it guardians are
    /// kept in memory for the life of the process.
    #[serde(default)]
    pub database_url: Option<String>,
}

/// Chat command source settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatConfig {
    /// Per-user cooldown in seconds, keyed by command word (`plant`,
    /// `water`, ...). Commands not listed have no cooldown.
    #[serde(default = "default_cooldowns")]
    pub cooldown_secs: BTreeMap<String, u64>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldowns(),
        }
    }
}

/// StreamElements credentials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamElementsConfig {
    /// Base URL of the kappa API.
    #[serde(default = "default_se_api_base")]
    pub api_base: String,

    /// JWT used by the chat bot (`/post-trick`).
    #[serde(default)]
    pub jwt_token: Option<String>,

    /// Channel the bot posts to.
    #[serde(default)]
    pub channel_id: Option<String>,

    /// Token relayed to the overlay for the tip/follow/raid push feed.
    #[serde(default)]
    pub account_token: Option<String>,
}

impl Default for StreamElementsConfig {
    fn default() -> Self {
        Self {
            api_base: default_se_api_base(),
            jwt_token: None,
            channel_id: None,
            account_token: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_max_flowers() -> usize {
    20
}

const fn default_plant_allowance() -> usize {
    2
}

const fn default_five_minutes_ms() -> i64 {
    300_000
}

const fn default_pick_old_age_ms() -> i64 {
    1_800_000
}

const fn default_bunny_interval_ms() -> i64 {
    1_200_000
}

const fn default_bunny_max_eaten() -> u32 {
    5
}

const fn default_water_step() -> u32 {
    25
}

const fn default_initial_water_level() -> u32 {
    50
}

const fn default_rain_duration_ms() -> i64 {
    5_000
}

const fn default_saturation_floor() -> f64 {
    20.0
}

const fn default_placement_spacing() -> f64 {
    8.0
}

const fn default_placement_attempts() -> u32 {
    10
}

const fn default_reveal_ms() -> i64 {
    3_000
}

const fn default_test_spawn_count() -> usize {
    6
}

const fn default_leaderboard_size() -> usize {
    10
}

const fn default_tick_interval_ms() -> u64 {
    1_000
}

const fn default_growth_interval_ms() -> i64 {
    5_000
}

const fn default_bunny_check_interval_ms() -> i64 {
    10_000
}

const fn default_saturation_interval_ms() -> i64 {
    30_000
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    3000
}

fn default_cooldowns() -> BTreeMap<String, u64> {
    [("plant", 5), ("water", 30), ("pick", 5), ("leaderboard", 30)]
        .into_iter()
        .map(|(name, secs)| (name.to_owned(), secs))
        .collect()
}

fn default_se_api_base() -> String {
    "https://api.streamelements.com/kappa/v2".to_owned()
}
