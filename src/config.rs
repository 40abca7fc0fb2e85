use crate::core::WriteFailurePolicy;
use crate::models::{MatchingCohorts, ScoringWeights};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    /// Cohort whose preference profiles drive scoring
    #[serde(default = "default_seeker_cohort")]
    pub seeker_cohort: String,
    #[serde(default = "default_pool_cohort")]
    pub pool_cohort: String,
    #[serde(default)]
    pub on_write_failure: WriteFailurePolicy,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            seeker_cohort: default_seeker_cohort(),
            pool_cohort: default_pool_cohort(),
            on_write_failure: WriteFailurePolicy::default(),
        }
    }
}

impl MatchingSettings {
    pub fn cohorts(&self) -> MatchingCohorts {
        MatchingCohorts::new(self.seeker_cohort.clone(), self.pool_cohort.clone())
    }
}

fn default_seeker_cohort() -> String { "seeker".to_string() }
fn default_pool_cohort() -> String { "pool".to_string() }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: ScoringWeights,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_run_capacity")]
    pub run_capacity: u64,
    #[serde(default = "default_run_ttl_secs")]
    pub run_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            run_capacity: default_run_capacity(),
            run_ttl_secs: default_run_ttl_secs(),
        }
    }
}

fn default_run_capacity() -> u64 { 100 }
fn default_run_ttl_secs() -> u64 { 86_400 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with CAMPUS_MATCH)
    /// 5. DATABASE_URL, if set
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., CAMPUS_MATCH__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("CAMPUS_MATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        with_database_url(settings)?.try_deserialize::<Self>()?.checked()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("CAMPUS_MATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize::<Self>()?.checked()
    }

    /// Reject values that deserialize fine but cannot be run
    fn checked(self) -> Result<Self, ConfigError> {
        self.scoring.weights.check().map_err(ConfigError::Message)?;
        Ok(self)
    }
}

/// Apply the conventional DATABASE_URL variable on top of the loaded config
fn with_database_url(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => Config::builder()
            .add_source(settings)
            .set_override("database.url", url)?
            .build(),
        Err(_) => Ok(settings),
    }
}
