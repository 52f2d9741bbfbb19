//! Engine configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::DEFAULT_CANONICAL_FILE;
use crate::error::{CalError, CalResult};

static DEFAULT_EVENTS_DIR: &str = "~/.pocketcal/events";

fn default_events_dir() -> PathBuf {
    PathBuf::from(DEFAULT_EVENTS_DIR)
}

fn default_canonical_file() -> String {
    DEFAULT_CANONICAL_FILE.to_string()
}

fn default_max_fps() -> u32 {
    4
}

fn default_key_debounce() -> Duration {
    Duration::from_millis(30)
}

fn default_message_duration() -> Duration {
    Duration::from_secs(2)
}

fn default_help_duration() -> Duration {
    Duration::from_secs(5)
}

/// Settings at ~/.config/pocketcal/config.toml, overridable with
/// `POCKETCAL_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory scanned for `.ics` files.
    #[serde(default = "default_events_dir")]
    pub events_dir: PathBuf,

    /// File name, inside `events_dir`, that the engine rewrites.
    #[serde(default = "default_canonical_file")]
    pub canonical_file: String,

    /// Upper bound on line echo and view redraws per second.
    #[serde(default = "default_max_fps")]
    pub max_fps: u32,

    #[serde(
        default = "default_key_debounce",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub key_debounce: Duration,

    /// How long a transient message stays on the line display.
    #[serde(
        default = "default_message_duration",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub message_duration: Duration,

    #[serde(
        default = "default_help_duration",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub help_duration: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            events_dir: default_events_dir(),
            canonical_file: default_canonical_file(),
            max_fps: default_max_fps(),
            key_debounce: default_key_debounce(),
            message_duration: default_message_duration(),
            help_duration: default_help_duration(),
        }
    }
}

impl EngineConfig {
    /// Load the global config, creating a commented default on first run.
    pub fn load() -> CalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from an explicit file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> CalResult<Self> {
        let config: EngineConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("POCKETCAL").try_parsing(true))
            .build()
            .map_err(|e| CalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalError::Config(e.to_string()))?;

        if config.max_fps == 0 {
            return Err(CalError::Config("max_fps must be at least 1".into()));
        }

        Ok(config)
    }

    pub fn config_path() -> CalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalError::Config("Could not determine config directory".into()))?
            .join("pocketcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalResult<()> {
        let contents = format!(
            "\
# pocketcal configuration

# Where .ics files are read from:
# events_dir = \"{}\"

# The file the calendar rewrites on every change:
# canonical_file = \"{}\"

# Line echo and redraw rate limit:
# max_fps = {}

# Keyboard poll interval:
# key_debounce = \"30ms\"

# How long messages and the repeat help stay up:
# message_duration = \"2s\"
# help_duration = \"5s\"
",
            DEFAULT_EVENTS_DIR,
            DEFAULT_CANONICAL_FILE,
            default_max_fps(),
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// `events_dir` with `~` expanded.
    pub fn events_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.events_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    /// Minimum interval between two echo or redraw frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.max_fps.max(1)))
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(&s).map_err(serde::de::Error::custom)
}

fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&humantime::format_duration(*duration))
}
