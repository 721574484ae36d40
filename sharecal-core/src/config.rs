//! sharecal configuration.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::access::EditPolicy;
use crate::error::{SharecalError, SharecalResult};

static DEFAULT_DATA_DIR: &str = "~/.local/share/sharecal";
static DEFAULT_PUBLIC_BASE_URL: &str = "http://127.0.0.1:4096/attachments";
const DEFAULT_LISTEN: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 4096));
static DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_MAX_EVENTS_PER_CELL: usize = 2;

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_public_base_url() -> String {
    DEFAULT_PUBLIC_BASE_URL.to_string()
}

fn default_listen() -> SocketAddr {
    DEFAULT_LISTEN
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_max_events_per_cell() -> usize {
    DEFAULT_MAX_EVENTS_PER_CELL
}

/// Configuration at ~/.config/sharecal/config.toml, overridable with
/// `SHARECAL_*` environment variables.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SharecalConfig {
    /// Where events, attachments, users and the session live.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Base URL attachments are published under.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    #[serde(default)]
    pub edit_policy: EditPolicy,

    /// Events shown per grid cell before "N more". 0 shows all.
    #[serde(default = "default_max_events_per_cell")]
    pub max_events_per_cell: usize,

    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for SharecalConfig {
    fn default() -> Self {
        SharecalConfig {
            data_dir: default_data_dir(),
            public_base_url: default_public_base_url(),
            edit_policy: EditPolicy::default(),
            max_events_per_cell: default_max_events_per_cell(),
            listen: default_listen(),
            log_level: default_log_level(),
        }
    }
}

impl SharecalConfig {
    pub fn config_path() -> SharecalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SharecalError::Config("Could not determine config directory".into()))?
            .join("sharecal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the default config file, creating a commented template first if
    /// there is none.
    pub fn load() -> SharecalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> SharecalResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("SHARECAL"))
            .build()
            .map_err(|e| SharecalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| SharecalError::Config(e.to_string()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> SharecalResult<()> {
        let contents = format!(
            "\
# sharecal configuration

# Where events, attachments and users are stored:
# data_dir = \"{}\"

# Base URL attachments are served from:
# public_base_url = \"{}\"

# Whether users may edit events they did not create (creator_only | any_user):
# edit_policy = \"creator_only\"

# Events shown per day in the month grid (0 = all):
# max_events_per_cell = {}

# Address the HTTP server listens on:
# listen = \"{}\"

# Log filter when RUST_LOG is not set:
# log_level = \"{}\"
",
            DEFAULT_DATA_DIR,
            DEFAULT_PUBLIC_BASE_URL,
            DEFAULT_MAX_EVENTS_PER_CELL,
            DEFAULT_LISTEN,
            DEFAULT_LOG_LEVEL,
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SharecalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SharecalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Data directory with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    pub fn events_dir(&self) -> PathBuf {
        self.data_path().join("events")
    }

    pub fn attachments_dir(&self) -> PathBuf {
        self.data_path().join("attachments")
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_path().join("users.toml")
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_path().join("session.toml")
    }

    /// Per-cell cap for the month grid.
    pub fn cell_cap(&self) -> Option<usize> {
        match self.max_events_per_cell {
            0 => None,
            n => Some(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_file_loads_as_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sharecal/config.toml");

        SharecalConfig::create_default_config(&path).unwrap();
        let config = SharecalConfig::load_from(&path).unwrap();

        assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(config.edit_policy, EditPolicy::CreatorOnly);
        assert_eq!(config.cell_cap(), Some(2));
        assert_eq!(config.listen, default_listen());
    }

    #[test]
    fn test_template_matches_default_listen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        SharecalConfig::create_default_config(&path).unwrap();
        let template = std::fs::read_to_string(&path).unwrap();

        assert_eq!(SharecalConfig::default().listen.to_string(), "127.0.0.1:4096");
        assert!(template.contains("# listen = \"127.0.0.1:4096\""));
    }

    #[test]
    fn test_values_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "data_dir = \"/srv/sharecal\"\n\
             edit_policy = \"any_user\"\n\
             max_events_per_cell = 0\n\
             listen = \"0.0.0.0:8080\"\n",
        )
        .unwrap();

        let config = SharecalConfig::load_from(&path).unwrap();

        assert_eq!(config.edit_policy, EditPolicy::AnyUser);
        assert_eq!(config.cell_cap(), None);
        assert_eq!(config.listen.port(), 8080);
        assert_eq!(config.events_dir(), PathBuf::from("/srv/sharecal/events"));
        assert_eq!(config.users_path(), PathBuf::from("/srv/sharecal/users.toml"));
    }

    #[test]
    fn test_invalid_policy_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "edit_policy = \"everyone\"\n").unwrap();

        assert!(matches!(
            SharecalConfig::load_from(&path),
            Err(SharecalError::Config(_))
        ));
    }
}
