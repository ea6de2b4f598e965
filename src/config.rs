//! Runtime configuration.
//!
//! [Config] is loaded from a TOML file. Every field has a default, so a
//! partial file (or an empty one) still yields a working configuration.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::{Error, scheduler};

/// Runtime settings, loaded from a TOML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the SQLite database lives.
    pub database_path: PathBuf,
    /// Seconds between reminder checks.
    pub reminder_check_seconds: u64,
    /// Seconds between cloud-sync passes.
    pub cloud_sync_seconds: u64,
    /// The tracing filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("xpenzy.db"),
            reminder_check_seconds: scheduler::REMINDER_CHECK_INTERVAL.as_secs(),
            cloud_sync_seconds: scheduler::CLOUD_SYNC_INTERVAL.as_secs(),
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load the configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidConfig] if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|error| {
            Error::InvalidConfig(format!("could not read {}: {error}", path.display()))
        })?;

        Self::parse(&contents)
    }

    /// Parse the configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidConfig] if the text is not valid TOML or a
    /// field has the wrong type.
    pub fn parse(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents).map_err(|error| Error::InvalidConfig(error.to_string()))
    }

    /// The reminder-check interval as a [Duration].
    pub fn reminder_check_interval(&self) -> Duration {
        Duration::from_secs(self.reminder_check_seconds)
    }

    /// The cloud-sync interval as a [Duration].
    pub fn cloud_sync_interval(&self) -> Duration {
        Duration::from_secs(self.cloud_sync_seconds)
    }
}

#[cfg(test)]
mod config_tests {
    use std::{fs, path::PathBuf};

    use crate::Error;

    use super::Config;

    #[test]
    fn a_full_file_overrides_every_default() {
        let config = Config::parse(
            "database_path = \"/var/lib/xpenzy/records.db\"\n\
             reminder_check_seconds = 5\n\
             cloud_sync_seconds = 600\n\
             log_filter = \"xpenzy=debug\"\n",
        )
        .expect("the config should parse");

        assert_eq!(
            config.database_path,
            PathBuf::from("/var/lib/xpenzy/records.db")
        );
        assert_eq!(config.reminder_check_interval().as_secs(), 5);
        assert_eq!(config.cloud_sync_interval().as_secs(), 600);
        assert_eq!(config.log_filter, "xpenzy=debug");
    }

    #[test]
    fn a_partial_file_keeps_the_other_defaults() {
        let config = Config::parse("database_path = \"records.db\"\n")
            .expect("the config should parse");

        assert_eq!(config.database_path, PathBuf::from("records.db"));
        assert_eq!(config.reminder_check_seconds, 60);
        assert_eq!(config.cloud_sync_seconds, 30 * 60);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn an_empty_file_is_the_default_config() {
        let config = Config::parse("").expect("the config should parse");

        assert_eq!(config, Config::default());
    }

    #[test]
    fn malformed_toml_is_an_invalid_config() {
        let result = Config::parse("database_path = ");

        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn a_wrongly_typed_field_is_an_invalid_config() {
        let result = Config::parse("reminder_check_seconds = \"soon\"");

        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn load_reads_the_file_at_the_given_path() {
        let file = tempfile::NamedTempFile::new().expect("could not create temp file");
        fs::write(file.path(), "log_filter = \"warn\"\n").expect("could not write config");

        let config = Config::load(file.path()).expect("the config should load");

        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn a_missing_file_is_an_invalid_config() {
        let result = Config::load("/definitely/not/a/real/config.toml");

        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
