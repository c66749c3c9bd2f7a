use std::{env, fmt, fs, path};

use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum Error {
    ReadFailed(()),
    WriteFailed(()),
    ParseFailed(()),
    ConfigPathUnavailable,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: Http,
    pub database: Database,
    pub monitoring: Monitoring,
    pub notifier: Notifier,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Http {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Database {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Monitoring {
    /// Period of the background sweep over all services.
    pub sweep_interval_seconds: u64,
    /// Per-request probe timeout.
    pub probe_timeout_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Notifier {
    /// Telegram Bot API token; when absent, transitions are only logged.
    /// The TELEGRAM_BOT_TOKEN environment variable takes precedence.
    pub telegram_bot_token: Option<String>,
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/vigil/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, Error> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(Error::ConfigPathUnavailable);
    };

    Ok(path.join("vigil/config.toml"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: Http::default(),
            database: Database::default(),
            monitoring: Monitoring::default(),
            notifier: Notifier::default(),
        }
    }
}

impl Default for Http {
    fn default() -> Self {
        Self { bind: "0.0.0.0".into(), port: 10000 }
    }
}

impl Default for Database {
    fn default() -> Self {
        Self { path: "monitored_services.db".into() }
    }
}

impl Default for Monitoring {
    fn default() -> Self {
        Self { sweep_interval_seconds: 60, probe_timeout_seconds: 10 }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self { telegram_bot_token: None }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Internal Configuration State:")?;
        write_title_1(f, "Http")?;
        write_1(f, "Bind Address", &self.http.bind)?;
        write_1(f, "Port", &self.http.port)?;
        write_title_1(f, "Database")?;
        write_1(f, "Path", &self.database.path)?;
        write_title_1(f, "Monitoring")?;
        write_1(f, "Sweep Interval (s)", &self.monitoring.sweep_interval_seconds)?;
        write_1(f, "Probe Timeout (s)", &self.monitoring.probe_timeout_seconds)?;
        write_title_1(f, "Notifier")?;
        let token_state =
            if self.notifier.telegram_bot_token.is_some() { "configured" } else { "not configured" };
        write_1(f, "Telegram Token", &token_state)?;

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/vigil/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, Error> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string =
                fs::read_to_string(&config_path).map_err(|_err| Error::ReadFailed(()))?;
            toml::from_str(raw_string.as_str()).map_err(|_err| Error::ParseFailed(()))
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &std::path::Path) -> Result<(), Error> {
        let config_str: String =
            toml::to_string_pretty(self).map_err(|_err| Error::ParseFailed(()))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|_err| Error::WriteFailed(()))?;
        }

        std::fs::write(path, config_str).map_err(|_err| Error::WriteFailed(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: Config =
            toml::from_str("[monitoring]\nsweep_interval_seconds = 30\n").unwrap();
        assert_eq!(config.monitoring.sweep_interval_seconds, 30);
        assert_eq!(config.monitoring.probe_timeout_seconds, 10);
        assert_eq!(config.http.port, 10000);
        assert_eq!(config.database.path, "monitored_services.db");
        assert!(config.notifier.telegram_bot_token.is_none());
    }

    #[test]
    fn default_config_roundtrips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        // First call creates the file with defaults, second call reads it.
        let created = Config::from_config(Some(&path)).unwrap();
        assert!(path.exists());
        let loaded = Config::from_config(Some(&path)).unwrap();
        assert_eq!(created.http.port, loaded.http.port);
        assert_eq!(created.database.path, loaded.database.path);
    }
}
