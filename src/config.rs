//! Configuration: TOML file with defaults for every key.
//!
//! Lookup order:
//! 1. Explicit `--config` path
//! 2. WOLFIES_WHATSAPP_CONFIG env var
//! 3. ./wolfies-whatsapp.toml
//! 4. <config dir>/wolfies-whatsapp/config.toml
//!
//! A file named explicitly (1 or 2) must exist. A missing discovered file
//! means defaults. CLI flags are applied on top by `main`.
//!
//! CHANGELOG:
//! - 10/18/2026 - Missing explicit config is an error instead of defaults
//! - 10/17/2026 - Session transport settings
//! - 10/15/2026 - Initial implementation

use crate::dispatch::FailurePolicy;
use crate::error::{Result, SenderError};
use crate::transport::direct::{DEFAULT_LEAD_MINUTES, DEFAULT_PROGRAM};
use crate::transport::session::DEFAULT_ENDPOINT;
use crate::transport::webdriver::DEFAULT_WEBDRIVER_URL;
use crate::transport::TransportKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

pub const CONFIG_ENV: &str = "WOLFIES_WHATSAPP_CONFIG";
pub const LOCAL_CONFIG_FILE: &str = "wolfies-whatsapp.toml";

/// Stock messages sent when none are configured.
pub fn default_messages() -> Vec<String> {
    vec![
        "Hello, this is an automated message!".to_string(),
        "Here's an update about our product!".to_string(),
        "Thank you for being a loyal customer!".to_string(),
    ]
}

fn default_contacts_file() -> String {
    "contacts.csv".to_string()
}

fn default_images_folder() -> String {
    "images".to_string()
}

fn default_log_file() -> String {
    "whatsapp_messaging.log".to_string()
}

fn default_send_delay_secs() -> u64 {
    2
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub contacts_file: String,
    pub images_folder: String,
    pub messages: Vec<String>,
    pub send_delay_secs: u64,
    pub on_failure: FailurePolicy,
    pub case_insensitive_extensions: bool,
    pub log_file: String,
    pub transport: TransportKind,
    pub direct: DirectConfig,
    pub session: SessionConfig,
    /// File this config was read from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            contacts_file: default_contacts_file(),
            images_folder: default_images_folder(),
            messages: default_messages(),
            send_delay_secs: default_send_delay_secs(),
            on_failure: FailurePolicy::default(),
            case_insensitive_extensions: false,
            log_file: default_log_file(),
            transport: TransportKind::default(),
            direct: DirectConfig::default(),
            session: SessionConfig::default(),
            source: None,
        }
    }
}

/// Where a config path came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` or the env var; must exist.
    Explicit(PathBuf),
    /// Found in the working or config directory.
    Discovered(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::Explicit(path) | ConfigSource::Discovered(path) => path,
        }
    }
}

/// External automation program settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectConfig {
    pub program: String,
    /// Minutes ahead to schedule text messages.
    pub lead_minutes: u32,
}

impl Default for DirectConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            lead_minutes: DEFAULT_LEAD_MINUTES,
        }
    }
}

/// Browser session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub browser: String,
    pub webdriver_url: String,
    pub endpoint: String,
    /// Spawn this driver executable when non-empty.
    pub driver_path: String,
    pub request_timeout_secs: u64,
    pub settle_short_ms: u64,
    pub settle_long_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            browser: "chrome".to_string(),
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            driver_path: String::new(),
            request_timeout_secs: 60,
            settle_short_ms: 1000,
            settle_long_ms: 2000,
        }
    }
}

impl Config {
    /// Resolve the config path per the lookup order, if any candidate applies.
    pub fn locate(explicit: Option<&Path>) -> Option<ConfigSource> {
        Self::resolve(
            explicit,
            std::env::var(CONFIG_ENV).ok(),
            Path::new("."),
            dirs::config_dir(),
        )
    }

    fn resolve(
        explicit: Option<&Path>,
        env: Option<String>,
        working_dir: &Path,
        config_dir: Option<PathBuf>,
    ) -> Option<ConfigSource> {
        if let Some(path) = explicit {
            return Some(ConfigSource::Explicit(expand(&path.to_string_lossy())));
        }

        if let Some(path) = env.filter(|p| !p.trim().is_empty()) {
            return Some(ConfigSource::Explicit(expand(&path)));
        }

        let local = working_dir.join(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Some(ConfigSource::Discovered(local));
        }

        config_dir
            .map(|dir| dir.join("wolfies-whatsapp").join("config.toml"))
            .filter(|p| p.is_file())
            .map(ConfigSource::Discovered)
    }

    /// Load config from `source`, or defaults when there is none.
    ///
    /// An explicit source that does not exist is a `Config` error.
    pub fn load(source: Option<&ConfigSource>) -> Result<Self> {
        let Some(source) = source else {
            return Ok(Self::default());
        };
        let path = source.path();
        if !path.exists() {
            return match source {
                ConfigSource::Explicit(_) => {
                    error!("Config file not found at {}", path.display());
                    Err(SenderError::Config(format!(
                        "config file {} does not exist",
                        path.display()
                    )))
                }
                ConfigSource::Discovered(_) => {
                    info!("Config file not found at {}, using defaults", path.display());
                    Ok(Self::default())
                }
            };
        }

        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content).map_err(|e| {
            error!("Failed to parse {}: {}", path.display(), e);
            e
        })?;
        config.source = Some(path.to_path_buf());
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SenderError::Config(e.to_string()))
    }

    pub fn contacts_path(&self) -> PathBuf {
        expand(&self.contacts_file)
    }

    pub fn images_path(&self) -> PathBuf {
        expand(&self.images_folder)
    }

    pub fn log_path(&self) -> PathBuf {
        expand(&self.log_file)
    }

    pub fn send_delay(&self) -> Duration {
        Duration::from_secs(self.send_delay_secs)
    }
}

impl SessionConfig {
    pub fn driver_path(&self) -> Option<String> {
        if self.driver_path.trim().is_empty() {
            None
        } else {
            Some(expand(&self.driver_path).to_string_lossy().into_owned())
        }
    }
}

/// Expand a leading `~` to the home directory.
fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.contacts_file, "contacts.csv");
        assert_eq!(config.images_folder, "images");
        assert_eq!(config.messages.len(), 3);
        assert_eq!(config.send_delay(), Duration::from_secs(2));
        assert_eq!(config.on_failure, FailurePolicy::Abort);
        assert_eq!(config.transport, TransportKind::Direct);
        assert_eq!(config.direct.lead_minutes, 2);
        assert_eq!(config.session.browser, "chrome");
        assert!(config.session.driver_path().is_none());
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_toml(
            r#"
contacts_file = "people.csv"
on_failure = "continue"
transport = "session"

[session]
browser = "firefox"
"#,
        )
        .unwrap();

        assert_eq!(config.contacts_file, "people.csv");
        assert_eq!(config.on_failure, FailurePolicy::Continue);
        assert_eq!(config.transport, TransportKind::Session);
        assert_eq!(config.session.browser, "firefox");
        // Untouched keys keep their defaults.
        assert_eq!(config.images_folder, "images");
        assert_eq!(config.session.webdriver_url, DEFAULT_WEBDRIVER_URL);
        assert_eq!(config.direct.program, DEFAULT_PROGRAM);
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml("transport = \"telegraph\"").unwrap_err();
        assert!(matches!(err, SenderError::Config(_)));
    }

    #[test]
    fn test_missing_discovered_file_yields_defaults() {
        let source = ConfigSource::Discovered(PathBuf::from("/nonexistent/wolfies.toml"));
        let config = Config::load(Some(&source)).unwrap();
        assert_eq!(config.contacts_file, "contacts.csv");
        assert!(config.source.is_none());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let source = ConfigSource::Explicit(PathBuf::from("/nonexistent/mine.toml"));
        let err = Config::load(Some(&source)).unwrap_err();
        assert!(matches!(err, SenderError::Config(_)));
    }

    #[test]
    fn test_no_source_yields_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.messages, default_messages());
        assert!(config.source.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "messages = [\"only one\"]\nsend_delay_secs = 0\n").unwrap();

        let config = Config::load(Some(&ConfigSource::Explicit(path.clone()))).unwrap();
        assert_eq!(config.messages, vec!["only one".to_string()]);
        assert_eq!(config.send_delay(), Duration::ZERO);
        assert_eq!(config.source, Some(path));
    }

    #[test]
    fn test_lookup_order() {
        let dir = tempfile::tempdir().unwrap();
        let working = dir.path().join("work");
        let config_dir = dir.path().join("config");
        std::fs::create_dir_all(&working).unwrap();
        std::fs::create_dir_all(config_dir.join("wolfies-whatsapp")).unwrap();
        let local = working.join(LOCAL_CONFIG_FILE);
        let user = config_dir.join("wolfies-whatsapp").join("config.toml");
        std::fs::write(&user, "").unwrap();

        // Config dir is the last resort.
        assert_eq!(
            Config::resolve(None, None, &working, Some(config_dir.clone())),
            Some(ConfigSource::Discovered(user.clone()))
        );

        // The working directory file beats the config dir.
        std::fs::write(&local, "").unwrap();
        assert_eq!(
            Config::resolve(None, None, &working, Some(config_dir.clone())),
            Some(ConfigSource::Discovered(local))
        );

        // The env var beats both, even when it names a missing file.
        assert_eq!(
            Config::resolve(
                None,
                Some("/nonexistent/env.toml".to_string()),
                &working,
                Some(config_dir.clone())
            ),
            Some(ConfigSource::Explicit(PathBuf::from("/nonexistent/env.toml")))
        );

        // The explicit path beats everything.
        assert_eq!(
            Config::resolve(
                Some(Path::new("/etc/mine.toml")),
                Some("/nonexistent/env.toml".to_string()),
                &working,
                Some(config_dir)
            ),
            Some(ConfigSource::Explicit(PathBuf::from("/etc/mine.toml")))
        );
    }

    #[test]
    fn test_lookup_finds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::resolve(None, None, dir.path(), None), None);
    }

    #[test]
    fn test_locate_explicit_and_env() {
        let explicit = Config::locate(Some(Path::new("/nonexistent/flag.toml")));
        assert_eq!(
            explicit,
            Some(ConfigSource::Explicit(PathBuf::from("/nonexistent/flag.toml")))
        );

        std::env::set_var(CONFIG_ENV, "/nonexistent/env.toml");
        let from_env = Config::locate(None);
        std::env::remove_var(CONFIG_ENV);
        assert_eq!(
            from_env,
            Some(ConfigSource::Explicit(PathBuf::from("/nonexistent/env.toml")))
        );
        assert!(Config::load(from_env.as_ref()).is_err());
    }

    #[test]
    fn test_tilde_expansion() {
        let config = Config {
            contacts_file: "~/contacts.csv".to_string(),
            ..Default::default()
        };
        assert!(!config.contacts_path().to_string_lossy().starts_with('~'));
    }
}
