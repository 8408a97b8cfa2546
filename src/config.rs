use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default location of the optional config file.
pub const CONFIG_FILE: &str = ".edit-console.toml";

/// Environment variable that overrides `backend.base_url`.
pub const BACKEND_URL_ENV: &str = "EDIT_CONSOLE_BACKEND_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .edit-console.toml.
///
/// All fields are optional; the console works against a local backend with
/// zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub preview: PreviewDefaults,

    #[serde(default)]
    pub setup: SetupConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the editor backend, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout. None means wait for the backend indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: None,
        }
    }
}

/// Values shown by the preview renderer when the backend omits them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PreviewDefaults {
    /// Fraction in [0, 1].
    pub default_confidence: f64,
    pub default_complexity: String,
}

impl Default for PreviewDefaults {
    fn default() -> Self {
        Self {
            default_confidence: 0.0,
            default_complexity: "medium".to_string(),
        }
    }
}

/// Local backend bootstrap settings used by `setup` and `serve`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SetupConfig {
    /// Interpreter used to create the virtual environment.
    pub python: String,
    /// Minimum interpreter version, "major.minor".
    pub min_python: String,
    pub venv_dir: PathBuf,
    pub requirements: PathBuf,
    pub env_file: PathBuf,
    pub env_template: PathBuf,
    /// Backend script started by `serve`.
    pub entrypoint: PathBuf,
    /// Keys that must be present and non-empty in the env file.
    pub required_secrets: Vec<String>,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            min_python: "3.8".to_string(),
            venv_dir: PathBuf::from("venv"),
            requirements: PathBuf::from("requirements.txt"),
            env_file: PathBuf::from(".env"),
            env_template: PathBuf::from(".env.example"),
            entrypoint: PathBuf::from("app.py"),
            required_secrets: vec!["GITHUB_TOKEN".to_string(), "OPENAI_API_KEY".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from .edit-console.toml in the
    /// current directory when no path is given.
    ///
    /// A missing default file yields the default config; an explicit path
    /// must exist. `EDIT_CONSOLE_BACKEND_URL` overrides the backend URL.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let default_path = Path::new(CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from(default_path)?
                } else {
                    Config::default()
                }
            }
        };

        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            config.backend.base_url = url;
        }
        config.backend.base_url = config.backend.base_url.trim_end_matches('/').to_string();

        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }
}
