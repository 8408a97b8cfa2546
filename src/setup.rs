//! Local bootstrap for the editor backend: interpreter check, virtual
//! environment, dependencies, and the `.env` secrets file.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

use crate::config::SetupConfig;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Interpreter `{python}` could not be started: {source}")]
    InterpreterMissing {
        python: String,
        source: std::io::Error,
    },

    #[error("Python {found} found, {required} or newer is required")]
    InterpreterTooOld { found: Version, required: Version },

    #[error("Could not read a Python version from {0:?}")]
    UnparseableVersion(String),

    #[error("`{command}` failed with {status}")]
    CommandFailed { command: String, status: ExitStatus },

    #[error("Config template {0} not found; cannot create the env file")]
    TemplateMissing(PathBuf),

    #[error("Virtual environment {0} not found; run `edit-console setup` first")]
    VenvMissing(PathBuf),

    #[error("Failed to read env file: {0}")]
    EnvFile(#[from] dotenvy::Error),

    #[error("Missing required secrets in env file: {}", .0.join(", "))]
    MissingSecrets(Vec<String>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// `major.minor` interpreter version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl std::str::FromStr for Version {
    type Err = SetupError;

    /// Accepts "3.8", "3.11.4" and "Python 3.11.4".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unparseable = || SetupError::UnparseableVersion(s.trim().to_string());
        let raw = s.trim();
        let raw = raw.strip_prefix("Python").unwrap_or(raw).trim();
        let mut parts = raw.split('.');
        let major = parts.next().and_then(|p| p.parse().ok()).ok_or_else(unparseable)?;
        let minor = parts
            .next()
            .map(|p| p.chars().take_while(char::is_ascii_digit).collect::<String>())
            .and_then(|p| p.parse().ok())
            .ok_or_else(unparseable)?;
        Ok(Version { major, minor })
    }
}

/// What `run_setup` did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SetupReport {
    pub python: Option<Version>,
    pub created_venv: bool,
    pub installed_requirements: bool,
    pub created_env_file: bool,
}

/// Run every bootstrap step in order, stopping at the first failure.
#[instrument(skip(config))]
pub async fn run_setup(config: &SetupConfig, skip_install: bool) -> Result<SetupReport, SetupError> {
    let mut report = SetupReport::default();

    let required: Version = config.min_python.parse()?;
    report.python = Some(check_interpreter(&config.python, required).await?);

    if !skip_install {
        report.created_venv = ensure_venv(config).await?;
        report.installed_requirements = install_requirements(config).await?;
    }

    report.created_env_file = ensure_env_file(&config.env_file, &config.env_template)?;

    let missing = missing_secrets(&config.env_file, &config.required_secrets)?;
    if !missing.is_empty() {
        return Err(SetupError::MissingSecrets(missing));
    }

    info!(?report, "setup complete");
    Ok(report)
}

/// Confirm `python` runs and is at least `required`.
pub async fn check_interpreter(python: &str, required: Version) -> Result<Version, SetupError> {
    let output = Command::new(python)
        .arg("--version")
        .output()
        .await
        .map_err(|source| SetupError::InterpreterMissing {
            python: python.to_string(),
            source,
        })?;

    // Older interpreters print the version on stderr.
    let text = if output.stdout.is_empty() {
        String::from_utf8_lossy(&output.stderr).into_owned()
    } else {
        String::from_utf8_lossy(&output.stdout).into_owned()
    };
    let found: Version = text.parse()?;
    debug!(%found, %required, "interpreter version");

    if found < required {
        return Err(SetupError::InterpreterTooOld { found, required });
    }
    Ok(found)
}

/// Path of an executable inside the virtual environment.
pub fn venv_bin(venv_dir: &Path, name: &str) -> PathBuf {
    if cfg!(windows) {
        venv_dir.join("Scripts").join(format!("{name}.exe"))
    } else {
        venv_dir.join("bin").join(name)
    }
}

/// Create the virtual environment unless it already exists.
async fn ensure_venv(config: &SetupConfig) -> Result<bool, SetupError> {
    if config.venv_dir.exists() {
        debug!(venv = %config.venv_dir.display(), "virtual environment already present");
        return Ok(false);
    }
    info!(venv = %config.venv_dir.display(), "creating virtual environment");
    let mut command = Command::new(&config.python);
    command.arg("-m").arg("venv").arg(&config.venv_dir);
    run(command, format!("{} -m venv {}", config.python, config.venv_dir.display())).await?;
    Ok(true)
}

async fn install_requirements(config: &SetupConfig) -> Result<bool, SetupError> {
    if !config.requirements.exists() {
        warn!(path = %config.requirements.display(), "requirements file not found, skipping install");
        return Ok(false);
    }
    let pip = venv_bin(&config.venv_dir, "pip");
    info!(requirements = %config.requirements.display(), "installing dependencies");
    let mut command = Command::new(&pip);
    command.arg("install").arg("-r").arg(&config.requirements);
    run(command, format!("{} install -r {}", pip.display(), config.requirements.display())).await?;
    Ok(true)
}

async fn run(mut command: Command, display: String) -> Result<(), SetupError> {
    let status = command.status().await?;
    if !status.success() {
        return Err(SetupError::CommandFailed {
            command: display,
            status,
        });
    }
    Ok(())
}

/// Copy `template` to `env_file` when the env file does not exist yet.
/// Returns whether a copy was made.
pub fn ensure_env_file(env_file: &Path, template: &Path) -> Result<bool, SetupError> {
    if env_file.exists() {
        return Ok(false);
    }
    if !template.exists() {
        return Err(SetupError::TemplateMissing(template.to_path_buf()));
    }
    std::fs::copy(template, env_file)?;
    info!(path = %env_file.display(), "created env file from template; fill in your secrets");
    Ok(true)
}

/// Keys from `required` that are absent or blank in `env_file`.
pub fn missing_secrets(env_file: &Path, required: &[String]) -> Result<Vec<String>, SetupError> {
    let mut present = Vec::new();
    for item in dotenvy::from_path_iter(env_file)? {
        let (key, value) = item?;
        if !value.trim().is_empty() {
            present.push(key);
        }
    }
    Ok(required
        .iter()
        .filter(|key| !present.contains(key))
        .cloned()
        .collect())
}

/// Run the backend entrypoint with the venv's interpreter, inheriting stdio.
#[instrument(skip(config))]
pub async fn serve(config: &SetupConfig) -> Result<ExitStatus, SetupError> {
    let python = venv_bin(&config.venv_dir, "python");
    if !python.exists() {
        return Err(SetupError::VenvMissing(config.venv_dir.clone()));
    }
    info!(entrypoint = %config.entrypoint.display(), "starting backend");
    let status = Command::new(&python)
        .arg(&config.entrypoint)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await?;
    Ok(status)
}
