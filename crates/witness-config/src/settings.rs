//! Configuration schema and resolution.
//!
//! Resolution order for every key: environment variable, then the TOML
//! document, then the built-in default (optional keys only). Missing required
//! keys are collected and reported in a single `ConfigError`.
//!
//! Example:
//! ```toml
//! password = "correct horse battery staple"
//! repo = "acme/sudo-log"
//! user = "octocat"
//! token = "ghp_..."
//! local_path = "/var/lib/witness/repo"
//! log_file = "log.json"
//! privilege_program = "sudo"
//! ```

use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::debug;

use witness_contracts::error::{WitnessError, WitnessResult};

pub const DEFAULT_LOG_FILE: &str = "log.json";
pub const DEFAULT_PRIVILEGE_PROGRAM: &str = "sudo";

pub const ENV_CONFIG: &str = "WITNESS_CONFIG";
pub const ENV_PASSWORD: &str = "WITNESS_PASSWORD";
pub const ENV_REPO: &str = "WITNESS_REPO";
pub const ENV_USER: &str = "WITNESS_USER";
pub const ENV_TOKEN: &str = "WITNESS_TOKEN";
pub const ENV_LOCAL_PATH: &str = "WITNESS_LOCAL_PATH";

/// The TOML document as written. Every key is optional here; validation
/// happens in [`WitnessConfig::resolve`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    pub password: Option<String>,
    pub repo: Option<String>,
    pub user: Option<String>,
    pub token: Option<String>,
    pub local_path: Option<PathBuf>,
    pub log_file: Option<String>,
    pub privilege_program: Option<String>,
}

/// Validated configuration, built once at process entry and passed by
/// reference into the codec, replica, and orchestrator constructors.
#[derive(Clone, PartialEq, Eq)]
pub struct WitnessConfig {
    /// Encryption password for every log entry.
    pub password: String,
    /// `owner/name`, an `https://` URL, or a local path / `file://` URL.
    pub repo: String,
    /// Remote account name; also the local git identity.
    pub user: String,
    /// Remote access token, embedded in the HTTPS remote URL.
    pub token: String,
    /// Where the working copy lives.
    pub local_path: PathBuf,
    /// Log document name inside the working copy.
    pub log_file: String,
    /// Program prefixed to the command (`None` runs the argv directly).
    pub privilege_program: Option<String>,
}

impl WitnessConfig {
    /// Parse `s` as TOML and resolve it with no environment overrides.
    pub fn from_toml_str(s: &str) -> WitnessResult<Self> {
        Self::resolve(parse_raw(s)?, |_| None, home_dir())
    }

    /// Read and parse the file at `path`, with no environment overrides.
    pub fn from_file(path: &Path) -> WitnessResult<Self> {
        Self::from_toml_str(&read_file(path)?)
    }

    /// Load configuration the way the binary does.
    ///
    /// An explicit `path` must exist. Without one, `$WITNESS_CONFIG` or
    /// `$HOME/.config/witness/config.toml` is read if present; otherwise the
    /// environment alone must supply every required key.
    pub fn load(path: Option<&Path>) -> WitnessResult<Self> {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());

        let raw = match path {
            Some(path) => parse_raw(&read_file(path)?)?,
            None => match default_config_path(env).filter(|p| p.exists()) {
                Some(path) => {
                    debug!(path = %path.display(), "reading default config file");
                    parse_raw(&read_file(&path)?)?
                }
                None => RawConfig::default(),
            },
        };

        Self::resolve(raw, env, home_dir())
    }

    /// Apply environment overrides and defaults to `raw`, then validate.
    pub fn resolve(
        raw: RawConfig,
        env: impl Fn(&str) -> Option<String>,
        home: Option<PathBuf>,
    ) -> WitnessResult<Self> {
        let mut missing = Vec::new();
        let mut required = |env_key: &str, file_value: Option<String>, name: &'static str| {
            match env(env_key).or(file_value).filter(|v| !v.is_empty()) {
                Some(v) => v,
                None => {
                    missing.push(name);
                    String::new()
                }
            }
        };

        let password = required(ENV_PASSWORD, raw.password, "password");
        let repo = required(ENV_REPO, raw.repo, "repo");
        let user = required(ENV_USER, raw.user, "user");
        let token = required(ENV_TOKEN, raw.token, "token");

        if !missing.is_empty() {
            return Err(WitnessError::ConfigError {
                reason: format!("missing required settings: {}", missing.join(", ")),
            });
        }

        let local_path = match env(ENV_LOCAL_PATH).map(PathBuf::from).or(raw.local_path) {
            Some(p) => p,
            None => home
                .map(|h| h.join(".local/share/witness/repo"))
                .ok_or_else(|| WitnessError::ConfigError {
                    reason: "local_path is not set and HOME is unknown".to_string(),
                })?,
        };

        let log_file = raw.log_file.unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());
        if log_file.is_empty() || log_file == "." || log_file == ".." || log_file.contains('/') {
            return Err(WitnessError::ConfigError {
                reason: format!("log_file must be a plain file name, got '{}'", log_file),
            });
        }

        let privilege_program = match raw.privilege_program {
            Some(p) if p.trim().is_empty() => None,
            Some(p) => Some(p),
            None => Some(DEFAULT_PRIVILEGE_PROGRAM.to_string()),
        };

        Ok(Self {
            password,
            repo,
            user,
            token,
            local_path,
            log_file,
            privilege_program,
        })
    }

    /// Path of the log document inside the working copy.
    pub fn log_path(&self) -> PathBuf {
        self.local_path.join(&self.log_file)
    }

    /// The git remote URL, with credentials embedded for HTTPS remotes.
    pub fn remote_url(&self) -> String {
        let repo = self.repo.trim();

        if let Some(rest) = repo.strip_prefix("https://") {
            if rest.split('/').next().is_some_and(|host| host.contains('@')) {
                return repo.to_string();
            }
            return format!("https://{}:{}@{}", self.user, self.token, rest);
        }

        if repo.contains("://") || repo.starts_with('/') || repo.starts_with('.') {
            return repo.to_string();
        }

        let name = repo.trim_end_matches(".git");
        format!("https://{}:{}@github.com/{}.git", self.user, self.token, name)
    }

    /// The email recorded on commits made from the working copy.
    pub fn commit_email(&self) -> String {
        format!("{}@users.noreply.github.com", self.user)
    }
}

impl fmt::Debug for WitnessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WitnessConfig")
            .field("password", &"<redacted>")
            .field("repo", &self.repo)
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .field("local_path", &self.local_path)
            .field("log_file", &self.log_file)
            .field("privilege_program", &self.privilege_program)
            .finish()
    }
}

/// `$WITNESS_CONFIG`, else `$HOME/.config/witness/config.toml`.
pub fn default_config_path(env: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    env(ENV_CONFIG)
        .map(PathBuf::from)
        .or_else(|| home_dir().map(|h| h.join(".config/witness/config.toml")))
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").filter(|h| !h.is_empty()).map(PathBuf::from)
}

fn parse_raw(s: &str) -> WitnessResult<RawConfig> {
    toml::from_str(s).map_err(|e| WitnessError::ConfigError {
        reason: format!("failed to parse config TOML: {}", e),
    })
}

fn read_file(path: &Path) -> WitnessResult<String> {
    std::fs::read_to_string(path).map_err(|e| WitnessError::ConfigError {
        reason: format!("failed to read config file '{}': {}", path.display(), e),
    })
}
