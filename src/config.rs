// Configuration: user options with their "missing" errors, process
// settings read from the environment, and the token file.

use crate::api::DEFAULT_API_URL;
use crate::error::{GistError, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the canonical token.
pub const TOKEN_ENV: &str = "GIST_TOKEN";
pub const TOKEN_FILE_ENV: &str = "GIST_TOKEN_FILE";
pub const API_URL_ENV: &str = "GIST_API_URL";
pub const DEFAULT_TOKEN_FILE: &str = "token.yaml";

/// Raw options a `User` is built from.
#[derive(Debug, Clone, Default)]
pub struct UserOptions {
    pub username: Option<String>,
    pub token: Option<String>,
}

/// The options a `UserConfig` knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    Username,
    Token,
}

impl ConfigField {
    /// Error raised when this field is required but absent.
    pub fn missing_error(self) -> GistError {
        match self {
            ConfigField::Username => GistError::NoUsernameDefined,
            ConfigField::Token => GistError::AuthenticationError,
        }
    }
}

/// Validated view over `UserOptions`. Empty strings count as absent.
#[derive(Debug, Clone)]
pub struct UserConfig {
    options: UserOptions,
}

impl UserConfig {
    pub fn new(options: UserOptions) -> Self {
        UserConfig { options }
    }

    pub fn get(&self, field: ConfigField) -> Option<&str> {
        let value = match field {
            ConfigField::Username => self.options.username.as_deref(),
            ConfigField::Token => self.options.token.as_deref(),
        };
        value.filter(|v| !v.is_empty())
    }

    /// Value of `field`, or the error mapped to it.
    pub fn require(&self, field: ConfigField) -> Result<&str> {
        self.get(field).ok_or_else(|| field.missing_error())
    }

    pub fn username(&self) -> Result<&str> {
        self.require(ConfigField::Username)
    }

    pub fn token(&self) -> Result<&str> {
        self.require(ConfigField::Token)
    }

    pub fn has_token(&self) -> bool {
        self.get(ConfigField::Token).is_some()
    }
}

/// Process-wide settings, resolved from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub token_file: PathBuf,
    /// Value of `GIST_TOKEN` when the settings were read.
    pub env_token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_url: DEFAULT_API_URL.to_string(),
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            env_token: None,
        }
    }
}

impl Settings {
    /// Read `GIST_API_URL`, `GIST_TOKEN_FILE` and `GIST_TOKEN`, falling back
    /// to `https://api.github.com`, `token.yaml` and no token.
    pub fn from_env() -> Self {
        let api_url = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.into());
        let token_file = std::env::var(TOKEN_FILE_ENV)
            .map(|p| expand_home(&p))
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TOKEN_FILE));
        Settings {
            api_url,
            token_file,
            env_token: std::env::var(TOKEN_ENV).ok(),
        }
    }

    /// Token from `GIST_TOKEN`, else from the token file, else `None`.
    /// An empty `GIST_TOKEN` counts as unset.
    pub fn stored_token(&self) -> Result<Option<String>> {
        if let Some(token) = self.env_token.as_deref().filter(|t| !t.is_empty()) {
            debug!("using token from {}", TOKEN_ENV);
            return Ok(Some(token.to_string()));
        }
        read_token(&self.token_file)
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest),
        None => PathBuf::from(path),
    }
}

/// On-disk shape of the token file.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct TokenFile {
    pub token: String,
}

/// Write `token` as the sole `token` key of the YAML file at `path`.
pub fn write_token(path: &Path, token: &str) -> Result<()> {
    let yaml = serde_yaml::to_string(&TokenFile {
        token: token.to_string(),
    })?;
    fs::write(path, yaml)?;
    info!("token written to {}", path.display());
    Ok(())
}

/// Read the token file. A missing file or empty token is `None`.
pub fn read_token(path: &Path) -> Result<Option<String>> {
    let data = match fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("no token file at {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    let file: TokenFile = serde_yaml::from_str(&data)?;
    Ok(Some(file.token).filter(|t| !t.is_empty()))
}
