//! Configuration loading
//!
//! Settings come from a TOML file (default `~/.config/prism-cli/config.toml`,
//! overridable with `--config`), with credentials optionally supplied through
//! the environment (`PRISM_URL`, `PRISM_USERNAME`, `PRISM_PASSWORD`) so they
//! never have to live on disk.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::reconcile::CaseMode;

const ENV_URL: &str = "PRISM_URL";
const ENV_USERNAME: &str = "PRISM_USERNAME";
const ENV_PASSWORD: &str = "PRISM_PASSWORD";

/// Connection settings for API-backed commands (fetch/apply).
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub insecure: bool,
}

/// Sheet names inside the workbook.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SheetNames {
    pub vms: String,
    pub categories: String,
    pub requests: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            vms: crate::excel::sheets::VMS.to_string(),
            categories: crate::excel::sheets::CATEGORIES.to_string(),
            requests: crate::excel::sheets::REQUESTS.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Options {
    pub case_insensitive: Option<bool>,
}

/// Raw file shape; everything optional so a partial (or absent) file works.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    base_url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    insecure: Option<bool>,
    workbook: Option<PathBuf>,
    sheets: Option<SheetNames>,
    options: Options,
}

#[derive(Debug, Clone)]
pub struct Config {
    base_url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    insecure: bool,
    workbook: Option<PathBuf>,
    pub sheets: SheetNames,
    case_insensitive: bool,
}

impl Config {
    /// Load configuration, merging file values with environment overrides.
    ///
    /// An explicitly passed path must exist; the default path is allowed to
    /// be absent (everything can come from flags and the environment).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))?
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => {
                    let content = fs::read_to_string(&path).with_context(|| {
                        format!("Failed to read config file: {}", path.display())
                    })?;
                    toml::from_str(&content).with_context(|| {
                        format!("Failed to parse config file: {}", path.display())
                    })?
                }
                _ => FileConfig::default(),
            },
        };

        Ok(Self {
            base_url: env::var(ENV_URL).ok().or(file.base_url),
            username: env::var(ENV_USERNAME).ok().or(file.username),
            password: env::var(ENV_PASSWORD).ok().or(file.password),
            insecure: file.insecure.unwrap_or(false),
            workbook: file.workbook,
            sheets: file.sheets.unwrap_or_default(),
            case_insensitive: file.options.case_insensitive.unwrap_or(true),
        })
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("prism-cli").join("config.toml"))
    }

    /// Workbook path: CLI flag wins over the config file.
    pub fn workbook(&self, flag: Option<&Path>) -> Result<PathBuf> {
        flag.map(Path::to_path_buf)
            .or_else(|| self.workbook.clone())
            .context("No workbook configured: pass --workbook or set `workbook` in the config file")
    }

    /// Case mode for this run; `--case-sensitive` overrides the config file.
    pub fn case_mode(&self, case_sensitive_flag: bool) -> CaseMode {
        if case_sensitive_flag || !self.case_insensitive {
            CaseMode::Sensitive
        } else {
            CaseMode::Insensitive
        }
    }

    /// Credentials for API-backed commands. Fails with a structural error
    /// when connection settings are incomplete.
    pub fn api_credentials(&self) -> Result<ApiCredentials> {
        let Some(base_url) = self.base_url.clone() else {
            bail!("Missing Prism Central URL: set `base_url` in the config file or {ENV_URL}");
        };
        let Some(username) = self.username.clone() else {
            bail!("Missing username: set `username` in the config file or {ENV_USERNAME}");
        };
        let Some(password) = self.password.clone() else {
            bail!("Missing password: set `password` in the config file or {ENV_PASSWORD}");
        };
        Ok(ApiCredentials {
            base_url,
            username,
            password,
            insecure: self.insecure,
        })
    }
}
