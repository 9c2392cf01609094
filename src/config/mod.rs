// Author: Dustin Pilgrim
// License: MIT

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ModfileError;

/// Settings file name, looked up in the home directory.
pub const CONFIG_FILE_NAME: &str = ".modfile.json";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "MODFILE_";

pub const DEFAULT_PUPPETFILE: &str = "./Puppetfile";
pub const DEFAULT_BRANCH: &str = "production";
pub const DEFAULT_FORGE_URL: &str = "https://forgeapi.puppet.com";

/// Registry settings, used by callers that talk to the module forge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeSettings {
    pub api_url: String,
    pub user_agent: String,
}

impl Default for ForgeSettings {
    fn default() -> Self {
        ForgeSettings {
            api_url: DEFAULT_FORGE_URL.to_string(),
            user_agent: String::new(),
        }
    }
}

/// Flags a caller wants switched on for every invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlwaysFlags {
    pub verbose: bool,
    pub show: bool,
    pub write_in_place: bool,
    pub confirm: bool,
    pub prefer_git: bool,
}

/// Process-wide settings: defaults, then the settings file, then `MODFILE_*`
/// environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub puppetfile: String,
    pub puppetfile_branch: String,
    pub forge: ForgeSettings,
    pub always: AlwaysFlags,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            puppetfile: DEFAULT_PUPPETFILE.to_string(),
            puppetfile_branch: DEFAULT_BRANCH.to_string(),
            forge: ForgeSettings::default(),
            always: AlwaysFlags::default(),
        }
    }
}

impl Settings {
    /// `~/.modfile.json`, when a home directory can be determined.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
    }

    /// Load from the default path with environment overrides applied.
    pub fn load() -> Result<Self, ModfileError> {
        let mut settings = match Self::default_path() {
            Some(path) => Self::from_file_or_default(path)?,
            None => {
                tracing::warn!("could not determine home directory, using default settings");
                Self::default()
            }
        };
        settings.apply_overrides(std::env::vars())?;
        Ok(settings)
    }

    /// A missing file yields defaults; an unreadable or malformed one is an error.
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ModfileError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModfileError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ModfileError::FileError {
            message: format!("Failed to read settings file: {}", e),
            path: path.to_string_lossy().to_string(),
            hint: Some("Check that the file exists and is readable".into()),
            code: Some(301),
        })?;
        let settings = Self::from_json(&content)?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Parse settings JSON. Missing keys fall back to their defaults.
    pub fn from_json(content: &str) -> Result<Self, ModfileError> {
        serde_json::from_str(content).map_err(|e| ModfileError::ConfigError {
            message: format!("Malformed settings: {}", e),
            hint: Some("Settings are a JSON object, e.g. {\"puppetfile\": \"./Puppetfile\"}".into()),
            code: Some(310),
        })
    }

    /// Apply `MODFILE_*` overrides from `(name, value)` pairs. Unrelated
    /// variables are ignored.
    pub fn apply_overrides<I, K, V>(&mut self, vars: I) -> Result<(), ModfileError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in vars {
            let Some(key) = name.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value: String = value.into();
            match key {
                "PUPPETFILE" => self.puppetfile = value,
                "PUPPETFILE_BRANCH" => self.puppetfile_branch = value,
                "FORGE_URL" => self.forge.api_url = value,
                "FORGE_USER_AGENT" => self.forge.user_agent = value,
                "ALWAYS_VERBOSE" => self.always.verbose = parse_flag(key, &value)?,
                "ALWAYS_SHOW" => self.always.show = parse_flag(key, &value)?,
                "ALWAYS_WRITE_IN_PLACE" => self.always.write_in_place = parse_flag(key, &value)?,
                "ALWAYS_CONFIRM" => self.always.confirm = parse_flag(key, &value)?,
                "ALWAYS_PREFER_GIT" => self.always.prefer_git = parse_flag(key, &value)?,
                _ => {
                    tracing::trace!(variable = name.as_ref(), "ignoring unknown override");
                    continue;
                }
            }
            tracing::debug!(variable = name.as_ref(), "applied settings override");
        }
        Ok(())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ModfileError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|e| ModfileError::ConfigError {
            message: format!("Failed to encode settings: {}", e),
            hint: None,
            code: Some(311),
        })?;
        fs::write(path, json).map_err(|e| ModfileError::FileError {
            message: format!("Failed to write settings file: {}", e),
            path: path.to_string_lossy().to_string(),
            hint: Some("Check that the directory exists and is writable".into()),
            code: Some(302),
        })
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ModfileError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ModfileError::ConfigError {
            message: format!("{}{} has invalid boolean value '{}'", ENV_PREFIX, key, other),
            hint: Some("Use true/false, yes/no, on/off or 1/0".into()),
            code: Some(312),
        }),
    }
}
