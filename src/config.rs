// Configuration: an optional YAML file overlaid with environment variables.
// `main` loads `.env` through dotenvy before calling `load`, so values from
// that file arrive here as ordinary environment variables.

use crate::{Error, Result};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_UPLOAD_URL: &str = "https://fal.run/upload";
pub const DEFAULT_MODEL_URL: &str = "https://api.fal.ai/fal-ai/bagel/understand";
pub const DEFAULT_PROMPT: &str = "Describe this person's hair type, color, and skin tone.";

/// Environment variable pointing at an explicit config file.
pub const CONFIG_PATH_VAR: &str = "SELFIE_ANALYZER_CONFIG";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_upload_url")]
    pub upload_url: String,
    #[serde(default = "default_model_url")]
    pub model_url: String,
    #[serde(default = "default_prompt")]
    pub prompt: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub show_highlights: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            upload_url: default_upload_url(),
            model_url: default_model_url(),
            prompt: default_prompt(),
            log_level: default_log_level(),
            show_highlights: false,
        }
    }
}

fn default_upload_url() -> String {
    DEFAULT_UPLOAD_URL.to_string()
}

fn default_model_url() -> String {
    DEFAULT_MODEL_URL.to_string()
}

fn default_prompt() -> String {
    DEFAULT_PROMPT.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Load configuration from the process environment and the config file, if any.
pub fn load() -> Result<Config> {
    match env::var(CONFIG_PATH_VAR) {
        Ok(path) => load_from(Some(Path::new(&path)), |key| env::var(key).ok()),
        Err(_) => {
            let default_path = default_config_path().filter(|p| p.is_file());
            load_from(default_path.as_deref(), |key| env::var(key).ok())
        }
    }
}

/// `~/.config/selfie-analyzer/config.yaml` (or the platform equivalent).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("selfie-analyzer").join("config.yaml"))
}

/// Build a config from an optional YAML file, then apply overrides looked up
/// through `lookup`, then validate.
pub fn load_from<F>(file: Option<&Path>, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match file {
        Some(path) => {
            debug!("Loading configuration from: {}", path.display());
            let raw = std::fs::read_to_string(path)?;
            serde_yaml::from_str(&raw)?
        }
        None => Config::default(),
    };

    apply_env(&mut config, lookup);
    validate(&config)?;
    Ok(config)
}

fn apply_env<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let set = |target: &mut String, key: &str| {
        if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
            debug!("Overriding config from {}", key);
            *target = value.trim().to_string();
        }
    };
    set(&mut config.api_key, "FAL_KEY");
    set(&mut config.upload_url, "FAL_UPLOAD_URL");
    set(&mut config.model_url, "FAL_MODEL_URL");
    set(&mut config.prompt, "FAL_PROMPT");
    set(&mut config.log_level, "SELFIE_ANALYZER_LOG");

    if let Some(flag) = lookup("SELFIE_ANALYZER_HIGHLIGHTS") {
        config.show_highlights = matches!(
            flag.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        );
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.api_key.trim().is_empty() {
        return Err(Error::Config(
            "FAL_KEY is required (set it in the environment, .env or the config file)".into(),
        ));
    }
    if config.upload_url.trim().is_empty() {
        return Err(Error::Config("upload_url must not be empty".into()));
    }
    if config.model_url.trim().is_empty() {
        return Err(Error::Config("model_url must not be empty".into()));
    }
    Ok(())
}
