use crate::error::{Result, SubcardsError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslatorKind {
    #[default]
    Google,
    Gemini,
}

impl std::fmt::Display for TranslatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslatorKind::Google => write!(f, "google"),
            TranslatorKind::Gemini => write!(f, "gemini"),
        }
    }
}

impl std::str::FromStr for TranslatorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" => Ok(TranslatorKind::Google),
            "gemini" => Ok(TranslatorKind::Gemini),
            _ => Err(format!(
                "Unknown translator: {}. Use 'google' or 'gemini'",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub translator: TranslatorKind,
    /// Language of the subtitles (front of the card).
    pub source_language: String,
    /// Language of the translation (back of the card).
    pub target_language: String,
    /// Comma-separated codes requested from yt-dlp.
    pub subtitle_languages: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            translator: TranslatorKind::default(),
            source_language: "es".to_string(),
            target_language: "en".to_string(),
            subtitle_languages: "es,es-ES,es-419".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                match toml::from_str::<Config>(&contents) {
                    Ok(file_config) => config = file_config,
                    Err(e) => warn!(
                        "Ignoring unreadable config file {}: {}",
                        config_path.display(),
                        e
                    ),
                }
            }
        }

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override fields from environment-style variables.
    fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = var("GEMINI_API_KEY") {
            self.gemini_api_key = Some(key);
        }
        if let Some(translator) = var("SUBCARDS_TRANSLATOR") {
            match translator.parse() {
                Ok(t) => self.translator = t,
                Err(e) => warn!("Ignoring SUBCARDS_TRANSLATOR: {}", e),
            }
        }
        if let Some(lang) = var("SUBCARDS_SOURCE_LANG") {
            self.source_language = lang;
        }
        if let Some(lang) = var("SUBCARDS_TARGET_LANG") {
            self.target_language = lang;
        }
        if let Some(langs) = var("SUBCARDS_SUB_LANGS") {
            self.subtitle_languages = langs;
        }
    }

    pub fn validate(&self, translator: TranslatorKind) -> Result<()> {
        if translator == TranslatorKind::Gemini && self.gemini_api_key.is_none() {
            return Err(SubcardsError::Config(
                "GEMINI_API_KEY not set. Get one at https://aistudio.google.com/apikey".to_string(),
            ));
        }

        if self.source_language.trim().is_empty() || self.target_language.trim().is_empty() {
            return Err(SubcardsError::Config(
                "Source and target languages must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("subcards").join("config.toml"))
    }
}
