pub mod gemini;
pub mod google;

pub use gemini::GeminiTranslator;
pub use google::GoogleTranslator;

use crate::config::{Config, TranslatorKind};
use crate::error::{Result, SubcardsError};
use async_trait::async_trait;

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}

/// Build the translator selected in the configuration.
pub fn create_translator(kind: TranslatorKind, config: &Config) -> Result<Box<dyn Translator>> {
    match kind {
        TranslatorKind::Google => Ok(Box::new(GoogleTranslator::new())),
        TranslatorKind::Gemini => {
            let api_key = config.gemini_api_key.as_ref().ok_or_else(|| {
                SubcardsError::Config(
                    "Gemini API key not set. Set GEMINI_API_KEY environment variable.".to_string(),
                )
            })?;
            Ok(Box::new(GeminiTranslator::new(api_key.clone())))
        }
    }
}

/// English name of a language code, used in prompts and CSV headers.
pub fn language_name(code: &str) -> Option<&'static str> {
    let primary = code.split(['-', '_']).next().unwrap_or(code).to_lowercase();
    let name = match primary.as_str() {
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ru" => "Russian",
        "ja" => "Japanese",
        "ko" => "Korean",
        "zh" => "Chinese",
        "ar" => "Arabic",
        "hi" => "Hindi",
        "nl" => "Dutch",
        "pl" => "Polish",
        "tr" => "Turkish",
        "uk" => "Ukrainian",
        "sv" => "Swedish",
        "el" => "Greek",
        _ => return None,
    };
    Some(name)
}
