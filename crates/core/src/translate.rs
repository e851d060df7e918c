use std::fmt;

use async_trait::async_trait;
use tracing::warn;

use crate::error::{KstudyError, Result};

const TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String>;
}

pub struct GoogleTranslator {
    http: reqwest::Client,
    source: String,
    target: String,
}

impl GoogleTranslator {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            source: source.into(),
            target: target.into(),
        }
    }

    /// Korean to English
    pub fn korean_to_english() -> Self {
        Self::new("ko", "en")
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str) -> Result<String> {
        let response = self
            .http
            .get(TRANSLATE_URL)
            .query(&[
                ("client", "gtx"),
                ("sl", self.source.as_str()),
                ("tl", self.target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(KstudyError::TranslationFailed {
                reason: format!("service returned {status}"),
            });
        }

        let body = response.json::<serde_json::Value>().await?;
        parse_translation(&body)
    }
}

/// Join the translated sentence chunks of a `translate_a/single` response
pub fn parse_translation(body: &serde_json::Value) -> Result<String> {
    let chunks = body[0]
        .as_array()
        .ok_or_else(|| KstudyError::TranslationFailed {
            reason: format!("unexpected response shape: {body}"),
        })?;

    Ok(chunks
        .iter()
        .filter_map(|chunk| chunk[0].as_str())
        .collect::<String>())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    Text(String),
    Unavailable { reason: String },
}

impl Translation {
    pub fn is_available(&self) -> bool {
        matches!(self, Translation::Text(_))
    }
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Translation::Text(text) => f.write_str(text),
            Translation::Unavailable { .. } => f.write_str("Translation not available"),
        }
    }
}

/// Translate, keeping a failure visible as [`Translation::Unavailable`] instead of an error
pub async fn translate_or_unavailable<T>(translator: &T, text: &str) -> Translation
where
    T: Translator + ?Sized,
{
    match translator.translate(text).await {
        Ok(translated) => Translation::Text(translated),
        Err(e) => {
            warn!(error = %e, "translation failed");
            Translation::Unavailable {
                reason: e.to_string(),
            }
        }
    }
}
