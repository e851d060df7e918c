use std::{str::FromStr, time::Duration};

use crate::{
    captions::ContextWindow,
    error::{KstudyError, Result},
};

pub const CONTEXT_WINDOW_VAR: &str = "KSTUDY_CONTEXT_WINDOW";
pub const TOP_K_VAR: &str = "KSTUDY_TOP_K";
pub const RESULT_LIMIT_VAR: &str = "KSTUDY_RESULT_LIMIT";
pub const CHANNEL_LIMIT_VAR: &str = "KSTUDY_CHANNEL_LIMIT";
pub const CAPTION_LANG_VAR: &str = "KSTUDY_CAPTION_LANG";
pub const TRANSCRIPT_TTL_VAR: &str = "KSTUDY_TRANSCRIPT_TTL_SECS";

/// Channels offered by name in the search screens.
pub const CHANNEL_PRESETS: &[(&str, &str)] = &[
    ("SBS Running Man", "UCaKod3X1Tn4c7Ci0iUKcvzQ"),
    ("DdeunDdeun", "UCDNvRZRgvkBTUkQzFoT_8rA"),
    ("channel fullmoon", "UCQ2O-iftmnlfrBuNsUUTofQ"),
    ("youquizontheblock", "UC920m3pMPH45qztdhppZhwA"),
];

/// Resolves a preset name (case-insensitive) to its channel id.
pub fn preset_channel_id(name: &str) -> Option<&'static str> {
    CHANNEL_PRESETS
        .iter()
        .find(|(preset, _)| preset.eq_ignore_ascii_case(name.trim()))
        .map(|(_, id)| *id)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub context_window: ContextWindow,
    /// Most viewed videos kept after ranking, searched in rank order
    pub top_k: usize,
    /// Search stops once this many videos have caption matches
    pub result_limit: usize,
    pub channel_limit: u32,
    pub caption_language: String,
    pub transcript_ttl: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            context_window: ContextWindow::DEFAULT,
            top_k: 50,
            result_limit: 3,
            channel_limit: 50,
            caption_language: "ko".to_string(),
            transcript_ttl: Duration::from_secs(86_400),
        }
    }
}

impl SearchConfig {
    /// Defaults overridden by any `KSTUDY_*` variables that are set
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(width) = parse_var::<usize, _>(&lookup, CONTEXT_WINDOW_VAR)? {
            config.context_window =
                ContextWindow::new(width).map_err(|e| invalid(CONTEXT_WINDOW_VAR, e))?;
        }
        if let Some(top_k) = parse_var::<usize, _>(&lookup, TOP_K_VAR)? {
            if top_k == 0 {
                return Err(invalid(TOP_K_VAR, "must be at least 1"));
            }
            config.top_k = top_k;
        }
        if let Some(limit) = parse_var::<usize, _>(&lookup, RESULT_LIMIT_VAR)? {
            if limit == 0 {
                return Err(invalid(RESULT_LIMIT_VAR, "must be at least 1"));
            }
            config.result_limit = limit;
        }
        if let Some(limit) = parse_var::<u32, _>(&lookup, CHANNEL_LIMIT_VAR)? {
            config.channel_limit = limit;
        }
        if let Some(lang) = lookup(CAPTION_LANG_VAR).filter(|v| !v.trim().is_empty()) {
            config.caption_language = lang.trim().to_string();
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, TRANSCRIPT_TTL_VAR)? {
            config.transcript_ttl = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| invalid(key, e)),
        None => Ok(None),
    }
}

fn invalid(key: &str, reason: impl std::fmt::Display) -> KstudyError {
    KstudyError::InvalidConfig {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
