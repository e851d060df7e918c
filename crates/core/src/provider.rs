use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{info, warn};

use crate::error::{KstudyError, Result};

pub const API_KEYS_VAR: &str = "YOUTUBE_API_KEYS";
pub const API_KEY_VAR: &str = "YOUTUBE_API_KEY";

/// Ordered fallback API keys with a cursor that only moves forward.
///
/// The client asks for `current()` before each request and calls `rotate()`
/// when the key is refused for quota. Once the cursor passes the last key the
/// ring is exhausted for the rest of its lifetime.
#[derive(Debug)]
pub struct KeyRing {
    keys: Vec<String>,
    cursor: AtomicUsize,
}

impl KeyRing {
    pub fn new<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: Vec<String> = keys
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if keys.is_empty() {
            return Err(KstudyError::MissingApiKey {
                env_var: format!("{API_KEYS_VAR} or {API_KEY_VAR}"),
            });
        }
        Ok(Self {
            keys,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Reads comma-separated keys from `YOUTUBE_API_KEYS`, falling back to `YOUTUBE_API_KEY`
    pub fn from_env() -> Result<Self> {
        let raw = std::env::var(API_KEYS_VAR)
            .or_else(|_| std::env::var(API_KEY_VAR))
            .unwrap_or_default();
        let ring = Self::new(raw.split(','))?;
        info!(keys = ring.len(), "loaded YouTube API keys");
        Ok(ring)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn current(&self) -> Option<&str> {
        self.keys
            .get(self.cursor.load(Ordering::Acquire))
            .map(String::as_str)
    }

    /// Retires the key `spent` if it is still current and returns the next usable key.
    ///
    /// Passing the key that was used keeps concurrent callers from skipping a
    /// key someone else already rotated past.
    pub fn rotate(&self, spent: &str) -> Option<&str> {
        let position = self.cursor.load(Ordering::Acquire);
        if self.keys.get(position).map(String::as_str) == Some(spent) {
            let _ = self.cursor.compare_exchange(
                position,
                position + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            );
        }
        let next = self.current();
        match next {
            Some(_) => warn!(
                key_index = self.cursor.load(Ordering::Acquire),
                "API key quota reached, switching to next key"
            ),
            None => warn!("all API keys have reached their quota"),
        }
        next
    }
}
