//! Substring search over timed captions.
//!
//! A match on entry `i` reports the run of entries `[i, i + w)` joined with
//! spaces so a short caption line comes back with a bit of the sentence that
//! follows it. The width `w` varies between screens, so it is a parameter.

use crate::{
    error::{KstudyError, Result},
    types::{CaptionEntry, CaptionMatch},
};

/// Number of consecutive entries joined into one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextWindow(usize);

impl ContextWindow {
    pub const DEFAULT: ContextWindow = ContextWindow(1);

    pub fn new(width: usize) -> Result<Self> {
        if width == 0 {
            return Err(KstudyError::invalid_input(
                "context window must cover at least one caption",
            ));
        }
        Ok(Self(width))
    }

    pub fn width(&self) -> usize {
        self.0
    }
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CaptionMatcher {
    window: ContextWindow,
}

impl CaptionMatcher {
    pub fn new(window: ContextWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> ContextWindow {
        self.window
    }

    /// Lazily yields one match per entry containing `query`, case-insensitively.
    ///
    /// The returned iterator is `Clone`; a clone taken before iteration replays
    /// the same matches.
    pub fn matches<'a>(&self, entries: &'a [CaptionEntry], query: &str) -> CaptionMatches<'a> {
        let needle = query.to_lowercase();
        let cursor = if needle.is_empty() { entries.len() } else { 0 };
        CaptionMatches {
            entries,
            needle,
            width: self.window.width(),
            cursor,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CaptionMatches<'a> {
    entries: &'a [CaptionEntry],
    needle: String,
    width: usize,
    cursor: usize,
}

impl CaptionMatches<'_> {
    fn build(&self, index: usize) -> CaptionMatch {
        let end = (index + self.width).min(self.entries.len());
        let context = &self.entries[index..end];
        let text = context
            .iter()
            .map(CaptionEntry::text)
            .collect::<Vec<_>>()
            .join(" ");
        let first = &context[0];
        let last_end = context.last().map(CaptionEntry::end).unwrap_or(first.end());
        CaptionMatch {
            index,
            start: first.start(),
            end: last_end,
            text,
        }
    }
}

impl Iterator for CaptionMatches<'_> {
    type Item = CaptionMatch;

    fn next(&mut self) -> Option<Self::Item> {
        while self.cursor < self.entries.len() {
            let index = self.cursor;
            self.cursor += 1;
            if self.entries[index].text().to_lowercase().contains(&self.needle) {
                return Some(self.build(index));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.entries.len() - self.cursor))
    }
}

impl std::iter::FusedIterator for CaptionMatches<'_> {}

/// Collects every match of `query` using a matcher of the given width.
pub fn search_captions(
    entries: &[CaptionEntry],
    query: &str,
    window: ContextWindow,
) -> Vec<CaptionMatch> {
    CaptionMatcher::new(window).matches(entries, query).collect()
}
