//! Mock Machine Translator for testing
//!
//! A deterministic, API-free translator for exercising the protect → translate →
//! restore → validate pipeline. Besides well-behaved modes it can simulate the kinds
//! of damage real services do to text: reordering words, padding spaces, and
//! dropping substrings.
//!
//! # Example
//!
//! ```ignore
//! use mergetag::mt::{MachineTranslator, MockTranslator, MockMode};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("hello", "en", "fr").await.unwrap();
//!     assert_eq!(result, "hello_fr");
//! }
//! ```

use crate::error::{MergeTagError, Result};
use crate::mt::translator::MachineTranslator;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append locale suffix: "hello" → "hello_fr"
    Suffix,

    /// Use predefined mappings, (text, target_locale) → translation,
    /// falling back to `Suffix`
    Mappings(HashMap<(String, String), String>),

    /// Reverse the order of whitespace-separated words (word-order changing languages)
    Reorder,

    /// Double every space, as sloppy services do around tokens
    PadSpaces,

    /// Delete every occurrence of a substring, e.g. a token the service swallowed
    Strip(String),

    /// Simulate API errors
    Error(String),

    /// No-op: return input unchanged
    NoOp,
}

impl MockMode {
    /// Parse a mode name as used on the command line.
    ///
    /// `strip` takes its argument after a colon: `strip:__PH_0__`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "suffix" => Some(MockMode::Suffix),
            "reorder" => Some(MockMode::Reorder),
            "pad" | "pad-spaces" => Some(MockMode::PadSpaces),
            "noop" | "identity" => Some(MockMode::NoOp),
            _ => name
                .strip_prefix("strip:")
                .map(|needle| MockMode::Strip(needle.to_string())),
        }
    }
}

/// Mock translator that simulates various translation scenarios
#[derive(Debug, Clone)]
pub struct MockTranslator {
    mode: MockMode,
    /// Optional simulated network delay (in milliseconds)
    delay_ms: u64,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self { mode, delay_ms: 0 }
    }

    /// Create a MockTranslator with simulated network delay
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self { mode, delay_ms }
    }

    async fn apply_delay(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    fn apply_translation(&self, text: &str, _source: &str, target: &str) -> Result<String> {
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::Reorder => {
                let words: Vec<&str> = text.split_whitespace().collect();
                Ok(words.into_iter().rev().collect::<Vec<_>>().join(" "))
            }
            MockMode::PadSpaces => Ok(text.replace(' ', "  ")),
            MockMode::Strip(needle) if needle.is_empty() => Ok(text.to_string()),
            MockMode::Strip(needle) => Ok(text.replace(needle.as_str(), "")),
            MockMode::Error(msg) => Err(MergeTagError::Translation(msg.clone())),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> Result<String> {
        self.apply_delay().await;
        self.apply_translation(text, source_locale, target_locale)
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        source_locale: &str,
        target_locale: &str,
    ) -> Result<Vec<String>> {
        // Delay once per batch, not per string
        self.apply_delay().await;

        texts
            .iter()
            .map(|text| self.apply_translation(text, source_locale, target_locale))
            .collect()
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}
