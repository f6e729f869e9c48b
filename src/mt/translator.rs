//! Machine Translation trait and utilities
//!
//! `MachineTranslator` is the seam for the opaque text transformation that sits
//! between `protect` and `restore`. This crate ships no network provider; callers
//! plug in their own vendor client, and tests use [`MockTranslator`](super::mock::MockTranslator).
//!
//! # Example
//!
//! ```ignore
//! use mergetag::mt::{MachineTranslator, MockMode, MockTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = MockTranslator::new(MockMode::NoOp);
//!     let result = provider.translate("Hello, __PH_0__!", "en", "fr").await?;
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

use crate::error::{MergeTagError, Result};
use async_trait::async_trait;

/// Generic trait for machine translation providers
///
/// Implementations receive protected text: merge tags have already been replaced by
/// anchor tokens, and everything else is ordinary prose the provider may change freely.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single text string from source to target locale
    ///
    /// # Arguments
    ///
    /// * `text` - The text to translate
    /// * `source_locale` - Source language code (e.g., "en", "en-US")
    /// * `target_locale` - Target language code (e.g., "fr", "fr-FR")
    async fn translate(&self, text: &str, source_locale: &str, target_locale: &str)
    -> Result<String>;

    /// Translate multiple strings in a single batch operation
    ///
    /// # Guarantees
    ///
    /// - Output order matches input order
    /// - Output length equals input length
    /// - Each translation is independent
    async fn translate_batch(
        &self,
        texts: &[String],
        source_locale: &str,
        target_locale: &str,
    ) -> Result<Vec<String>>;

    /// Get the name of this translation provider, for logging
    fn provider_name(&self) -> &str;
}

/// Validate that a locale code is in acceptable format
///
/// Only ASCII alphanumerics, hyphens and underscores are accepted.
pub fn validate_locale(locale: &str) -> Result<()> {
    if locale.is_empty() {
        return Err(MergeTagError::InvalidLocale(
            "Locale code is empty".to_string(),
        ));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(MergeTagError::InvalidLocale(format!(
            "Invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}
