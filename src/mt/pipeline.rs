//! Placeholder-safe translation pipeline
//!
//! Runs the full round trip for one text or a batch:
//!
//! 1. Protect: replace merge tags with anchor tokens
//! 2. Translate: hand the protected text to a [`MachineTranslator`]
//! 3. Restore: put the merge tags back, absorbing spacing drift
//! 4. Validate: compare the restored text's tags with the source's
//!
//! Texts in a batch are independent. Each gets its own token map, and maps are
//! never shared between texts.

use crate::config::Config;
use crate::error::{MergeTagError, Result};
use crate::mt::anchor::{Protected, Protector};
use crate::mt::placeholder_recovery::recover_placeholders;
use crate::mt::translator::{MachineTranslator, validate_locale};
use crate::mt::validation::{ValidationResult, validate};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Everything produced while translating one text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationOutcome {
    pub source: String,
    pub protected: Protected,
    /// Raw translator output, tokens still in place
    pub translated: String,
    /// Final text with merge tags restored
    pub restored: String,
    /// Token-level observations from restoring (missing, duplicated, reordered)
    pub recovery_warnings: Vec<String>,
    pub validation: ValidationResult,
}

impl TranslationOutcome {
    pub fn is_valid(&self) -> bool {
        self.validation.is_valid
    }
}

/// Translates texts through a [`MachineTranslator`] without exposing merge tags to it.
pub struct TranslationPipeline<T: MachineTranslator> {
    translator: T,
    protector: Protector,
}

impl<T: MachineTranslator> TranslationPipeline<T> {
    pub fn new(translator: T) -> Self {
        TranslationPipeline {
            translator,
            protector: Protector::default(),
        }
    }

    /// Create a pipeline using the token style of `config`.
    pub fn with_config(translator: T, config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(TranslationPipeline {
            translator,
            protector: Protector::new(config),
        })
    }

    fn finish(&self, source: &str, protected: Protected, translated: String) -> TranslationOutcome {
        let recovery = recover_placeholders(&translated, &protected.map);
        let validation = validate(source, &recovery.recovered_text);
        if !validation.is_valid {
            warn!(
                provider = self.translator.provider_name(),
                warnings = ?validation.warnings,
                "placeholders changed during translation"
            );
        }
        TranslationOutcome {
            source: source.to_string(),
            protected,
            translated,
            restored: recovery.recovered_text,
            recovery_warnings: recovery.warnings,
            validation,
        }
    }

    /// Translate a single text, protecting its merge tags
    ///
    /// # Returns
    /// * `Ok(TranslationOutcome)` - Restored text plus its validation report. An invalid
    ///   report is not an error; callers treat it as advisory.
    /// * `Err(MergeTagError)` - If a locale is malformed or the translator fails
    pub async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> Result<TranslationOutcome> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        let protected = self.protector.protect(text);
        debug!(
            provider = self.translator.provider_name(),
            tokens = protected.map.len(),
            "translating protected text"
        );
        let translated = self
            .translator
            .translate(&protected.protected_text, source_locale, target_locale)
            .await?;

        Ok(self.finish(text, protected, translated))
    }

    /// Translate several texts with a single batch call to the translator
    ///
    /// Output order matches input order.
    pub async fn translate_batch(
        &self,
        texts: &[String],
        source_locale: &str,
        target_locale: &str,
    ) -> Result<Vec<TranslationOutcome>> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        let protected: Vec<Protected> = texts.iter().map(|t| self.protector.protect(t)).collect();
        let payload: Vec<String> = protected.iter().map(|p| p.protected_text.clone()).collect();

        let translated = self
            .translator
            .translate_batch(&payload, source_locale, target_locale)
            .await?;
        if translated.len() != texts.len() {
            return Err(MergeTagError::BatchMismatch {
                expected: texts.len(),
                actual: translated.len(),
            });
        }

        let outcomes: Vec<TranslationOutcome> = texts
            .iter()
            .zip(protected)
            .zip(translated)
            .map(|((source, protected), translated)| self.finish(source, protected, translated))
            .collect();

        let invalid = outcomes.iter().filter(|o| !o.is_valid()).count();
        info!(
            provider = self.translator.provider_name(),
            texts = outcomes.len(),
            invalid,
            "translated batch"
        );
        Ok(outcomes)
    }
}
