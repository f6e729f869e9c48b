//! Placeholder-safe machine translation
//!
//! Merge tags must reach the recipient exactly as the author wrote them, but machine
//! translators reword, reorder and respace whatever they are given. This module keeps
//! tags out of the translator's reach and checks the result afterwards.
//!
//! # Overview
//!
//! 1. **Protector** ([`anchor`]) - Replaces each merge tag with an opaque anchor token
//! 2. **MT Trait & Providers** ([`translator`], [`mock`]) - Seam for the translation service
//! 3. **Restorer** ([`placeholder_recovery`]) - Swaps tokens back, absorbing spacing drift
//! 4. **Validator** ([`validation`]) - Compares tags before and after, flags corruption
//! 5. **Pipeline** ([`pipeline`]) - Orchestrates the round trip for one text or a batch
//!
//! # Example
//!
//! ```ignore
//! use mergetag::mt::{MockMode, MockTranslator, TranslationPipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = TranslationPipeline::new(MockTranslator::new(MockMode::Suffix));
//!     let outcome = pipeline.translate("Hi *|FNAME|*", "en", "fr").await?;
//!
//!     println!("{}", outcome.restored);
//!     Ok(())
//! }
//! ```
pub mod anchor;
pub mod mock;
pub mod pipeline;
pub mod placeholder_recovery;
pub mod translator;
pub mod validation;


pub use anchor::{Protected, ProtectionMap, Protector, protect};
pub use mock::{MockMode, MockTranslator};
pub use pipeline::{TranslationOutcome, TranslationPipeline};
pub use placeholder_recovery::{RecoveryResult, recover_placeholders, restore};
pub use translator::{MachineTranslator, validate_locale};
pub use validation::{ValidationResult, find_corrupted, validate};
