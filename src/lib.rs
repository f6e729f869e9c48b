//! Email merge tag handling
//!
//! Finds the merge tags in an email template (`*|FNAME|*`, `{{url}}`,
//! `*|GLOBAL:SIGNATURE|*`, `*|IF:VIP|*`), catalogs them across a template's fields,
//! carries them safely through machine translation and renders them with values
//! for previews.
//!
//! ```ignore
//! use mergetag::{protect, restore, validate};
//!
//! let source = "Hello *|FNAME|*, visit {{url}}";
//! let protected = protect(source);
//! // ... translate protected.protected_text ...
//! let restored = restore(&protected.protected_text, &protected.map);
//! assert!(validate(source, &restored).is_valid);
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod mt;
pub mod occurrence;
pub mod render;
pub mod scanner;

pub use catalog::{
    CatalogBuilder, CatalogEntry, FieldUsage, TemplateField, TemplateFields, build_catalog,
};
pub use config::Config;
pub use error::{MergeTagError, Result};
pub use mt::{
    Protected, ProtectionMap, Protector, TranslationOutcome, TranslationPipeline,
    ValidationResult, protect, restore, validate,
};
pub use occurrence::{ConditionalKeyword, Occurrence, PlaceholderFormat};
pub use render::render;
pub use scanner::scan;
