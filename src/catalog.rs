//! Placeholder catalog
//!
//! Builds the UI-facing inventory of distinct merge tags used across a template's
//! fields, with per-field usage counts and a few example spellings.
//!
//! Entries are keyed by `(format, name)`. The output is ordered by format priority
//! and then by case-sensitive name, so the same template always yields the same
//! catalog.

use crate::config::Config;
use crate::occurrence::PlaceholderFormat;
use crate::scanner::scan_opt;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Maximum number of distinct raw spellings kept per field location.
pub const MAX_EXAMPLES: usize = 3;

/// Descriptions for well-known merge tag names.
static BUILTIN_DESCRIPTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("FNAME", "Recipient first name"),
        ("LNAME", "Recipient last name"),
        ("EMAIL", "Recipient email address"),
        ("PHONE", "Recipient phone number"),
        ("ADDRESS", "Recipient postal address"),
        ("BIRTHDAY", "Recipient birthday"),
        ("COMPANY", "Sender company name"),
        ("UNSUB", "Unsubscribe link"),
        ("UNSUBSCRIBE", "Unsubscribe link"),
        ("UPDATE_PROFILE", "Update profile link"),
        ("ARCHIVE", "View in browser link"),
        ("FORWARD", "Forward to a friend link"),
        ("CURRENT_YEAR", "Current year"),
        ("DATE", "Send date"),
        ("LIST_ADDRESS", "Mailing list postal address"),
        ("REWARDS", "Referral badge"),
    ])
});

/// Look up the built-in description for a name, case-insensitively.
pub fn builtin_description(name: &str) -> Option<&'static str> {
    BUILTIN_DESCRIPTIONS
        .get(name)
        .or_else(|| BUILTIN_DESCRIPTIONS.get(name.to_uppercase().as_str()))
        .copied()
}

/// The template fields scanned by the catalog, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateField {
    Code,
    Text,
    Subject,
    FromName,
    FromEmail,
    PublishCode,
    PublishText,
    PublishSubject,
    PublishFromName,
    PublishFromEmail,
}

impl TemplateField {
    pub const ALL: [TemplateField; 10] = [
        TemplateField::Code,
        TemplateField::Text,
        TemplateField::Subject,
        TemplateField::FromName,
        TemplateField::FromEmail,
        TemplateField::PublishCode,
        TemplateField::PublishText,
        TemplateField::PublishSubject,
        TemplateField::PublishFromName,
        TemplateField::PublishFromEmail,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateField::Code => "code",
            TemplateField::Text => "text",
            TemplateField::Subject => "subject",
            TemplateField::FromName => "from_name",
            TemplateField::FromEmail => "from_email",
            TemplateField::PublishCode => "publish_code",
            TemplateField::PublishText => "publish_text",
            TemplateField::PublishSubject => "publish_subject",
            TemplateField::PublishFromName => "publish_from_name",
            TemplateField::PublishFromEmail => "publish_from_email",
        }
    }
}

/// The text of a template's draft and published fields. Absent fields are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateFields {
    pub code: Option<String>,
    pub text: Option<String>,
    pub subject: Option<String>,
    pub from_name: Option<String>,
    pub from_email: Option<String>,
    pub publish_code: Option<String>,
    pub publish_text: Option<String>,
    pub publish_subject: Option<String>,
    pub publish_from_name: Option<String>,
    pub publish_from_email: Option<String>,
}

impl TemplateFields {
    pub fn get(&self, field: TemplateField) -> Option<&str> {
        let value = match field {
            TemplateField::Code => &self.code,
            TemplateField::Text => &self.text,
            TemplateField::Subject => &self.subject,
            TemplateField::FromName => &self.from_name,
            TemplateField::FromEmail => &self.from_email,
            TemplateField::PublishCode => &self.publish_code,
            TemplateField::PublishText => &self.publish_text,
            TemplateField::PublishSubject => &self.publish_subject,
            TemplateField::PublishFromName => &self.publish_from_name,
            TemplateField::PublishFromEmail => &self.publish_from_email,
        };
        value.as_deref()
    }

    pub fn with(mut self, field: TemplateField, text: impl Into<String>) -> Self {
        let slot = match field {
            TemplateField::Code => &mut self.code,
            TemplateField::Text => &mut self.text,
            TemplateField::Subject => &mut self.subject,
            TemplateField::FromName => &mut self.from_name,
            TemplateField::FromEmail => &mut self.from_email,
            TemplateField::PublishCode => &mut self.publish_code,
            TemplateField::PublishText => &mut self.publish_text,
            TemplateField::PublishSubject => &mut self.publish_subject,
            TemplateField::PublishFromName => &mut self.publish_from_name,
            TemplateField::PublishFromEmail => &mut self.publish_from_email,
        };
        *slot = Some(text.into());
        self
    }
}

/// Usage of one placeholder within one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldUsage {
    pub field: TemplateField,
    pub count: usize,
    /// Up to [`MAX_EXAMPLES`] distinct raw spellings, in order of appearance
    pub examples: Vec<String>,
}

/// One distinct placeholder and where it is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub name: String,
    pub format: PlaceholderFormat,
    pub locations: Vec<FieldUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CatalogEntry {
    pub fn total_count(&self) -> usize {
        self.locations.iter().map(|l| l.count).sum()
    }

    pub fn location(&self, field: TemplateField) -> Option<&FieldUsage> {
        self.locations.iter().find(|l| l.field == field)
    }

    fn record(&mut self, field: TemplateField, raw: &str) {
        let usage = match self.locations.iter().position(|l| l.field == field) {
            Some(index) => &mut self.locations[index],
            None => {
                self.locations.push(FieldUsage {
                    field,
                    count: 0,
                    examples: Vec::new(),
                });
                let last = self.locations.len() - 1;
                &mut self.locations[last]
            }
        };
        usage.count += 1;
        if usage.examples.len() < MAX_EXAMPLES && !usage.examples.iter().any(|e| e == raw) {
            usage.examples.push(raw.to_string());
        }
    }
}

/// Builds catalogs with a configurable description table.
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    extra_descriptions: HashMap<String, String>,
}

impl CatalogBuilder {
    pub fn new(config: &Config) -> Self {
        CatalogBuilder {
            extra_descriptions: config.descriptions.clone(),
        }
    }

    /// Description for a name: configured entries first, then the built-in table.
    pub fn describe(&self, name: &str) -> Option<String> {
        self.extra_descriptions
            .get(name)
            .cloned()
            .or_else(|| builtin_description(name).map(str::to_string))
    }

    pub fn build(&self, fields: &TemplateFields) -> Vec<CatalogEntry> {
        let mut entries: HashMap<(PlaceholderFormat, String), CatalogEntry> = HashMap::new();

        for field in TemplateField::ALL {
            for occurrence in scan_opt(fields.get(field)) {
                let key = (occurrence.format, occurrence.name.clone());
                let entry = entries.entry(key).or_insert_with(|| CatalogEntry {
                    description: self.describe(&occurrence.name),
                    name: occurrence.name.clone(),
                    format: occurrence.format,
                    locations: Vec::new(),
                });
                entry.record(field, &occurrence.raw);
            }
        }

        let mut catalog: Vec<CatalogEntry> = entries.into_values().collect();
        catalog.sort_by(|a, b| a.format.cmp(&b.format).then_with(|| a.name.cmp(&b.name)));
        debug!(entries = catalog.len(), "built placeholder catalog");
        catalog
    }
}

/// Build a catalog using only the built-in description table.
pub fn build_catalog(fields: &TemplateFields) -> Vec<CatalogEntry> {
    CatalogBuilder::default().build(fields)
}
