//! Placeholder scanner
//!
//! Finds every merge tag of every supported syntax in a text and returns them as a
//! single left-to-right sequence with exact byte offsets.
//!
//! ```ignore
//! let found = scan("Hi *|FNAME|*, visit {{url}}");
//! assert_eq!(found[0].raw, "*|FNAME|*");
//! assert_eq!(found[1].name, "url");
//! ```
//!
//! Each format has one independent rule. The grammars are mutually exclusive: simple
//! variable names never contain `:`, and the global and conditional grammars are told
//! apart by the literal keyword right after `*|`. A new format must not be a textual
//! subset of an existing one.

use crate::occurrence::{Occurrence, PlaceholderFormat};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Characters allowed in a `*|NAME|*` style variable name.
pub(crate) const NAME_CHARS: &str = "A-Za-z0-9_";

static SIMPLE_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\*\|([{NAME_CHARS}]+)\|\*")).unwrap());

static TEMPLATE_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_.]*)\s*\}\}").unwrap());

static GLOBAL_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\*\|GLOBAL:([{NAME_CHARS}]+)\|\*")).unwrap());

static CONDITIONAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\*\|(IF|ELSEIF|ELSE|END):([{NAME_CHARS}]*)\|\*")).unwrap()
});

fn rule(format: PlaceholderFormat) -> &'static Regex {
    match format {
        PlaceholderFormat::SimpleVar => &SIMPLE_VAR,
        PlaceholderFormat::TemplateVar => &TEMPLATE_VAR,
        PlaceholderFormat::GlobalVar => &GLOBAL_VAR,
        PlaceholderFormat::Conditional => &CONDITIONAL,
    }
}

fn name_of(format: PlaceholderFormat, caps: &Captures) -> String {
    match format {
        PlaceholderFormat::Conditional => {
            // Markers without a variable (`*|ELSE:|*`) are named after their keyword
            match caps.get(2).map(|m| m.as_str()).filter(|s| !s.is_empty()) {
                Some(name) => name.to_string(),
                None => caps[1].to_string(),
            }
        }
        _ => caps[1].to_string(),
    }
}

/// Scan a text for placeholders of one format only, in text order.
pub fn scan_format(text: &str, format: PlaceholderFormat) -> Vec<Occurrence> {
    rule(format)
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(Occurrence {
                raw: whole.as_str().to_string(),
                name: name_of(format, &caps),
                format,
                start: whole.start(),
                end: whole.end(),
            })
        })
        .collect()
}

/// Scan a text for placeholders of every supported format.
///
/// The result is sorted by `start` and no two occurrences overlap. Two formats can
/// only collide when adjacent tags share a delimiter character (`*|IF:A|*|B|*`); the
/// later span is dropped in that case. Empty input yields an empty sequence.
pub fn scan(text: &str) -> Vec<Occurrence> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut found: Vec<Occurrence> = PlaceholderFormat::ALL
        .iter()
        .flat_map(|&format| scan_format(text, format))
        .collect();
    found.sort_by_key(|o| o.start);

    let mut disjoint: Vec<Occurrence> = Vec::with_capacity(found.len());
    for occurrence in found {
        if disjoint
            .last()
            .is_some_and(|previous| occurrence.start < previous.end)
        {
            continue;
        }
        disjoint.push(occurrence);
    }
    disjoint
}

/// Scan an optional text; `None` behaves like an empty string.
pub fn scan_opt(text: Option<&str>) -> Vec<Occurrence> {
    text.map(scan).unwrap_or_default()
}
