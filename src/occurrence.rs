//! Placeholder data model shared by the scanner, catalog, protector and renderer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The textual syntaxes a placeholder can be written in.
///
/// Variant order is the canonical priority order used when presenting
/// placeholders, so the derived `Ord` sorts `SimpleVar` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaceholderFormat {
    /// `*|FNAME|*`
    SimpleVar,
    /// `{{first_name}}`
    TemplateVar,
    /// `*|GLOBAL:SIGNATURE|*`
    GlobalVar,
    /// `*|IF:VIP|*`, `*|ELSEIF:VIP|*`, `*|ELSE:|*`, `*|END:IF|*`
    Conditional,
}

impl PlaceholderFormat {
    pub const ALL: [PlaceholderFormat; 4] = [
        PlaceholderFormat::SimpleVar,
        PlaceholderFormat::TemplateVar,
        PlaceholderFormat::GlobalVar,
        PlaceholderFormat::Conditional,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceholderFormat::SimpleVar => "simple-var",
            PlaceholderFormat::TemplateVar => "template-var",
            PlaceholderFormat::GlobalVar => "global-var",
            PlaceholderFormat::Conditional => "conditional",
        }
    }
}

impl fmt::Display for PlaceholderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword of a conditional marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionalKeyword {
    If,
    ElseIf,
    Else,
    End,
}

impl ConditionalKeyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionalKeyword::If => "IF",
            ConditionalKeyword::ElseIf => "ELSEIF",
            ConditionalKeyword::Else => "ELSE",
            ConditionalKeyword::End => "END",
        }
    }

    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "IF" => Some(ConditionalKeyword::If),
            "ELSEIF" => Some(ConditionalKeyword::ElseIf),
            "ELSE" => Some(ConditionalKeyword::Else),
            "END" => Some(ConditionalKeyword::End),
            _ => None,
        }
    }
}

/// A single placeholder found in a text.
///
/// `start..end` are byte offsets and `text[start..end] == raw` always holds
/// for the text the occurrence was scanned from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Occurrence {
    /// The exact matched text, e.g. `*|FNAME|*`
    pub raw: String,
    /// Variable name; for conditionals without a variable, the keyword itself
    pub name: String,
    pub format: PlaceholderFormat,
    pub start: usize,
    pub end: usize,
}

impl Occurrence {
    /// The keyword of a conditional marker, recovered from `raw`.
    ///
    /// Returns `None` for every other format.
    pub fn conditional_keyword(&self) -> Option<ConditionalKeyword> {
        if self.format != PlaceholderFormat::Conditional {
            return None;
        }
        let inner = self.raw.strip_prefix("*|")?;
        let (keyword, _) = inner.split_once(':')?;
        ConditionalKeyword::parse(keyword)
    }

    /// The variable a conditional marker tests, if it names one.
    ///
    /// `*|IF:VIP|*` tests `VIP`; `*|ELSE:|*` tests nothing.
    pub fn conditional_variable(&self) -> Option<&str> {
        self.conditional_keyword()?;
        let inner = self.raw.strip_prefix("*|")?.strip_suffix("|*")?;
        let (_, variable) = inner.split_once(':')?;
        (!variable.is_empty()).then_some(variable)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn conditional(raw: &str, name: &str) -> Occurrence {
        Occurrence {
            raw: raw.to_string(),
            name: name.to_string(),
            format: PlaceholderFormat::Conditional,
            start: 0,
            end: raw.len(),
        }
    }

    #[test]
    fn test_format_priority_order() {
        let mut formats = vec![
            PlaceholderFormat::Conditional,
            PlaceholderFormat::GlobalVar,
            PlaceholderFormat::SimpleVar,
            PlaceholderFormat::TemplateVar,
        ];
        formats.sort();
        assert_eq!(formats, PlaceholderFormat::ALL.to_vec());
    }

    #[test]
    fn test_format_serializes_kebab_case() {
        let json = serde_json::to_string(&PlaceholderFormat::TemplateVar).unwrap();
        assert_eq!(json, "\"template-var\"");
        assert_eq!(PlaceholderFormat::GlobalVar.to_string(), "global-var");
    }

    #[test]
    fn test_conditional_keyword_from_raw() {
        assert_eq!(
            conditional("*|IF:VIP|*", "VIP").conditional_keyword(),
            Some(ConditionalKeyword::If)
        );
        assert_eq!(
            conditional("*|END:IF|*", "IF").conditional_keyword(),
            Some(ConditionalKeyword::End)
        );
        assert_eq!(
            conditional("*|ELSE:|*", "ELSE").conditional_keyword(),
            Some(ConditionalKeyword::Else)
        );
        assert_eq!(
            conditional("*|ELSEIF:A|*", "A").conditional_keyword(),
            Some(ConditionalKeyword::ElseIf)
        );
    }

    #[test]
    fn test_conditional_variable() {
        assert_eq!(
            conditional("*|IF:VIP|*", "VIP").conditional_variable(),
            Some("VIP")
        );
        assert_eq!(
            conditional("*|ELSE:|*", "ELSE").conditional_variable(),
            None
        );
        assert_eq!(
            conditional("*|END:IF|*", "IF").conditional_variable(),
            Some("IF")
        );
    }

    #[test]
    fn test_conditional_keyword_none_for_other_formats() {
        let occurrence = Occurrence {
            raw: "*|FNAME|*".to_string(),
            name: "FNAME".to_string(),
            format: PlaceholderFormat::SimpleVar,
            start: 0,
            end: 9,
        };
        assert_eq!(occurrence.conditional_keyword(), None);
        assert_eq!(occurrence.conditional_variable(), None);
    }
}
