//! Placeholder fidelity validation
//!
//! Compares the merge tags of a text before and after an opaque transformation and
//! reports what went missing, what appeared, and which malformed remnants are left.
//!
//! Detection is heuristic. The corruption checks are pattern based and can both
//! under- and over-report, so results are advisory.

use crate::scanner::{NAME_CHARS, scan};
use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

const MISSING_PREFIX: &str = "Missing placeholder: ";
const ADDED_PREFIX: &str = "Unexpected placeholder: ";
const CORRUPTED_PREFIX: &str = "Corrupted placeholder: ";

/// `*|` and a (possibly empty) name, checked for what follows.
static OPEN_MERGE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\*\|[{NAME_CHARS}:]*")).unwrap());

/// `{{` up to the next brace, checked for what follows.
static OPEN_TEMPLATE_VAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{[^{}]*").unwrap());

/// `*|NAME|`, checked for a trailing `*`.
static HALF_CLOSED_MERGE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\*\|[{NAME_CHARS}:]+\|")).unwrap());

/// `{{name}`, checked for a second `}`.
static HALF_CLOSED_TEMPLATE_VAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*[A-Za-z_][A-Za-z0-9_.]*\s*\}").unwrap());

/// A malformed-pattern check: a rule plus a predicate on the character that follows
/// each match (`None` at end of text). The regex crate has no lookahead.
struct CorruptionCheck {
    rule: &'static Lazy<Regex>,
    is_corrupt: fn(Option<char>) -> bool,
}

static CORRUPTION_CHECKS: [CorruptionCheck; 4] = [
    // Unterminated `*|`
    CorruptionCheck {
        rule: &OPEN_MERGE_TAG,
        is_corrupt: |next| next != Some('|'),
    },
    // Unterminated `{{`
    CorruptionCheck {
        rule: &OPEN_TEMPLATE_VAR,
        is_corrupt: |next| matches!(next, None | Some('{')),
    },
    // `*|NAME|` missing its trailing `*`
    CorruptionCheck {
        rule: &HALF_CLOSED_MERGE_TAG,
        is_corrupt: |next| next != Some('*'),
    },
    // `{{name}` missing its second `}`
    CorruptionCheck {
        rule: &HALF_CLOSED_TEMPLATE_VAR,
        is_corrupt: |next| next != Some('}'),
    },
];

/// Find malformed placeholder remnants in `text`.
///
/// Results are grouped by check, in text order within a check, and are not
/// deduplicated.
pub fn find_corrupted(text: &str) -> Vec<String> {
    let mut corrupted = Vec::new();
    for check in CORRUPTION_CHECKS.iter() {
        for m in check.rule.find_iter(text) {
            let next = text[m.end()..].chars().next();
            if (check.is_corrupt)(next) {
                corrupted.push(m.as_str().to_string());
            }
        }
    }
    corrupted
}

/// Outcome of comparing the placeholders of two texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Human-readable restatement of `missing`, `added` and `corrupted`
    pub warnings: Vec<String>,
    pub missing: Vec<String>,
    pub added: Vec<String>,
    pub corrupted: Vec<String>,
}

impl ValidationResult {
    /// Assemble a result; validity and warnings are derived from the three lists.
    pub fn from_parts(missing: Vec<String>, added: Vec<String>, corrupted: Vec<String>) -> Self {
        let warnings = missing
            .iter()
            .map(|raw| format!("{MISSING_PREFIX}{raw}"))
            .chain(added.iter().map(|raw| format!("{ADDED_PREFIX}{raw}")))
            .chain(corrupted.iter().map(|raw| format!("{CORRUPTED_PREFIX}{raw}")))
            .collect();
        ValidationResult {
            is_valid: missing.is_empty() && added.is_empty() && corrupted.is_empty(),
            warnings,
            missing,
            added,
            corrupted,
        }
    }
}

fn raw_set(text: &str) -> IndexSet<String> {
    scan(text).into_iter().map(|o| o.raw).collect()
}

/// Compare the placeholders of `original` and `translated`
///
/// # Arguments
/// * `original` - The text before the transformation
/// * `translated` - The text after the transformation and restore
///
/// # Returns
/// `missing` lists raw placeholders of the original absent from the translation, in
/// order of first appearance; `added` lists the reverse. `corrupted` lists malformed
/// remnants found in the translation.
///
/// # Example
/// ```ignore
/// let result = validate("Hi *|FNAME|*", "Salut *|FNAME|");
/// assert!(!result.is_valid);
/// assert_eq!(result.missing, vec!["*|FNAME|*"]);
/// assert_eq!(result.corrupted, vec!["*|FNAME|"]);
/// ```
pub fn validate(original: &str, translated: &str) -> ValidationResult {
    let before = raw_set(original);
    let after = raw_set(translated);

    let missing = before.difference(&after).cloned().collect();
    let added = after.difference(&before).cloned().collect();
    let corrupted = find_corrupted(translated);

    ValidationResult::from_parts(missing, added, corrupted)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_text() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                "[a-z]{1,6}",
                "[A-C]".prop_map(|n| format!("*|{n}|*")),
                "[a-c]".prop_map(|n| format!("{{{{{n}}}}}")),
                "[A-C]".prop_map(|n| format!("*|GLOBAL:{n}|*")),
                "[A-C]".prop_map(|n| format!("*|IF:{n}|*")),
                Just("*|END:IF|*".to_string()),
            ],
            0..10,
        )
        .prop_map(|parts| parts.join(" "))
    }

    proptest! {
        #[test]
        fn self_comparison_is_valid(text in arb_text()) {
            let result = validate(&text, &text);
            prop_assert!(result.is_valid);
            prop_assert!(result.missing.is_empty());
            prop_assert!(result.added.is_empty());
        }

        #[test]
        fn missing_and_added_are_complementary(a in arb_text(), b in arb_text()) {
            let forward = validate(&a, &b);
            let backward = validate(&b, &a);
            prop_assert_eq!(forward.missing, backward.added);
            prop_assert_eq!(forward.added, backward.missing);
        }
    }
}
