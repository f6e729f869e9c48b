//! Placeholder recovery after machine translation
//!
//! Puts the original merge tags back in place of the anchor tokens produced by
//! [`protect`](super::anchor::protect), wherever the translation service moved them.
//!
//! ```ignore
//! Source:      "Hello *|FNAME|* !"
//! Protected:   "Hello __PH_0__ !"          map: __PH_0__ => " *|FNAME|* "
//! Translated:  "Bonjour __PH_0__  !"       (service added a space)
//! Recovered:   "Bonjour *|FNAME|* !"
//! ```
//!
//! Spacing drift next to a token is absorbed. For each side of a token whose stored
//! text carries a captured whitespace character:
//! - a run of horizontal whitespace touching the token is consumed;
//! - if the captured character is a line break, at most one such line break is also
//!   consumed, so blank lines are never collapsed.
//!
//! The consumed span is replaced by the stored text, which re-emits exactly the
//! captured spacing. A run of two or more horizontal whitespace characters touching a
//! placeholder therefore comes back as the single captured character. When the spans
//! consumed by two neighbouring tokens overlap, as they do for `*|A|* *|B|*`, the
//! shared whitespace character is emitted once.
//!
//! Restoring is a single left-to-right pass over the translated text. Stored text is
//! emitted and never looked at again, so a placeholder whose name is spelled like a
//! token (`{{__PH_1__}}`) survives the round trip.

use super::anchor::ProtectionMap;
use tracing::{debug, warn};

fn is_line_break(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// Whitespace that is not a line break.
fn is_horizontal_space(c: char) -> bool {
    c.is_whitespace() && !is_line_break(c)
}

/// The whitespace characters captured on each side of a stored placeholder.
fn captured_spacing(stored: &str) -> (Option<char>, Option<char>) {
    let leading = stored.chars().next().filter(|c| c.is_whitespace());
    let trailing = stored.chars().next_back().filter(|c| c.is_whitespace());
    (leading, trailing)
}

/// Start of the spacing a token at `at` absorbs on its left, never reaching below `floor`.
fn absorb_before(text: &str, floor: usize, at: usize, captured: Option<char>) -> usize {
    let Some(c) = captured else {
        return at;
    };
    let run: usize = text[floor..at]
        .chars()
        .rev()
        .take_while(|&ch| is_horizontal_space(ch))
        .map(char::len_utf8)
        .sum();
    let start = at - run;
    if is_line_break(c) && text[floor..start].ends_with(c) {
        start - c.len_utf8()
    } else {
        start
    }
}

/// End of the spacing a token ending at `at` absorbs on its right, never passing `ceiling`.
fn absorb_after(text: &str, at: usize, ceiling: usize, captured: Option<char>) -> usize {
    let Some(c) = captured else {
        return at;
    };
    let run: usize = text[at..ceiling]
        .chars()
        .take_while(|&ch| is_horizontal_space(ch))
        .map(char::len_utf8)
        .sum();
    let end = at + run;
    if is_line_break(c) && text[end..ceiling].starts_with(c) {
        end + c.len_utf8()
    } else {
        end
    }
}

/// A token found in the translated text.
struct TokenSpan<'a> {
    start: usize,
    end: usize,
    stored: &'a str,
}

/// Every token occurrence in `text`, left to right, without overlaps.
///
/// At equal offsets the longer token wins.
fn locate_spans<'a>(text: &str, map: &'a ProtectionMap) -> Vec<TokenSpan<'a>> {
    let mut found: Vec<TokenSpan<'a>> = map
        .iter()
        .flat_map(|(token, stored)| {
            text.match_indices(token).map(move |(start, _)| TokenSpan {
                start,
                end: start + token.len(),
                stored,
            })
        })
        .collect();
    found.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut spans: Vec<TokenSpan<'a>> = Vec::with_capacity(found.len());
    for span in found {
        if spans.last().is_some_and(|previous| span.start < previous.end) {
            continue;
        }
        spans.push(span);
    }
    spans
}

/// Restore the original placeholders in a (translated) protected text
///
/// Every occurrence of every token in `map` is replaced, not only the first. The
/// result does not depend on the order of the map.
///
/// # Arguments
/// * `text` - The text containing anchor tokens
/// * `map` - The map returned by the `protect` call that produced the tokens
///
/// # Example
/// ```ignore
/// let protected = protect("Hi *|FNAME|*, see {{url}}");
/// let translated = "Salut __PH_0__, voir __PH_1__";
/// assert_eq!(restore(translated, &protected.map), "Salut *|FNAME|*, voir {{url}}");
/// ```
pub fn restore(text: &str, map: &ProtectionMap) -> String {
    let spans = locate_spans(text, map);

    let mut restored = String::with_capacity(text.len());
    // End of the text consumed so far, and end of the previous token itself
    let mut cursor = 0;
    let mut floor = 0;
    let mut previous_trailing: Option<char> = None;

    for (index, span) in spans.iter().enumerate() {
        let (leading, trailing) = captured_spacing(span.stored);
        let ceiling = spans.get(index + 1).map_or(text.len(), |next| next.start);

        let mut stored = span.stored;
        let leading_start = absorb_before(text, floor, span.start, leading);
        if leading_start < cursor {
            // Both neighbours claimed the same spacing; emit a shared character once
            if let Some(c) = leading.filter(|&c| previous_trailing == Some(c)) {
                stored = &stored[c.len_utf8()..];
            }
        } else {
            restored.push_str(&text[cursor..leading_start]);
        }
        restored.push_str(stored);

        cursor = absorb_after(text, span.end, ceiling, trailing);
        floor = span.end;
        previous_trailing = trailing;
    }
    restored.push_str(&text[cursor..]);

    debug!(tokens = spans.len(), "restored placeholders");
    restored
}

/// Result of a restore with token bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Text with anchor tokens replaced by the original placeholders
    pub recovered_text: String,
    /// Tokens from the map that the translation dropped
    pub missing_tokens: Vec<String>,
    /// Tokens that appear more than once in the translation
    pub duplicated_tokens: Vec<String>,
    /// Whether tokens appear in a different order than they were issued
    pub reordering_detected: bool,
    pub warnings: Vec<String>,
}

/// Locate each token's first position and occurrence count in `text`.
fn locate_tokens<'a>(text: &str, map: &'a ProtectionMap) -> Vec<(&'a str, Option<usize>, usize)> {
    map.tokens()
        .map(|token| {
            let first = text.find(token);
            let count = text.matches(token).count();
            (token, first, count)
        })
        .collect()
}

/// Restore placeholders and report what happened to the tokens on the way
///
/// Missing and duplicated tokens are reported, not treated as errors: the recovered
/// text is still produced and the caller decides what to do with the warnings.
/// Reordering is expected for languages with a different word order and is only
/// flagged.
pub fn recover_placeholders(text: &str, map: &ProtectionMap) -> RecoveryResult {
    let located = locate_tokens(text, map);

    let missing_tokens: Vec<String> = located
        .iter()
        .filter(|(_, first, _)| first.is_none())
        .map(|(token, _, _)| token.to_string())
        .collect();
    let duplicated_tokens: Vec<String> = located
        .iter()
        .filter(|(_, _, count)| *count > 1)
        .map(|(token, _, _)| token.to_string())
        .collect();

    let positions: Vec<usize> = located.iter().filter_map(|(_, first, _)| *first).collect();
    let reordering_detected = positions.windows(2).any(|pair| pair[0] > pair[1]);

    let mut warnings = Vec::new();
    if !missing_tokens.is_empty() {
        warnings.push(format!(
            "Tokens missing from translation: {}",
            missing_tokens.join(", ")
        ));
    }
    if !duplicated_tokens.is_empty() {
        warnings.push(format!(
            "Tokens duplicated by translation: {}",
            duplicated_tokens.join(", ")
        ));
    }
    if reordering_detected {
        warnings.push(
            "Tokens were reordered during translation, which may indicate word-order changes in the target language."
                .to_string(),
        );
    }
    for warning in &warnings {
        warn!("{}", warning);
    }

    RecoveryResult {
        recovered_text: restore(text, map),
        missing_tokens,
        duplicated_tokens,
        reordering_detected,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mt::anchor::protect;

    fn roundtrip(text: &str) -> String {
        let protected = protect(text);
        restore(&protected.protected_text, &protected.map)
    }

    #[test]
    fn test_absorb_spacing_bounds() {
        let text = "a \n  __PH_0__  \n\nb";
        let start = text.find("__PH_0__").unwrap();
        let end = start + "__PH_0__".len();
        assert_eq!(absorb_before(text, 0, start, None), start);
        assert_eq!(absorb_before(text, 0, start, Some(' ')), start - 2);
        assert_eq!(absorb_before(text, 0, start, Some('\n')), start - 3);
        // Never below the floor
        assert_eq!(absorb_before(text, start - 1, start, Some('\n')), start - 1);
        assert_eq!(absorb_after(text, end, text.len(), Some(' ')), end + 2);
        assert_eq!(absorb_after(text, end, text.len(), Some('\n')), end + 3);
    }

    #[test]
    fn test_restore_empty() {
        assert_eq!(restore("", &ProtectionMap::new()), "");
        assert_eq!(restore("plain", &ProtectionMap::new()), "plain");
    }

    #[test]
    fn test_roundtrip_simple() {
        let text = "Hello *|FNAME|*, your code is {{code}}.";
        assert_eq!(roundtrip(text), text);
    }

    #[test]
    fn test_roundtrip_adjacent_placeholders() {
        for text in [
            "*|A|* *|B|*",
            "*|A|**|B|*",
            "*|A|*\n*|B|*",
            "*|A|*\n\n*|B|*",
            "*|IF:VIP|*\n{{x}}\n*|END:IF|*",
            "\r\n*|A|*\r\n",
            "\t{{a}}\t{{b}}\t",
        ] {
            assert_eq!(roundtrip(text), text, "roundtrip failed for {:?}", text);
        }
    }

    #[test]
    fn test_roundtrip_blank_lines_preserved() {
        let text = "Hello,\n\n*|FNAME|*\n\nBye";
        assert_eq!(roundtrip(text), text);
    }

    #[test]
    fn test_restore_absorbs_extra_space() {
        let protected = protect("Hello *|FNAME|* !");
        let corrupted = protected.protected_text.replace("__PH_0__", "__PH_0__ ");
        assert_eq!(corrupted, "Hello __PH_0__  !");
        assert_eq!(restore(&corrupted, &protected.map), "Hello *|FNAME|* !");
    }

    #[test]
    fn test_restore_reinstates_removed_space() {
        let protected = protect("Hello *|FNAME|* !");
        assert_eq!(restore("Hello__PH_0__!", &protected.map), "Hello *|FNAME|* !");
    }

    #[test]
    fn test_restore_does_not_merge_lines() {
        let protected = protect("Hi *|FNAME|*\nNext line");
        // A translator that pads the token must not pull the next line up
        assert_eq!(
            restore("Salut __PH_0__ \nLigne suivante", &protected.map),
            "Salut *|FNAME|*\nLigne suivante"
        );
    }

    #[test]
    fn test_restore_collapses_double_space_run() {
        // A run of two horizontal spaces touching a tag comes back as one
        assert_eq!(roundtrip("a  *|B|*"), "a *|B|*");
    }

    #[test]
    fn test_restore_replaces_all_occurrences() {
        let protected = protect("Hi *|FNAME|*!");
        assert_eq!(
            restore("__PH_0__! Hi __PH_0__!", &protected.map),
            " *|FNAME|*! Hi *|FNAME|*!"
        );
    }

    #[test]
    fn test_restore_reordered_tokens() {
        let protected = protect("*|FNAME|* sent {{item}}");
        assert_eq!(protected.protected_text, "__PH_0__ sent __PH_1__");
        let restored = restore("__PH_1__ は __PH_0__ によって送信", &protected.map);
        assert_eq!(restored, " {{item}} は *|FNAME|* によって送信");
    }

    #[test]
    fn test_restore_token_prefix_ambiguity() {
        let text = (0..12)
            .map(|i| format!("*|V{}|*", i))
            .collect::<Vec<_>>()
            .join(",");
        assert_eq!(roundtrip(&text), text);
    }

    #[test]
    fn test_restore_token_shaped_names() {
        for text in [
            "{{__PH_1__}} *|A|*",
            "*|__PH_1__|* *|__PH_0__|*",
            "*|A|* {{__PH_0__}}",
        ] {
            assert_eq!(roundtrip(text), text, "roundtrip failed for {:?}", text);
        }
    }

    #[test]
    fn test_restore_independent_of_map_order() {
        let mut forward = ProtectionMap::new();
        forward.insert("__PH_0__".to_string(), "{{__PH_1__}} ".to_string());
        forward.insert("__PH_1__".to_string(), " *|A|*".to_string());
        let mut backward = ProtectionMap::new();
        backward.insert("__PH_1__".to_string(), " *|A|*".to_string());
        backward.insert("__PH_0__".to_string(), "{{__PH_1__}} ".to_string());

        let translated = "__PH_1__ et __PH_0__";
        assert_eq!(restore(translated, &forward), restore(translated, &backward));
        assert_eq!(restore(translated, &forward), " *|A|* et {{__PH_1__}} ");
    }

    #[test]
    fn test_restore_shared_space_between_padded_tokens() {
        let protected = protect("*|A|* *|B|*");
        assert_eq!(protected.protected_text, "__PH_0__ __PH_1__");
        assert_eq!(restore("__PH_0__   __PH_1__", &protected.map), "*|A|* *|B|*");
    }

    #[test]
    fn test_restore_stored_text_is_not_expanded() {
        let mut map = ProtectionMap::new();
        map.insert("__PH_0__".to_string(), "$1 *|A|*".to_string());
        assert_eq!(restore("x __PH_0__", &map), "x $1 *|A|*");
    }

    #[test]
    fn test_recover_clean() {
        let protected = protect("*|A|* and *|B|*");
        let result = recover_placeholders(&protected.protected_text, &protected.map);
        assert_eq!(result.recovered_text, "*|A|* and *|B|*");
        assert!(result.missing_tokens.is_empty());
        assert!(result.duplicated_tokens.is_empty());
        assert!(!result.reordering_detected);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_recover_reports_missing_duplicated_reordered() {
        let protected = protect("*|A|* *|B|* *|C|*");
        let result = recover_placeholders("__PH_2__ __PH_0__ __PH_2__", &protected.map);
        assert_eq!(result.missing_tokens, vec!["__PH_1__"]);
        assert_eq!(result.duplicated_tokens, vec!["__PH_2__"]);
        assert!(result.reordering_detected);
        assert_eq!(result.warnings.len(), 3);
        assert!(!result.recovered_text.contains("__PH_"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::mt::anchor::protect;
    use proptest::prelude::*;

    fn arb_placeholder() -> impl Strategy<Value = String> {
        prop_oneof![
            "[A-Z][A-Z0-9_]{0,6}".prop_map(|n| format!("*|{n}|*")),
            "[a-z][a-z0-9_.]{0,6}".prop_map(|n| format!("{{{{{n}}}}}")),
            "[a-z]{1,4}".prop_map(|n| format!("{{{{ {n} }}}}")),
            "[A-Z][A-Z0-9_]{0,6}".prop_map(|n| format!("*|GLOBAL:{n}|*")),
            "[0-9]{1,2}".prop_map(|n| format!("*|__PH_{n}__|*")),
            "[0-9]{1,2}".prop_map(|n| format!("{{{{__PH_{n}__}}}}")),
            "[A-Z]{1,5}".prop_map(|n| format!("*|IF:{n}|*")),
            "[A-Z]{1,5}".prop_map(|n| format!("*|ELSEIF:{n}|*")),
            Just("*|ELSE:|*".to_string()),
            Just("*|END:IF|*".to_string()),
        ]
    }

    fn arb_piece() -> impl Strategy<Value = String> {
        prop_oneof![
            3 => "[A-Za-zéü]{1,8}",
            2 => arb_placeholder(),
            1 => "[,.!?:]",
        ]
    }

    // Separators never put two horizontal whitespace characters side by side
    fn arb_separator() -> impl Strategy<Value = &'static str> {
        prop_oneof![
            Just(""),
            Just(" "),
            Just("\t"),
            Just("\n"),
            Just("\n\n"),
            Just("\r\n"),
            Just(" \n"),
            Just("\n "),
        ]
    }

    fn arb_text() -> impl Strategy<Value = String> {
        prop::collection::vec((arb_piece(), arb_separator()), 0..16).prop_map(|parts| {
            parts
                .into_iter()
                .map(|(piece, sep)| format!("{piece}{sep}"))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn identity_roundtrip(text in arb_text()) {
            let protected = protect(&text);
            prop_assert_eq!(restore(&protected.protected_text, &protected.map), text);
        }

        #[test]
        fn protected_text_has_no_placeholders(text in arb_text()) {
            let protected = protect(&text);
            prop_assert!(crate::scanner::scan(&protected.protected_text).is_empty());
        }
    }
}
