//! Merge tag renderer for previews and test sends
//!
//! Fills merge tags with values. Works from the scanner's occurrence list, so it
//! recognizes exactly the tags the scanner does and substitutes by `(format, name)`.
//!
//! Conditionals get a single, non-nested pass: `*|IF:NAME|* … *|END:IF|*` keeps its
//! inner content when `NAME` has a non-empty value and is removed entirely otherwise.
//! `ELSE` and `ELSEIF` markers are not evaluated and stay in kept content as written.
//!
//! ```ignore
//! let vars = HashMap::from([("FNAME".to_string(), "Ana".to_string())]);
//! assert_eq!(render("Hi *|FNAME|*", &vars, None), "Hi Ana");
//! ```

use crate::occurrence::{ConditionalKeyword, Occurrence, PlaceholderFormat};
use crate::scanner::scan;
use std::collections::HashMap;

/// Exact key first, then a key whose upper-case spelling equals `name`.
///
/// When several keys fold to the same name the lexicographically smallest wins.
fn lookup_folded<'a>(vars: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    if let Some(value) = vars.get(name) {
        return Some(value);
    }
    vars.iter()
        .filter(|(key, _)| key.to_uppercase() == name)
        .min_by(|a, b| a.0.cmp(b.0))
        .map(|(_, value)| value.as_str())
}

/// Non-empty under `name` or under its lower-case spelling.
fn is_truthy(vars: &HashMap<String, String>, name: &str) -> bool {
    let lower = name.to_lowercase();
    [name, lower.as_str()]
        .iter()
        .any(|key| vars.get(*key).is_some_and(|value| !value.is_empty()))
}

fn closes_if(marker: &Occurrence) -> bool {
    marker.conditional_keyword() == Some(ConditionalKeyword::End)
        && marker.conditional_variable() == Some("IF")
}

fn value_for<'a>(
    occurrence: &Occurrence,
    merge_vars: &'a HashMap<String, String>,
    global_vars: Option<&'a HashMap<String, String>>,
) -> Option<&'a str> {
    match occurrence.format {
        PlaceholderFormat::SimpleVar => lookup_folded(merge_vars, &occurrence.name),
        PlaceholderFormat::TemplateVar => merge_vars.get(&occurrence.name).map(String::as_str),
        PlaceholderFormat::GlobalVar => {
            global_vars.and_then(|globals| lookup_folded(globals, &occurrence.name))
        }
        PlaceholderFormat::Conditional => None,
    }
}

/// Keep or drop each `IF … END:IF` span. Each `IF` pairs with the next `*|END:IF|*`.
fn resolve_conditionals(content: &str, merge_vars: &HashMap<String, String>) -> String {
    let markers: Vec<Occurrence> = scan(content)
        .into_iter()
        .filter(|o| o.format == PlaceholderFormat::Conditional)
        .collect();

    let mut resolved = String::with_capacity(content.len());
    let mut cursor = 0;
    let mut index = 0;

    while index < markers.len() {
        let open = &markers[index];
        let variable = match (open.conditional_keyword(), open.conditional_variable()) {
            (Some(ConditionalKeyword::If), Some(variable)) => variable,
            _ => {
                index += 1;
                continue;
            }
        };
        let Some(close_index) = markers[index + 1..]
            .iter()
            .position(closes_if)
            .map(|offset| index + 1 + offset)
        else {
            break;
        };
        let close = &markers[close_index];

        resolved.push_str(&content[cursor..open.start]);
        if is_truthy(merge_vars, variable) {
            resolved.push_str(&content[open.end..close.start]);
        }
        cursor = close.end;
        index = close_index + 1;
    }

    resolved.push_str(&content[cursor..]);
    resolved
}

/// Render `content` with merge and global variable values
///
/// # Arguments
/// * `content` - Template text
/// * `merge_vars` - Per-recipient values; `*|NAME|*` matches a key spelled `NAME` or
///   one whose upper-case form is `NAME`, `{{name}}` matches its key exactly
/// * `global_vars` - Values for `*|GLOBAL:NAME|*`, matched like `*|NAME|*`
///
/// Tags without a value are left as written. Values are inserted verbatim and are
/// never scanned again.
pub fn render(
    content: &str,
    merge_vars: &HashMap<String, String>,
    global_vars: Option<&HashMap<String, String>>,
) -> String {
    let resolved = resolve_conditionals(content, merge_vars);

    let mut rendered = String::with_capacity(resolved.len());
    let mut cursor = 0;
    for occurrence in scan(&resolved) {
        if let Some(value) = value_for(&occurrence, merge_vars, global_vars) {
            rendered.push_str(&resolved[cursor..occurrence.start]);
            rendered.push_str(value);
            cursor = occurrence.end;
        }
    }
    rendered.push_str(&resolved[cursor..]);
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_simple_and_template_vars() {
        let merge = vars(&[("FNAME", "Ana"), ("url", "https://x")]);
        assert_eq!(
            render("Hi *|FNAME|*, visit {{url}}", &merge, None),
            "Hi Ana, visit https://x"
        );
    }

    #[test]
    fn test_render_upper_cased_key_match() {
        let merge = vars(&[("fname", "Ana")]);
        assert_eq!(render("*|FNAME|* *|fname|*", &merge, None), "Ana Ana");
        // Template variables only match their exact key
        assert_eq!(render("{{FNAME}} {{fname}}", &merge, None), "{{FNAME}} Ana");
    }

    #[test]
    fn test_render_exact_key_wins_over_folded() {
        let merge = vars(&[("fname", "lower"), ("FNAME", "upper")]);
        assert_eq!(render("*|FNAME|*", &merge, None), "upper");
    }

    #[test]
    fn test_render_template_var_with_spaces() {
        let merge = vars(&[("url", "https://x")]);
        assert_eq!(render("{{ url }}", &merge, None), "https://x");
    }

    #[test]
    fn test_render_unknown_left_verbatim() {
        let merge = vars(&[("FNAME", "Ana")]);
        assert_eq!(
            render("*|LNAME|* {{x}} *|GLOBAL:SIG|*", &merge, None),
            "*|LNAME|* {{x}} *|GLOBAL:SIG|*"
        );
    }

    #[test]
    fn test_render_global_vars() {
        let globals = vars(&[("SIGNATURE", "— Team")]);
        assert_eq!(
            render("*|GLOBAL:SIGNATURE|*", &HashMap::new(), Some(&globals)),
            "— Team"
        );
        let lower = vars(&[("signature", "— Team")]);
        assert_eq!(
            render("*|GLOBAL:SIGNATURE|*", &HashMap::new(), Some(&lower)),
            "— Team"
        );
    }

    #[test]
    fn test_render_merge_vars_do_not_fill_globals() {
        let merge = vars(&[("SIGNATURE", "x")]);
        assert_eq!(
            render("*|GLOBAL:SIGNATURE|*", &merge, None),
            "*|GLOBAL:SIGNATURE|*"
        );
    }

    #[test]
    fn test_render_conditional_removed_when_falsy() {
        let content = "*|IF:VIP|*Welcome back!*|END:IF|*";
        assert_eq!(render(content, &HashMap::new(), None), "");
        assert_eq!(render(content, &vars(&[("VIP", "")]), None), "");
    }

    #[test]
    fn test_render_conditional_kept_when_truthy() {
        let content = "*|IF:VIP|*Welcome back!*|END:IF|*";
        assert_eq!(render(content, &vars(&[("VIP", "1")]), None), "Welcome back!");
        assert_eq!(render(content, &vars(&[("vip", "yes")]), None), "Welcome back!");
    }

    #[test]
    fn test_render_conditional_empty_value_does_not_hide_lower_case() {
        let content = "*|IF:VIP|*Welcome back!*|END:IF|*";
        let merge = vars(&[("VIP", ""), ("vip", "1")]);
        assert_eq!(render(content, &merge, None), "Welcome back!");
    }

    #[test]
    fn test_render_conditional_closed_only_by_end_if() {
        let content = "*|IF:VIP|*a*|END:FOO|*b*|END:IF|*c";
        assert_eq!(render(content, &HashMap::new(), None), "c");
        assert_eq!(
            render(content, &vars(&[("VIP", "1")]), None),
            "a*|END:FOO|*bc"
        );
    }

    #[test]
    fn test_render_conditional_content_is_rendered() {
        let merge = vars(&[("VIP", "1"), ("FNAME", "Ana")]);
        assert_eq!(
            render("A *|IF:VIP|*Hi *|FNAME|*. *|END:IF|*B", &merge, None),
            "A Hi Ana. B"
        );
    }

    #[test]
    fn test_render_else_markers_not_evaluated() {
        let content = "*|IF:VIP|*gold*|ELSE:|*standard*|END:IF|*";
        assert_eq!(
            render(content, &vars(&[("VIP", "1")]), None),
            "gold*|ELSE:|*standard"
        );
        assert_eq!(render(content, &HashMap::new(), None), "");
    }

    #[test]
    fn test_render_conditionals_are_not_nested() {
        let content = "*|IF:A|*x*|IF:B|*y*|END:IF|*z*|END:IF|*";
        // The outer IF pairs with the first END; the second END is left over
        assert_eq!(
            render(content, &vars(&[("A", "1")]), None),
            "x*|IF:B|*yz*|END:IF|*"
        );
        assert_eq!(render(content, &HashMap::new(), None), "z*|END:IF|*");
    }

    #[test]
    fn test_render_unpaired_markers_left_verbatim() {
        assert_eq!(
            render("*|IF:VIP|*no end", &HashMap::new(), None),
            "*|IF:VIP|*no end"
        );
        assert_eq!(render("stray *|END:IF|*", &HashMap::new(), None), "stray *|END:IF|*");
    }

    #[test]
    fn test_render_values_not_reexpanded() {
        let merge = vars(&[("A", "*|B|*"), ("B", "no")]);
        assert_eq!(render("*|A|*", &merge, None), "*|B|*");
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render("", &HashMap::new(), None), "");
    }
}
