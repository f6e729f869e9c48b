//! Anchor tokens for protecting merge tags during machine translation
//!
//! Every placeholder occurrence is replaced by an opaque positional token before the
//! text is handed to a translation service, so the service cannot translate, split
//! or reorder the tag's inner words.
//!
//! Format: `{prefix}{index}{suffix}`, `__PH_0__`, `__PH_1__`, ... by default. The
//! index is the occurrence's zero-based position in a single `protect` call. Tokens
//! from different calls must never be mixed.

use crate::config::Config;
use crate::scanner::scan;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Insertion-ordered association of protection token to the text it stands for.
///
/// The stored text is the placeholder's raw spelling plus at most one whitespace
/// character captured from each side of it in the source text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtectionMap(IndexMap<String, String>);

impl ProtectionMap {
    pub fn new() -> Self {
        ProtectionMap(IndexMap::new())
    }

    pub fn insert(&mut self, token: String, stored: String) {
        self.0.insert(token, stored);
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.0.get(token).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(token, stored text)` pairs in token index order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a ProtectionMap {
    type Item = (&'a String, &'a String);
    type IntoIter = indexmap::map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Output of a `protect` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protected {
    /// The input with every placeholder span replaced by its token
    pub protected_text: String,
    pub map: ProtectionMap,
}

/// Replaces placeholders with anchor tokens of a fixed style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Protector {
    prefix: String,
    suffix: String,
}

impl Default for Protector {
    fn default() -> Self {
        Protector::new(&Config::default())
    }
}

impl Protector {
    /// Create a protector using the token style of `config`.
    ///
    /// The config is expected to have passed [`Config::validate`].
    pub fn new(config: &Config) -> Self {
        Protector {
            prefix: config.token_prefix.clone(),
            suffix: config.token_suffix.clone(),
        }
    }

    /// The token for the occurrence at `index`.
    pub fn token(&self, index: usize) -> String {
        format!("{}{}{}", self.prefix, index, self.suffix)
    }

    /// Replace every placeholder in `text` with an anchor token
    ///
    /// Only the placeholder spans are rewritten; surrounding whitespace stays in the
    /// protected text. A whitespace character directly before or after a span is also
    /// copied into the stored text so `restore` can put spacing back exactly as it was.
    ///
    /// # Arguments
    /// * `text` - The source text
    ///
    /// # Returns
    /// The protected text and the token map for this call
    ///
    /// # Example
    /// ```ignore
    /// let protected = Protector::default().protect("Hello *|FNAME|*!");
    /// assert_eq!(protected.protected_text, "Hello __PH_0__!");
    /// assert_eq!(protected.map.get("__PH_0__"), Some(" *|FNAME|*"));
    /// ```
    pub fn protect(&self, text: &str) -> Protected {
        let occurrences = scan(text);
        let mut map = ProtectionMap::new();
        let mut tokens = Vec::with_capacity(occurrences.len());

        for (index, occurrence) in occurrences.iter().enumerate() {
            let token = self.token(index);
            let before = text[..occurrence.start]
                .chars()
                .next_back()
                .filter(|c| c.is_whitespace());
            let after = text[occurrence.end..]
                .chars()
                .next()
                .filter(|c| c.is_whitespace());

            let mut stored = String::with_capacity(occurrence.raw.len() + 2);
            stored.extend(before);
            stored.push_str(&occurrence.raw);
            stored.extend(after);

            map.insert(token.clone(), stored);
            tokens.push(token);
        }

        // Rewrite from the last occurrence to the first so earlier offsets stay valid
        let mut protected_text = text.to_string();
        for (occurrence, token) in occurrences.iter().zip(&tokens).rev() {
            protected_text.replace_range(occurrence.start..occurrence.end, token);
        }

        debug!(tokens = map.len(), "protected placeholders");
        Protected {
            protected_text,
            map,
        }
    }
}

/// Protect `text` with the default token style.
pub fn protect(text: &str) -> Protected {
    Protector::default().protect(text)
}
