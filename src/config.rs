//! Runtime configuration
//!
//! Controls the shape of protection tokens and extends the catalog's description
//! table. Loadable from JSON; every field is optional.
//!
//! ```json
//! {
//!   "token_prefix": "__PH_",
//!   "token_suffix": "__",
//!   "descriptions": { "PLAN": "Subscription plan" }
//! }
//! ```

use crate::error::{MergeTagError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_TOKEN_PREFIX: &str = "__PH_";
pub const DEFAULT_TOKEN_SUFFIX: &str = "__";

/// Characters a token must never contain: placeholder delimiters would make a token
/// rescannable as a merge tag, and whitespace would be absorbed on restore.
const FORBIDDEN_TOKEN_CHARS: [char; 4] = ['*', '|', '{', '}'];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub token_prefix: String,
    pub token_suffix: String,
    /// Extra catalog descriptions, merged over the built-in table
    pub descriptions: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            token_prefix: DEFAULT_TOKEN_PREFIX.to_string(),
            token_suffix: DEFAULT_TOKEN_SUFFIX.to_string(),
            descriptions: HashMap::new(),
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check that the token style produces tokens that are unambiguous and inert.
    ///
    /// The suffix must be non-empty and must not start with a digit, otherwise
    /// token `1` would be a prefix of token `10`.
    pub fn validate(&self) -> Result<()> {
        if self.token_prefix.is_empty() {
            return Err(MergeTagError::InvalidConfig(
                "token_prefix must not be empty".to_string(),
            ));
        }
        if self.token_suffix.is_empty() {
            return Err(MergeTagError::InvalidConfig(
                "token_suffix must not be empty".to_string(),
            ));
        }
        if self
            .token_suffix
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
        {
            return Err(MergeTagError::InvalidConfig(
                "token_suffix must not start with a digit".to_string(),
            ));
        }
        for (label, part) in [
            ("token_prefix", &self.token_prefix),
            ("token_suffix", &self.token_suffix),
        ] {
            if let Some(c) = part
                .chars()
                .find(|c| c.is_whitespace() || FORBIDDEN_TOKEN_CHARS.contains(c))
            {
                return Err(MergeTagError::InvalidConfig(format!(
                    "{} contains forbidden character {:?}",
                    label, c
                )));
            }
        }
        Ok(())
    }
}
