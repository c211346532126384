//! Parser configuration.
//!
//! Limits are carried in an explicit [`ParserConfig`] value handed to
//! [`UrlParser`](crate::url_parser::UrlParser) rather than in process-wide state.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default maximum input length, in characters.
pub const DEFAULT_MAX_INPUT_LENGTH: usize = 2048;

/// Environment variable overriding [`ParserConfig::max_input_length`].
pub const MAX_INPUT_LENGTH_ENV: &str = "GITURL_MAX_INPUT_LENGTH";

/// Settings for the URL parser.
///
/// Deserializes with every field optional, so it can be nested inside a
/// caller's own configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Inputs longer than this many characters are rejected.
    pub max_input_length: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_input_length: DEFAULT_MAX_INPUT_LENGTH,
        }
    }
}

impl ParserConfig {
    /// Create a config with the given maximum input length.
    pub fn with_max_input_length(max_input_length: usize) -> Self {
        Self { max_input_length }
    }

    /// Build a config from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let Ok(raw) = std::env::var(MAX_INPUT_LENGTH_ENV) else {
            return Self::default();
        };
        match raw.trim().parse::<usize>() {
            Ok(max_input_length) => Self { max_input_length },
            Err(err) => {
                debug!("ignoring {MAX_INPUT_LENGTH_ENV}={raw:?}: {err}");
                Self::default()
            }
        }
    }
}
