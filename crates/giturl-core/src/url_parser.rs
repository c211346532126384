//! URL parsing with scp-style remote recovery.
//!
//! Strict URL grammar rejects `git@host:owner/repo.git`, so a failed strict
//! parse is retried against a dedicated pattern before giving up.

use std::ops::Deref;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::config::ParserConfig;
use crate::errors::{InvalidInputReason, ParseError};
use crate::normalize::{NormalizeOptions, Normalizer, StandardNormalizer};
use crate::path::{ParsedPath, parse_path};

/// `user@host:path` (or `http(s)://host:path`), where path may end in
/// `.git` or `/`. The user or scheme prefix is mandatory.
static GIT_REPOSITORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:([a-zA-Z_][a-zA-Z0-9_-]{0,31})@|https?://)([A-Za-z0-9_.\-@]+)[/:]((?:[~.A-Za-z0-9_\-/,\s]|%[0-9A-Fa-f]{2})+?(?:\.git|/)?)$",
    )
    .expect("GIT_REPOSITORY_RE is a valid regex")
});

/// Whether, and how, to normalize input before parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Normalize {
    /// Parse the input as given.
    #[default]
    No,
    /// Normalize with the default options, keeping the fragment.
    Yes,
    /// Normalize with explicit options.
    With(NormalizeOptions),
}

impl Normalize {
    fn options(&self) -> Option<NormalizeOptions> {
        match self {
            Self::No => None,
            Self::Yes => Some(NormalizeOptions {
                strip_hash: false,
                ..NormalizeOptions::default()
            }),
            Self::With(options) => Some(options.clone()),
        }
    }
}

impl From<bool> for Normalize {
    fn from(normalize: bool) -> Self {
        if normalize { Self::Yes } else { Self::No }
    }
}

impl From<NormalizeOptions> for Normalize {
    fn from(options: NormalizeOptions) -> Self {
        Self::With(options)
    }
}

/// A successfully parsed URL.
///
/// Only produced by [`UrlParser`], so `parse_failed` is always `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParsedUrl(ParsedPath);

impl ParsedUrl {
    /// Unwrap into the underlying record.
    pub fn into_inner(self) -> ParsedPath {
        self.0
    }
}

impl Deref for ParsedUrl {
    type Target = ParsedPath;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// URL parser carrying its configuration and normalizer.
#[derive(Debug, Clone)]
pub struct UrlParser {
    config: ParserConfig,
    normalizer: Arc<dyn Normalizer>,
}

impl Default for UrlParser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl UrlParser {
    /// Create a parser with the given configuration.
    pub fn new(config: ParserConfig) -> Self {
        Self {
            config,
            normalizer: Arc::new(StandardNormalizer),
        }
    }

    /// Replace the normalizer used when normalization is requested.
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: Arc<dyn Normalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a URL or scp-style remote.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidInput`] for blank or oversized input,
    /// [`ParseError::Normalize`] when normalization fails, and
    /// [`ParseError::ParseFailure`] when the input is neither a URL nor an
    /// scp-style remote.
    pub fn parse(
        &self,
        url: &str,
        normalize: impl Into<Normalize>,
    ) -> Result<ParsedUrl, ParseError> {
        self.validate(url)?;

        let normalized = match normalize.into().options() {
            Some(options) => self.normalizer.normalize(url, &options)?,
            None => url.to_string(),
        };

        let mut parsed = parse_path(&normalized);
        if parsed.parse_failed && !recover_scp_style(&mut parsed) {
            debug!("no URL or scp-style remote found in input");
            return Err(ParseError::ParseFailure {
                subject_url: url.to_string(),
            });
        }

        Ok(ParsedUrl(parsed))
    }

    fn validate(&self, url: &str) -> Result<(), ParseError> {
        let reason = if url.trim().is_empty() {
            InvalidInputReason::Blank
        } else if url.chars().count() > self.config.max_input_length {
            InvalidInputReason::TooLong {
                max: self.config.max_input_length,
            }
        } else {
            return Ok(());
        };

        Err(ParseError::InvalidInput {
            reason,
            subject_url: url.to_string(),
        })
    }
}

/// Reinterpret a failed parse as an scp-style SSH remote.
fn recover_scp_style(parsed: &mut ParsedPath) -> bool {
    let (user, host, path) = {
        let Some(caps) = GIT_REPOSITORY_RE.captures(&parsed.href) else {
            return false;
        };
        (
            caps.get(1).map_or("", |m| m.as_str()).to_string(),
            caps[2].to_string(),
            format!("/{}", &caps[3]),
        )
    };

    debug!(resource = %host, "recovered scp-style remote");

    parsed.protocols = vec!["ssh".to_string()];
    parsed.protocol = Some("ssh".to_string());
    parsed.resource.clone_from(&host);
    parsed.host = host;
    parsed.user = user;
    parsed.pathname = path;
    parsed.parse_failed = false;
    true
}

/// Parse with the default configuration.
///
/// # Errors
///
/// See [`UrlParser::parse`].
pub fn parse_url(url: &str, normalize: impl Into<Normalize>) -> Result<ParsedUrl, ParseError> {
    UrlParser::default().parse(url, normalize)
}
