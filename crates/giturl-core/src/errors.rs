//! Error types for URL parsing and normalization.

use std::fmt;

/// Errors from parsing a URL or git remote reference.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The input was rejected before any parsing was attempted.
    #[error("invalid URL: {reason}")]
    InvalidInput {
        /// Why the input was rejected.
        reason: InvalidInputReason,
        /// The offending input.
        subject_url: String,
    },

    /// Neither strict URL parsing nor the scp-style fallback matched.
    #[error("URL parsing failed: {subject_url:?}")]
    ParseFailure {
        /// The offending input.
        subject_url: String,
    },

    /// The normalizer rejected the input or its options.
    #[error("URL normalization failed: {0}")]
    Normalize(#[from] NormalizeError),
}

impl ParseError {
    /// The input that triggered the error, when one is attached.
    pub fn subject_url(&self) -> Option<&str> {
        match self {
            Self::InvalidInput { subject_url, .. } | Self::ParseFailure { subject_url } => {
                Some(subject_url)
            }
            Self::Normalize(err) => err.subject_url(),
        }
    }

    /// Check if this error was raised by input validation.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }
}

/// Reason an input was rejected up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidInputReason {
    /// Empty or whitespace-only input.
    Blank,
    /// Input longer than the configured maximum.
    TooLong {
        /// The configured maximum length in characters.
        max: usize,
    },
}

impl fmt::Display for InvalidInputReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => f.write_str("input is empty"),
            Self::TooLong { max } => write!(
                f,
                "input exceeds maximum length of {max} characters (see ParserConfig::max_input_length)"
            ),
        }
    }
}

/// Errors from the URL normalizer.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum NormalizeError {
    /// `force_http` and `force_https` were both requested.
    #[error("the `force_http` and `force_https` options cannot be used together")]
    ConflictingOptions,

    /// The normalizer could not build a URL from the input.
    #[error("invalid URL {subject_url:?}: {source}")]
    InvalidUrl {
        /// The offending input.
        subject_url: String,
        /// Underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// A malformed `data:` URL.
    #[error("invalid data URL: {subject_url:?}")]
    InvalidDataUrl {
        /// The offending input.
        subject_url: String,
    },

    /// A query parameter filter is not a valid regular expression.
    #[error("invalid query parameter pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
}

impl NormalizeError {
    /// The input that triggered the error, when one is attached.
    pub fn subject_url(&self) -> Option<&str> {
        match self {
            Self::InvalidUrl { subject_url, .. } | Self::InvalidDataUrl { subject_url } => {
                Some(subject_url)
            }
            Self::ConflictingOptions | Self::InvalidPattern { .. } => None,
        }
    }
}
