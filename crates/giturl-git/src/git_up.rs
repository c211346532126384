//! Credential and transport enrichment on top of URL parsing.

use serde::Serialize;
use tracing::trace;

use giturl_core::ParseError;
use giturl_core::path::ParsedPath;
use giturl_core::ssh::is_ssh;
use giturl_core::url_parser::{Normalize, UrlParser};

/// Password marking the username as an OAuth token (GitHub style).
pub const OAUTH_BASIC_MARKER: &str = "x-oauth-basic";

/// Username marking the password as an access token (Bitbucket style).
pub const TOKEN_AUTH_MARKER: &str = "x-token-auth";

/// A parsed URL with its resolved transport and embedded token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitUp {
    /// The parsed URL. `protocol` holds the resolved transport.
    #[serde(flatten)]
    pub url: ParsedPath,
    /// Access token found in the credentials, or empty.
    pub token: String,
}

impl GitUp {
    /// The resolved transport.
    pub fn protocol(&self) -> &str {
        self.url.protocol.as_deref().unwrap_or("file")
    }
}

/// Parse a remote reference and resolve its transport and token.
///
/// # Errors
///
/// Returns an error when the input cannot be parsed; see
/// [`UrlParser::parse`].
pub fn git_up(input: &str) -> Result<GitUp, ParseError> {
    git_up_with(&UrlParser::default(), input)
}

/// Like [`git_up`], using the given parser.
///
/// # Errors
///
/// Returns an error when the input cannot be parsed.
pub fn git_up_with(parser: &UrlParser, input: &str) -> Result<GitUp, ParseError> {
    let mut url = parser.parse(input, Normalize::No)?.into_inner();

    let token = if url.password == OAUTH_BASIC_MARKER {
        url.user.clone()
    } else if url.user == TOKEN_AUTH_MARKER {
        url.password.clone()
    } else {
        String::new()
    };

    let protocol = if is_ssh(url.protocols.as_slice())
        || (url.protocols.is_empty() && is_ssh(input))
    {
        "ssh".to_string()
    } else if let Some(first) = url.protocols.first() {
        first.clone()
    } else {
        url.protocols = vec!["file".to_string()];
        "file".to_string()
    };
    trace!(%protocol, has_token = !token.is_empty(), "resolved transport");
    url.protocol = Some(protocol);

    if let Some(stripped) = url.href.strip_suffix('/') {
        url.href = stripped.to_string();
    }

    Ok(GitUp { url, token })
}
