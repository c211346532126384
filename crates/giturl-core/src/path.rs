//! Strict URL decomposition.
//!
//! [`parse_path`] never fails: input that is not a well-formed URL (local
//! paths, scp-style remotes) comes back as a sentinel record with
//! `parse_failed` set, for higher-level parsers to reinterpret.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::trace;
use url::Url;

use crate::protocols::protocols;

/// The components of a URL, as produced by [`parse_path`].
///
/// Path, hash and search keep their percent-encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedPath {
    /// Scheme tokens, e.g. `["git", "ssh"]` for `git+ssh://`.
    pub protocols: Vec<String>,
    /// The first scheme token.
    pub protocol: Option<String>,
    /// Explicit, non-default port.
    pub port: Option<String>,
    /// Hostname.
    pub resource: String,
    /// Hostname plus `:port` when a port is present.
    pub host: String,
    /// Username, empty when absent.
    pub user: String,
    /// Password, empty when absent.
    pub password: String,
    /// Path component.
    pub pathname: String,
    /// Fragment without the leading `#`.
    pub hash: String,
    /// Query string without the leading `?`.
    pub search: String,
    /// Canonical serialization of the input.
    pub href: String,
    /// Query parameters; the last occurrence of a key wins.
    pub query: BTreeMap<String, String>,
    /// Set when the input is not a well-formed URL.
    pub parse_failed: bool,
}

impl ParsedPath {
    /// The sentinel record for input that is not a well-formed URL.
    pub fn failed(path: &str) -> Self {
        Self {
            protocols: vec!["file".to_string()],
            protocol: Some("file".to_string()),
            href: path.to_string(),
            parse_failed: true,
            ..Self::default()
        }
    }

    /// Decompose an already-parsed URL.
    pub fn from_url(u: &Url) -> Self {
        let protocols = protocols(u);
        let protocol = protocols.first().cloned();
        let port = u.port().map(|p| p.to_string());
        let resource = u.host_str().unwrap_or_default().to_string();
        let host = match &port {
            Some(port) => format!("{resource}:{port}"),
            None => resource.clone(),
        };

        Self {
            protocols,
            protocol,
            port,
            resource,
            host,
            user: u.username().to_string(),
            password: u.password().unwrap_or_default().to_string(),
            pathname: u.path().to_string(),
            hash: u.fragment().unwrap_or_default().to_string(),
            search: u.query().unwrap_or_default().to_string(),
            href: u.as_str().to_string(),
            query: u.query_pairs().into_owned().collect(),
            parse_failed: false,
        }
    }
}

/// Parse the input as a URL, returning a sentinel record on failure.
pub fn parse_path(path: &str) -> ParsedPath {
    match Url::parse(path) {
        Ok(u) => ParsedPath::from_url(&u),
        Err(err) => {
            trace!("not a well-formed URL ({err}), returning sentinel");
            ParsedPath::failed(path)
        }
    }
}
