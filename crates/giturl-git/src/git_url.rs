//! The resolved git URL record.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Source label assigned to Bitbucket Server remotes.
pub const BITBUCKET_SERVER_SOURCE: &str = "bitbucket-server";

/// The view a web URL points into (`/blob/`, `/tree/`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilePathType {
    /// A single file.
    Blob,
    /// A directory listing.
    Tree,
    /// Raw file contents.
    Raw,
    /// Bitbucket-style source view.
    Src,
    /// The web editor.
    Edit,
}

impl FilePathType {
    /// The path segment for this view.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Raw => "raw",
            Self::Src => "src",
            Self::Edit => "edit",
        }
    }
}

impl fmt::Display for FilePathType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path segment that is not a file path view.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown file path type: {0:?}")]
pub struct UnknownFilePathType(pub String);

impl FromStr for FilePathType {
    type Err = UnknownFilePathType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blob" => Ok(Self::Blob),
            "tree" => Ok(Self::Tree),
            "raw" => Ok(Self::Raw),
            "src" => Ok(Self::Src),
            "edit" => Ok(Self::Edit),
            other => Err(UnknownFilePathType(other.to_string())),
        }
    }
}

/// A git remote reference broken down into repository coordinates.
///
/// String fields are empty when the input carries no such information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GitUrl {
    /// Scheme tokens of the parsed input.
    pub protocols: Vec<String>,
    /// Resolved transport: `ssh`, `http`, `https`, `file`, or another scheme.
    pub protocol: String,
    /// Explicit, non-default port.
    pub port: Option<String>,
    /// Hostname.
    pub resource: String,
    /// Hostname plus `:port` when a port is present.
    pub host: String,
    /// Username as written in the input.
    pub user: String,
    /// Password as written in the input.
    pub password: String,
    /// Path component, percent-encoded.
    pub pathname: String,
    /// Fragment without the leading `#`.
    pub hash: String,
    /// Query string without the leading `?`.
    pub search: String,
    /// Canonical serialization of the input.
    pub href: String,
    /// Query parameters.
    pub query: BTreeMap<String, String>,
    /// Access token embedded in the credentials.
    pub token: String,
    /// Hosting domain with instance subdomains collapsed, e.g. `github.com`.
    pub source: String,
    /// Repository owner; may contain `/` for nested groups.
    pub owner: String,
    /// Repository name.
    pub name: String,
    /// Organization or collection context.
    pub organization: Option<String>,
    /// Canonical repository identifier, usually `owner/name`.
    pub full_name: String,
    /// Branch, tag or commit-ish the URL points at.
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// File path below the ref.
    pub filepath: String,
    /// View type of a web URL.
    pub filepathtype: Option<FilePathType>,
    /// Whether the path ends in `.git`.
    pub git_suffix: bool,
    /// Commit hash from a `/commit/<sha>` URL.
    pub commit: Option<String>,
}

impl GitUrl {
    /// Render the canonical `protocol://resource/owner/name` form.
    ///
    /// `kind` names the desired output flavor. Every flavor currently
    /// renders the same way.
    pub fn to_string_as(&self, kind: Option<&str>) -> String {
        stringify(self, kind)
    }

    /// Whether the remote was recognized as a Bitbucket Server repository.
    pub fn is_bitbucket_server(&self) -> bool {
        self.source == BITBUCKET_SERVER_SOURCE
    }
}

impl fmt::Display for GitUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&stringify(self, None))
    }
}

/// Render a parsed git URL as `protocol://resource/owner/name`.
pub fn stringify(url: &GitUrl, _kind: Option<&str>) -> String {
    format!(
        "{}://{}/{}/{}",
        url.protocol, url.resource, url.owner, url.name
    )
}
