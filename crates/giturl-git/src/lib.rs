//! Provider-aware resolution of git remote references.
//!
//! [`git_url_parse`] takes anything a user might paste as a remote (an
//! HTTPS clone URL, an SCP-style SSH reference, a web URL pointing at a
//! file, a local path) and returns a [`GitUrl`] with the hosting source,
//! owner, repository name, and where present the ref and file path.

pub mod git_up;
pub mod git_url;
pub mod parse;
pub mod provider;

pub use git_up::{GitUp, git_up};
pub use git_url::{FilePathType, GitUrl, UnknownFilePathType, stringify};
pub use giturl_core::{ParseError, ParserConfig};
pub use parse::{GitUrlParser, git_url_parse, git_url_parse_with_refs};
pub use provider::{ProviderFamily, is_azure_family};
