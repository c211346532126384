//! URL decomposition primitives for git remote references.
//!
//! This crate provides the leaf components used by `giturl-git`:
//! - [`protocols`](protocols::protocols) for scheme token extraction
//! - [`is_ssh`](ssh::is_ssh) for SSH remote detection
//! - [`parse_path`](path::parse_path) for strict, infallible URL decomposition
//! - [`parse_url`](url_parser::parse_url) for parsing with scp-style recovery
//! - [`normalize_url`](normalize::normalize_url) for optional pre-processing

pub mod config;
pub mod errors;
pub mod normalize;
pub mod path;
pub mod protocols;
pub mod ssh;
#[cfg(test)]
pub mod test_utils;
pub mod url_parser;

pub use config::ParserConfig;
pub use errors::{InvalidInputReason, NormalizeError, ParseError};
pub use normalize::{NormalizeOptions, normalize_url};
pub use path::{ParsedPath, parse_path};
pub use protocols::protocols;
pub use ssh::is_ssh;
pub use url_parser::{Normalize, ParsedUrl, UrlParser, parse_url};
