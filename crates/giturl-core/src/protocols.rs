//! Scheme token extraction.
//!
//! A compound scheme such as `git+ssh` is split into its parts
//! (`["git", "ssh"]`) so callers can test for a transport anywhere in it.

use url::Url;

/// A value whose URL scheme can be split into protocol tokens.
pub trait ProtocolSource {
    /// The scheme without its trailing `:`, or `None` if no URL can be built.
    fn scheme(&self) -> Option<String>;
}

impl ProtocolSource for str {
    fn scheme(&self) -> Option<String> {
        Url::parse(self).ok().map(|u| u.scheme().to_string())
    }
}

impl ProtocolSource for String {
    fn scheme(&self) -> Option<String> {
        self.as_str().scheme()
    }
}

impl ProtocolSource for Url {
    fn scheme(&self) -> Option<String> {
        Some(Url::scheme(self).to_string())
    }
}

/// Which protocol token to pick out of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// The first token.
    First,
    /// The token at a zero-based index.
    Index(usize),
}

impl From<usize> for Selector {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Return the protocol tokens of an input URL.
///
/// Inputs that are not parseable as URLs yield an empty list.
pub fn protocols<T: ProtocolSource + ?Sized>(input: &T) -> Vec<String> {
    input
        .scheme()
        .map(|scheme| split_scheme(&scheme))
        .unwrap_or_default()
}

/// Return one protocol token of an input URL, if present.
pub fn protocol<T: ProtocolSource + ?Sized>(
    input: &T,
    selector: impl Into<Selector>,
) -> Option<String> {
    let index = match selector.into() {
        Selector::First => 0,
        Selector::Index(index) => index,
    };
    protocols(input).into_iter().nth(index)
}

/// Split a raw scheme on `:` and `+`, dropping empty pieces.
pub fn split_scheme(scheme: &str) -> Vec<String> {
    scheme
        .split([':', '+'])
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
