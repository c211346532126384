//! SSH remote detection.

use std::sync::LazyLock;

use regex::Regex;

use crate::protocols::protocols;

/// `.<label>:<port>` with an optional trailing slash, i.e. a URL-style port.
static URL_PORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.([a-zA-Z\d]+):(\d+)/?").expect("URL_PORT_RE is a valid regex")
});

/// Input accepted by [`is_ssh`]: a raw reference or its protocol tokens.
pub trait SshProbe {
    /// Whether the value describes an SSH-style remote.
    fn looks_like_ssh(&self) -> bool;
}

impl SshProbe for str {
    fn looks_like_ssh(&self) -> bool {
        if has_ssh_protocol(&protocols(self)) {
            return true;
        }

        let rest = self.find("://").map_or(self, |idx| &self[idx + 3..]);
        if URL_PORT_RE.is_match(rest) {
            return false;
        }

        // A missing `@` or `:` sorts last, so `user@host:path` is the only
        // shape that passes.
        let at = rest.find('@').unwrap_or(usize::MAX);
        let colon = rest.find(':').unwrap_or(usize::MAX);
        at < colon
    }
}

impl SshProbe for String {
    fn looks_like_ssh(&self) -> bool {
        self.as_str().looks_like_ssh()
    }
}

impl<S: AsRef<str>> SshProbe for [S] {
    fn looks_like_ssh(&self) -> bool {
        has_ssh_protocol(self)
    }
}

impl<S: AsRef<str>, const N: usize> SshProbe for [S; N] {
    fn looks_like_ssh(&self) -> bool {
        has_ssh_protocol(self)
    }
}

impl<S: AsRef<str>> SshProbe for Vec<S> {
    fn looks_like_ssh(&self) -> bool {
        has_ssh_protocol(self)
    }
}

/// Check whether a remote reference (or its protocol list) is SSH.
pub fn is_ssh<T: SshProbe + ?Sized>(input: &T) -> bool {
    input.looks_like_ssh()
}

/// Check a protocol token list for `ssh` or `rsync`.
pub fn has_ssh_protocol<S: AsRef<str>>(protocols: &[S]) -> bool {
    protocols
        .iter()
        .any(|p| matches!(p.as_ref(), "ssh" | "rsync"))
}
