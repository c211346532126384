//! Git URL resolution: turn any remote reference into a [`GitUrl`].

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use giturl_core::{ParseError, ParserConfig, UrlParser};

use crate::git_up::{GitUp, git_up_with};
use crate::git_url::{BITBUCKET_SERVER_SOURCE, GitUrl};
use crate::provider;

/// `owner/repo` shorthand, expanded to a GitHub URL.
static SHORTHAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9-]{1,39})/([-.A-Za-z0-9_]{1,100})$")
        .expect("SHORTHAND_RE is a valid regex")
});

/// Bitbucket Server project and personal repository paths.
static BITBUCKET_SERVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(projects|users)/(.*?)/repos/(.*?)((/.*$)|$)")
        .expect("BITBUCKET_SERVER_RE is a valid regex")
});

const SHORTHAND_HOST: &str = "https://github.com";
const BITBUCKET_SERVER_PREFIX: &str = "scm/";

/// Resolves git remote references with a configured [`UrlParser`].
#[derive(Debug, Clone, Default)]
pub struct GitUrlParser {
    url_parser: UrlParser,
}

impl GitUrlParser {
    /// Create a resolver with the given limits.
    pub fn new(config: ParserConfig) -> Self {
        Self::with_url_parser(UrlParser::new(config))
    }

    /// Create a resolver on top of an existing URL parser.
    pub fn with_url_parser(url_parser: UrlParser) -> Self {
        Self { url_parser }
    }

    /// Resolve a remote reference.
    pub fn parse(&self, url: &str) -> Result<GitUrl, ParseError> {
        self.parse_with_refs::<&str>(url, &[])
    }

    /// Resolve a remote reference, using `refs` to tell branch names that
    /// contain `/` apart from the file path that follows them.
    #[instrument(level = "debug", skip_all)]
    pub fn parse_with_refs<S: AsRef<str>>(
        &self,
        url: &str,
        refs: &[S],
    ) -> Result<GitUrl, ParseError> {
        let url = expand_shorthand(url);
        let up = git_up_with(&self.url_parser, &url)?;
        let mut git_url = from_git_up(up);

        let family = provider::extract(&mut git_url, refs);
        debug!(?family, owner = %git_url.owner, name = %git_url.name, "dispatched provider");

        apply_fixups(&mut git_url);
        Ok(git_url)
    }
}

/// Resolve a remote reference with default limits.
///
/// # Errors
///
/// Fails when the input is blank, longer than the default limit, or not a
/// URL, path or SCP-style reference.
pub fn git_url_parse(url: &str) -> Result<GitUrl, ParseError> {
    GitUrlParser::default().parse(url)
}

/// Like [`git_url_parse`], disambiguating refs that contain `/`.
///
/// # Errors
///
/// See [`git_url_parse`].
pub fn git_url_parse_with_refs<S: AsRef<str>>(
    url: &str,
    refs: &[S],
) -> Result<GitUrl, ParseError> {
    GitUrlParser::default().parse_with_refs(url, refs)
}

fn expand_shorthand(url: &str) -> Cow<'_, str> {
    if SHORTHAND_RE.is_match(url) {
        debug!(%url, "expanding repository shorthand");
        Cow::Owned(format!("{SHORTHAND_HOST}/{url}"))
    } else {
        Cow::Borrowed(url)
    }
}

/// Percent-decode, keeping the raw text when it is not valid UTF-8 after
/// decoding.
fn decode(s: &str) -> String {
    urlencoding::decode(s).map_or_else(|_| s.to_string(), Cow::into_owned)
}

/// Collapse instance subdomains: `gitlab.example.com` -> `example.com`.
fn source_of(resource: &str) -> String {
    let labels: Vec<&str> = resource.split('.').collect();
    if labels.len() > 2 {
        labels[1..].join(".")
    } else {
        resource.to_string()
    }
}

fn from_git_up(up: GitUp) -> GitUrl {
    let GitUp { url, token } = up;

    let raw_name = if url.pathname.is_empty() {
        &url.href
    } else {
        &url.pathname
    };
    let decoded = decode(raw_name);
    let name = decoded.strip_prefix('/').unwrap_or(&decoded);
    let name = name.strip_suffix('/').unwrap_or(name);
    let name = name.strip_suffix(".git").unwrap_or(name).to_string();

    GitUrl {
        protocol: url.protocol.clone().unwrap_or_else(|| "file".to_string()),
        source: source_of(&url.resource),
        git_suffix: url.pathname.ends_with(".git"),
        owner: decode(&url.user),
        name,
        token,
        protocols: url.protocols,
        port: url.port,
        resource: url.resource,
        host: url.host,
        user: url.user,
        password: url.password,
        pathname: url.pathname,
        hash: url.hash,
        search: url.search,
        href: url.href,
        query: url.query,
        ..GitUrl::default()
    }
}

fn apply_fixups(url: &mut GitUrl) {
    if url.full_name.is_empty() {
        url.full_name = match (url.owner.is_empty(), url.name.is_empty()) {
            (_, true) => url.owner.clone(),
            (true, false) => url.name.clone(),
            (false, false) => format!("{}/{}", url.owner, url.name),
        };
    }

    if let Some(owner) = url
        .owner
        .strip_prefix(BITBUCKET_SERVER_PREFIX)
        .map(str::to_string)
    {
        url.owner = owner;
        url.source = BITBUCKET_SERVER_SOURCE.to_string();
        url.organization = Some(url.owner.clone());
        url.full_name = format!("{}/{}", url.owner, url.name);
    }

    let repo = BITBUCKET_SERVER_RE
        .captures(&url.pathname)
        .map(|caps| (caps[2].to_string(), caps[3].to_string()));
    if let Some((owner, name)) = repo {
        debug!(%owner, %name, "matched bitbucket server path");
        url.organization = Some(owner.clone());
        url.full_name = format!("{owner}/{name}");
        url.owner = owner;
        url.name = name;
    }
}
