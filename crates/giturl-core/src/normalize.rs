//! String-level URL normalization.
//!
//! Runs as optional pre-processing before [`parse_url`](crate::url_parser::parse_url).
//! The output is always a string; scp-style remotes (`git@host:path`) are
//! not URLs and should not be normalized.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::NormalizeError;

const DATA_URL_DEFAULT_MIME_TYPE: &str = "text/plain";
const DATA_URL_DEFAULT_CHARSET: &str = "us-ascii";

/// Schemes the normalizer rewrites. A dotted scheme outside this set is
/// treated as custom and passed through untouched.
const SUPPORTED_PROTOCOLS: [&str; 3] = ["https", "http", "file"];

static DATA_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:data:)(?P<type>[^,]*?),(?P<data>[^#]*?)(?:#(?P<hash>.*))?$")
        .expect("DATA_URL_RE is a valid regex")
});

static SCHEME_SLASHES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9_]+:)?//").expect("SCHEME_SLASHES_RE is a valid regex")
});

static RELATIVE_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.*/").expect("RELATIVE_PATH_RE is a valid regex"));

static TEXT_FRAGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i):~:text.*$").expect("TEXT_FRAGMENT_RE is a valid regex")
});

static EMBEDDED_PROTOCOL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[a-z\d+\-.]{1,50}://").expect("EMBEDDED_PROTOCOL_RE is a valid regex")
});

static REPEATED_SLASHES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/{2,}").expect("REPEATED_SLASHES_RE is a valid regex"));

static WWW_HOST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z\-\d]{1,63}\.[a-z.\-\d]{2,63}$").expect("WWW_HOST_RE is a valid regex")
});

static STRIP_PROTOCOL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?:)?//").expect("STRIP_PROTOCOL_RE is a valid regex")
});

/// A query parameter (or path segment) filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamFilter {
    /// Matches a name exactly.
    Name(String),
    /// Matches names against a case-insensitive regular expression.
    Pattern(String),
}

impl ParamFilter {
    fn compile(&self) -> Result<CompiledFilter<'_>, NormalizeError> {
        match self {
            Self::Name(name) => Ok(CompiledFilter::Name(name)),
            Self::Pattern(pattern) => RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map(CompiledFilter::Pattern)
                .map_err(|source| NormalizeError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                }),
        }
    }
}

enum CompiledFilter<'a> {
    Name(&'a str),
    Pattern(Regex),
}

impl CompiledFilter<'_> {
    fn matches(&self, candidate: &str) -> bool {
        match self {
            Self::Name(name) => *name == candidate,
            Self::Pattern(re) => re.is_match(candidate),
        }
    }
}

fn compile_all(filters: &[ParamFilter]) -> Result<Vec<CompiledFilter<'_>>, NormalizeError> {
    filters.iter().map(ParamFilter::compile).collect()
}

fn any_match(filters: &[CompiledFilter<'_>], candidate: &str) -> bool {
    filters.iter().any(|f| f.matches(candidate))
}

/// Which query parameters to drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryRemoval {
    /// Keep every parameter.
    None,
    /// Drop every parameter.
    All,
    /// Drop parameters matching any filter.
    Matching(Vec<ParamFilter>),
}

impl Default for QueryRemoval {
    fn default() -> Self {
        Self::Matching(vec![ParamFilter::Pattern(r"^utm_\w+".to_string())])
    }
}

/// Options for [`normalize_url`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct NormalizeOptions {
    /// Scheme prepended to protocol-relative and scheme-less input.
    pub default_protocol: String,
    /// Keep the default scheme on protocol-relative input.
    pub normalize_protocol: bool,
    /// Rewrite `https` to `http`.
    pub force_http: bool,
    /// Rewrite `http` to `https`.
    pub force_https: bool,
    /// Drop username and password.
    pub strip_authentication: bool,
    /// Drop the fragment entirely.
    pub strip_hash: bool,
    /// Drop `:~:text` directives from the fragment.
    pub strip_text_fragment: bool,
    /// Drop a leading `www.` from the host.
    pub strip_www: bool,
    /// Query parameters to drop.
    pub remove_query_parameters: QueryRemoval,
    /// Query parameters that survive removal. When set on its own, every
    /// other parameter is dropped.
    pub keep_query_parameters: Option<Vec<ParamFilter>>,
    /// Drop a trailing `/` from the path.
    pub remove_trailing_slash: bool,
    /// Drop the lone `/` of an otherwise empty path.
    pub remove_single_slash: bool,
    /// Last path segments to drop, such as `index.html`.
    pub remove_directory_index: Vec<ParamFilter>,
    /// Drop an explicit port.
    pub remove_explicit_port: bool,
    /// Sort query parameters by key.
    pub sort_query_parameters: bool,
    /// Drop the `http(s)://` prefix from the result.
    pub strip_protocol: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            default_protocol: "http".to_string(),
            normalize_protocol: true,
            force_http: false,
            force_https: false,
            strip_authentication: true,
            strip_hash: false,
            strip_text_fragment: true,
            strip_www: true,
            remove_query_parameters: QueryRemoval::default(),
            keep_query_parameters: None,
            remove_trailing_slash: true,
            remove_single_slash: true,
            remove_directory_index: Vec::new(),
            remove_explicit_port: false,
            sort_query_parameters: true,
            strip_protocol: false,
        }
    }
}

impl NormalizeOptions {
    /// Filter matching `index.<ext>`, for use in `remove_directory_index`.
    pub fn directory_index_filter() -> ParamFilter {
        ParamFilter::Pattern(r"^index\.[a-z]+$".to_string())
    }
}

/// Pluggable normalization step used by [`UrlParser`](crate::url_parser::UrlParser).
pub trait Normalizer: Send + Sync + std::fmt::Debug {
    /// Normalize `url` with the given options.
    ///
    /// # Errors
    ///
    /// Returns an error when the options conflict or no URL can be built.
    fn normalize(&self, url: &str, options: &NormalizeOptions) -> Result<String, NormalizeError>;
}

/// The built-in [`Normalizer`], backed by [`normalize_url`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardNormalizer;

impl Normalizer for StandardNormalizer {
    fn normalize(&self, url: &str, options: &NormalizeOptions) -> Result<String, NormalizeError> {
        normalize_url(url, options)
    }
}

/// Normalize a URL string.
///
/// # Errors
///
/// Returns [`NormalizeError::ConflictingOptions`] when both `force_http`
/// and `force_https` are set, and an error when the input cannot be turned
/// into a URL.
pub fn normalize_url(input: &str, options: &NormalizeOptions) -> Result<String, NormalizeError> {
    if options.force_http && options.force_https {
        return Err(NormalizeError::ConflictingOptions);
    }

    let input = input.trim();

    if input
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("data:"))
    {
        return normalize_data_url(input, options.strip_hash);
    }

    if has_custom_protocol(input) {
        return Ok(input.to_string());
    }

    let has_relative_protocol = input.starts_with("//");
    let is_relative_url = !has_relative_protocol && RELATIVE_PATH_RE.is_match(input);

    let default_protocol = options.default_protocol.trim_end_matches(':');
    let prefixed: Cow<'_, str> = if is_relative_url {
        Cow::Borrowed(input)
    } else if let Some(rest) = input.strip_prefix("//") {
        Cow::Owned(format!("{default_protocol}:{rest}"))
    } else if SCHEME_SLASHES_RE.is_match(input) {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(format!("{default_protocol}:{input}"))
    };

    let mut u = Url::parse(&prefixed).map_err(|source| NormalizeError::InvalidUrl {
        subject_url: input.to_string(),
        source,
    })?;

    if options.force_http && u.scheme() == "https" {
        u.set_scheme("http").ok();
    }
    if options.force_https && u.scheme() == "http" {
        u.set_scheme("https").ok();
    }

    if options.strip_authentication {
        u.set_username("").ok();
        u.set_password(None).ok();
    }

    if options.strip_hash {
        u.set_fragment(None);
    } else if options.strip_text_fragment
        && let Some(fragment) = u.fragment().map(str::to_string)
    {
        let stripped = TEXT_FRAGMENT_RE.replace(&fragment, "");
        let stripped = stripped.strip_prefix('#').unwrap_or(&stripped);
        u.set_fragment((!stripped.is_empty()).then_some(stripped));
    }

    if !u.cannot_be_a_base() {
        let collapsed = collapse_slashes(u.path());
        u.set_path(&collapsed);
        remove_directory_index(&mut u, &options.remove_directory_index)?;
    }

    clean_host(&mut u, options.strip_www);
    filter_query(&mut u, options)?;

    if options.remove_trailing_slash && !u.cannot_be_a_base() {
        let path = u.path().to_string();
        if let Some(trimmed) = path.strip_suffix('/') {
            u.set_path(trimmed);
        }
    }

    if options.remove_explicit_port {
        u.set_port(None).ok();
    }

    let mut normalized = u.to_string();

    if (options.remove_trailing_slash || u.path() == "/")
        && u.fragment().is_none()
        && options.remove_single_slash
        && let Some(trimmed) = normalized.strip_suffix('/')
    {
        normalized = trimmed.to_string();
    }

    if has_relative_protocol
        && !options.normalize_protocol
        && let Some(rest) = normalized.strip_prefix("http://")
    {
        normalized = format!("//{rest}");
    }

    if options.strip_protocol {
        normalized = STRIP_PROTOCOL_RE.replace(&normalized, "").into_owned();
    }

    Ok(normalized)
}

fn has_custom_protocol(input: &str) -> bool {
    Url::parse(input).is_ok_and(|u| {
        let scheme = u.scheme();
        scheme.contains('.') && !SUPPORTED_PROTOCOLS.contains(&scheme)
    })
}

/// Collapse runs of `/` in a path, leaving embedded `scheme://` intact.
fn collapse_slashes(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    let mut last = 0;
    for m in EMBEDDED_PROTOCOL_RE.find_iter(path) {
        result.push_str(&REPEATED_SLASHES_RE.replace_all(&path[last..m.start()], "/"));
        result.push_str(m.as_str());
        last = m.end();
    }
    result.push_str(&REPEATED_SLASHES_RE.replace_all(&path[last..], "/"));
    result
}

fn remove_directory_index(u: &mut Url, filters: &[ParamFilter]) -> Result<(), NormalizeError> {
    if filters.is_empty() {
        return Ok(());
    }
    let compiled = compile_all(filters)?;
    let components: Vec<&str> = u.path().split('/').collect();
    let Some((last, rest)) = components.split_last() else {
        return Ok(());
    };
    if any_match(&compiled, last) {
        let kept = rest.get(1..).unwrap_or_default().join("/");
        let path = format!("{kept}/");
        u.set_path(&path);
    }
    Ok(())
}

fn clean_host(u: &mut Url, strip_www: bool) {
    let Some(host) = u.host_str() else {
        return;
    };
    let mut cleaned = host.strip_suffix('.').unwrap_or(host).to_string();
    if strip_www
        && let Some(bare) = cleaned.strip_prefix("www.")
        && !bare.starts_with("www.")
        && WWW_HOST_RE.is_match(bare)
    {
        cleaned = bare.to_string();
    }
    if cleaned != host {
        u.set_host(Some(&cleaned)).ok();
    }
}

fn filter_query(u: &mut Url, options: &NormalizeOptions) -> Result<(), NormalizeError> {
    if u.query().is_none() {
        return Ok(());
    }

    let keep = options
        .keep_query_parameters
        .as_deref()
        .map(compile_all)
        .transpose()?;
    let remove = match &options.remove_query_parameters {
        QueryRemoval::Matching(filters) => Some(compile_all(filters)?),
        QueryRemoval::None | QueryRemoval::All => None,
    };

    let mut pairs: Vec<(String, String)> = u
        .query_pairs()
        .into_owned()
        .filter(|(key, _)| {
            if keep.as_ref().is_some_and(|keep| any_match(keep, key)) {
                return true;
            }
            match &options.remove_query_parameters {
                QueryRemoval::All => false,
                QueryRemoval::Matching(_) => {
                    !remove.as_ref().is_some_and(|remove| any_match(remove, key))
                        && keep.is_none()
                }
                QueryRemoval::None => keep.is_none(),
            }
        })
        .collect();

    if options.sort_query_parameters {
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
    }

    if pairs.is_empty() {
        u.set_query(None);
        return Ok(());
    }

    u.query_pairs_mut().clear().extend_pairs(&pairs);

    if options.sort_query_parameters
        && let Some(query) = u.query().map(str::to_string)
        && let Ok(decoded) = urlencoding::decode(&query)
    {
        u.set_query(Some(decoded.as_ref()));
    }
    Ok(())
}

fn normalize_data_url(input: &str, strip_hash: bool) -> Result<String, NormalizeError> {
    let caps = DATA_URL_RE
        .captures(input)
        .ok_or_else(|| NormalizeError::InvalidDataUrl {
            subject_url: input.to_string(),
        })?;

    let media_type = caps.name("type").map_or("", |m| m.as_str());
    let data = caps.name("data").map_or("", |m| m.as_str());
    let hash = if strip_hash {
        ""
    } else {
        caps.name("hash").map_or("", |m| m.as_str())
    };

    let mut parts: Vec<&str> = media_type.split(';').collect();
    let is_base64 = parts.last() == Some(&"base64");
    if is_base64 {
        parts.pop();
    }

    let mime_type = if parts.is_empty() {
        String::new()
    } else {
        parts.remove(0).to_lowercase()
    };

    let mut normalized_media_type: Vec<String> = parts
        .into_iter()
        .filter_map(|attribute| {
            let (key, value) = attribute.split_once('=').unwrap_or((attribute, ""));
            let key = key.trim();
            let mut value = value.trim().to_string();
            if key == "charset" {
                value = value.to_lowercase();
                if value == DATA_URL_DEFAULT_CHARSET {
                    return None;
                }
            }
            let rendered = if value.is_empty() {
                key.to_string()
            } else {
                format!("{key}={value}")
            };
            (!rendered.is_empty()).then_some(rendered)
        })
        .collect();

    if is_base64 {
        normalized_media_type.push("base64".to_string());
    }

    if !normalized_media_type.is_empty()
        || (!mime_type.is_empty() && mime_type != DATA_URL_DEFAULT_MIME_TYPE)
    {
        normalized_media_type.insert(0, mime_type);
    }

    let data = if is_base64 { data.trim() } else { data };
    let hash = if hash.is_empty() {
        String::new()
    } else {
        format!("#{hash}")
    };

    Ok(format!(
        "data:{},{data}{hash}",
        normalized_media_type.join(";")
    ))
}
