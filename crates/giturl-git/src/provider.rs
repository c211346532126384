//! Provider-specific field extraction.
//!
//! Every hosting family lays out repository paths differently. The
//! family is chosen from the collapsed `source` domain, then one extraction
//! routine fills in `owner`, `name`, `organization`, `full_name`, and
//! where the shape allows it `ref` and `filepath`.

use tracing::debug;

use crate::git_url::{FilePathType, GitUrl};

/// SSH host of Visual Studio Team Services.
const VS_SSH_HOST: &str = "vs-ssh.visualstudio.com";

/// SSH host of Azure DevOps.
const AZURE_SSH_HOST: &str = "ssh.dev.azure.com";

/// Collection name that Azure DevOps Server puts in front of projects.
const DEFAULT_COLLECTION: &str = "DefaultCollection";

/// Azure query parameters carrying the file path and the version.
const AZURE_PATH_PARAM: &str = "path";
const AZURE_VERSION_PARAM: &str = "version";

/// Azure version prefix for a git branch.
const AZURE_BRANCH_PREFIX: &str = "GB";

/// A hosting family with its own path layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFamily {
    /// CloudForge (`*.git.cloudforge.com`).
    CloudForge,
    /// Visual Studio Team Services (`*.visualstudio.com`).
    VisualStudio,
    /// Azure DevOps (`dev.azure.com`, `ssh.dev.azure.com`).
    Azure,
    /// GitHub, GitLab, Bitbucket, Gitea and self-hosted instances.
    Generic,
}

impl ProviderFamily {
    /// Choose the family for a collapsed source domain.
    pub fn classify(source: &str) -> Self {
        match source {
            "git.cloudforge.com" => Self::CloudForge,
            "visualstudio.com" => Self::VisualStudio,
            "dev.azure.com" | "azure.com" => Self::Azure,
            _ => Self::Generic,
        }
    }
}

/// Whether a source domain belongs to Visual Studio or Azure DevOps.
pub fn is_azure_family(source: &str) -> bool {
    matches!(
        ProviderFamily::classify(source),
        ProviderFamily::VisualStudio | ProviderFamily::Azure
    )
}

/// Run the extraction routine for the URL's provider family.
pub(crate) fn extract<S: AsRef<str>>(url: &mut GitUrl, refs: &[S]) -> ProviderFamily {
    let family = ProviderFamily::classify(&url.source);
    debug!(source = %url.source, ?family, "extracting repository fields");

    match family {
        ProviderFamily::CloudForge => extract_cloudforge(url),
        ProviderFamily::VisualStudio | ProviderFamily::Azure => extract_azure_family(url, family),
        ProviderFamily::Generic => extract_generic(url, refs),
    }
    family
}

fn extract_cloudforge(url: &mut GitUrl) {
    url.owner.clone_from(&url.user);
    url.organization = url.resource.split('.').next().map(str::to_string);
    url.source = "cloudforge.com".to_string();
}

fn extract_azure_family(url: &mut GitUrl, family: ProviderFamily) {
    let splits: Vec<String> = url.name.split('/').map(str::to_string).collect();

    let ssh_host = match family {
        ProviderFamily::VisualStudio => VS_SSH_HOST,
        _ => AZURE_SSH_HOST,
    };

    if url.resource == ssh_host {
        // `v3/<organization>/<project>/<repo>`
        if let [_, organization, owner, name] = splits.as_slice() {
            url.organization = Some(organization.clone());
            url.owner.clone_from(owner);
            url.name.clone_from(name);
            if family == ProviderFamily::VisualStudio {
                url.full_name = format!("{owner}/{name}");
            }
            return;
        }
        if family == ProviderFamily::Azure {
            return;
        }
        // Other Visual Studio SSH shapes use the Azure web layout.
        extract_azure_web(url, &splits);
        return;
    }

    match family {
        ProviderFamily::VisualStudio => extract_visual_studio_web(url, &splits),
        _ => extract_azure_web(url, &splits),
    }
}

fn extract_visual_studio_web(url: &mut GitUrl, splits: &[String]) {
    match splits {
        [_, name] => {
            url.owner.clone_from(name);
            url.name.clone_from(name);
            url.full_name = format!("_git/{name}");
        }
        [first, _, name] => extract_collection_shape(url, first, name),
        [organization, owner, name, _] => {
            url.organization = Some(organization.clone());
            url.owner.clone_from(owner);
            url.name.clone_from(name);
            url.full_name = format!("{organization}/{owner}/_git/{name}");
        }
        _ => {}
    }
}

fn extract_azure_web(url: &mut GitUrl, splits: &[String]) {
    match splits {
        [organization, owner, _, _, name] => {
            url.organization = Some(organization.clone());
            url.owner.clone_from(owner);
            url.name.clone_from(name);
            url.full_name = format!("_git/{name}");
        }
        [first, _, name] => extract_collection_shape(url, first, name),
        [organization, owner, _, name] => {
            url.organization = Some(organization.clone());
            url.owner.clone_from(owner);
            url.name.clone_from(name);
            url.full_name = format!("{organization}/{owner}/_git/{name}");
        }
        _ => {}
    }

    if let Some(path) = url.query.get(AZURE_PATH_PARAM).filter(|p| !p.is_empty()) {
        url.filepath = path.trim_start_matches('/').to_string();
    }
    if let Some(version) = url.query.get(AZURE_VERSION_PARAM).filter(|v| !v.is_empty()) {
        url.git_ref = version
            .strip_prefix(AZURE_BRANCH_PREFIX)
            .unwrap_or(version)
            .to_string();
    }
}

/// `<collection-or-project>/_git/<repo>`
fn extract_collection_shape(url: &mut GitUrl, first: &str, name: &str) {
    url.name = name.to_string();
    url.full_name = format!("{first}/_git/{name}");
    if first == DEFAULT_COLLECTION {
        url.owner = name.to_string();
        url.organization = Some(first.to_string());
    } else {
        url.owner = first.to_string();
    }
}

/// Positions of the marker segments in a generic path, searched from the
/// third segment on.
#[derive(Debug, Default)]
struct Markers {
    dash: Option<usize>,
    blob: Option<usize>,
    tree: Option<usize>,
    commit: Option<usize>,
    issues: Option<usize>,
    src: Option<usize>,
    raw: Option<usize>,
    edit: Option<usize>,
}

impl Markers {
    fn locate(splits: &[String]) -> Self {
        let find = |marker: &str| {
            splits
                .iter()
                .skip(2)
                .position(|s| s == marker)
                .map(|pos| pos + 2)
        };
        Self {
            dash: find("-"),
            blob: find("blob"),
            tree: find("tree"),
            commit: find("commit"),
            issues: find("issues"),
            src: find("src"),
            raw: find("raw"),
            edit: find("edit"),
        }
    }

    /// Index of the repository name: the segment before the winning marker.
    ///
    /// The precedence is `-`, the earlier of `blob`/`tree` when both occur,
    /// then `blob`, `issues`, `tree`, `commit`, `src`, `raw`, `edit`. It is
    /// not a natural order (`issues` beats `tree` but not `blob`) and is
    /// kept as-is for compatibility.
    fn name_index(&self) -> Option<usize> {
        let both = self.blob.zip(self.tree).map(|(blob, tree)| blob.min(tree));
        self.dash
            .or(both)
            .or(self.blob)
            .or(self.issues)
            .or(self.tree)
            .or(self.commit)
            .or(self.src)
            .or(self.raw)
            .or(self.edit)
            .map(|marker| marker - 1)
    }
}

fn extract_generic<S: AsRef<str>>(url: &mut GitUrl, refs: &[S]) {
    let splits: Vec<String> = url.name.split('/').map(str::to_string).collect();
    let mut name_index = splits.len().saturating_sub(1);

    if splits.len() >= 2 {
        let markers = Markers::locate(&splits);
        if let Some(index) = markers.name_index() {
            name_index = index;
        }

        url.owner = splits[..name_index].join("/");
        url.name.clone_from(&splits[name_index]);

        if markers.commit.is_some() && markers.issues.is_none() {
            url.commit = splits.get(name_index + 2).cloned();
        }
    }

    url.git_ref.clear();
    url.filepathtype = None;
    url.filepath.clear();

    let offset = if splits.get(name_index + 1).is_some_and(|s| s == "-") {
        name_index + 1
    } else {
        name_index
    };

    if splits.len() > offset + 2
        && let Ok(kind) = splits[offset + 1].parse::<FilePathType>()
    {
        let (git_ref, filepath) = split_ref(&splits[offset + 2..], refs);
        url.filepathtype = Some(kind);
        url.git_ref = git_ref;
        url.filepath = filepath;
    }

    url.organization = Some(url.owner.clone());
}

/// Split the segments after a view marker into ref and file path.
///
/// The longest known ref matching the leading segments wins, so branches
/// containing `/` survive. Without a match the ref is one segment.
fn split_ref<S: AsRef<str>>(rest: &[String], refs: &[S]) -> (String, String) {
    let ref_len = refs
        .iter()
        .map(AsRef::as_ref)
        .filter(|r| !r.is_empty())
        .filter_map(|r| {
            let segments: Vec<&str> = r.split('/').collect();
            (segments.len() <= rest.len()
                && segments.iter().zip(rest).all(|(want, got)| want == got))
            .then_some(segments.len())
        })
        .max()
        .unwrap_or(1);

    (rest[..ref_len].join("/"), rest[ref_len..].join("/"))
}
