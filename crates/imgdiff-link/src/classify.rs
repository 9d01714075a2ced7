//! Address classification and identity-key extraction.
//!
//! Pure, synchronous helpers that the pairing strategies use to decide
//! whether an address applies to them and which key it is filed under:
//! absolute path, repo-relative path, VCS ref, or filename.
//!
//! Nothing here fails loudly. An address that cannot be classified for a
//! purpose simply yields `None`/`false` and the caller moves on.

use std::rc::Rc;

use serde::Deserialize;

use crate::address::{Address, Scheme};
use crate::config::LinkerConfig;

/// The VCS ref that denotes the index (staged content) in a
/// working-tree-vs-index comparison.
pub const STAGED_REF: &str = "";

/// Parsed query payload of a [`Scheme::VcsObject`] address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VcsQuery {
    /// The ref the object was read at (`"HEAD"`, `"~"`, a commit, or
    /// [`STAGED_REF`]).
    #[serde(rename = "ref")]
    pub reference: String,
    /// The path the host recorded for the object, if present.
    #[serde(default)]
    pub path: Option<String>,
}

/// The category of `address`.
#[must_use]
pub const fn classify(address: &Address) -> Scheme {
    address.scheme()
}

/// Parse a VCS query payload.
///
/// The payload is a JSON object carrying at least a string `ref`.
/// Anything else (malformed JSON, no `ref`, non-string `ref`) is not a
/// recognized VCS reference and yields `None`.
#[must_use]
pub fn parse_vcs_query(query: &str) -> Option<VcsQuery> {
    let value: serde_json::Value = serde_json::from_str(query).ok()?;
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}

/// The parsed VCS query of `address`, if it is a VCS object with a
/// recognizable query.
#[must_use]
pub fn vcs_query(address: &Address) -> Option<VcsQuery> {
    if address.scheme() != Scheme::VcsObject {
        return None;
    }
    address.query().and_then(parse_vcs_query)
}

/// Whether `reference` is the staged sentinel.
#[must_use]
pub fn is_staged_reference(reference: &str) -> bool {
    reference == STAGED_REF
}

/// Whether `address` is a VCS object read from the index.
#[must_use]
pub fn is_staged(address: &Address) -> bool {
    vcs_query(address).is_some_and(|q| is_staged_reference(&q.reference))
}

/// Repo path of a virtual-fs address: `/<owner>/<repo>/<rel>` becomes
/// `<repo>/<rel>`.
#[must_use]
pub fn virtual_fs_repo_path(address: &Address) -> Option<String> {
    if address.scheme() != Scheme::VirtualFs {
        return None;
    }
    let rest: Vec<&str> = address.segments().skip(1).collect();
    (!rest.is_empty()).then(|| rest.join("/"))
}

/// Layout of an extension's temp storage:
/// `.../<marker>/<temp>/<repo>/<relative-path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempCacheLayout {
    marker: String,
    temp_segment: String,
}

impl TempCacheLayout {
    /// Create a layout keyed on the given storage marker and temp
    /// directory name.
    #[must_use]
    pub fn new(marker: impl Into<String>, temp_segment: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            temp_segment: temp_segment.into(),
        }
    }

    /// Segments after `<marker>/<temp>/`, or `None` if `address` is not
    /// laid out this way.
    fn cache_segments<'a>(&self, address: &'a Address) -> Option<Vec<&'a str>> {
        if address.scheme() != Scheme::RemoteTempCache {
            return None;
        }
        let segments: Vec<&str> = address.segments().collect();
        let marker_at = segments.iter().position(|s| *s == self.marker)?;
        if segments.get(marker_at + 1) != Some(&self.temp_segment.as_str()) {
            return None;
        }
        Some(segments[marker_at + 2..].to_vec())
    }

    /// Whether `address` lives in this extension's temp storage.
    #[must_use]
    pub fn is_cache_address(&self, address: &Address) -> bool {
        self.cache_segments(address).is_some()
    }

    /// `<repo>/<relative-path>` for a cache address.
    #[must_use]
    pub fn repo_qualified_path(&self, address: &Address) -> Option<String> {
        let segments = self.cache_segments(address)?;
        (segments.len() >= 2).then(|| segments.join("/"))
    }

    /// `<relative-path>` for a cache address (the repo folder stripped).
    #[must_use]
    pub fn repo_relative_path(&self, address: &Address) -> Option<String> {
        let segments = self.cache_segments(address)?;
        (segments.len() >= 2).then(|| segments[1..].join("/"))
    }
}

impl Default for TempCacheLayout {
    fn default() -> Self {
        Self::new(
            LinkerConfig::DEFAULT_EXTENSION_STORAGE_MARKER,
            LinkerConfig::DEFAULT_TEMP_SEGMENT,
        )
    }
}

/// Host workspace roots, used to compute repo-relative paths of local
/// files.
pub trait Workspace {
    /// The workspace root containing `address`, if any.
    fn root_for(&self, address: &Address) -> Option<String>;

    /// Path of `address` relative to `root`.
    fn relativize(&self, root: &str, address: &Address) -> String;
}

/// A fixed list of workspace root paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceRoots {
    roots: Vec<String>,
}

impl WorkspaceRoots {
    /// Create from root paths. Trailing slashes are ignored.
    #[must_use]
    pub fn new<I, S>(roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roots: roots
                .into_iter()
                .map(|r| r.into().trim_end_matches('/').to_string())
                .collect(),
        }
    }
}

impl Workspace for WorkspaceRoots {
    fn root_for(&self, address: &Address) -> Option<String> {
        if address.scheme() != Scheme::LocalFile {
            return None;
        }
        let path = address.path();
        self.roots
            .iter()
            .filter(|root| {
                path.strip_prefix(root.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
            })
            .max_by_key(|root| root.len())
            .cloned()
    }

    fn relativize(&self, root: &str, address: &Address) -> String {
        let path = address.path();
        path.strip_prefix(root)
            .map_or(path, |rest| rest.trim_start_matches('/'))
            .to_string()
    }
}

/// Bundles the host collaborators needed to derive identity keys.
pub struct Classifier {
    workspace: Rc<dyn Workspace>,
    layout: TempCacheLayout,
}

impl Classifier {
    /// Create a classifier over the given workspace and cache layout.
    #[must_use]
    pub fn new(workspace: Rc<dyn Workspace>, layout: TempCacheLayout) -> Self {
        Self { workspace, layout }
    }

    /// The extension temp-storage layout.
    #[must_use]
    pub const fn layout(&self) -> &TempCacheLayout {
        &self.layout
    }

    /// Repo-relative path of `address`.
    ///
    /// Local files inside a workspace root are relativized against it;
    /// extension cache files have everything through the repo folder
    /// stripped. Other addresses have no repo-relative path.
    #[must_use]
    pub fn repo_relative_path(&self, address: &Address) -> Option<String> {
        match address.scheme() {
            Scheme::LocalFile => {
                let root = self.workspace.root_for(address)?;
                Some(self.workspace.relativize(&root, address))
            }
            Scheme::RemoteTempCache => self.layout.repo_relative_path(address),
            Scheme::VcsObject | Scheme::VirtualFs => None,
        }
    }

    /// Whether `address` is a derived view (a VCS object or an extension
    /// cache file) rather than the file it was derived from.
    #[must_use]
    pub fn is_derived_view(&self, address: &Address) -> bool {
        match address.scheme() {
            Scheme::VcsObject => true,
            Scheme::RemoteTempCache => self.layout.is_cache_address(address),
            Scheme::LocalFile | Scheme::VirtualFs => false,
        }
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CACHE: &str =
        "vscode-userdata:/User/globalStorage/github.vscode-pull-request-github/temp/repo/assets/image.png";

    fn classifier(roots: &[&str]) -> Classifier {
        Classifier::new(
            Rc::new(WorkspaceRoots::new(roots.iter().copied())),
            TempCacheLayout::default(),
        )
    }

    #[test]
    fn classify_follows_scheme_tag() {
        for scheme in Scheme::ALL {
            assert_eq!(classify(&Address::new(scheme, "/a")), scheme);
        }
    }

    #[test]
    fn parse_vcs_query_accepts_ref_objects() {
        let q = parse_vcs_query(r#"{"path":"/repo/img.png","ref":"HEAD"}"#).unwrap();
        assert_eq!(q.reference, "HEAD");
        assert_eq!(q.path.as_deref(), Some("/repo/img.png"));
        let q = parse_vcs_query(r#"{"ref":""}"#).unwrap();
        assert!(is_staged_reference(&q.reference));
    }

    #[test]
    fn parse_vcs_query_rejects_malformed_payloads() {
        assert!(parse_vcs_query("not json").is_none());
        assert!(parse_vcs_query(r#"{"path":"/a"}"#).is_none());
        assert!(parse_vcs_query(r#"{"ref":3}"#).is_none());
        assert!(parse_vcs_query(r#"["ref"]"#).is_none());
    }

    #[test]
    fn is_staged_requires_vcs_scheme_and_sentinel() {
        let staged = Address::new(Scheme::VcsObject, "/a.png").with_query(r#"{"ref":""}"#);
        let head = Address::new(Scheme::VcsObject, "/a.png").with_query(r#"{"ref":"HEAD"}"#);
        let bare = Address::new(Scheme::VcsObject, "/a.png");
        let file = Address::file("/a.png").with_query(r#"{"ref":""}"#);
        assert!(is_staged(&staged));
        assert!(!is_staged(&head));
        assert!(!is_staged(&bare));
        assert!(!is_staged(&file));
    }

    #[test]
    fn virtual_fs_repo_path_drops_owner() {
        let address = Address::parse("vscode-vfs://github/uname/repo/image.png").unwrap();
        assert_eq!(
            virtual_fs_repo_path(&address).as_deref(),
            Some("repo/image.png")
        );
        assert!(virtual_fs_repo_path(&Address::new(Scheme::VirtualFs, "/uname")).is_none());
        assert!(virtual_fs_repo_path(&Address::file("/uname/repo/image.png")).is_none());
    }

    #[test]
    fn cache_layout_extracts_paths() {
        let layout = TempCacheLayout::default();
        let address = Address::parse(CACHE).unwrap();
        assert!(layout.is_cache_address(&address));
        assert_eq!(
            layout.repo_qualified_path(&address).as_deref(),
            Some("repo/assets/image.png")
        );
        assert_eq!(
            layout.repo_relative_path(&address).as_deref(),
            Some("assets/image.png")
        );
    }

    #[test]
    fn cache_layout_rejects_other_userdata_paths() {
        let layout = TempCacheLayout::default();
        let settings = Address::parse("vscode-userdata:/User/settings.json").unwrap();
        assert!(!layout.is_cache_address(&settings));
        let no_temp = Address::new(
            Scheme::RemoteTempCache,
            "/User/globalStorage/github.vscode-pull-request-github/other/repo/a.png",
        );
        assert!(layout.repo_relative_path(&no_temp).is_none());
        let repo_only = Address::new(
            Scheme::RemoteTempCache,
            "/x/github.vscode-pull-request-github/temp/repo",
        );
        assert!(layout.repo_relative_path(&repo_only).is_none());
    }

    #[test]
    fn workspace_roots_pick_longest_match() {
        let roots = WorkspaceRoots::new(["/home/u/repo", "/home/u/repo/sub/"]);
        let address = Address::file("/home/u/repo/sub/img.png");
        assert_eq!(roots.root_for(&address).as_deref(), Some("/home/u/repo/sub"));
        assert_eq!(roots.relativize("/home/u/repo/sub", &address), "img.png");
    }

    #[test]
    fn workspace_roots_require_segment_boundary() {
        let roots = WorkspaceRoots::new(["/home/u/repo"]);
        assert!(roots.root_for(&Address::file("/home/u/repository/a.png")).is_none());
        assert!(roots.root_for(&Address::file("/home/u/repo")).is_none());
    }

    #[test]
    fn repo_relative_path_per_scheme() {
        let c = classifier(&["/home/u/repo"]);
        assert_eq!(
            c.repo_relative_path(&Address::file("/home/u/repo/assets/image.png"))
                .as_deref(),
            Some("assets/image.png")
        );
        assert!(c.repo_relative_path(&Address::file("/elsewhere/image.png")).is_none());
        assert_eq!(
            c.repo_relative_path(&Address::parse(CACHE).unwrap()).as_deref(),
            Some("assets/image.png")
        );
        let vcs = Address::new(Scheme::VcsObject, "/home/u/repo/assets/image.png");
        assert!(c.repo_relative_path(&vcs).is_none());
    }

    #[test]
    fn derived_views() {
        let c = classifier(&[]);
        assert!(c.is_derived_view(&Address::new(Scheme::VcsObject, "/a.png")));
        assert!(c.is_derived_view(&Address::parse(CACHE).unwrap()));
        assert!(!c.is_derived_view(&Address::parse("vscode-userdata:/User/a.png").unwrap()));
        assert!(!c.is_derived_view(&Address::file("/a.png")));
    }
}
