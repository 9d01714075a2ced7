//! Local file ↔ derived view, by absolute or repo-relative path.
//!
//! Only local files are indexed. VCS objects and extension cache files
//! are always the side doing the pointing, never the side pointed at.

use std::rc::Rc;
use std::time::Duration;

use super::{LinkStrategy, settle};
use crate::address::{Address, Scheme};
use crate::classify::Classifier;
use crate::config::LinkerConfig;
use crate::document::Document;
use crate::link::{Link, LinkIndex};
use crate::panel::Panel;

/// Default strategy over the absolute-path and repo-relative-path indices.
///
/// Clones share the same indices, which lets the registry consult them
/// directly in its fallback chain.
#[derive(Debug, Clone)]
pub struct PathStrategy {
    delay: Duration,
    classifier: Rc<Classifier>,
    by_path: LinkIndex,
    by_relative_path: LinkIndex,
}

impl PathStrategy {
    #[must_use]
    pub fn new(config: &LinkerConfig, classifier: Rc<Classifier>) -> Self {
        Self {
            delay: config.observation_delay(),
            classifier,
            by_path: LinkIndex::default(),
            by_relative_path: LinkIndex::default(),
        }
    }

    /// Read the indices for `address` without waiting.
    ///
    /// VCS objects resolve by absolute path at any ref. Other derived
    /// views resolve by repo-relative path. Local files never resolve.
    #[must_use]
    pub fn resolve(&self, address: &Address) -> Option<Link> {
        match address.scheme() {
            Scheme::LocalFile => None,
            Scheme::VcsObject => self.by_path.get(address.path()),
            Scheme::RemoteTempCache | Scheme::VirtualFs => {
                let relative = self.classifier.repo_relative_path(address)?;
                self.by_relative_path.get(&relative)
            }
        }
    }

    /// Number of indexed absolute paths.
    #[must_use]
    pub fn indexed_paths(&self) -> usize {
        self.by_path.len()
    }
}

impl LinkStrategy for PathStrategy {
    fn observe(&self, document: &Document, panel: &Panel) {
        let address = document.address();
        if address.scheme() != Scheme::LocalFile {
            return;
        }
        tracing::trace!(strategy = "path", key = address.path(), "indexing document");
        self.by_path
            .insert(address.path().to_string(), document, panel, false);
        if let Some(relative) = self.classifier.repo_relative_path(address) {
            tracing::trace!(strategy = "path", key = %relative, "indexing repo-relative path");
            self.by_relative_path.insert(relative, document, panel, false);
        }
    }

    async fn lookup(&self, document: &Document) -> Option<Link> {
        settle(self.delay).await;
        self.resolve(document.address())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::classify::WorkspaceRoots;

    fn strategy() -> PathStrategy {
        let config = LinkerConfig::default();
        let classifier = Classifier::new(
            Rc::new(WorkspaceRoots::new(["/home/user/repo"])),
            config.temp_cache_layout(),
        );
        PathStrategy::new(&config, Rc::new(classifier))
    }

    fn doc(uri: &str) -> Document {
        Document::from_bytes(Address::parse(uri).unwrap(), Vec::new())
    }

    #[tokio::test(start_paused = true)]
    async fn vcs_object_finds_file_at_same_path() {
        let strategy = strategy();
        let file = doc("file:///home/user/repo/image.png");
        let panel = Panel::new("image.png");
        strategy.observe(&file, &panel);

        let head = doc(r#"git:/home/user/repo/image.png?{"path":"/home/user/repo/image.png","ref":"~"}"#);
        let link = strategy.lookup(&head).await.unwrap();
        assert_eq!(link.document, file);
        assert_eq!(link.panel, panel);
    }

    #[tokio::test(start_paused = true)]
    async fn cache_copy_finds_file_by_repo_relative_path() {
        let strategy = strategy();
        let file = doc("file:///home/user/repo/assets/image.png");
        let panel = Panel::new("image.png");
        strategy.observe(&file, &panel);

        let cached = doc(
            "vscode-userdata:/User/globalStorage/github.vscode-pull-request-github/temp/repo/assets/image.png",
        );
        assert_eq!(strategy.lookup(&cached).await.unwrap().document, file);
    }

    #[test]
    fn only_local_files_are_indexed() {
        let strategy = strategy();
        strategy.observe(
            &doc(r#"git:/home/user/repo/image.png?{"ref":"HEAD"}"#),
            &Panel::new("image.png"),
        );
        assert_eq!(strategy.indexed_paths(), 0);
    }

    #[test]
    fn local_files_never_resolve() {
        let strategy = strategy();
        let file = doc("file:///home/user/repo/image.png");
        strategy.observe(&file, &Panel::new("image.png"));
        assert!(strategy.resolve(file.address()).is_none());
    }

    #[test]
    fn clones_share_indices() {
        let strategy = strategy();
        let shared = strategy.clone();
        let file = doc("file:///home/user/repo/image.png");
        strategy.observe(&file, &Panel::new("image.png"));
        assert_eq!(shared.indexed_paths(), 1);
        file.dispose();
        assert_eq!(shared.indexed_paths(), 0);
    }
}
