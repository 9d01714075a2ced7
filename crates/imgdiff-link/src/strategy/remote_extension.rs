//! Local file ↔ extension temp cache, by filename.
//!
//! The pull-request extension's cache layout does not reliably preserve
//! the repo-relative structure, so only the last path segment is
//! compared.

use std::time::Duration;

use super::{LinkStrategy, settle};
use crate::address::Scheme;
use crate::config::LinkerConfig;
use crate::document::Document;
use crate::link::{Link, LinkIndex};
use crate::panel::Panel;

/// Indexes local files by filename, resolves remote temp-cache documents.
#[derive(Debug)]
pub struct RemoteExtensionStrategy {
    delay: Duration,
    index: LinkIndex,
}

impl RemoteExtensionStrategy {
    #[must_use]
    pub fn new(config: &LinkerConfig) -> Self {
        Self {
            delay: config.observation_delay(),
            index: LinkIndex::default(),
        }
    }
}

impl LinkStrategy for RemoteExtensionStrategy {
    fn observe(&self, document: &Document, panel: &Panel) {
        let address = document.address();
        if address.scheme() != Scheme::LocalFile {
            return;
        }
        let Some(file_name) = address.file_name() else {
            return;
        };
        tracing::trace!(strategy = "remote-extension", key = file_name, "indexing document");
        self.index.insert(file_name.to_string(), document, panel, true);
    }

    async fn lookup(&self, document: &Document) -> Option<Link> {
        settle(self.delay).await;
        let address = document.address();
        if address.scheme() != Scheme::RemoteTempCache {
            return None;
        }
        self.index.get(address.file_name()?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::address::Address;

    fn doc(uri: &str) -> Document {
        Document::from_bytes(Address::parse(uri).unwrap(), Vec::new())
    }

    #[tokio::test(start_paused = true)]
    async fn matches_on_filename_only() {
        let strategy = RemoteExtensionStrategy::new(&LinkerConfig::default());
        let local = doc("file:///home/uname/unshared/shared/filename.png");
        let panel = Panel::new("filename.png");
        strategy.observe(&local, &panel);

        let cached = doc(
            "vscode-userdata:/home/uname/.config/Code/User/globalStorage/github.vscode-pull-request-github/temp/elsewhere/filename.png",
        );
        assert_eq!(strategy.lookup(&cached).await.unwrap().document, local);
    }

    #[tokio::test(start_paused = true)]
    async fn local_files_are_never_resolved_here() {
        let strategy = RemoteExtensionStrategy::new(&LinkerConfig::default());
        let local = doc("file:///repo/a.png");
        strategy.observe(&local, &Panel::new("a.png"));
        assert!(strategy.lookup(&doc("file:///other/a.png")).await.is_none());
    }

    #[test]
    fn directory_paths_are_not_indexed() {
        let strategy = RemoteExtensionStrategy::new(&LinkerConfig::default());
        strategy.observe(&doc("file:///repo/"), &Panel::new("repo"));
        assert!(strategy.index.is_empty());
    }
}
