//! Non-staged VCS object ↔ staged VCS object, by path.
//!
//! In a working-tree-vs-index comparison the host opens the staged blob
//! (ref [`STAGED_REF`](crate::classify::STAGED_REF)) and the other side
//! either as a VCS object at a different ref or as the plain file. Both
//! carry the same path.

use std::time::Duration;

use super::{LinkStrategy, settle};
use crate::address::Scheme;
use crate::classify::is_staged;
use crate::config::LinkerConfig;
use crate::document::Document;
use crate::link::{Link, LinkIndex};
use crate::panel::Panel;

/// Indexes staged VCS objects, resolves non-staged ones and local files.
#[derive(Debug)]
pub struct StagedVcsStrategy {
    delay: Duration,
    index: LinkIndex,
}

impl StagedVcsStrategy {
    #[must_use]
    pub fn new(config: &LinkerConfig) -> Self {
        Self {
            delay: config.observation_delay(),
            index: LinkIndex::default(),
        }
    }
}

impl LinkStrategy for StagedVcsStrategy {
    fn observe(&self, document: &Document, panel: &Panel) {
        let address = document.address();
        if !is_staged(address) || address.path().is_empty() {
            return;
        }
        tracing::trace!(strategy = "staged-vcs", key = address.path(), "indexing document");
        self.index.insert(address.path().to_string(), document, panel, false);
    }

    async fn lookup(&self, document: &Document) -> Option<Link> {
        settle(self.delay).await;
        let address = document.address();
        match address.scheme() {
            // An unparseable query is not staged.
            Scheme::VcsObject if is_staged(address) => None,
            Scheme::VcsObject | Scheme::LocalFile => self.index.get(address.path()),
            Scheme::RemoteTempCache | Scheme::VirtualFs => None,
        }
    }
}
