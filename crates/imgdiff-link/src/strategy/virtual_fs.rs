//! Virtual filesystem ↔ extension temp cache.
//!
//! A repository browsed through a virtual filesystem
//! (`vscode-vfs://<authority>/<owner>/<repo>/<rel>`) and the same file
//! materialized by the pull-request extension
//! (`vscode-userdata:/.../<marker>/temp/<repo>/<rel>`) share the key
//! `<repo>/<rel>`.

use std::time::Duration;

use super::{LinkStrategy, settle};
use crate::classify::{TempCacheLayout, virtual_fs_repo_path};
use crate::config::LinkerConfig;
use crate::document::Document;
use crate::link::{Link, LinkIndex};
use crate::panel::Panel;

/// Indexes virtual-fs documents, resolves extension cache documents.
#[derive(Debug)]
pub struct VirtualFsStrategy {
    delay: Duration,
    layout: TempCacheLayout,
    index: LinkIndex,
}

impl VirtualFsStrategy {
    #[must_use]
    pub fn new(config: &LinkerConfig) -> Self {
        Self {
            delay: config.observation_delay(),
            layout: config.temp_cache_layout(),
            index: LinkIndex::default(),
        }
    }
}

impl LinkStrategy for VirtualFsStrategy {
    fn observe(&self, document: &Document, panel: &Panel) {
        let Some(key) = virtual_fs_repo_path(document.address()) else {
            return;
        };
        tracing::trace!(strategy = "virtual-fs", %key, "indexing document");
        self.index.insert(key, document, panel, true);
    }

    async fn lookup(&self, document: &Document) -> Option<Link> {
        settle(self.delay).await;
        let key = self.layout.repo_qualified_path(document.address())?;
        self.index.get(&key)
    }
}
