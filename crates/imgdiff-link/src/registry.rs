//! The pairing registry: fans observations out to every strategy and
//! races lookups across them.

use std::rc::Rc;

use futures_util::future::join_all;

use crate::address::Scheme;
use crate::classify::{Classifier, Workspace, is_staged};
use crate::config::LinkerConfig;
use crate::document::Document;
use crate::history::OpeningHistory;
use crate::link::Link;
use crate::panel::Panel;
use crate::strategy::{
    LinkStrategy, PathStrategy, RemoteExtensionStrategy, StagedVcsStrategy, Strategy,
    StrategyKind, VirtualFsStrategy,
};

/// Owns the ordered strategy set and the recency tracker.
///
/// All state is in memory and holds only back-references: dropping or
/// disposing a document removes it from every index.
#[derive(Debug)]
pub struct PairingRegistry {
    strategies: Vec<Strategy>,
    path: PathStrategy,
    classifier: Rc<Classifier>,
    history: OpeningHistory,
}

impl PairingRegistry {
    /// Create a registry with every strategy, in registration order.
    #[must_use]
    pub fn new(config: &LinkerConfig, workspace: Rc<dyn Workspace>) -> Self {
        let classifier = Rc::new(Classifier::new(workspace, config.temp_cache_layout()));
        let path = PathStrategy::new(config, Rc::clone(&classifier));
        let strategies = StrategyKind::ALL
            .into_iter()
            .map(|kind| match kind {
                StrategyKind::VirtualFs => Strategy::VirtualFs(VirtualFsStrategy::new(config)),
                StrategyKind::StagedVcs => Strategy::StagedVcs(StagedVcsStrategy::new(config)),
                StrategyKind::RemoteExtension => {
                    Strategy::RemoteExtension(RemoteExtensionStrategy::new(config))
                }
                StrategyKind::Path => Strategy::Path(path.clone()),
            })
            .collect();

        Self {
            strategies,
            path,
            classifier,
            history: OpeningHistory::new(config.history_capacity),
        }
    }

    /// Register a newly opened `(document, panel)` with every strategy and
    /// the recency tracker.
    ///
    /// Must complete before [`find_link`](Self::find_link) is called for
    /// the same document.
    pub fn observe_open(&self, document: &Document, panel: &Panel) {
        tracing::debug!(
            document = %document.address(),
            panel = panel.title(),
            "document opened",
        );
        for strategy in &self.strategies {
            strategy.observe(document, panel);
        }
        self.history.record(document, panel);
    }

    /// Find the counterpart of `document`.
    ///
    /// Every strategy is queried concurrently; the first match in
    /// registration order wins. Without a strategy match, local files and
    /// staged VCS objects resolve to nothing and every other address is
    /// checked against the path indices.
    pub async fn find_link(&self, document: &Document) -> Option<Link> {
        let results = join_all(self.strategies.iter().map(|s| s.lookup(document))).await;
        let matched = self
            .strategies
            .iter()
            .zip(results)
            .find_map(|(strategy, link)| link.map(|link| (strategy.kind(), link)));
        if let Some((kind, link)) = matched {
            tracing::debug!(
                document = %document.address(),
                counterpart = %link.document.address(),
                strategy = %kind,
                "link resolved",
            );
            return Some(link);
        }

        let address = document.address();
        let fallback = match address.scheme() {
            Scheme::LocalFile => None,
            Scheme::VcsObject if is_staged(address) => None,
            Scheme::VcsObject | Scheme::RemoteTempCache | Scheme::VirtualFs => {
                self.path.resolve(address)
            }
        };
        match &fallback {
            Some(link) => tracing::debug!(
                document = %address,
                counterpart = %link.document.address(),
                "link resolved from path index",
            ),
            None => tracing::debug!(document = %address, "no link"),
        }
        fallback
    }

    /// The recency tracker fed by [`observe_open`](Self::observe_open).
    #[must_use]
    pub const fn history(&self) -> &OpeningHistory {
        &self.history
    }

    /// The classifier strategies derive their keys with.
    #[must_use]
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Strategy kinds in registration order.
    pub fn strategy_kinds(&self) -> impl Iterator<Item = StrategyKind> + '_ {
        self.strategies.iter().map(Strategy::kind)
    }
}
