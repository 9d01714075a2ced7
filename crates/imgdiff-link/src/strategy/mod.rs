//! Pairing strategies: one per pair of addressing schemes.
//!
//! Every strategy keeps its own index and implements [`LinkStrategy`]:
//! `observe` files an opened document under a derived key when the
//! document's address applies, and `lookup` derives the key an incoming
//! document would be filed under on the *opposite* side and reads the
//! index.
//!
//! # Observation delay
//!
//! The two sides of a pair are opened by the host in no particular order.
//! Every `lookup` therefore waits for the configured observation delay
//! before reading its index, giving the other side the chance to finish
//! its `observe`. This is best effort: under slow I/O the other side may
//! still not be registered when the delay expires.

mod path;
mod remote_extension;
mod staged_vcs;
mod virtual_fs;

use std::future::Future;
use std::time::Duration;

pub use path::PathStrategy;
pub use remote_extension::RemoteExtensionStrategy;
pub use staged_vcs::StagedVcsStrategy;
pub use virtual_fs::VirtualFsStrategy;

use crate::document::Document;
use crate::link::Link;
use crate::panel::Panel;

/// Identifies a strategy variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Virtual filesystem ↔ extension temp cache, by repo path.
    VirtualFs,
    /// Non-staged VCS object (or local file) ↔ staged VCS object, by path.
    StagedVcs,
    /// Local file ↔ extension temp cache, by filename.
    RemoteExtension,
    /// Local file ↔ derived view, by absolute or repo-relative path.
    Path,
}

impl StrategyKind {
    /// All strategies in registration order. Earlier strategies win when
    /// several resolve the same lookup.
    pub const ALL: [Self; 4] = [
        Self::VirtualFs,
        Self::StagedVcs,
        Self::RemoteExtension,
        Self::Path,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::VirtualFs => "virtual-fs",
            Self::StagedVcs => "staged-vcs",
            Self::RemoteExtension => "remote-extension",
            Self::Path => "path",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Capability shared by every pairing strategy.
pub trait LinkStrategy {
    /// File `document` under this strategy's key, if its address applies.
    ///
    /// Never fails; addresses the strategy cannot classify are ignored.
    fn observe(&self, document: &Document, panel: &Panel);

    /// Find the counterpart of `document` among observed documents.
    ///
    /// Waits for the observation delay first.
    fn lookup(&self, document: &Document) -> impl Future<Output = Option<Link>>;
}

/// A configured strategy of any kind.
#[derive(Debug)]
pub enum Strategy {
    VirtualFs(VirtualFsStrategy),
    StagedVcs(StagedVcsStrategy),
    RemoteExtension(RemoteExtensionStrategy),
    Path(PathStrategy),
}

impl Strategy {
    #[must_use]
    pub const fn kind(&self) -> StrategyKind {
        match self {
            Self::VirtualFs(_) => StrategyKind::VirtualFs,
            Self::StagedVcs(_) => StrategyKind::StagedVcs,
            Self::RemoteExtension(_) => StrategyKind::RemoteExtension,
            Self::Path(_) => StrategyKind::Path,
        }
    }
}

impl LinkStrategy for Strategy {
    fn observe(&self, document: &Document, panel: &Panel) {
        match self {
            Self::VirtualFs(s) => s.observe(document, panel),
            Self::StagedVcs(s) => s.observe(document, panel),
            Self::RemoteExtension(s) => s.observe(document, panel),
            Self::Path(s) => s.observe(document, panel),
        }
    }

    async fn lookup(&self, document: &Document) -> Option<Link> {
        match self {
            Self::VirtualFs(s) => s.lookup(document).await,
            Self::StagedVcs(s) => s.lookup(document).await,
            Self::RemoteExtension(s) => s.lookup(document).await,
            Self::Path(s) => s.lookup(document).await,
        }
    }
}

/// Wait out the observation delay.
async fn settle(delay: Duration) {
    tokio::time::sleep(delay).await;
}
