//! imgdiff-link: pairs independently opened image documents.
//!
//! The host opens two renditions of the same image (a working file and a
//! VCS object, a virtual-fs file and an extension cache copy, ...) in any
//! order and through different addressing schemes. This crate decides
//! which documents belong together:
//!
//! observe_open -> every strategy indexes the document -> find_link
//! races all strategies -> first match in registration order, else the
//! path fallback.
//!
//! Everything runs on a single thread; documents and panels are `Rc`
//! handles and indices hold only weak back-references that disposal
//! clears. [`diff_documents`] hands a resolved pair to `imgdiff-engine`.

// Documents are `Rc` handles; every future here is single-threaded.
#![allow(clippy::future_not_send)]

pub mod address;
pub mod classify;
pub mod compare;
pub mod config;
pub mod document;
pub mod history;
mod lifecycle;
pub mod link;
pub mod panel;
pub mod registry;
pub mod strategy;

pub use address::{Address, AddressError, Scheme};
pub use classify::{Classifier, STAGED_REF, TempCacheLayout, VcsQuery, Workspace, WorkspaceRoots};
pub use compare::diff_documents;
pub use config::LinkerConfig;
pub use document::{ByteSource, Document, DocumentId, WeakDocument};
pub use history::OpeningHistory;
pub use link::Link;
pub use panel::{Panel, PanelId, WeakPanel};
pub use registry::PairingRegistry;
pub use strategy::{LinkStrategy, Strategy, StrategyKind};
