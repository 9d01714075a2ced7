//! Resolved pairs and the per-strategy indices that produce them.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::document::{Document, WeakDocument};
use crate::panel::{Panel, WeakPanel};

/// A resolved pairing: the counterpart document and the panel it is
/// shown in.
///
/// "No link" is `Option::<Link>::None`; a link is never half-populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub document: Document,
    pub panel: Panel,
}

/// Back-reference to the most recent `(document, panel)` observed under
/// one key.
#[derive(Debug, Clone)]
pub(crate) struct PendingLink {
    document: WeakDocument,
    panel: WeakPanel,
}

impl PendingLink {
    fn upgrade(&self) -> Option<Link> {
        Some(Link {
            document: self.document.upgrade()?,
            panel: self.panel.upgrade()?,
        })
    }
}

type Entries = RefCell<HashMap<String, PendingLink>>;

/// Key → [`PendingLink`] map owned by one strategy.
///
/// Entries are last-write-wins and removed by disposal hooks registered at
/// insertion time. A hook only removes the entry while it still belongs to
/// the disposing document (or panel), so a newer observation under the
/// same key survives an older owner's disposal.
#[derive(Debug, Clone, Default)]
pub(crate) struct LinkIndex {
    entries: Rc<Entries>,
}

impl LinkIndex {
    /// Upsert `key → (document, panel)`.
    ///
    /// With `watch_panel`, disposing the panel removes the entry too.
    /// Entries whose document was dropped without disposal are pruned here.
    pub(crate) fn insert(&self, key: String, document: &Document, panel: &Panel, watch_panel: bool) {
        let pending = PendingLink {
            document: document.downgrade(),
            panel: panel.downgrade(),
        };
        // The borrow must end before hooks are registered: a hook on an
        // already-disposed document runs immediately.
        let previous = {
            let mut entries = self.entries.borrow_mut();
            entries.retain(|_, p| p.document.upgrade().is_some());
            entries.insert(key.clone(), pending)
        };
        // A hook from the previous observation still covers the same owner.
        let hooked_document = previous
            .as_ref()
            .is_some_and(|p| p.document.id() == document.id());
        let hooked_panel = previous.as_ref().is_some_and(|p| p.panel.id() == panel.id());

        let entries = Rc::downgrade(&self.entries);
        if watch_panel && !hooked_panel {
            let panel_id = panel.id();
            let entries = Weak::clone(&entries);
            let key = key.clone();
            panel.on_dispose(move || {
                remove_owned(&entries, &key, |p| p.panel.id() == panel_id);
            });
        }
        if !hooked_document {
            let document_id = document.id();
            document.on_dispose(move || {
                remove_owned(&entries, &key, |p| p.document.id() == document_id);
            });
        }
    }

    /// The live link stored under `key`.
    pub(crate) fn get(&self, key: &str) -> Option<Link> {
        self.entries.borrow().get(key).and_then(PendingLink::upgrade)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

fn remove_owned(entries: &Weak<Entries>, key: &str, owned: impl Fn(&PendingLink) -> bool) {
    let Some(entries) = entries.upgrade() else {
        return;
    };
    let mut entries = entries.borrow_mut();
    if entries.get(key).is_some_and(owned) {
        entries.remove(key);
    }
}
