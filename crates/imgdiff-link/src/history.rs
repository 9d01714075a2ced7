//! Recency tracker for opened documents.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use crate::document::{Document, WeakDocument};
use crate::link::Link;
use crate::panel::{Panel, PanelId, WeakPanel};

#[derive(Debug, Clone)]
struct Entry {
    document: WeakDocument,
    panel: WeakPanel,
}

impl Entry {
    fn upgrade(&self) -> Option<Link> {
        Some(Link {
            document: self.document.upgrade()?,
            panel: self.panel.upgrade()?,
        })
    }
}

type Log = RefCell<VecDeque<Entry>>;

/// Bounded most-recent-first log of opened `(document, panel)` pairs.
///
/// Entries are dropped when their panel is disposed. Used to pair the two
/// most recently opened documents on request.
#[derive(Debug, Clone)]
pub struct OpeningHistory {
    capacity: usize,
    log: Rc<Log>,
}

impl OpeningHistory {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            log: Rc::default(),
        }
    }

    /// Record that `document` was opened in `panel`.
    pub fn record(&self, document: &Document, panel: &Panel) {
        let panel_id = panel.id();
        let hooked = {
            let mut log = self.log.borrow_mut();
            let hooked = log.iter().any(|entry| entry.panel.id() == panel_id);
            log.push_front(Entry {
                document: document.downgrade(),
                panel: panel.downgrade(),
            });
            log.truncate(self.capacity);
            hooked
        };

        if !hooked {
            let log = Rc::downgrade(&self.log);
            panel.on_dispose(move || forget_panel(&log, panel_id));
        }
    }

    /// Live entries, most recent first.
    #[must_use]
    pub fn entries(&self) -> Vec<Link> {
        self.log.borrow().iter().filter_map(Entry::upgrade).collect()
    }

    /// The two most recent live entries.
    #[must_use]
    pub fn last_two(&self) -> (Option<Link>, Option<Link>) {
        let log = self.log.borrow();
        let mut live = log.iter().filter_map(Entry::upgrade);
        (live.next(), live.next())
    }

    /// The two most recent live entries as `(older, newer)`, if there are
    /// two.
    #[must_use]
    pub fn last_pair(&self) -> Option<(Link, Link)> {
        match self.last_two() {
            (Some(newer), Some(older)) => Some((older, newer)),
            _ => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }
}

fn forget_panel(log: &Weak<Log>, panel: PanelId) {
    if let Some(log) = log.upgrade() {
        log.borrow_mut().retain(|entry| entry.panel.id() != panel);
    }
}
