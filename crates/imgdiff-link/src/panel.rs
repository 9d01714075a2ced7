//! Host view handles.

use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::lifecycle::Lifecycle;

static NEXT_PANEL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Panel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(u64);

#[derive(Debug)]
struct Inner {
    id: PanelId,
    title: String,
    lifecycle: Lifecycle,
}

/// Where a [`Document`](crate::Document) is currently rendered.
///
/// Opaque to the pairing engine apart from its identity and its disposal
/// notification.
#[derive(Clone)]
pub struct Panel {
    inner: Rc<Inner>,
}

impl Panel {
    /// Create a panel with a display title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        let id = PanelId(NEXT_PANEL_ID.fetch_add(1, Ordering::Relaxed));
        Self {
            inner: Rc::new(Inner {
                id,
                title: title.into(),
                lifecycle: Lifecycle::default(),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> PanelId {
        self.inner.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.inner.title
    }

    /// Register `hook` to run when this panel is disposed.
    pub fn on_dispose(&self, hook: impl FnOnce() + 'static) {
        self.inner.lifecycle.on_dispose(Box::new(hook));
    }

    /// Dispose the panel. Idempotent.
    pub fn dispose(&self) {
        if self.inner.lifecycle.dispose() {
            tracing::trace!(panel = %self.inner.title, "panel disposed");
        }
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.lifecycle.is_disposed()
    }

    #[cfg(test)]
    pub(crate) fn dispose_hook_count(&self) -> usize {
        self.inner.lifecycle.hook_count()
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakPanel {
        WeakPanel {
            id: self.inner.id,
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl PartialEq for Panel {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Panel {}

impl std::fmt::Debug for Panel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Panel")
            .field("id", &self.inner.id)
            .field("title", &self.inner.title)
            .finish_non_exhaustive()
    }
}

/// Non-owning reference to a [`Panel`].
#[derive(Debug, Clone)]
pub struct WeakPanel {
    id: PanelId,
    inner: Weak<Inner>,
}

impl WeakPanel {
    #[must_use]
    pub const fn id(&self) -> PanelId {
        self.id
    }

    /// The panel, if it is still alive and not disposed.
    #[must_use]
    pub fn upgrade(&self) -> Option<Panel> {
        self.inner
            .upgrade()
            .map(|inner| Panel { inner })
            .filter(|panel| !panel.is_disposed())
    }
}
