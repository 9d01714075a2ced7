//! Dispose-once notification shared by documents and panels.

use std::cell::{Cell, RefCell};

pub type Hook = Box<dyn FnOnce()>;

/// Runs registered hooks exactly once, when disposed.
///
/// Disposing twice is a no-op. A hook registered after disposal runs
/// immediately, so late registrations cannot leave dangling entries.
#[derive(Default)]
pub struct Lifecycle {
    disposed: Cell<bool>,
    hooks: RefCell<Vec<Hook>>,
}

impl Lifecycle {
    pub fn on_dispose(&self, hook: Hook) {
        if self.disposed.get() {
            hook();
        } else {
            self.hooks.borrow_mut().push(hook);
        }
    }

    /// Returns `true` on the first call, `false` afterwards.
    pub fn dispose(&self) -> bool {
        if self.disposed.replace(true) {
            return false;
        }
        // Hooks may register further hooks; release the borrow first.
        let hooks = self.hooks.take();
        for hook in hooks {
            hook();
        }
        true
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    #[cfg(test)]
    pub fn hook_count(&self) -> usize {
        self.hooks.borrow().len()
    }
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("disposed", &self.disposed.get())
            .field("hooks", &self.hooks.borrow().len())
            .finish()
    }
}
