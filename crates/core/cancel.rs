/*!
Cancellation: a single `Ctrl-C` sets a shared flag that every worker and
the collector poll between files, producing an orderly shutdown rather
than an abrupt process kill.
*/

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cancellation flag shared by every worker thread and the collector.
/// Cloning shares the same underlying flag.
#[derive(Clone)]
pub struct Cancelled(Arc<AtomicBool>);

impl Cancelled {
    /// Create a new, not-yet-cancelled flag.
    pub fn new() -> Cancelled {
        Cancelled(Arc::new(AtomicBool::new(false)))
    }

    /// True once `Ctrl-C` has been received, or [`Cancelled::set`] was
    /// called directly (e.g. after `--max-count` is satisfied process-wide).
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Mark the run as cancelled.
    pub fn set(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Install a `Ctrl-C` handler that marks `cancel` as set. Installing more
/// than one handler per process is a logic error in `ctrlc`, so this
/// must be called exactly once.
pub fn install_handler(cancel: Cancelled) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || cancel.set())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unset_and_can_be_set() {
        let c = Cancelled::new();
        assert!(!c.is_set());
        c.set();
        assert!(c.is_set());
    }

    #[test]
    fn clones_share_the_same_flag() {
        let c = Cancelled::new();
        let c2 = c.clone();
        c2.set();
        assert!(c.is_set());
    }
}
