//! Unscoped change callbacks.
//!
//! Every successful create, update or delete invokes each registered
//! callback once, in registration order. The store takes a [`pass`] of the
//! list before invoking anything, so callbacks added or removed during a
//! pass only affect later passes.
//!
//! [`pass`]: ChangeNotifier::pass

use crate::callback::Callback;

#[derive(Debug, Default)]
pub struct ChangeNotifier {
    callbacks: Vec<Callback>,
}

impl ChangeNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, callback: &Callback) {
        self.callbacks.push(callback.clone());
    }

    /// Remove every registration of `callback`. Returns whether anything
    /// was removed; removing an unknown callback is a no-op.
    pub fn remove(&mut self, callback: &Callback) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|cb| cb != callback);
        self.callbacks.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Stable copy of the callbacks to run for one notification.
    #[must_use]
    pub fn pass(&self) -> Vec<Callback> {
        self.callbacks.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn pass_preserves_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut notifier = ChangeNotifier::new();
        for n in 0..3 {
            let log = Rc::clone(&log);
            notifier.add(&Callback::new(move || log.borrow_mut().push(n)));
        }
        for cb in notifier.pass() {
            cb.invoke();
        }
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn remove_unknown_is_noop() {
        let mut notifier = ChangeNotifier::new();
        let kept = Callback::new(|| {});
        notifier.add(&kept);
        assert!(!notifier.remove(&Callback::new(|| {})));
        assert_eq!(notifier.len(), 1);
        assert!(notifier.remove(&kept));
        assert!(notifier.is_empty());
    }

    #[test]
    fn remove_drops_duplicate_registrations() {
        let mut notifier = ChangeNotifier::new();
        let cb = Callback::new(|| {});
        notifier.add(&cb);
        notifier.add(&cb);
        assert!(notifier.remove(&cb));
        assert!(notifier.pass().is_empty());
    }

    #[test]
    fn pass_is_detached_from_later_changes() {
        let mut notifier = ChangeNotifier::new();
        let cb = Callback::new(|| {});
        notifier.add(&cb);
        let pass = notifier.pass();
        notifier.remove(&cb);
        assert_eq!(pass.len(), 1);
        assert!(notifier.is_empty());
    }
}
