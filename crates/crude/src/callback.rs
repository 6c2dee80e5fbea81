//! Identity-compared callback handles.
//!
//! Closures have no useful equality, so registrations are matched by the
//! allocation behind the handle: two clones of one [`Callback`] are equal,
//! two callbacks built from identical closures are not.

use std::fmt;
use std::rc::Rc;

/// A shared zero-argument callback.
#[derive(Clone)]
pub struct Callback {
    f: Rc<dyn Fn()>,
}

impl Callback {
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self { f: Rc::new(f) }
    }

    /// Run the callback.
    pub fn invoke(&self) {
        (self.f)();
    }

    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.f).cast::<()>()
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for Callback {}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callback").field(&self.addr()).finish()
    }
}
