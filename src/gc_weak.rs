use crate::{gc_box::GcBox, Collect, Collector, Gc, Invariant};

/// A weak pointer into the arena, which does not keep its value alive.
///
/// Once the value has been reclaimed, [`Weak::upgrade`] returns `None`. The allocation itself
/// is kept around for as long as the `Weak` is reachable.
pub struct Weak<'b, T: ?Sized>(Option<GcBox<T>>, Invariant<'b>);

impl<T: ?Sized> Default for Weak<'_, T> {
    fn default() -> Self {
        Weak(None, Default::default())
    }
}

impl<T: ?Sized> Clone for Weak<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Weak<'_, T> {}

impl<'b, T: ?Sized> Weak<'b, T> {
    /// Constructs a `Weak` which points at nothing.
    pub fn new() -> Weak<'b, T> {
        Weak::default()
    }

    pub(crate) fn from_box(ptr: GcBox<T>) -> Weak<'b, T> {
        Weak(Some(ptr), Default::default())
    }

    pub fn upgrade(self) -> Option<Gc<'b, T>> {
        self.0
            .filter(|b| b.is_initialized())
            .map(Gc::from_box)
    }

    /// Returns true if the value pointed to has been reclaimed, or if this `Weak` never pointed
    /// at anything.
    pub fn is_dead(self) -> bool {
        self.0.map_or(true, |b| !b.is_initialized())
    }
}

impl<T: ?Sized> core::fmt::Debug for Weak<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("(Weak)")
    }
}

unsafe impl<T: ?Sized> Collect for Weak<'_, T> {
    const NEEDS_TRACE: bool = true;

    fn trace(&self, c: &Collector) {
        if let Some(b) = self.0 {
            c.context().mark_weak(b.erase());
        }
    }
}
