use core::ops::Deref;
use std::{fmt::Debug, hash::Hash};

use crate::{context::Mutation, gc_box::GcBox, Collect, Collector, Invariant, Weak};

/// A thin, copyable, garbage collected pointer type.
pub struct Gc<'b, T: ?Sized>(GcBox<T>, Invariant<'b>);

impl<'b, T: Collect> Gc<'b, T> {
    /// Allocates garbage collected memory on the heap and then places `val`
    /// into it.
    ///
    /// This allocates regardless of if `T` is zero-sized, so the returned pointer always has an
    /// identity of its own.
    ///
    /// # Examples
    /// ```
    /// # use ghost_cleanup::{once_arena, Gc};
    /// # once_arena(|mt| {
    /// let five = Gc::new(5, mt);
    /// assert_eq!(*five, 5);
    /// # });
    /// ```
    pub fn new(val: T, mt: &Mutation<'b>) -> Gc<'b, T> {
        Gc(mt.context().allocate(val), Default::default())
    }
}

impl<'b, T> Gc<'b, T> {
    pub fn as_ptr(this: Gc<'b, T>) -> *const T {
        this.0.data_ptr()
    }

    pub fn downgrade(this: Gc<'b, T>) -> Weak<'b, T> {
        Weak::from_box(this.0)
    }
}

impl<'b, T: ?Sized> Gc<'b, T> {
    /// Returns true if both pointers point at the same allocation.
    ///
    /// # Examples
    /// ```
    /// # use ghost_cleanup::{once_arena, Gc};
    /// # once_arena(|mt| {
    /// let a = Gc::new(1, mt);
    /// let b = Gc::new(1, mt);
    ///
    /// assert!(Gc::ptr_eq(a, a));
    /// assert!(!Gc::ptr_eq(a, b));
    /// # });
    /// ```
    pub fn ptr_eq(this: Gc<'b, T>, other: Gc<'b, T>) -> bool {
        this.0 == other.0
    }

    pub(crate) fn into_box(self) -> GcBox<T> {
        self.0
    }

    pub(crate) fn from_box(ptr: GcBox<T>) -> Gc<'b, T> {
        Gc(ptr, Default::default())
    }
}

impl<T> Deref for Gc<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // Safety: A `Gc` is always reachable while it can be used, so its value is initialized.
        unsafe { self.0.data() }
    }
}

impl<T: ?Sized> Clone for Gc<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Gc<'_, T> {}

impl<T: Debug> Debug for Gc<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        (**self).fmt(f)
    }
}

impl<T: PartialEq> PartialEq for Gc<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl<T: Eq> Eq for Gc<'_, T> {}

impl<T: PartialOrd> PartialOrd for Gc<'_, T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        (**self).partial_cmp(other)
    }
}

impl<T: Ord> Ord for Gc<'_, T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (**self).cmp(other)
    }
}

impl<T: Hash> Hash for Gc<'_, T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (**self).hash(state);
    }
}

unsafe impl<T: ?Sized> Collect for Gc<'_, T> {
    const NEEDS_TRACE: bool = true;

    fn trace(&self, c: &Collector) {
        c.context().mark(self.0.erase());
    }
}
