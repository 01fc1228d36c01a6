//! Cleanups attached to the identity of an existing allocation.

use std::collections::HashMap;

use crate::{
    classify, cleanup::Cleanup, CleanupError, CleanupResult, Collect, Gc, Identity, Mutation,
};

/// Maps the identity of an allocation to the cleanup attached to it.
///
/// Keys are bare addresses, and are never traced, so an entry never keeps its allocation
/// alive. Entries are removed by the sweep, while the allocation they are keyed on is being
/// reclaimed. The table is only touched by the arena's single mutator or by its collector,
/// which never run at the same time, so it needs no synchronization.
#[derive(Debug, Default)]
pub(crate) struct FinalizerTable {
    entries: HashMap<usize, Cleanup>,
}

impl FinalizerTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn register(&mut self, identity: usize, cleanup: Cleanup) -> CleanupResult<()> {
        use std::collections::hash_map::Entry;

        match self.entries.entry(identity) {
            Entry::Occupied(_) => Err(CleanupError::AlreadyManaged),
            Entry::Vacant(slot) => {
                slot.insert(cleanup);
                Ok(())
            }
        }
    }

    /// Called when the allocation with the given identity has been reclaimed.
    ///
    /// Returns the cleanup to run, at most once per registration. Later notifications for the
    /// same identity find nothing.
    pub fn notify(&mut self, identity: usize) -> Option<Cleanup> {
        self.entries.remove(&identity)
    }
}

/// Attaches `cleanup` to the identity of `invocable`, without allocating.
///
/// The returned pointer is `invocable` itself, and calls exactly as it did before. Once the
/// arena reclaims it, `cleanup` runs exactly once.
///
/// # Errors
/// - [`CleanupError::ClassificationMismatch`] if `invocable` is [`Identity::Shareable`].
///   Attaching to it would attach to every other user of the same allocation.
/// - [`CleanupError::AlreadyManaged`] if a cleanup has already been attached to
///   `invocable`.
///
/// On error, `cleanup` is dropped without running.
///
/// # Examples
/// ```
/// # use ghost_cleanup::{attach, once_arena, CleanupError, Func, Invocable};
/// # once_arena(|mt| {
/// let greeting = String::from("hello");
/// let f = Func::new(move || greeting.len(), mt);
///
/// let g = attach(f, || println!("reclaimed"), mt).unwrap();
/// assert_eq!(g.invoke(()), 5);
///
/// assert_eq!(attach(f, || {}, mt).unwrap_err(), CleanupError::AlreadyManaged);
/// # });
/// ```
pub fn attach<'b, T, C>(
    invocable: Gc<'b, T>,
    cleanup: C,
    mt: &Mutation<'b>,
) -> CleanupResult<Gc<'b, T>>
where
    T: Collect,
    C: Into<Cleanup>,
{
    if classify(&invocable) == Identity::Shareable {
        return Err(CleanupError::ClassificationMismatch);
    }

    let gc = invocable.into_box();
    if gc.is_observed() {
        return Err(CleanupError::AlreadyManaged);
    }

    mt.context()
        .finalizers()
        .borrow_mut()
        .register(gc.addr(), cleanup.into())?;
    gc.set_observed();

    log::debug!("attached cleanup to {:#x}", gc.addr());

    Ok(invocable)
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::FinalizerTable;
    use crate::{attach, cleanup::Cleanup, once_arena, CleanupError, Func, Gc};

    fn counting(count: &Rc<Cell<u32>>) -> Cleanup {
        let count = count.clone();
        Cleanup::new(move || count.set(count.get() + 1))
    }

    #[test]
    fn duplicate_notifications_fire_once() {
        let count = Rc::new(Cell::new(0));
        let mut table = FinalizerTable::default();

        table.register(0x1000, counting(&count)).unwrap();

        for _ in 0..3 {
            if let Some(mut cleanup) = table.notify(0x1000) {
                cleanup.fire();
            }
        }

        assert_eq!(count.get(), 1);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn unknown_identity_is_ignored() {
        let mut table = FinalizerTable::default();

        assert!(table.notify(0x2000).is_none());
    }

    #[test]
    fn second_registration_is_rejected() {
        let count = Rc::new(Cell::new(0));
        let mut table = FinalizerTable::default();

        table.register(0x1000, counting(&count)).unwrap();
        let err = table.register(0x1000, counting(&count)).unwrap_err();

        assert_eq!(err, CleanupError::AlreadyManaged);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn attach_preserves_identity() {
        once_arena(|mt| {
            let state = vec![1, 2, 3];
            let f = Func::new(move || state.len(), mt);

            let g = attach(f, || {}, mt).unwrap();

            assert!(Gc::ptr_eq(f, g));
            assert_eq!(mt.context().finalizers().borrow().len(), 1);
        });
    }

    #[test]
    fn attach_rejects_shareable() {
        once_arena(|mt| {
            let f = Func::new(|| 0, mt);

            let err = attach(f, || {}, mt).unwrap_err();

            assert_eq!(err, CleanupError::ClassificationMismatch);
            assert_eq!(mt.context().finalizers().borrow().len(), 0);
        });
    }
}
