use std::{
    any::TypeId,
    cell::{Cell, RefCell},
    collections::HashMap,
};

use crate::{
    cleanup::Cleanup,
    gc_box::{Colour, Erased, GcBox},
    tracked::FinalizerTable,
    Collect, Invariant,
};

/// The capability to allocate inside of an arena, handed out by [`Arena::view`].
///
/// [`Arena::view`]: crate::Arena::view
#[repr(transparent)]
pub struct Mutation<'b>(Context, Invariant<'b>);

impl<'b> Mutation<'b> {
    pub(crate) fn new(ctx: &Context) -> &Mutation<'b> {
        // Safety: `Mutation` is a transparent wrapper around `Context`.
        unsafe { core::mem::transmute::<&Context, &Mutation<'b>>(ctx) }
    }

    pub(crate) fn context(&self) -> &Context {
        &self.0
    }
}

impl core::fmt::Debug for Mutation<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Mutation").finish()
    }
}

/// Handed to [`Collect::trace`] while the arena marks reachable objects.
#[repr(transparent)]
pub struct Collector(Context);

impl Collector {
    pub(crate) fn new(ctx: &Context) -> &Collector {
        // Safety: `Collector` is a transparent wrapper around `Context`.
        unsafe { core::mem::transmute::<&Context, &Collector>(ctx) }
    }

    pub(crate) fn context(&self) -> &Context {
        &self.0
    }
}

impl core::fmt::Debug for Collector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Collector").finish()
    }
}

/// Decides when [`Arena::finish_cycle`] starts a collection.
///
/// A trigger of `None` never fires; when both are `None` only
/// [`Arena::complete_collection`] reclaims anything.
///
/// [`Arena::finish_cycle`]: crate::Arena::finish_cycle
/// [`Arena::complete_collection`]: crate::Arena::complete_collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pacing {
    /// Collect once this many bytes have been allocated since the last cycle.
    pub trigger_bytes: Option<usize>,
    /// Collect once this many objects have been allocated since the last cycle.
    pub trigger_allocations: Option<usize>,
}

impl Pacing {
    /// Never collects on its own. Only [`Arena::complete_collection`] reclaims anything.
    ///
    /// [`Arena::complete_collection`]: crate::Arena::complete_collection
    pub const NEVER: Pacing = Pacing {
        trigger_bytes: None,
        trigger_allocations: None,
    };

    fn should_wake(&self, allocations: usize, bytes: usize) -> bool {
        self.trigger_allocations.is_some_and(|n| allocations >= n)
            || self.trigger_bytes.is_some_and(|n| bytes >= n)
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            trigger_bytes: Some(4192),
            trigger_allocations: Some(64),
        }
    }
}

pub(crate) struct Context {
    objects: RefCell<Vec<GcBox<Erased>>>,
    /// Canonical allocations for zero-sized values, one per type.
    singletons: RefCell<HashMap<TypeId, GcBox<Erased>>>,
    finalizers: RefCell<FinalizerTable>,
    first_gray: Cell<Option<GcBox<Erased>>>,
    phase: Cell<CollectionPhase>,
    pacing: Pacing,
}

impl Context {
    pub fn new(pacing: Pacing) -> Context {
        Self {
            objects: RefCell::default(),
            singletons: RefCell::default(),
            finalizers: RefCell::default(),
            first_gray: Cell::default(),
            phase: Cell::default(),
            pacing,
        }
    }

    pub fn allocations(&self) -> usize {
        self.objects.borrow().len()
    }

    pub fn finalizers(&self) -> &RefCell<FinalizerTable> {
        &self.finalizers
    }

    pub fn allocate<T: Collect>(&self, val: T) -> GcBox<T> {
        let gc = GcBox::allocate(val);

        self.objects.borrow_mut().push(gc.erase());

        if let CollectionPhase::Sleep { allocations, bytes } = self.phase.get() {
            self.phase.set(CollectionPhase::Sleep {
                allocations: allocations + 1,
                bytes: bytes.saturating_add(gc.layout().size()),
            });
        }

        gc
    }

    /// Returns the canonical allocation for a zero-sized `T`, allocating it on first use.
    ///
    /// Interned objects are treated as roots, and live until the context is dropped.
    pub fn intern<T: Collect + 'static>(&self, val: T) -> GcBox<T> {
        debug_assert_eq!(core::mem::size_of::<T>(), 0);

        let key = TypeId::of::<T>();
        if let Some(gc) = self.singletons.borrow().get(&key) {
            // Safety: Entries are only ever inserted under the `TypeId` of their own type.
            return unsafe { gc.restore_type() };
        }

        let gc = self.allocate(val);
        self.singletons.borrow_mut().insert(key, gc.erase());
        gc
    }

    pub fn should_collect(&self) -> bool {
        match self.phase.get() {
            CollectionPhase::Sleep { allocations, bytes } => {
                self.pacing.should_wake(allocations, bytes)
            }
            // A previous cycle was interrupted by a panicking cleanup.
            CollectionPhase::Mark | CollectionPhase::Sweep => true,
        }
    }

    /// Strongly marks an allocation, queueing it to have its value traced.
    pub fn mark(&self, gc: GcBox<Erased>) {
        if matches!(gc.colour(), Colour::White | Colour::Weak) {
            gc.set_colour(Colour::Gray);
            gc.set_next(self.first_gray.take());
            self.first_gray.set(Some(gc));
        }
    }

    /// Keeps an allocation alive without keeping its value alive.
    pub fn mark_weak(&self, gc: GcBox<Erased>) {
        if gc.colour() == Colour::White {
            gc.set_colour(Colour::Weak);
        }
    }

    /// Runs a full mark and sweep cycle, treating `root` and the interned singletons as live.
    pub fn collect(&self, root: &impl Collect) {
        self.phase.set(CollectionPhase::Mark);
        self.first_gray.set(None);

        for obj in self.objects.borrow().iter() {
            obj.set_colour(Colour::White);
            obj.set_next(None);
        }

        let collector = Collector::new(self);
        root.trace(collector);
        for gc in self.singletons.borrow().values() {
            self.mark(*gc);
        }

        while let Some(gc) = self.first_gray.take() {
            self.first_gray.set(gc.next_gc());
            gc.set_next(None);
            gc.set_colour(Colour::Black);

            unsafe { gc.trace_value(collector) };
        }

        self.phase.set(CollectionPhase::Sweep);
        let (freed, cleanups) = self.sweep();

        log::debug!(
            "collection finished: {freed} objects freed, {cleanups} identity cleanups run, {} remaining",
            self.allocations()
        );

        self.phase.set(CollectionPhase::default());
    }

    fn sweep(&self) -> (usize, usize) {
        let mut index = 0;
        let mut freed = 0;
        let mut cleanups = 0;

        loop {
            let Some(obj) = self.objects.borrow().get(index).copied() else {
                break;
            };

            match obj.colour() {
                Colour::Black => {
                    index += 1;
                }
                Colour::Weak => {
                    cleanups += usize::from(self.reclaim(obj));
                    index += 1;
                }
                Colour::White => {
                    self.objects.borrow_mut().swap_remove(index);
                    cleanups += usize::from(self.reclaim(obj));
                    // Safety: The object was unreachable, and its value has been dropped.
                    unsafe { obj.dealloc() };
                    freed += 1;
                }
                Colour::Gray => unreachable!("gray object left after marking"),
            }
        }

        (freed, cleanups)
    }

    /// Fires the cleanup attached to the identity of a dead object, then drops its value.
    ///
    /// The cleanup runs first, the same way a [`Boxed`](crate::Boxed) container fires its
    /// cleanup before its fields are dropped, so a panicking destructor cannot lose it.
    ///
    /// Returns whether a cleanup from the finalizer table ran.
    fn reclaim(&self, obj: GcBox<Erased>) -> bool {
        if !obj.is_initialized() {
            return false;
        }

        let cleanup: Option<Cleanup> = if obj.is_observed() {
            self.finalizers.borrow_mut().notify(obj.addr())
        } else {
            None
        };

        log::trace!(
            "reclaiming object {:#x} (observed: {})",
            obj.addr(),
            obj.is_observed()
        );

        let fired = match cleanup {
            Some(mut cleanup) => {
                cleanup.fire();
                true
            }
            None => false,
        };

        // Safety: The object is unreachable, so no references to its value exist.
        unsafe { obj.drop_value() };

        fired
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        let objects = std::mem::take(self.objects.get_mut());

        for obj in objects {
            self.reclaim(obj);

            // Safety: The arena is going away, so nothing can reach the object anymore.
            unsafe { obj.dealloc() };
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CollectionPhase {
    Sleep { allocations: usize, bytes: usize },
    Mark,
    Sweep,
}

impl Default for CollectionPhase {
    fn default() -> Self {
        CollectionPhase::Sleep {
            allocations: 0,
            bytes: 0,
        }
    }
}
