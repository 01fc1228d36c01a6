use std::{
    alloc::Layout,
    cell::Cell,
    marker::PhantomData,
    ptr::{addr_of_mut, NonNull},
};

use crate::{gc_vtable::GcVTable, Collect, Collector};

pub(crate) struct Erased;

#[repr(transparent)]
pub(crate) struct GcBox<T: ?Sized>(NonNull<GcHeader>, PhantomData<*const T>);

impl<T: ?Sized> Clone for GcBox<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for GcBox<T> {}

impl GcBox<Erased> {
    /// # Safety
    /// The erased box must have come from a call to `GcBox<T>::erase`.
    pub unsafe fn restore_type<T>(self) -> GcBox<T> {
        GcBox(self.0, PhantomData)
    }

    /// Runs the tracing routine of the contained value, if it is still initialized.
    ///
    /// # Safety
    /// Must only be called by the context while marking.
    pub unsafe fn trace_value(&self, c: &Collector) {
        if self.is_initialized() {
            unsafe { self.vtable().trace(*self, c) };
        }
    }

    /// Drops the contained value, leaving the allocation in place.
    ///
    /// The box is marked uninitialized before the destructor runs, so a panicking destructor
    /// is never run a second time.
    ///
    /// # Safety
    /// No live reference to the value may exist.
    pub unsafe fn drop_value(&self) {
        if self.is_initialized() {
            self.set_uninit();
            unsafe { self.vtable().drop_in_place(*self) };
        }
    }

    /// # Safety
    /// The value must already have been dropped, and the box must not be used again.
    pub unsafe fn dealloc(self) {
        let layout = self.layout();
        unsafe { std::alloc::dealloc(self.0.as_ptr().cast::<u8>(), layout) };
    }
}

impl<T: Collect> GcBox<T> {
    pub fn allocate(val: T) -> GcBox<T> {
        let layout = Layout::new::<GcInner<T>>();

        // Safety: `GcInner` always contains a header, so the layout is never zero-sized.
        let ptr = unsafe { std::alloc::alloc(layout) }.cast::<GcInner<T>>();
        let Some(ptr) = NonNull::new(ptr) else {
            std::alloc::handle_alloc_error(layout);
        };

        let inner = GcInner {
            header: GcHeader {
                vtable: GcVTable::new::<T>(),
                next_gray: Cell::new(None),
                colour: Cell::new(Colour::White),
                is_live: Cell::new(true),
                observed: Cell::new(false),
                layout,
            },
            data: val,
        };

        // Safety: The pointer was just allocated with the layout of `GcInner<T>`.
        unsafe { ptr.as_ptr().write(inner) };

        GcBox(ptr.cast(), PhantomData)
    }
}

impl<T> GcBox<T> {
    pub fn data_ptr(&self) -> *mut T {
        let ptr = self.0.as_ptr().cast::<GcInner<T>>();

        unsafe { addr_of_mut!((*ptr).data) }
    }

    /// # Safety
    /// The value must not have been reclaimed.
    pub unsafe fn data(&self) -> &T {
        debug_assert!(self.is_initialized());
        unsafe { &*self.data_ptr() }
    }
}

impl<T: ?Sized> GcBox<T> {
    pub fn erase(self) -> GcBox<Erased> {
        GcBox(self.0, PhantomData)
    }

    /// The identity of the allocation, stable for as long as it is not reclaimed.
    pub fn addr(&self) -> usize {
        self.0.as_ptr() as usize
    }

    pub fn next_gc(&self) -> Option<GcBox<Erased>> {
        self.header().next_gray.get()
    }

    pub fn set_next(&self, next: Option<GcBox<Erased>>) {
        self.header().next_gray.set(next);
    }

    pub fn set_uninit(&self) {
        self.header().is_live.set(false);
    }

    pub fn is_initialized(&self) -> bool {
        self.header().is_live.get()
    }

    pub fn is_observed(&self) -> bool {
        self.header().observed.get()
    }

    /// Tags the allocation so that the sweep consults the finalizer table when it dies.
    pub fn set_observed(&self) {
        self.header().observed.set(true);
    }

    pub fn colour(&self) -> Colour {
        self.header().colour.get()
    }

    pub fn set_colour(&self, c: Colour) {
        self.header().colour.set(c)
    }

    pub fn vtable(&self) -> &'static GcVTable {
        self.header().vtable
    }

    pub fn layout(&self) -> Layout {
        self.header().layout
    }

    fn header(&self) -> &GcHeader {
        unsafe { self.0.as_ref() }
    }
}

impl<T: ?Sized> PartialEq for GcBox<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: ?Sized> Eq for GcBox<T> {}

pub(crate) struct GcHeader {
    vtable: &'static GcVTable,
    next_gray: Cell<Option<GcBox<Erased>>>,
    colour: Cell<Colour>,
    is_live: Cell<bool>,
    observed: Cell<bool>,
    /// The layout of the whole `GcInner`
    layout: Layout,
}

#[repr(C)]
struct GcInner<T> {
    header: GcHeader,
    data: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) enum Colour {
    /// The allocation has not been reached by the current cycle.
    #[default]
    White,
    /// The allocation is only pointed to by a traced `Weak`. Its value does not need tracing.
    Weak,
    /// The allocation is pointed to by a traced `Gc`, but its value has not been traced yet.
    Gray,
    /// The allocation and its value have both been traced.
    Black,
}
