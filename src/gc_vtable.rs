use crate::{
    gc_box::{Erased, GcBox},
    Collect, Collector,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct GcVTable {
    trace: unsafe fn(GcBox<Erased>, &Collector),
    drop_in_place: unsafe fn(GcBox<Erased>),
}

impl GcVTable {
    pub unsafe fn trace(&self, ptr: GcBox<Erased>, c: &Collector) {
        unsafe { (self.trace)(ptr, c) }
    }

    pub unsafe fn drop_in_place(&self, ptr: GcBox<Erased>) {
        unsafe { (self.drop_in_place)(ptr) }
    }
}

impl GcVTable {
    pub fn new<T: Collect>() -> &'static GcVTable {
        &const {
            GcVTable {
                trace: |erased: GcBox<Erased>, c| {
                    if T::NEEDS_TRACE {
                        let gc: GcBox<T> = unsafe { erased.restore_type() };
                        unsafe { &*gc.data_ptr() }.trace(c);
                    }
                },
                drop_in_place: |erased: GcBox<Erased>| {
                    let gc: GcBox<T> = unsafe { erased.restore_type() };
                    unsafe { std::ptr::drop_in_place(gc.data_ptr()) };
                },
            }
        }
    }
}
