use std::collections::VecDeque;

use crate::context::Collector;

/// A value which can be stored in an arena, and which reports every [`Gc`] it holds.
///
/// # Safety
/// `trace` *must* call `trace` on every value reachable from `self` whose `NEEDS_TRACE` is
/// true. A `Gc` which is not traced is reclaimed at the next collection while still in use.
///
/// `NEEDS_TRACE` may be true for a type which never holds a `Gc`, but *must* be true for any
/// type which can.
///
/// A `Drop` implementation *must not* dereference any `Gc` held by the value. Objects which
/// die in the same cycle are reclaimed in no particular order, so the pointee may already be
/// gone.
///
/// [`Gc`]: crate::Gc
pub unsafe trait Collect {
    const NEEDS_TRACE: bool;

    fn trace(&self, c: &Collector);
}

macro_rules! leaf_collect {
    ($($t:ty),* $(,)?) => {
        $(
            unsafe impl Collect for $t {
                const NEEDS_TRACE: bool = false;

                fn trace(&self, _: &Collector) {}
            }
        )*
    };
}

leaf_collect!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, bool, char, (), f32, f64,
    str, String,
);

unsafe impl<T: Collect + ?Sized> Collect for Box<T> {
    const NEEDS_TRACE: bool = T::NEEDS_TRACE;

    fn trace(&self, c: &Collector) {
        (**self).trace(c)
    }
}

macro_rules! container_collect {
    ($($t:ty),* $(,)?) => {
        $(
            unsafe impl<T: Collect> Collect for $t {
                const NEEDS_TRACE: bool = T::NEEDS_TRACE;

                fn trace(&self, c: &Collector) {
                    if !T::NEEDS_TRACE {
                        return;
                    }

                    self.iter().for_each(|el| el.trace(c));
                }
            }
        )*
    };
}

container_collect!([T], Option<T>, Vec<T>, VecDeque<T>);
