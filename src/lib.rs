#![deny(unsafe_op_in_unsafe_fn)]
#![doc = include_str!("../README.md")]

mod arena;
mod boxed;
mod cleanup;
mod collect;
mod context;
mod error;
mod func;
mod gc;
mod gc_box;
mod gc_vtable;
mod gc_weak;
mod identity;
mod managed;
pub mod sugar;
mod tracked;

pub use arena::{Arena, Rootable};
pub use boxed::{wrap, Boxed};
pub use cleanup::Cleanup;
pub use collect::Collect;
pub use context::{Collector, Mutation, Pacing};
pub use error::{CleanupError, CleanupResult};
pub use func::{Func, Invocable};
pub use gc::Gc;
pub use gc_weak::Weak;
pub use identity::{classify, Identity};
pub use managed::{construct, Managed};
pub use tracked::attach;

/// A phantom type which marks the given lifetime as being invariant.
pub(crate) type Invariant<'b> = core::marker::PhantomData<fn(&'b ()) -> &'b ()>;

/// Runs `f` inside of a throwaway arena.
///
/// Nothing is collected while `f` runs. Once it returns, every object it allocated is
/// reclaimed, and all of their cleanups run.
pub fn once_arena<F, R>(f: F) -> R
where
    F: for<'b> FnOnce(&Mutation<'b>) -> R,
{
    struct OnceRoot;

    impl Rootable for OnceRoot {
        type Root<'a> = OnceRoot;
    }

    unsafe impl Collect for OnceRoot {
        const NEEDS_TRACE: bool = false;

        fn trace(&self, _c: &Collector) {}
    }

    let arena = Arena::<OnceRoot>::new(|_| OnceRoot);

    arena.view(|_, mt| f(mt))
}
