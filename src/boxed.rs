use crate::{cleanup::Cleanup, Collect, Collector, Gc, Invocable, Mutation};

/// A fresh allocation which owns a cleanup, and forwards calls to a body it does not own.
///
/// The cleanup is tied to the lifetime of the container, not of the body. The body may be
/// shared with any number of other containers and callers.
pub struct Boxed<'b, T> {
    body: Gc<'b, T>,
    cleanup: Cleanup,
}

impl<'b, T> Boxed<'b, T> {
    pub fn body(&self) -> Gc<'b, T> {
        self.body
    }
}

impl<T, Args> Invocable<Args> for Boxed<'_, T>
where
    T: Invocable<Args>,
{
    type Output = T::Output;

    fn invoke(&self, args: Args) -> Self::Output {
        self.body.invoke(args)
    }
}

impl<T> Drop for Boxed<'_, T> {
    fn drop(&mut self) {
        // The body may already be gone, so it must not be touched here.
        self.cleanup.fire();
    }
}

impl<T> core::fmt::Debug for Boxed<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Boxed")
            .field("cleanup", &self.cleanup)
            .finish_non_exhaustive()
    }
}

unsafe impl<T> Collect for Boxed<'_, T> {
    const NEEDS_TRACE: bool = true;

    fn trace(&self, c: &Collector) {
        self.body.trace(c);
    }
}

/// Allocates a new container holding `body` and `cleanup`.
///
/// Unlike [`attach`](crate::attach) this is valid for any body, including shareable ones,
/// and may be used any number of times on the same body. Each container fires its own
/// cleanup when it is reclaimed.
///
/// # Examples
/// ```
/// # use ghost_cleanup::{once_arena, wrap, Func, Gc, Invocable};
/// # once_arena(|mt| {
/// let double = Func::new(|x: i32| x * 2, mt);
///
/// let a = wrap(double, || println!("a reclaimed"), mt);
/// let b = wrap(double, || println!("b reclaimed"), mt);
///
/// assert!(!Gc::ptr_eq(a, b));
/// assert_eq!(a.invoke((4,)), double.invoke((4,)));
/// # });
/// ```
pub fn wrap<'b, T, C>(body: Gc<'b, T>, cleanup: C, mt: &Mutation<'b>) -> Gc<'b, Boxed<'b, T>>
where
    C: Into<Cleanup>,
{
    let container = Gc::new(
        Boxed {
            body,
            cleanup: cleanup.into(),
        },
        mt,
    );

    log::debug!("wrapped body in container {:p}", Gc::as_ptr(container));

    container
}
