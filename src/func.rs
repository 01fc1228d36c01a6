use crate::{Collect, Collector, Gc, Mutation};

/// A value which can be called with a tuple of arguments.
///
/// Implemented for [`Func`] with argument tuples of up to eight elements, and by the wrappers
/// which forward calls to one, so that a managed callback is called exactly like the callback
/// it wraps.
pub trait Invocable<Args> {
    type Output;

    fn invoke(&self, args: Args) -> Self::Output;
}

/// A Rust closure, placed inside of an arena.
#[repr(transparent)]
pub struct Func<F>(F);

impl<F: 'static> Func<F> {
    /// Places a closure inside of the arena.
    ///
    /// A closure which captures nothing is zero-sized, and every instance of it behaves the
    /// same. Such closures are interned: each call returns the same allocation, which lives
    /// for as long as the arena does. Closures with state always get an allocation of their
    /// own.
    ///
    /// # Examples
    /// ```
    /// # use ghost_cleanup::{once_arena, Func, Gc, Invocable};
    /// # once_arena(|mt| {
    /// let doubles: Vec<_> = (0..2).map(|_| Func::new(|x: i32| x * 2, mt)).collect();
    ///
    /// assert!(Gc::ptr_eq(doubles[0], doubles[1]));
    /// assert_eq!(doubles[0].invoke((21,)), 42);
    /// # });
    /// ```
    pub fn new<'b>(f: F, mt: &Mutation<'b>) -> Gc<'b, Func<F>> {
        if core::mem::size_of::<F>() == 0 {
            Gc::from_box(mt.context().intern(Func(f)))
        } else {
            Gc::new(Func(f), mt)
        }
    }
}

impl<F> core::fmt::Debug for Func<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Func")
            .field(&core::any::type_name::<F>())
            .finish()
    }
}

// Closures stored in the arena are `'static`, so they cannot hold any `Gc` pointer.
unsafe impl<F: 'static> Collect for Func<F> {
    const NEEDS_TRACE: bool = false;

    fn trace(&self, _: &Collector) {}
}

macro_rules! invocable_impl {
    ($($a:ident),*) => {
        impl<F, R, $($a,)*> Invocable<($($a,)*)> for Func<F>
        where
            F: Fn($($a),*) -> R,
        {
            type Output = R;

            #[allow(non_snake_case)]
            fn invoke(&self, ($($a,)*): ($($a,)*)) -> R {
                (self.0)($($a),*)
            }
        }
    };
}

invocable_impl!();
invocable_impl!(A);
invocable_impl!(A, B);
invocable_impl!(A, B, C);
invocable_impl!(A, B, C, D);
invocable_impl!(A, B, C, D, E);
invocable_impl!(A, B, C, D, E, G);
invocable_impl!(A, B, C, D, E, G, H);
invocable_impl!(A, B, C, D, E, G, H, I);
