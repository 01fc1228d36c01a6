use crate::Gc;

/// Whether a garbage collected value is guaranteed an identity of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Identity {
    /// The value is a dedicated allocation, not aliased by anything else.
    Unique,
    /// The value carries no state, so the arena is free to hand out the same allocation for
    /// every instance of it. See [`Func::new`](crate::Func::new).
    Shareable,
}

/// Classifies a value by whether attaching data to its identity is safe.
///
/// Zero-sized values are `Shareable`; everything else is `Unique`.
///
/// # Examples
/// ```
/// # use ghost_cleanup::{classify, once_arena, Func, Identity};
/// # once_arena(|mt| {
/// let offset = 10;
/// let add = Func::new(move |x: i32| x + offset, mt);
/// let double = Func::new(|x: i32| x * 2, mt);
///
/// assert_eq!(classify(&add), Identity::Unique);
/// assert_eq!(classify(&double), Identity::Shareable);
/// # });
/// ```
pub fn classify<T>(_value: &Gc<'_, T>) -> Identity {
    if core::mem::size_of::<T>() == 0 {
        Identity::Shareable
    } else {
        Identity::Unique
    }
}
