use crate::{
    attach, boxed::Boxed, classify, cleanup::Cleanup, wrap, CleanupResult, Collect, Collector, Gc,
    Identity, Invocable, Mutation,
};

/// An invocable whose cleanup runs when the arena reclaims it.
///
/// Calls behave exactly like calls to the wrapped invocable. There is no way to release the
/// cleanup early; it fires once, after the last reference to the managed value is gone.
pub enum Managed<'b, T> {
    /// The cleanup is attached to the identity of the invocable itself.
    Tracked(Gc<'b, T>),
    /// The invocable sits inside of a container which owns the cleanup.
    Boxed(Gc<'b, Boxed<'b, T>>),
}

impl<'b, T: Collect> Managed<'b, T> {
    /// See [`construct`].
    pub fn new<C>(invocable: Gc<'b, T>, cleanup: C, mt: &Mutation<'b>) -> CleanupResult<Self>
    where
        C: Into<Cleanup>,
    {
        construct(invocable, cleanup, mt)
    }
}

impl<'b, T> Managed<'b, T> {
    /// Which of the two strategies was used. A `Unique` managed value is the original
    /// invocable, a `Shareable` one a new container around it.
    pub fn strategy(&self) -> Identity {
        match self {
            Managed::Tracked(_) => Identity::Unique,
            Managed::Boxed(_) => Identity::Shareable,
        }
    }

    /// The invocable that calls are forwarded to.
    pub fn body(&self) -> Gc<'b, T> {
        match self {
            Managed::Tracked(gc) => *gc,
            Managed::Boxed(container) => container.body(),
        }
    }
}

impl<T> Clone for Managed<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Managed<'_, T> {}

impl<T, Args> Invocable<Args> for Managed<'_, T>
where
    T: Invocable<Args>,
{
    type Output = T::Output;

    fn invoke(&self, args: Args) -> Self::Output {
        match self {
            Managed::Tracked(gc) => gc.invoke(args),
            Managed::Boxed(container) => container.invoke(args),
        }
    }
}

impl<T> core::fmt::Debug for Managed<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Managed::Tracked(_) => f.write_str("Managed::Tracked"),
            Managed::Boxed(_) => f.write_str("Managed::Boxed"),
        }
    }
}

unsafe impl<T> Collect for Managed<'_, T> {
    const NEEDS_TRACE: bool = true;

    fn trace(&self, c: &Collector) {
        match self {
            Managed::Tracked(gc) => gc.trace(c),
            Managed::Boxed(container) => container.trace(c),
        }
    }
}

/// Binds `cleanup` to `invocable`, choosing the strategy from its [`Identity`].
///
/// `Unique` invocables get the cleanup attached to their own identity with [`attach`], and
/// `Shareable` ones are placed in a fresh container with [`wrap`].
///
/// # Errors
/// [`CleanupError::AlreadyManaged`](crate::CleanupError::AlreadyManaged) if `invocable` is
/// unique and already has a cleanup attached.
///
/// # Examples
/// ```
/// # use ghost_cleanup::{construct, once_arena, Func, Identity, Invocable};
/// # once_arena(|mt| {
/// let base = 100;
/// let add = construct(Func::new(move |x: i32| x + base, mt), || {}, mt).unwrap();
/// let neg = construct(Func::new(|x: i32| -x, mt), || {}, mt).unwrap();
///
/// assert_eq!(add.strategy(), Identity::Unique);
/// assert_eq!(neg.strategy(), Identity::Shareable);
/// assert_eq!(add.invoke((1,)), 101);
/// assert_eq!(neg.invoke((1,)), -1);
/// # });
/// ```
pub fn construct<'b, T, C>(
    invocable: Gc<'b, T>,
    cleanup: C,
    mt: &Mutation<'b>,
) -> CleanupResult<Managed<'b, T>>
where
    T: Collect,
    C: Into<Cleanup>,
{
    match classify(&invocable) {
        Identity::Unique => attach(invocable, cleanup, mt).map(Managed::Tracked),
        Identity::Shareable => Ok(Managed::Boxed(wrap(invocable, cleanup, mt))),
    }
}
