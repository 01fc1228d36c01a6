//! Builders which let a callback and its cleanup be written in either order.
//!
//! ```
//! # use ghost_cleanup::{once_arena, Invocable};
//! use ghost_cleanup::sugar::{callback, cleanup};
//!
//! # once_arena(|mt| {
//! let label = String::from("tick");
//!
//! let a = callback(move || label.len()).cleanup(|| println!("done")).construct(mt).unwrap();
//! let b = cleanup(|| println!("done")).callback(|| 0).construct(mt).unwrap();
//!
//! assert_eq!(a.invoke(()), 4);
//! assert_eq!(b.invoke(()), 0);
//! # });
//! ```

use crate::{cleanup::Cleanup, construct, CleanupResult, Func, Managed, Mutation};

/// A callback body waiting for its cleanup.
#[derive(Debug)]
pub struct Callback<F>(F);

/// A cleanup waiting for its callback body.
#[derive(Debug)]
pub struct PendingCleanup(Cleanup);

/// A callback body paired with its cleanup, ready to be placed in an arena.
#[derive(Debug)]
pub struct WithCleanup<F> {
    body: F,
    cleanup: Cleanup,
}

pub fn callback<F>(body: F) -> Callback<F> {
    Callback(body)
}

pub fn cleanup<C>(action: C) -> PendingCleanup
where
    C: FnOnce() + 'static,
{
    PendingCleanup(Cleanup::new(action))
}

impl<F> Callback<F> {
    pub fn cleanup<C>(self, action: C) -> WithCleanup<F>
    where
        C: FnOnce() + 'static,
    {
        WithCleanup {
            body: self.0,
            cleanup: Cleanup::new(action),
        }
    }

    /// Returns the body unchanged, for a callback which has no cleanup.
    pub fn into_inner(self) -> F {
        self.0
    }
}

impl PendingCleanup {
    pub fn callback<F>(self, body: F) -> WithCleanup<F> {
        WithCleanup {
            body,
            cleanup: self.0,
        }
    }

    /// Returns the cleanup unchanged, without binding it to anything.
    pub fn into_inner(self) -> Cleanup {
        self.0
    }
}

impl<F: 'static> WithCleanup<F> {
    /// Places the body in the arena and hands both halves to [`construct`].
    pub fn construct<'b>(self, mt: &Mutation<'b>) -> CleanupResult<Managed<'b, Func<F>>> {
        construct(Func::new(self.body, mt), self.cleanup, mt)
    }
}
