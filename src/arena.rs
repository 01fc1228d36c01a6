use crate::{
    context::{Context, Mutation, Pacing},
    Collect,
};

/// A garbage collected arena, inside which garbage collected pointers can be allocated.
///
/// Objects are only reclaimed between calls to [`Arena::view`], by
/// [`Arena::complete_collection`], [`Arena::finish_cycle`], or when the arena itself is
/// dropped. Everything still allocated at that point is reclaimed, and any outstanding
/// cleanups run.
pub struct Arena<R: Rootable> {
    root: R::Root<'static>,
    context: Box<Context>,
}

impl<R> Arena<R>
where
    R: Rootable,
{
    pub fn new<F>(f: F) -> Arena<R>
    where
        F: for<'b> FnOnce(&Mutation<'b>) -> R::Root<'b>,
    {
        Arena::with_pacing(Pacing::default(), f)
    }

    pub fn with_pacing<F>(pacing: Pacing, f: F) -> Arena<R>
    where
        F: for<'b> FnOnce(&Mutation<'b>) -> R::Root<'b>,
    {
        let context = Box::new(Context::new(pacing));
        let root = f(Mutation::new(&context));

        Arena { root, context }
    }

    pub fn view<F, Ret>(&self, f: F) -> Ret
    where
        F: for<'b> FnOnce(&R::Root<'b>, &Mutation<'b>) -> Ret,
    {
        f(&self.root, Mutation::new(&self.context))
    }

    pub fn view_mut<F, Ret>(&mut self, f: F) -> Ret
    where
        F: for<'b> FnOnce(&mut R::Root<'b>, &Mutation<'b>) -> Ret,
    {
        f(&mut self.root, Mutation::new(&self.context))
    }

    /// The number of objects currently allocated, including reclaimed objects whose
    /// allocation is kept around for a [`Weak`](crate::Weak).
    pub fn allocations(&self) -> usize {
        self.context.allocations()
    }

    /// The number of identity-tracked cleanups which have not fired yet.
    pub fn finalizers(&self) -> usize {
        self.context.finalizers().borrow().len()
    }

    /// Runs a full collection cycle, regardless of pacing.
    ///
    /// # Panics
    /// If a cleanup or a destructor panics, the panic is propagated out of this call. The
    /// cleanup which panicked is never run again, its object is leaked, and the next cycle
    /// reclaims whatever the interrupted sweep did not reach.
    pub fn complete_collection(&mut self) {
        self.context.collect(&self.root);
    }

    /// Runs a full collection cycle if enough has been allocated since the last one, as
    /// decided by the arena's [`Pacing`].
    pub fn finish_cycle(&mut self) {
        if self.context.should_collect() {
            self.context.collect(&self.root);
        }
    }
}

pub trait Rootable {
    type Root<'l>: Collect;
}
