/// A nullary action which runs at most once, when the value it is bound to is reclaimed.
///
/// Both the identity-tracked and the boxed strategies fire their cleanup through this type.
/// The action is taken out before it runs, so a cleanup which panics is never run again. A
/// `Cleanup` which is dropped without having been bound to anything does not run.
pub struct Cleanup(Option<Box<dyn FnOnce()>>);

impl Cleanup {
    pub fn new<F>(action: F) -> Cleanup
    where
        F: FnOnce() + 'static,
    {
        Cleanup(Some(Box::new(action)))
    }

    /// Returns true once the action has been run.
    pub fn is_spent(&self) -> bool {
        self.0.is_none()
    }

    pub(crate) fn fire(&mut self) {
        if let Some(action) = self.0.take() {
            action();
        }
    }
}

impl<F> From<F> for Cleanup
where
    F: FnOnce() + 'static,
{
    fn from(action: F) -> Self {
        Cleanup::new(action)
    }
}

impl core::fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Cleanup")
            .field(&if self.is_spent() { "<spent>" } else { "<pending>" })
            .finish()
    }
}
