/// Hook for watching a corrector run and steering it between passes.
///
/// A solver hands each event to `observe` as it happens. Returning
/// `Some(action)` asks the solver to act on it (for example, to stop after the
/// current pressure pass). Returning `None` leaves the run untouched. Solvers
/// document which events can act and which ignore the answer.
///
/// Any `FnMut(&E) -> Option<A>` closure is an observer, and `()` is the
/// observer that never acts.
pub trait Observer<E, A> {
    /// Inspects `event`, optionally requesting an action.
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}

impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}
