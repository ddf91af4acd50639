/// Control actions supported by the pressure corrector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop after the current pass and return its pressure and flux.
    ///
    /// The velocity is returned as predicted, pressure is not relaxed, and no
    /// continuity errors are reported.
    StopEarly,
}
