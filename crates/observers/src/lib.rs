//! Reusable observers for the Plenum pressure corrector.
//!
//! This crate provides [`Observer`] implementations and capability traits for
//! the events emitted by [`pressure::solve`].
//!
//! # Modules
//!
//! - [`traits`] — Capability traits for generic observers
//!   ([`HasResidual`], [`CanStopEarly`])
//! - [`LogObserver`] — Reports each pass through the `log` facade
//!
//! # Features
//!
//! - `plot` — Enables [`ResidualPlot`] for visualizing residual histories via
//!   egui. This feature adds dependencies on `eframe` and `egui_plot`.
//!
//! [`Observer`]: plenum_core::Observer
//! [`pressure::solve`]: plenum_solvers::pressure::solve
//! [`HasResidual`]: traits::HasResidual
//! [`CanStopEarly`]: traits::CanStopEarly

mod log_observer;
pub mod traits;

pub use log_observer::LogObserver;

#[cfg(feature = "plot")]
mod plot;

#[cfg(feature = "plot")]
pub use plot::{ResidualPlot, ShowConfig};
