//! # Tracking-plane Core
//!
//! Assembles the tracking plane: a perforated copper support plate with an
//! array of sensor modules ("dice boards") behind it. It also provides random
//! vertex generation inside the plate and module regions.
//!
//! ## Architecture
//!
//! [`assembly::TrackingPlane`] owns the construction pass. It computes the
//! module grid, builds the plate solid, hands both to a
//! [`sink::PlacementSink`], records absolute sensor coordinates in an
//! [`tracker::AbsolutePositionTracker`], and finally configures the
//! [`vertex::VertexGenerator`].
//!
//! The module's internal layout is supplied through the
//! [`provider::ModuleGeometry`] trait, so any board design can be plugged in.
//!
//! ## Modules
//!
//! - [`assembly`] — Configuration and the construction pass.
//! - [`provider`] — Module geometry trait and a reference sensor board.
//! - [`sink`] — Placement and diagnostic output traits.
//! - [`tracker`] — Absolute sensor position bookkeeping.
//! - [`vertex`] — Region-specific vertex sampling.

pub mod assembly;
pub mod provider;
pub mod sink;
pub mod tracker;
pub mod vertex;
