//! Core primitives for Isoline contour layers.
//!
//! This crate holds the small, dependency-light pieces every other Isoline
//! crate agrees on: geographic bounds, the viewport and its zoom/projection
//! queries, per-frame context, prop identity diffing and logging targets.

mod bounds;
mod coordinate;
mod error;
mod frame;
pub mod identity;
pub mod logging;
mod viewport;

pub use bounds::{FULL_REVOLUTION, GeoBounds};
pub use coordinate::CoordinateSystem;
pub use error::{CoreError, CoreResult};
pub use frame::FrameContext;
pub use viewport::{
    GLOBE_RADIUS, Projection, Viewport, is_globe_projection, is_within_zoom_bounds,
    validate_zoom_range,
};

// Re-export glam so hosts build matrices with the same version.
pub use glam;
