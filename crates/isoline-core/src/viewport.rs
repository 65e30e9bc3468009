//! Viewport state and the queries layers make against it.

use glam::Mat4;

use crate::error::{CoreError, CoreResult};

/// How the map is projected for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    /// Flat Web Mercator map.
    #[default]
    Mercator,
    /// 3D globe.
    Globe,
}

/// The camera state a frame is rendered with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Current zoom level.
    pub zoom: f64,
    /// Projection mode.
    pub projection: Projection,
    /// Combined view-projection matrix from world space to clip space.
    ///
    /// World space is the 512-unit Web Mercator square for flat maps and a
    /// sphere of radius [`GLOBE_RADIUS`] centred on the origin for globes.
    pub view_proj: Mat4,
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
}

/// Radius of the globe in world units.
pub const GLOBE_RADIUS: f32 = 256.0;

impl Viewport {
    /// A flat viewport with an identity camera.
    pub fn flat(zoom: f64) -> Self {
        Self {
            zoom,
            projection: Projection::Mercator,
            view_proj: Mat4::IDENTITY,
            width: 800,
            height: 600,
        }
    }

    /// A globe viewport with an identity camera.
    pub fn globe(zoom: f64) -> Self {
        Self {
            projection: Projection::Globe,
            ..Self::flat(zoom)
        }
    }

    /// Replace the view-projection matrix.
    pub fn with_view_proj(mut self, view_proj: Mat4) -> Self {
        self.view_proj = view_proj;
        self
    }

    /// Replace the pixel size.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::flat(0.0)
    }
}

/// Whether the viewport renders a globe.
#[inline]
pub fn is_globe_projection(viewport: &Viewport) -> bool {
    viewport.projection == Projection::Globe
}

/// Whether the viewport zoom lies within `[min_zoom, max_zoom]`.
///
/// Both ends are inclusive; `None` leaves that end unbounded. A non-finite
/// zoom is never within bounds.
pub fn is_within_zoom_bounds(
    viewport: &Viewport,
    min_zoom: Option<f64>,
    max_zoom: Option<f64>,
) -> bool {
    if !viewport.zoom.is_finite() {
        return false;
    }
    if let Some(min_zoom) = min_zoom {
        if viewport.zoom < min_zoom {
            return false;
        }
    }
    if let Some(max_zoom) = max_zoom {
        if viewport.zoom > max_zoom {
            return false;
        }
    }
    true
}

/// Check that a zoom range is not inverted and that its limits are numbers.
///
/// Infinite limits are accepted and behave like `None`.
pub fn validate_zoom_range(min_zoom: Option<f64>, max_zoom: Option<f64>) -> CoreResult<()> {
    let invalid = || CoreError::InvalidZoomRange {
        min: min_zoom.unwrap_or(f64::NEG_INFINITY),
        max: max_zoom.unwrap_or(f64::INFINITY),
    };
    if min_zoom.is_some_and(f64::is_nan) || max_zoom.is_some_and(f64::is_nan) {
        return Err(invalid());
    }
    match (min_zoom, max_zoom) {
        (Some(min), Some(max)) if min > max => Err(invalid()),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_bounds_inclusive() {
        let min = Some(2.0);
        let max = Some(10.0);
        assert!(is_within_zoom_bounds(&Viewport::flat(2.0), min, max));
        assert!(is_within_zoom_bounds(&Viewport::flat(10.0), min, max));
        assert!(!is_within_zoom_bounds(&Viewport::flat(1.99), min, max));
        assert!(!is_within_zoom_bounds(&Viewport::flat(10.01), min, max));
    }

    #[test]
    fn test_zoom_bounds_unbounded() {
        assert!(is_within_zoom_bounds(&Viewport::flat(-3.0), None, Some(10.0)));
        assert!(is_within_zoom_bounds(&Viewport::flat(22.0), Some(0.0), None));
        assert!(is_within_zoom_bounds(&Viewport::flat(100.0), None, None));
    }

    #[test]
    fn test_non_finite_zoom_is_outside() {
        assert!(!is_within_zoom_bounds(&Viewport::flat(f64::NAN), Some(0.0), Some(10.0)));
        assert!(!is_within_zoom_bounds(&Viewport::flat(f64::NAN), None, None));
        assert!(!is_within_zoom_bounds(&Viewport::flat(f64::INFINITY), None, None));
    }

    #[test]
    fn test_globe_detection() {
        assert!(is_globe_projection(&Viewport::globe(3.0)));
        assert!(!is_globe_projection(&Viewport::flat(3.0)));
    }

    #[test]
    fn test_validate_zoom_range() {
        assert!(validate_zoom_range(Some(1.0), Some(1.0)).is_ok());
        assert!(validate_zoom_range(None, Some(1.0)).is_ok());
        assert!(validate_zoom_range(Some(4.0), Some(1.0)).is_err());
        assert!(validate_zoom_range(Some(f64::NAN), Some(1.0)).is_err());
        assert!(validate_zoom_range(None, Some(f64::NAN)).is_err());
        assert!(validate_zoom_range(None, Some(f64::INFINITY)).is_ok());
    }
}
