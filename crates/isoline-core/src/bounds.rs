//! Geographic bounding rectangles.
//!
//! A [`GeoBounds`] describes the longitude/latitude rectangle a raster is
//! mapped onto. The raster's first row lies on the northern edge and its first
//! column on the western edge.

use crate::error::{CoreError, CoreResult};

/// Tolerance used when deciding whether bounds cover a full revolution.
const REVOLUTION_EPSILON: f64 = 1e-6;

/// Degrees of longitude in a full horizontal revolution.
pub const FULL_REVOLUTION: f64 = 360.0;

/// A geographic rectangle in degrees: `[west, south, east, north]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoBounds {
    /// The whole globe, `[-180, -90, 180, 90]`.
    pub const GLOBAL: Self = Self {
        west: -180.0,
        south: -90.0,
        east: 180.0,
        north: 90.0,
    };

    /// Create bounds without validation.
    #[inline]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Create bounds, rejecting non-finite or inverted rectangles.
    ///
    /// East may exceed 180 (e.g. `[0, -90, 360, 90]`), but the rectangle must
    /// not be wider than one revolution.
    pub fn try_new(west: f64, south: f64, east: f64, north: f64) -> CoreResult<Self> {
        let invalid = || CoreError::InvalidBounds {
            west,
            south,
            east,
            north,
        };

        if ![west, south, east, north].iter().all(|v| v.is_finite()) {
            return Err(invalid());
        }
        if west >= east || south >= north {
            return Err(invalid());
        }
        if east - west > FULL_REVOLUTION + REVOLUTION_EPSILON {
            return Err(invalid());
        }
        for lat in [south, north] {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(CoreError::LatitudeOutOfRange(lat));
            }
        }

        Ok(Self::new(west, south, east, north))
    }

    /// Check bounds built with [`GeoBounds::new`] against the rules of
    /// [`GeoBounds::try_new`].
    pub fn validate(&self) -> CoreResult<()> {
        Self::try_new(self.west, self.south, self.east, self.north).map(|_| ())
    }

    /// Create bounds from a `[west, south, east, north]` array.
    pub fn from_array(bounds: [f64; 4]) -> CoreResult<Self> {
        Self::try_new(bounds[0], bounds[1], bounds[2], bounds[3])
    }

    /// Width in degrees of longitude.
    #[inline]
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height in degrees of latitude.
    #[inline]
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Whether the bounds span a full horizontal revolution.
    ///
    /// Such rasters wrap around the antimeridian and are uploaded with a
    /// repeating texture so the seam samples its neighbour across the edge.
    #[inline]
    pub fn is_repeat(&self) -> bool {
        (self.width() - FULL_REVOLUTION).abs() <= REVOLUTION_EPSILON
    }

    /// Bounds as `[west, south, east, north]` in single precision.
    #[inline]
    pub fn to_array_f32(&self) -> [f32; 4] {
        [
            self.west as f32,
            self.south as f32,
            self.east as f32,
            self.north as f32,
        ]
    }

    /// Normalized texture coordinates of a point.
    ///
    /// `u` grows eastwards from the western edge, `v` grows southwards from
    /// the northern edge. Longitudes are wrapped for repeating bounds; for
    /// other bounds points outside the rectangle yield `None`.
    pub fn uv_at(&self, lon: f64, lat: f64) -> Option<[f64; 2]> {
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        if lat < self.south || lat > self.north {
            return None;
        }

        let u = if self.is_repeat() {
            (lon - self.west).rem_euclid(FULL_REVOLUTION) / FULL_REVOLUTION
        } else {
            let lon = wrap_into(lon, self.west);
            if lon > self.east {
                return None;
            }
            (lon - self.west) / self.width()
        };
        let v = (self.north - lat) / self.height();

        Some([u, v])
    }

    /// Whether a point lies inside the rectangle (longitudes are wrapped).
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.uv_at(lon, lat).is_some()
    }
}

impl Default for GeoBounds {
    fn default() -> Self {
        Self::GLOBAL
    }
}

impl From<[f64; 4]> for GeoBounds {
    fn from(bounds: [f64; 4]) -> Self {
        Self::new(bounds[0], bounds[1], bounds[2], bounds[3])
    }
}

/// Shift `lon` by whole revolutions into `[west, west + 360)`.
fn wrap_into(lon: f64, west: f64) -> f64 {
    west + (lon - west).rem_euclid(FULL_REVOLUTION)
}
