//! Coordinate-system tags understood by the image-sampling shader stage.

/// The coordinate system an image's bounds are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CoordinateSystem {
    /// Whatever the viewport uses natively.
    #[default]
    Default,
    /// Longitude/latitude in degrees.
    LngLat,
    /// Plain world units.
    Cartesian,
}

impl CoordinateSystem {
    /// The integer tag written into uniform blocks.
    #[inline]
    pub const fn tag(self) -> i32 {
        match self {
            CoordinateSystem::Default => -1,
            CoordinateSystem::Cartesian => 0,
            CoordinateSystem::LngLat => 1,
        }
    }
}
