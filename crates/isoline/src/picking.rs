//! CPU sampling of raster inputs, for hover read-outs and tooltips.
//!
//! Values are reconstructed the way the contour shader reconstructs them, so
//! a picked value sits on the same side of a contour line as the pixel drawn
//! under the cursor.

use isoline_core::GeoBounds;
use isoline_render::TextureData;

use crate::props::{ContourLayerProps, ContourStyle, ImageInterpolation, ImageType};

/// The field value at a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterPointValue {
    /// Scalar value, or vector magnitude.
    pub value: f32,
    /// Direction the vector points towards, degrees clockwise from north in
    /// `[0, 360)`. `None` for scalar images.
    pub direction: Option<f32>,
}

/// Sample the layer's raster inputs at `lon`/`lat`.
///
/// Returns `None` outside the bounds, without a primary image, or where the
/// data marks no value (NaN samples, transparent unscaled samples, values
/// outside the configured min/max range).
pub fn pick_raster_value(props: &ContourLayerProps, lon: f64, lat: f64) -> Option<RasterPointValue> {
    let image = props.image.as_deref()?;
    let [u, v] = props.bounds.uv_at(lon, lat)?;
    let uv = [u as f32, v as f32];
    let style = &props.style;
    let sampler = Sampler::new(&props.bounds, style);

    let mut texel = sampler.sample_smoothed(image, uv);
    if let Some(image2) = props.image2.as_deref() {
        if style.image_weight > 0.0 {
            let other = sampler.sample_smoothed(image2, uv);
            texel = mix4(texel, other, style.image_weight);
        }
    }

    if let Some([min, max]) = style.image_unscale {
        if min < max {
            if texel[3] < 1.0 {
                return None;
            }
            texel[0] = min + (max - min) * texel[0];
            texel[1] = min + (max - min) * texel[1];
        }
    }

    let (value, direction) = match style.image_type {
        ImageType::Scalar => (texel[0], None),
        ImageType::Vector => {
            let (east, north) = (texel[0], texel[1]);
            let direction = east.atan2(north).to_degrees().rem_euclid(360.0);
            (east.hypot(north), Some(direction))
        }
    };

    if value.is_nan() {
        return None;
    }
    if style.image_min_value.is_some_and(|min| value < min)
        || style.image_max_value.is_some_and(|max| value > max)
    {
        return None;
    }

    Some(RasterPointValue { value, direction })
}

struct Sampler {
    repeat: bool,
    interpolation: ImageInterpolation,
    smoothing: f32,
}

impl Sampler {
    fn new(bounds: &GeoBounds, style: &ContourStyle) -> Self {
        Self {
            repeat: bounds.is_repeat(),
            interpolation: style.image_interpolation,
            smoothing: style.image_smoothing,
        }
    }

    fn sample_smoothed(&self, image: &TextureData, uv: [f32; 2]) -> [f32; 4] {
        if self.smoothing <= 0.0 {
            return self.sample(image, uv);
        }

        let dx = self.smoothing / image.width() as f32;
        let dy = self.smoothing / image.height() as f32;
        let taps = [
            uv,
            [uv[0] + dx, uv[1]],
            [uv[0] - dx, uv[1]],
            [uv[0], uv[1] + dy],
            [uv[0], uv[1] - dy],
        ];

        let mut sum = [0.0; 4];
        for tap in taps {
            let texel = self.sample(image, tap);
            for (acc, c) in sum.iter_mut().zip(texel) {
                *acc += c;
            }
        }
        sum.map(|c| c / taps.len() as f32)
    }

    fn sample(&self, image: &TextureData, uv: [f32; 2]) -> [f32; 4] {
        let width = image.width() as f32;
        let height = image.height() as f32;

        match self.interpolation {
            ImageInterpolation::Nearest => {
                let x = (uv[0] * width).floor() as i64;
                let y = (uv[1] * height).floor() as i64;
                self.fetch(image, x, y)
            }
            ImageInterpolation::Linear => {
                let (x, fx) = split(uv[0] * width - 0.5);
                let (y, fy) = split(uv[1] * height - 0.5);
                let top = mix4(self.fetch(image, x, y), self.fetch(image, x + 1, y), fx);
                let bottom = mix4(
                    self.fetch(image, x, y + 1),
                    self.fetch(image, x + 1, y + 1),
                    fx,
                );
                mix4(top, bottom, fy)
            }
            ImageInterpolation::Cubic => {
                let (x, fx) = split(uv[0] * width - 0.5);
                let (y, fy) = split(uv[1] * height - 0.5);
                let wx = cubic_weights(fx);
                let wy = cubic_weights(fy);

                let mut result = [0.0; 4];
                for (j, wy) in wy.into_iter().enumerate() {
                    for (i, wx) in wx.into_iter().enumerate() {
                        let texel = self.fetch(image, x + i as i64 - 1, y + j as i64 - 1);
                        for (acc, c) in result.iter_mut().zip(texel) {
                            *acc += wx * wy * c;
                        }
                    }
                }
                result
            }
        }
    }

    /// One texel; columns wrap for repeating bounds, everything else clamps.
    fn fetch(&self, image: &TextureData, x: i64, y: i64) -> [f32; 4] {
        let width = image.width() as i64;
        let height = image.height() as i64;
        let x = if self.repeat {
            x.rem_euclid(width)
        } else {
            x.clamp(0, width - 1)
        };
        let y = y.clamp(0, height - 1);
        image.texel(x as u32, y as u32)
    }
}

fn split(t: f32) -> (i64, f32) {
    let base = t.floor();
    (base as i64, t - base)
}

/// Catmull-Rom weights for the four taps around `t`.
fn cubic_weights(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        -0.5 * t3 + t2 - 0.5 * t,
        1.5 * t3 - 2.5 * t2 + 1.0,
        -1.5 * t3 + 2.0 * t2 + 0.5 * t,
        0.5 * t3 - 0.5 * t2,
    ]
}

fn mix4(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    /// 4×2 raster, value = column + 10 * row, over [0, 0, 40, 20].
    fn gradient_props() -> ContourLayerProps {
        let data: Vec<f32> = (0..2)
            .flat_map(|row| (0..4).map(move |col| col as f32 + 10.0 * row as f32))
            .collect();
        let image = TextureData::float32(4, 2, data).unwrap();
        ContourLayerProps::new("pick")
            .with_image(Some(Arc::new(image)))
            .with_bounds(GeoBounds::new(0.0, 0.0, 40.0, 20.0))
    }

    #[test]
    fn test_nearest() {
        let props = gradient_props().with_interpolation(ImageInterpolation::Nearest);
        // column 2, top row
        let picked = pick_raster_value(&props, 25.0, 15.0).unwrap();
        assert_eq!(picked.value, 2.0);
        assert_eq!(picked.direction, None);
        // column 1, bottom row
        assert_eq!(pick_raster_value(&props, 12.0, 2.0).unwrap().value, 11.0);
    }

    #[test]
    fn test_linear_between_texel_centers() {
        let props = gradient_props().with_interpolation(ImageInterpolation::Linear);
        // halfway between the centers of columns 1 and 2 on the top row
        let picked = pick_raster_value(&props, 20.0, 15.0).unwrap();
        assert!(approx(picked.value, 1.5), "{}", picked.value);
    }

    #[test]
    fn test_cubic_reproduces_linear_ramp() {
        let props = gradient_props();
        // at the center of column 1, Catmull-Rom passes through the sample
        let picked = pick_raster_value(&props, 15.0, 15.0).unwrap();
        assert!(approx(picked.value, 1.0), "{}", picked.value);
    }

    #[test]
    fn test_outside_bounds() {
        let props = gradient_props();
        assert!(pick_raster_value(&props, 50.0, 10.0).is_none());
        assert!(pick_raster_value(&props, 10.0, 30.0).is_none());
        assert!(pick_raster_value(&ContourLayerProps::new("empty"), 0.0, 0.0).is_none());
    }

    #[test]
    fn test_value_range_and_nan() {
        let props = gradient_props()
            .with_interpolation(ImageInterpolation::Nearest)
            .with_value_range(Some(1.0), Some(10.0));
        assert!(pick_raster_value(&props, 5.0, 15.0).is_none());
        assert!(pick_raster_value(&props, 25.0, 15.0).is_some());
        assert!(pick_raster_value(&props, 25.0, 5.0).is_none());

        let image = TextureData::float32(1, 1, vec![f32::NAN]).unwrap();
        let props = ContourLayerProps::new("nan").with_image(Some(Arc::new(image)));
        assert!(pick_raster_value(&props, 0.0, 0.0).is_none());
    }

    #[test]
    fn test_weight_blends_secondary() {
        let first = TextureData::float32(1, 1, vec![10.0]).unwrap();
        let second = TextureData::float32(1, 1, vec![20.0]).unwrap();
        let props = ContourLayerProps::new("blend")
            .with_image(Some(Arc::new(first)))
            .with_image2(Some(Arc::new(second)))
            .with_weight(0.25);
        assert!(approx(pick_raster_value(&props, 0.0, 0.0).unwrap().value, 12.5));

        let props = props.with_image2(None);
        assert_eq!(pick_raster_value(&props, 0.0, 0.0).unwrap().value, 10.0);
    }

    #[test]
    fn test_unscale_and_no_data() {
        let image = TextureData::uint8(2, 1, vec![255, 255, 0, 0, 51, 0, 0, 255]).unwrap();
        let props = ContourLayerProps::new("unscale")
            .with_image(Some(Arc::new(image)))
            .with_bounds(GeoBounds::new(0.0, 0.0, 20.0, 10.0))
            .with_interpolation(ImageInterpolation::Nearest)
            .with_unscale(-50.0, 50.0);

        // opaque texel: 0.2 → -30
        let picked = pick_raster_value(&props, 15.0, 5.0).unwrap();
        assert!(approx(picked.value, -30.0), "{}", picked.value);
        // transparent texel marks no data
        assert!(pick_raster_value(&props, 5.0, 5.0).is_none());
    }

    #[test]
    fn test_vector_magnitude_and_direction() {
        // eastward wind of 3, northward of 4
        let image = TextureData::float32(1, 1, vec![3.0, 4.0]).unwrap();
        let props = ContourLayerProps::new("wind")
            .with_image(Some(Arc::new(image)))
            .with_image_type(ImageType::Vector);
        let picked = pick_raster_value(&props, 0.0, 0.0).unwrap();
        assert!(approx(picked.value, 5.0));
        assert!(approx(picked.direction.unwrap(), 36.869_9));

        // westward
        let image = TextureData::float32(1, 1, vec![-1.0, 0.0]).unwrap();
        let props = props.with_image(Some(Arc::new(image)));
        assert!(approx(pick_raster_value(&props, 0.0, 0.0).unwrap().direction.unwrap(), 270.0));
    }

    #[test]
    fn test_repeat_wraps_columns() {
        let image = TextureData::float32(4, 1, vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let props = ContourLayerProps::new("global")
            .with_image(Some(Arc::new(image)))
            .with_interpolation(ImageInterpolation::Linear);

        // at the seam, linear sampling mixes the last and first columns
        let picked = pick_raster_value(&props, 180.0, 0.0).unwrap();
        assert!(approx(picked.value, 1.5), "{}", picked.value);

        let clamped = props.with_bounds(GeoBounds::new(-180.0, -90.0, 179.0, 90.0));
        let picked = pick_raster_value(&clamped, -180.0, 0.0).unwrap();
        assert!(approx(picked.value, 0.0), "{}", picked.value);
    }
}
