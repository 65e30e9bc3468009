//! Palettes for Isoline contour layers.
//!
//! A palette maps raster values to colors. It is supplied either as stops or
//! as text, one `<value> <color>` stop per line:
//!
//! ```
//! use isoline_style::{PaletteSpec, parse_palette};
//!
//! let palette = parse_palette(&PaletteSpec::from(
//!     "# air temperature, °C
//!      -40 #313695
//!        0 white
//!       40 rgb(165, 0, 38)",
//! ))?;
//! assert_eq!(palette.bounds(), (-40.0, 40.0));
//! # Ok::<(), isoline_style::Error>(())
//! ```
//!
//! [`create_palette_texture`] uploads a palette as a 256×1 color ramp plus
//! the value bounds the ramp spans.

mod error;
pub mod palette;
pub mod palette_texture;
pub mod parser;

pub use error::{Error, Result};
pub use palette::{Palette, PaletteSpec, PaletteStop, parse_palette};
pub use palette_texture::{PALETTE_WIDTH, PaletteTexture, create_palette_texture, palette_texels};
pub use parser::parse_color_str;
