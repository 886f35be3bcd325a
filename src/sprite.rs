//! Card artwork decoded into a small pixel grid
//!
//! The gallery draws two pixels per terminal cell with the upper half block,
//! so a sprite of `SPRITE_PIXELS` rows takes half as many card lines.

use image::{imageops::FilterType, DynamicImage, GenericImageView, RgbaImage};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Longest side of a decoded sprite, in pixels.
pub const SPRITE_PIXELS: u32 = 14;

/// Pixels below this alpha are left to the card background.
const ALPHA_CUTOFF: u8 = 128;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Sprite {
    pub width: u16,
    pub height: u16,
    /// Row-major, `None` where the artwork is transparent.
    pub pixels: Vec<Option<Rgb>>,
}

impl Sprite {
    pub fn pixel(&self, x: u16, y: u16) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = usize::from(y) * usize::from(self.width) + usize::from(x);
        self.pixels.get(idx).copied().flatten()
    }

    /// Terminal lines needed at two pixels per cell.
    pub fn rows(&self) -> u16 {
        self.height.div_ceil(2)
    }
}

/// Decode PNG/GIF/JPEG bytes, trim the transparent margin and shrink the rest
/// to fit within `max_side` pixels.
pub fn decode_sprite(bytes: &[u8], max_side: u32) -> Result<Sprite, String> {
    let image = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let image = match opaque_bounds(&image.to_rgba8()) {
        Some((x, y, width, height)) => image.crop_imm(x, y, width, height),
        None => return Err("image is fully transparent".to_string()),
    };
    let image = fit(image, max_side.max(1));

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels = rgba
        .pixels()
        .map(|pixel| {
            let [r, g, b, a] = pixel.0;
            (a >= ALPHA_CUTOFF).then_some(Rgb::new(r, g, b))
        })
        .collect();

    Ok(Sprite {
        width: width as u16,
        height: height as u16,
        pixels,
    })
}

fn fit(image: DynamicImage, max_side: u32) -> DynamicImage {
    let (width, height) = image.dimensions();
    if width <= max_side && height <= max_side {
        return image;
    }
    image.resize(max_side, max_side, FilterType::Triangle)
}

/// Smallest rectangle holding every visible pixel, as `(x, y, width, height)`.
fn opaque_bounds(rgba: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in rgba.enumerate_pixels() {
        if pixel.0[3] < ALPHA_CUTOFF {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((left, top, right, bottom)) => {
                (left.min(x), top.min(y), right.max(x), bottom.max(y))
            }
        });
    }
    bounds.map(|(left, top, right, bottom)| (left, top, right - left + 1, bottom - top + 1))
}
