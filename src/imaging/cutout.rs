//! Background removal by scanline flood fill from the top-left pixel.
//!
//! The reference color is the pixel at (0, 0). A pixel matches when it is not
//! already transparent and each RGB channel is within the tolerance of the
//! reference. Matching pixels connected to the corner get alpha 0; everything
//! else, including islands of background color enclosed by the subject, is
//! left alone.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use super::ensure_not_empty;
use crate::consts::CUTOUT_TOLERANCE;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutoutOptions {
    /// Maximum per-channel difference from the reference color.
    pub tolerance: u8,
}

impl Default for CutoutOptions {
    fn default() -> Self {
        Self {
            tolerance: CUTOUT_TOLERANCE,
        }
    }
}

struct Matcher {
    reference: [u8; 3],
    tolerance: u8,
}

impl Matcher {
    fn matches(&self, pixel: &Rgba<u8>) -> bool {
        let Rgba([r, g, b, a]) = *pixel;
        a != 0
            && [r, g, b]
                .iter()
                .zip(self.reference)
                .all(|(c, reference)| c.abs_diff(reference) <= self.tolerance)
    }
}

/// Clear the background connected to (0, 0) in place.
///
/// Returns the number of pixels made transparent. Running it again on its own
/// output removes nothing, since the corner is already transparent.
pub fn remove_background(image: &mut RgbaImage, options: &CutoutOptions) -> Result<usize> {
    ensure_not_empty(image)?;
    let (width, height) = image.dimensions();

    let Rgba([r, g, b, _]) = *image.get_pixel(0, 0);
    let matcher = Matcher {
        reference: [r, g, b],
        tolerance: options.tolerance,
    };

    let mut cleared = 0usize;
    let mut stack: Vec<(u32, u32)> = vec![(0, 0)];

    while let Some((x, seed_y)) = stack.pop() {
        // Walk up to the top of this run.
        let mut y = seed_y;
        while y > 0 && matcher.matches(image.get_pixel(x, y - 1)) {
            y -= 1;
        }

        let mut reach_left = false;
        let mut reach_right = false;

        // Walk down, clearing, and seed the neighbour columns once per run.
        while y < height && matcher.matches(image.get_pixel(x, y)) {
            image.get_pixel_mut(x, y).0[3] = 0;
            cleared += 1;

            if x > 0 {
                if matcher.matches(image.get_pixel(x - 1, y)) {
                    if !reach_left {
                        stack.push((x - 1, y));
                        reach_left = true;
                    }
                } else {
                    reach_left = false;
                }
            }

            if x + 1 < width {
                if matcher.matches(image.get_pixel(x + 1, y)) {
                    if !reach_right {
                        stack.push((x + 1, y));
                        reach_right = true;
                    }
                } else {
                    reach_right = false;
                }
            }

            y += 1;
        }
    }

    tracing::info!(cleared, width, height, "background removed");
    Ok(cleared)
}
