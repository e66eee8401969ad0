use std::io::Write;

use image::codecs::gif::GifEncoder;
use image::{Delay, Frame, ImageResult, Rgba, RgbaImage};

use crate::node::image::PixelGrid;

/// Default time each stage stays on screen.
pub const DEFAULT_DELAY_MS: u32 = 500;

fn to_rgba(img: &PixelGrid) -> RgbaImage {
	RgbaImage::from_fn(img.width(), img.height(), |x, y| {
		let p = img.get_pixel(x, y);
		Rgba([p.0[0], p.0[1], p.0[2], 255])
	})
}

/// Encodes `frames` as an animated GIF, showing each one for `delay_ms`
/// milliseconds.
///
/// Meant for the output of `Quadtree::frames`, which steps through the
/// tree one depth at a time.
pub fn write_gif<W: Write>(frames: &[PixelGrid], writer: W, delay_ms: u32) -> ImageResult<()> {
	let delay = Delay::from_numer_denom_ms(delay_ms, 1);
	let mut encoder = GifEncoder::new(writer);
	encoder.encode_frames(frames.iter().map(|f| Frame::from_parts(to_rgba(f), 0, 0, delay)))
}
