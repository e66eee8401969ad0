use super::error::*;
use super::{Quadtree, QuadtreeNode, Rect};

/// Row-major grid of 8-bit RGB pixels that trees are built from.
pub type PixelGrid = image::RgbImage;

/// Color of block borders when drawing outlines.
const OUTLINE: image::Rgb<u8> = image::Rgb([0, 0, 0]);

/// Assembles a grid from rows of `[r, g, b]` pixels.
///
/// Every row must be as wide as the first, and there must be at least one
/// pixel.
pub fn grid_from_rows(rows: &[Vec<[u8; 3]>]) -> Result<PixelGrid, BuildError> {
	let width = rows.first().map(Vec::len).unwrap_or(0);
	if width == 0 {
		return Err(BuildError::EmptyImage { width, height: rows.len() });
	}
	if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
		return Err(BuildError::RaggedRow { row, expected: width, found: r.len() });
	}
	Ok(PixelGrid::from_fn(width as u32, rows.len() as u32,
		|x, y| image::Rgb(rows[y as usize][x as usize])))
}

/// The pixels of `grid` inside `rect`, row by row.
///
/// `rect` must lie within the grid.
pub(crate) fn region_pixels<'a>(
	grid: &'a PixelGrid,
	rect: Rect
) -> impl Iterator<Item = &'a image::Rgb<u8>> + 'a {
	(rect.y..rect.y + rect.height).flat_map(move |row|
		(rect.x..rect.x + rect.width).map(move |col| grid.get_pixel(col, row)))
}

/// Mean color of the pixels in `rect`, each channel rounded down.
///
/// Fails like `ErrorMetric::compute` if `rect` is empty or does not lie
/// within the grid.
pub fn average_color(grid: &PixelGrid, rect: Rect) -> Result<image::Rgb<u8>, RegionError> {
	rect.check_within(grid)?;
	let count = rect.area();
	let sums = region_pixels(grid, rect).fold([0u64; 3], |mut s, p| {
		s[0] += p.0[0] as u64;
		s[1] += p.0[1] as u64;
		s[2] += p.0[2] as u64;
		s
	});
	Ok(image::Rgb([
		(sums[0] / count) as u8,
		(sums[1] / count) as u8,
		(sums[2] / count) as u8,
	]))
}

fn draw_outline(img: &mut PixelGrid, rect: Rect) {
	let Rect { x, y, width, height } = rect;
	for col in x..x + width {
		img.put_pixel(col, y, OUTLINE);
		img.put_pixel(col, y + height - 1, OUTLINE);
	}
	for row in y..y + height {
		img.put_pixel(x, row, OUTLINE);
		img.put_pixel(x + width - 1, row, OUTLINE);
	}
}

impl QuadtreeNode {
	/// Paints this node into the supplied buffer as solid blocks of color.
	///
	/// Sections are descended into until `depth_limit` is reached; a node
	/// at the limit is painted in its own color even if it has sections.
	/// `None` paints the leaves only.
	///
	/// `outline` gives every painted block a one pixel black border.
	pub fn draw(&self, img: &mut PixelGrid, depth_limit: Option<u32>, outline: bool) {
		match self.sections {
			Some(ref sects) if depth_limit.map_or(true, |limit| self.depth < limit) => {
				for section in sects.iter() {
					section.draw(img, depth_limit, outline);
				}
			},
			_ => {
				image::imageops::replace(
					img,
					&PixelGrid::from_pixel(self.rect.width, self.rect.height, self.color),
					self.rect.x,
					self.rect.y,
				);
				if outline {
					draw_outline(img, self.rect);
				}
			}
		}
	}
}

impl Quadtree {
	/// Reconstructs an image of the original size from the tree.
	///
	/// See `QuadtreeNode::draw` for the meaning of `depth_limit` and
	/// `outline`.
	pub fn render(&self, depth_limit: Option<u32>, outline: bool) -> PixelGrid {
		let mut img = PixelGrid::new(self.width(), self.height());
		self.root.draw(&mut img, depth_limit, outline);
		img
	}

	/// Renders every stage of the compression, from the root alone
	/// (depth 0) up to `self.depth()`.
	pub fn frames(&self, outline: bool) -> Vec<PixelGrid> {
		(0..=self.depth())
			.map(|depth| self.render(Some(depth), outline))
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::metric::ErrorMetric;
	use crate::node::Config;
	use image::Rgb;

	fn checkerboard(size: u32) -> PixelGrid {
		PixelGrid::from_fn(size, size, |x, y| if (x + y) % 2 == 0 {
			Rgb([0, 0, 0])
		} else {
			Rgb([255, 255, 255])
		})
	}

	#[test]
	fn rows_must_be_rectangular() {
		assert_eq!(grid_from_rows(&[]), Err(BuildError::EmptyImage { width: 0, height: 0 }));
		assert_eq!(
			grid_from_rows(&[vec![], vec![]]),
			Err(BuildError::EmptyImage { width: 0, height: 2 })
		);
		assert_eq!(
			grid_from_rows(&[vec![[1, 2, 3]; 3], vec![[1, 2, 3]; 3], vec![[0; 3]; 2]]),
			Err(BuildError::RaggedRow { row: 2, expected: 3, found: 2 })
		);
		let grid = grid_from_rows(&[vec![[1, 2, 3], [4, 5, 6]]]).unwrap();
		assert_eq!(grid.dimensions(), (2, 1));
		assert_eq!(*grid.get_pixel(1, 0), Rgb([4, 5, 6]));
	}

	#[test]
	fn average_rounds_down() {
		let grid = grid_from_rows(&[vec![[1, 10, 255], [2, 11, 254]]]).unwrap();
		assert_eq!(average_color(&grid, Rect::new(0, 0, 2, 1)), Ok(Rgb([1, 10, 254])));
		assert_eq!(average_color(&grid, Rect::new(1, 0, 1, 1)), Ok(Rgb([2, 11, 254])));
	}

	#[test]
	fn average_rejects_bad_regions() {
		let grid = checkerboard(4);
		assert_eq!(average_color(&grid, Rect::new(1, 0, 0, 1)), Err(RegionError::ZeroArea));
		assert_eq!(
			average_color(&grid, Rect::new(3, 3, 2, 1)),
			Err(RegionError::OutOfBounds { width: 4, height: 4 })
		);
	}

	#[test]
	fn full_render_is_lossless_on_pixel_leaves() {
		let grid = checkerboard(8);
		let tree = Quadtree::build(&grid, Config::new(0., ErrorMetric::Variance, 1)).unwrap();
		assert_eq!(tree.render(None, false), grid);
	}

	#[test]
	fn depth_zero_renders_the_average() {
		let grid = checkerboard(8);
		let tree = Quadtree::build(&grid, Config::new(0., ErrorMetric::Variance, 1)).unwrap();
		let coarse = tree.render(Some(0), false);
		assert!(coarse.pixels().all(|p| *p == Rgb([127, 127, 127])));
		assert_ne!(coarse, tree.render(Some(tree.depth()), false));
	}

	#[test]
	fn outlines_frame_each_block() {
		let grid = PixelGrid::from_pixel(4, 3, Rgb([9, 9, 9]));
		let tree = Quadtree::build(&grid, Config::new(1., ErrorMetric::Variance, 1)).unwrap();
		let img = tree.render(None, true);
		for (x, y, p) in img.enumerate_pixels() {
			let border = x == 0 || y == 0 || x == 3 || y == 2;
			assert_eq!(*p, if border { OUTLINE } else { Rgb([9, 9, 9]) }, "at {},{}", x, y);
		}
	}

	#[test]
	fn one_frame_per_depth() {
		let grid = checkerboard(4);
		let tree = Quadtree::build(&grid, Config::new(0., ErrorMetric::Entropy, 1)).unwrap();
		let frames = tree.frames(false);
		assert_eq!(frames.len(), tree.depth() as usize + 1);
		assert!(frames.iter().all(|f| f.dimensions() == grid.dimensions()));
		assert_eq!(frames.last(), Some(&grid));
	}
}
