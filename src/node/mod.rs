pub mod error;

use std::fmt;

use crate::metric::ErrorMetric;

/// A rectangular block of an image, addressed by its top-left corner
/// and extent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
	pub x: u32,
	pub y: u32,
	pub width: u32,
	pub height: u32,
}

impl Rect {
	pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
		Rect { x, y, width, height }
	}

	/// Number of pixels covered.
	pub fn area(&self) -> u64 {
		self.width as u64 * self.height as u64
	}

	pub fn is_empty(&self) -> bool {
		self.area() == 0
	}

	/// Area of the smallest of the four `quarters`.
	pub fn smallest_quarter_area(&self) -> u64 {
		(self.width / 2) as u64 * (self.height / 2) as u64
	}

	/// Splits the block into its NW, NE, SW and SE quarters.
	///
	/// On an odd extent the extra column or row goes to the east or south
	/// half, so the quarters always tile the block exactly.
	pub fn quarters(&self) -> [Rect; 4] {
		let (w0, h0) = (self.width / 2, self.height / 2);
		let (w1, h1) = (self.width - w0, self.height - h0);
		[
			Rect::new(self.x, self.y, w0, h0),
			Rect::new(self.x + w0, self.y, w1, h0),
			Rect::new(self.x, self.y + h0, w0, h1),
			Rect::new(self.x + w0, self.y + h0, w1, h1),
		]
	}

	/// Checks that the block is non-empty and lies inside `grid`.
	pub fn check_within(&self, grid: &self::image::PixelGrid) -> Result<(), error::RegionError> {
		if self.is_empty() {
			return Err(error::RegionError::ZeroArea);
		}
		if self.x as u64 + self.width as u64 > grid.width() as u64 ||
			self.y as u64 + self.height as u64 > grid.height() as u64 {
			return Err(error::RegionError::OutOfBounds {
				width: grid.width(),
				height: grid.height(),
			});
		}
		Ok(())
	}
}

/// Node in a quadtree describing one block of an image.
///
/// May contain subnodes (branch node) or no subnodes (leaf node).
///
/// It always carries the average color of its block, such that tree descent
/// can stop at any level and give a meaningful preview.
#[derive(Clone, Debug, PartialEq)]
pub struct QuadtreeNode {
	pub rect: Rect,
	/// Distance from the root; the root is at depth 0.
	pub depth: u32,
	pub color: ::image::Rgb<u8>,
	/// NW, NE, SW and SE quarters, in that order.
	pub sections: Option<Box<[QuadtreeNode; 4]>>,
}

impl QuadtreeNode {
	pub fn is_leaf(&self) -> bool {
		self.sections.is_none()
	}
}

/// Parameters for building a `Quadtree`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
	/// Blocks scoring at least this much are split.
	pub threshold: f64,
	/// Smallest area, in pixels, a split may produce.
	pub min_block_size: u32,
	pub metric: ErrorMetric,
	/// Nodes at this depth are never split.
	pub max_depth: Option<u32>,
}

impl Config {
	pub fn new(threshold: f64, metric: ErrorMetric, min_block_size: u32) -> Self {
		Config { threshold, min_block_size, metric, max_depth: None }
	}

	pub fn max_depth(mut self, depth: u32) -> Self {
		self.max_depth = Some(depth);
		self
	}

	/// Rejects parameters that cannot drive a build.
	pub fn validate(&self) -> Result<(), error::BuildError> {
		if !self.threshold.is_finite() || self.threshold < 0. {
			return Err(error::BuildError::InvalidThreshold(self.threshold));
		}
		if self.min_block_size == 0 {
			return Err(error::BuildError::InvalidMinBlockSize);
		}
		Ok(())
	}
}

/// A compressed image: the tree of blocks plus the parameters it was
/// built with.
#[derive(Clone, Debug, PartialEq)]
pub struct Quadtree {
	pub root: QuadtreeNode,
	pub config: Config,
}

impl Quadtree {
	pub fn width(&self) -> u32 {
		self.root.rect.width
	}

	pub fn height(&self) -> u32 {
		self.root.rect.height
	}

	/// Every node of the tree, parents before their sections.
	pub fn nodes(&self) -> Nodes<'_> {
		Nodes { stack: vec![&self.root] }
	}

	pub fn leaves(&self) -> impl Iterator<Item = &QuadtreeNode> {
		self.nodes().filter(|n| n.is_leaf())
	}
}

/// Pre-order iterator over the nodes of a `Quadtree`.
pub struct Nodes<'a> {
	stack: Vec<&'a QuadtreeNode>,
}

impl<'a> Iterator for Nodes<'a> {
	type Item = &'a QuadtreeNode;

	fn next(&mut self) -> Option<Self::Item> {
		let node = self.stack.pop()?;
		if let Some(ref sects) = node.sections {
			self.stack.extend(sects.iter().rev());
		}
		Some(node)
	}
}

/// One line per node, indented by depth.
impl fmt::Display for Quadtree {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for node in self.nodes() {
			let Rect { x, y, width, height } = node.rect;
			let [r, g, b] = node.color.0;
			write!(f, "{:indent$}{},{} {}x{} #{:02x}{:02x}{:02x}",
				"", x, y, width, height, r, g, b, indent = 2 * node.depth as usize)?;
			if node.is_leaf() {
				f.write_str(" leaf")?;
			}
			writeln!(f)?;
		}
		Ok(())
	}
}

pub mod build;
pub mod image;
pub mod stats;
