use std::fmt;

use super::Quadtree;

/// Size figures of a compressed image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompressionStats {
	pub width: u32,
	pub height: u32,
	/// Number of levels in the tree.
	pub depth: u32,
	pub nodes: usize,
	pub leaves: usize,
}

impl CompressionStats {
	pub fn pixel_count(&self) -> u64 {
		self.width as u64 * self.height as u64
	}

	/// Fraction of the original pixels saved by storing one color per leaf
	/// instead.
	pub fn ratio(&self) -> f64 {
		1. - self.leaves as f64 / self.pixel_count() as f64
	}
}

impl fmt::Display for CompressionStats {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "Size before: {} x {} ({} pixels)", self.width, self.height, self.pixel_count())?;
		writeln!(f, "Size after: {} blocks", self.leaves)?;
		writeln!(f, "Compression: {:.2}%", self.ratio() * 100.)?;
		writeln!(f, "Tree depth: {}", self.depth)?;
		write!(f, "Tree nodes: {}", self.nodes)
	}
}

impl Quadtree {
	/// Number of levels in the tree; a lone root counts as 1.
	pub fn depth(&self) -> u32 {
		1 + self.nodes().map(|n| n.depth).max().unwrap_or(0)
	}

	pub fn node_count(&self) -> usize {
		self.nodes().count()
	}

	pub fn leaf_count(&self) -> usize {
		self.leaves().count()
	}

	pub fn internal_count(&self) -> usize {
		self.node_count() - self.leaf_count()
	}

	pub fn stats(&self) -> CompressionStats {
		CompressionStats {
			width: self.width(),
			height: self.height(),
			depth: self.depth(),
			nodes: self.node_count(),
			leaves: self.leaf_count(),
		}
	}
}
