use super::error::*;
use super::image::{average_color, PixelGrid};
use super::{Config, Quadtree, QuadtreeNode, Rect};

/// A node visited by the construction pass, waiting to be assembled.
struct Visited {
	rect: Rect,
	depth: u32,
	color: image::Rgb<u8>,
	split: bool,
}

/// Takes the most recently assembled node.
fn pop_section(assembled: &mut Vec<QuadtreeNode>) -> QuadtreeNode {
	match assembled.pop() {
		Some(node) => node,
		None => unreachable!("split node assembled with fewer than four sections"),
	}
}

impl Quadtree {
	/// Analyzes a pixel grid into a quadtree.
	///
	/// A block is split into quarters when its score under `config.metric`
	/// reaches `config.threshold`, as long as the smallest quarter still
	/// covers at least `config.min_block_size` pixels and the block is
	/// shallower than `config.max_depth`. Otherwise it becomes a leaf
	/// holding its average color.
	///
	/// Blocks are visited with an explicit stack, so the call stack does
	/// not grow with the tree.
	pub fn build(grid: &PixelGrid, config: Config) -> Result<Quadtree, BuildError> {
		config.validate()?;
		if grid.width() == 0 || grid.height() == 0 {
			return Err(BuildError::EmptyImage {
				width: grid.width() as usize,
				height: grid.height() as usize,
			});
		}

		// First pass, pre-order: score every block and decide whether it splits.
		let mut pending = vec![(Rect::new(0, 0, grid.width(), grid.height()), 0)];
		let mut visited = Vec::new();
		while let Some((rect, depth)) = pending.pop() {
			let scored = config.metric.compute(grid, rect)
				.and_then(|error| average_color(grid, rect).map(|color| (error, color)));
			let (error, color) = match scored {
				Ok(s) => s,
				// Quarters of an in-bounds block with a non-empty smallest
				// quarter are themselves in bounds and non-empty.
				Err(e) => unreachable!("block {:?} rejected: {}", rect, e),
			};
			let split = error >= config.threshold &&
				rect.smallest_quarter_area() >= config.min_block_size as u64 &&
				config.max_depth.map_or(true, |max| depth < max);
			if split {
				// Reversed so that the NW quarter is visited first.
				for quarter in rect.quarters().iter().rev() {
					pending.push((*quarter, depth + 1));
				}
			}
			visited.push(Visited { rect, depth, color, split });
		}

		// Second pass, reverse pre-order: every block comes after its sections,
		// which sit on top of `assembled` with the NW quarter last in.
		let mut assembled: Vec<QuadtreeNode> = Vec::new();
		for v in visited.into_iter().rev() {
			let sections = if v.split {
				Some(Box::new([
					pop_section(&mut assembled),
					pop_section(&mut assembled),
					pop_section(&mut assembled),
					pop_section(&mut assembled),
				]))
			} else {
				None
			};
			assembled.push(QuadtreeNode {
				rect: v.rect,
				depth: v.depth,
				color: v.color,
				sections,
			});
		}
		let root = pop_section(&mut assembled);
		Ok(Quadtree { root, config })
	}
}
