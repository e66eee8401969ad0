pub mod animate;
pub mod metric;
pub mod node;

pub use metric::ErrorMetric;
pub use node::*;

use node::error::BuildError;
use node::image::PixelGrid;

/// Number of bisection steps when searching for a threshold.
const TARGET_SEARCH_STEPS: u32 = 32;

/// Rejects a target compression that is not a fraction between 0 and 1.
pub fn validate_target(target: f64) -> Result<(), BuildError> {
	if !(0. ..=1.).contains(&target) {
		return Err(BuildError::InvalidTarget(target));
	}
	Ok(())
}

impl node::Quadtree {
	/// Builds a tree whose compression ratio reaches `target`, a fraction
	/// between 0 and 1.
	///
	/// `config.threshold` is ignored; the threshold is bisected over the
	/// range of `config.metric` instead, relying on the leaf count never
	/// growing as the threshold grows. The tree with the smallest threshold
	/// found to reach `target` is returned, or the coarsest possible tree
	/// if no threshold reaches it.
	pub fn build_for_target(
		grid: &PixelGrid,
		config: Config,
		target: f64
	) -> Result<Quadtree, BuildError> {
		validate_target(target)?;
		let build_at = |threshold| Quadtree::build(grid, Config { threshold, ..config });

		let finest = build_at(0.)?;
		if finest.stats().ratio() >= target {
			return Ok(finest);
		}
		// Nothing scores above the upper bound, so this is the coarsest tree.
		let mut hi = config.metric.upper_bound() + 1.;
		let mut best = build_at(hi)?;
		if best.stats().ratio() < target {
			return Ok(best);
		}
		let mut lo = 0.;
		for _ in 0..TARGET_SEARCH_STEPS {
			let mid = (lo + hi) / 2.;
			let tree = build_at(mid)?;
			if tree.stats().ratio() >= target {
				hi = mid;
				best = tree;
			} else {
				lo = mid;
			}
		}
		Ok(best)
	}
}
