use thiserror::Error;

/// Reason why a quadtree couldn't be built from a pixel grid.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum BuildError {
	/// The grid has no rows or no columns.
	#[error("image must have at least one row and one column, got {width}x{height}")]
	EmptyImage { width: usize, height: usize },
	/// A row of the grid is not as wide as the first one.
	#[error("row {row} has {found} pixels, expected {expected}")]
	RaggedRow { row: usize, expected: usize, found: usize },
	/// The threshold is negative, infinite or NaN.
	#[error("threshold must be a finite non-negative number, got {0}")]
	InvalidThreshold(f64),
	/// The minimum block size is zero.
	#[error("minimum block size must be at least 1")]
	InvalidMinBlockSize,
	/// A target compression outside of `[0, 1]`.
	#[error("target compression must be between 0 and 1, got {0}")]
	InvalidTarget(f64),
}

impl BuildError {
	/// Whether the error is about the shape of the input grid rather than
	/// the parameters.
	pub fn is_invalid_image(&self) -> bool {
		matches!(self, BuildError::EmptyImage { .. } | BuildError::RaggedRow { .. })
	}
}

/// Reason why an error metric couldn't be evaluated over a region.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RegionError {
	/// The region covers no pixels.
	#[error("region has zero area")]
	ZeroArea,
	/// The region extends past the edge of the grid.
	#[error("region exceeds the {width}x{height} grid")]
	OutOfBounds { width: u32, height: u32 },
}

/// Reason why a metric name couldn't be parsed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown error metric `{0}`")]
pub struct UnknownMetric(pub String);
