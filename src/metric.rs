use std::fmt;
use std::str::FromStr;

use crate::node::error::{RegionError, UnknownMetric};
use crate::node::image::{region_pixels, PixelGrid};
use crate::node::Rect;

/// Stabilizing constants of the SSIM formula for an 8-bit dynamic range.
const SSIM_C1: f64 = (0.01 * 255.) * (0.01 * 255.);
const SSIM_C2: f64 = (0.03 * 255.) * (0.03 * 255.);

/// Ways of scoring how heterogeneous a block of pixels is.
///
/// Every variant yields a non-negative number where larger means "less
/// uniform", so a block is worth splitting when its score reaches the
/// threshold. `StructuralSimilarity` reports `1 - SSIM` to fit that rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorMetric {
	/// Mean squared deviation from the block mean, summed over channels.
	Variance,
	/// Mean absolute deviation from the block mean, summed over channels.
	MeanAbsoluteDeviation,
	/// Spread between the darkest and brightest value, averaged over channels.
	MaxChannelRange,
	/// Shannon entropy of each channel's histogram, averaged over channels.
	Entropy,
	/// Luma dissimilarity between the block and the block shifted one column
	/// to the right, repeating its last column.
	StructuralSimilarity,
}

impl ErrorMetric {
	/// Every metric, in the order of their numeric selectors.
	pub const ALL: [ErrorMetric; 5] = [
		ErrorMetric::Variance,
		ErrorMetric::MeanAbsoluteDeviation,
		ErrorMetric::MaxChannelRange,
		ErrorMetric::Entropy,
		ErrorMetric::StructuralSimilarity,
	];

	/// Scores the pixels of `grid` inside `rect`.
	///
	/// Fails if `rect` is empty or does not lie within the grid.
	pub fn compute(&self, grid: &PixelGrid, rect: Rect) -> Result<f64, RegionError> {
		rect.check_within(grid)?;
		Ok(match self {
			ErrorMetric::Variance => variance(grid, rect),
			ErrorMetric::MeanAbsoluteDeviation => mean_absolute_deviation(grid, rect),
			ErrorMetric::MaxChannelRange => max_channel_range(grid, rect),
			ErrorMetric::Entropy => entropy(grid, rect),
			ErrorMetric::StructuralSimilarity => structural_dissimilarity(grid, rect),
		})
	}

	/// The largest score the metric can give to any block of 8-bit pixels.
	pub fn upper_bound(&self) -> f64 {
		match self {
			ErrorMetric::Variance => 3. * 127.5 * 127.5,
			ErrorMetric::MeanAbsoluteDeviation => 3. * 127.5,
			ErrorMetric::MaxChannelRange => 255.,
			ErrorMetric::Entropy => 8.,
			ErrorMetric::StructuralSimilarity => 2.,
		}
	}

	/// Short name, as accepted by `from_str`.
	pub fn name(&self) -> &'static str {
		match self {
			ErrorMetric::Variance => "variance",
			ErrorMetric::MeanAbsoluteDeviation => "mad",
			ErrorMetric::MaxChannelRange => "range",
			ErrorMetric::Entropy => "entropy",
			ErrorMetric::StructuralSimilarity => "ssim",
		}
	}
}

impl Default for ErrorMetric {
	fn default() -> Self {
		ErrorMetric::Variance
	}
}

impl fmt::Display for ErrorMetric {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for ErrorMetric {
	type Err = UnknownMetric;

	/// Accepts short names as well as the numbers 1 to 5.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"1" | "variance" | "var" => Ok(ErrorMetric::Variance),
			"2" | "mad" | "mean-absolute-deviation" => Ok(ErrorMetric::MeanAbsoluteDeviation),
			"3" | "range" | "max" | "max-pixel-difference" => Ok(ErrorMetric::MaxChannelRange),
			"4" | "entropy" => Ok(ErrorMetric::Entropy),
			"5" | "ssim" => Ok(ErrorMetric::StructuralSimilarity),
			_ => Err(UnknownMetric(s.to_string())),
		}
	}
}

fn channel_means(grid: &PixelGrid, rect: Rect) -> [f64; 3] {
	let sums = region_pixels(grid, rect).fold([0u64; 3], |mut s, p| {
		s[0] += p.0[0] as u64;
		s[1] += p.0[1] as u64;
		s[2] += p.0[2] as u64;
		s
	});
	let count = rect.area() as f64;
	[sums[0] as f64 / count, sums[1] as f64 / count, sums[2] as f64 / count]
}

/// Sums `deviation(pixel - mean)` over every channel of every pixel, divided
/// by the pixel count.
fn mean_deviation(grid: &PixelGrid, rect: Rect, deviation: impl Fn(f64) -> f64) -> f64 {
	let mean = channel_means(grid, rect);
	let total: f64 = region_pixels(grid, rect)
		.map(|p| (0..3).map(|c| deviation(p.0[c] as f64 - mean[c])).sum::<f64>())
		.sum();
	total / rect.area() as f64
}

fn variance(grid: &PixelGrid, rect: Rect) -> f64 {
	mean_deviation(grid, rect, |d| d * d)
}

fn mean_absolute_deviation(grid: &PixelGrid, rect: Rect) -> f64 {
	mean_deviation(grid, rect, f64::abs)
}

fn max_channel_range(grid: &PixelGrid, rect: Rect) -> f64 {
	let (min, max) = region_pixels(grid, rect).fold(
		([u8::MAX; 3], [u8::MIN; 3]),
		|(mut min, mut max), p| {
			for c in 0..3 {
				min[c] = min[c].min(p.0[c]);
				max[c] = max[c].max(p.0[c]);
			}
			(min, max)
		},
	);
	(0..3).map(|c| (max[c] - min[c]) as f64).sum::<f64>() / 3.
}

fn entropy(grid: &PixelGrid, rect: Rect) -> f64 {
	let mut histograms = [[0u32; 256]; 3];
	for p in region_pixels(grid, rect) {
		for c in 0..3 {
			histograms[c][p.0[c] as usize] += 1;
		}
	}
	let count = rect.area() as f64;
	histograms.iter()
		.map(|h| h.iter()
			.filter(|&&n| n > 0)
			.map(|&n| {
				let p = n as f64 / count;
				-p * p.log2()
			})
			.sum::<f64>())
		.sum::<f64>() / 3.
}

fn luma(p: &image::Rgb<u8>) -> f64 {
	0.299 * p.0[0] as f64 + 0.587 * p.0[1] as f64 + 0.114 * p.0[2] as f64
}

fn structural_dissimilarity(grid: &PixelGrid, rect: Rect) -> f64 {
	// The shifted window stays inside the block.
	let last_col = rect.x + rect.width - 1;
	let samples = || (rect.y..rect.y + rect.height).flat_map(move |row| {
		(rect.x..rect.x + rect.width).map(move |col| (
			luma(grid.get_pixel(col, row)),
			luma(grid.get_pixel((col + 1).min(last_col), row)),
		))
	});
	let count = rect.area() as f64;
	let (sum_a, sum_b) = samples().fold((0., 0.), |(a, b), (x, y)| (a + x, b + y));
	let (mean_a, mean_b) = (sum_a / count, sum_b / count);
	let (var_a, var_b, cov) = samples().fold((0., 0., 0.), |(va, vb, cv), (x, y)| {
		let (da, db) = (x - mean_a, y - mean_b);
		(va + da * da, vb + db * db, cv + da * db)
	});
	let (var_a, var_b, cov) = (var_a / count, var_b / count, cov / count);
	let ssim = ((2. * mean_a * mean_b + SSIM_C1) * (2. * cov + SSIM_C2))
		/ ((mean_a * mean_a + mean_b * mean_b + SSIM_C1) * (var_a + var_b + SSIM_C2));
	(1. - ssim).max(0.)
}
