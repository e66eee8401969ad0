use image::Rgb;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use quadtree_compress::image::PixelGrid;
use quadtree_compress::{Config, ErrorMetric, Quadtree, QuadtreeNode};

/// Grids of random size made of a few flat patches with some noise, so trees
/// end up with a mix of shallow and deep branches.
fn random_grids(seed: u64, count: usize) -> Vec<PixelGrid> {
	let mut rng = StdRng::seed_from_u64(seed);
	(0..count).map(|_| {
		let (w, h) = (rng.gen_range(1..48), rng.gen_range(1..48));
		let patch = rng.gen_range(1..12);
		let palette: Vec<[u8; 3]> = (0..4).map(|_| rng.gen()).collect();
		let noise = rng.gen_range(0..40u8);
		PixelGrid::from_fn(w, h, |x, y| {
			let base = palette[((x / patch + y / patch) % 4) as usize];
			let n = if noise == 0 { 0 } else { rng.gen_range(0..noise) };
			Rgb([base[0].saturating_add(n), base[1].saturating_sub(n), base[2]])
		})
	}).collect()
}

fn configs() -> Vec<Config> {
	let mut configs = Vec::new();
	for metric in ErrorMetric::ALL.iter() {
		let scale = metric.upper_bound();
		for (fraction, min_block) in [(0., 1), (0.001, 1), (0.01, 3), (0.1, 8)].iter() {
			configs.push(Config::new(scale * fraction, *metric, *min_block));
		}
	}
	configs
}

fn check_sections(node: &QuadtreeNode) {
	let sects = match node.sections {
		Some(ref s) => s,
		None => return,
	};
	let p = node.rect;
	let [nw, ne, sw, se] = [sects[0].rect, sects[1].rect, sects[2].rect, sects[3].rect];
	assert_eq!((nw.x, nw.y), (p.x, p.y));
	assert_eq!((ne.x, ne.y), (nw.x + nw.width, p.y));
	assert_eq!((sw.x, sw.y), (p.x, nw.y + nw.height));
	assert_eq!((se.x, se.y), (ne.x, sw.y));
	assert_eq!(nw.width + ne.width, p.width);
	assert_eq!(nw.height + sw.height, p.height);
	assert_eq!((sw.width, se.width), (nw.width, ne.width));
	assert_eq!((ne.height, se.height), (nw.height, sw.height));
	assert_eq!(sects.iter().map(|s| s.rect.area()).sum::<u64>(), p.area());
	for s in sects.iter() {
		assert_eq!(s.depth, node.depth + 1);
		check_sections(s);
	}
}

#[test]
fn sections_tile_their_parent() {
	for grid in random_grids(1, 24) {
		for config in configs() {
			let tree = Quadtree::build(&grid, config).unwrap();
			assert_eq!(tree.root.depth, 0);
			check_sections(&tree.root);

			// Leaves cover every pixel exactly once.
			let mut cover = vec![0u8; (grid.width() * grid.height()) as usize];
			for leaf in tree.leaves() {
				for y in leaf.rect.y..leaf.rect.y + leaf.rect.height {
					for x in leaf.rect.x..leaf.rect.x + leaf.rect.width {
						cover[(y * grid.width() + x) as usize] += 1;
					}
				}
			}
			assert!(cover.iter().all(|&c| c == 1));
		}
	}
}

#[test]
fn counts_add_up() {
	for grid in random_grids(2, 24) {
		for config in configs() {
			let tree = Quadtree::build(&grid, config).unwrap();
			assert_eq!(tree.leaf_count() + tree.internal_count(), tree.node_count());
			// Every split adds exactly three nodes.
			assert_eq!(tree.leaf_count(), 1 + 3 * tree.internal_count());
			let stats = tree.stats();
			assert_eq!(stats.pixel_count(), grid.width() as u64 * grid.height() as u64);
			assert!(stats.ratio() >= 0. && stats.ratio() < 1.);
			assert!(stats.depth >= 1);
		}
	}
}

#[test]
fn leaves_respect_the_minimum_block_size() {
	for grid in random_grids(3, 24) {
		for config in configs() {
			let tree = Quadtree::build(&grid, config).unwrap();
			for leaf in tree.leaves().filter(|l| l.depth > 0) {
				assert!(leaf.rect.area() >= config.min_block_size as u64);
			}
		}
	}
}

#[test]
fn building_is_deterministic() {
	for grid in random_grids(4, 12) {
		for config in configs() {
			let a = Quadtree::build(&grid, config).unwrap();
			let b = Quadtree::build(&grid, config).unwrap();
			assert_eq!(a, b);
			assert_eq!(a.render(None, false), b.render(None, false));
		}
	}
}

#[test]
fn higher_thresholds_never_add_leaves() {
	for grid in random_grids(5, 12) {
		for metric in ErrorMetric::ALL.iter() {
			let mut last = usize::MAX;
			for step in 0..=20 {
				let threshold = metric.upper_bound() * step as f64 / 20.;
				let leaves = Quadtree::build(&grid, Config::new(threshold, *metric, 1)).unwrap().leaf_count();
				assert!(leaves <= last, "{} at {}: {} > {}", metric, threshold, leaves, last);
				last = leaves;
			}
		}
	}
}

#[test]
fn leaf_colors_are_block_averages() {
	for grid in random_grids(6, 12) {
		let tree = Quadtree::build(&grid, Config::new(0., ErrorMetric::Variance, 2)).unwrap();
		for node in tree.nodes() {
			assert_eq!(Ok(node.color), quadtree_compress::image::average_color(&grid, node.rect));
		}
	}
}
