use image::error::ImageError;

use log::{debug, info};

use quadtree_compress::animate;
use quadtree_compress::{Config, ErrorMetric, Quadtree};

use std::fs::File;
use std::io::BufWriter;
use std::str::FromStr;
use std::time::Instant;

/// Helper function for `main`.
fn error_exit(msg: &str, code: i32) -> ! {
	eprintln!("{}", msg);
	std::process::exit(code)
}

/// Maps an `image` failure to a message and exit code.
fn image_error_exit(e: ImageError) -> ! {
	let (msg, code) = match e {
		ImageError::Decoding(_) => ("Invalid image data", 4),
		ImageError::Limits(_) => ("Computation limits exceeded", 5),
		ImageError::IoError(_) => ("File not found or could not be read", 3),
		_ => ("An error occurred", 10)
	};
	error_exit(msg, code)
}

/// Parses an optional argument, falling back to `default` when it is absent.
fn parse_arg<T: FromStr>(matches: &clap::ArgMatches, name: &str, default: &str) -> T {
	match matches.value_of(name).unwrap_or(default).parse() {
		Ok(n) => n,
		Err(_) => error_exit(&format!("Invalid value for {}", name), 2)
	}
}

/// `clap`-based CLI for compressing images with a quadtree.
///
/// May exit process with status code if there are errors:
///
/// 1: `clap` error
///
/// 2: invalid arguments
///
/// 3: file I/O issues
///
/// 4: invalid image data
///
/// 5: computation limits exceeded
///
/// 10: other, potentially unknown error
fn main() {
	env_logger::init();

	let clap_matches = clap::App::new("quadtree_compress")
		.version(env!("CARGO_PKG_VERSION"))
		.author("vkcz")
		.about("Compresses an image by splitting it into a quadtree of flat-colored blocks.")
		.arg_from_usage("-m, --metric=[METRIC] 'Error metric: variance, mad, range, entropy or ssim (or 1-5); defaults to variance'")
		.arg_from_usage("-t, --threshold=[N] 'Error at or above which a block is split; defaults to 100'")
		.arg_from_usage("-b, --min-block=[N] 'Smallest block area, in pixels, a split may produce; defaults to 4'")
		.arg_from_usage("-d, --max-depth=[N] 'Depth past which blocks are never split'")
		.arg_from_usage("-c, --target=[F] 'Target compression between 0 and 1; overrides --threshold unless 0'")
		.arg_from_usage("-g, --gif=[PATH] 'Also write an animation of the compression stages to PATH'")
		.arg_from_usage("--delay=[MS] 'Milliseconds per animation frame; defaults to 500'")
		.arg_from_usage("-l, --outline 'Outline the blocks in the animation'")
		.arg_from_usage("<INPUT> 'Path to input image'")
		.arg_from_usage("[OUTPUT] 'Path to output image; defaults to INPUT with `_compressed.png` appended to its stem'")
		.get_matches();

	let metric: ErrorMetric = match clap_matches.value_of("metric").unwrap_or("variance").parse() {
		Ok(m) => m,
		Err(e) => error_exit(&e.to_string(), 2)
	};
	let mut config = Config::new(
		parse_arg(&clap_matches, "threshold", "100"),
		metric,
		parse_arg(&clap_matches, "min-block", "4"),
	);
	if clap_matches.is_present("max-depth") {
		config = config.max_depth(parse_arg(&clap_matches, "max-depth", "0"));
	}
	let target: f64 = parse_arg(&clap_matches, "target", "0");
	if let Err(e) = quadtree_compress::validate_target(target) {
		error_exit(&e.to_string(), 2)
	}
	let delay = parse_arg(&clap_matches, "delay", "500");

	let input_path = clap_matches.value_of("INPUT").unwrap();
	let start = Instant::now();
	let source = match image::open(input_path) {
		Ok(i) => i,
		Err(e) => image_error_exit(e)
	}.into_rgb8();
	debug!("loaded {} ({}x{})", input_path, source.width(), source.height());

	let built = if target > 0. {
		Quadtree::build_for_target(&source, config, target)
	} else {
		Quadtree::build(&source, config)
	};
	let tree = match built {
		Ok(t) => t,
		Err(e) => error_exit(&e.to_string(), if e.is_invalid_image() { 4 } else { 2 })
	};
	let elapsed = start.elapsed();
	if target > 0. {
		info!("threshold {} reaches target {}", tree.config.threshold, target);
	}

	println!("Execution time: {:.3} s", elapsed.as_secs_f64());
	println!("{}", tree.stats());

	let output_path = clap_matches.value_of("OUTPUT").map(str::to_string)
		.unwrap_or_else(|| input_path.rsplitn(2, '.').last().unwrap().to_string() + "_compressed.png");
	if let Err(e) = tree.render(None, false).save(&output_path) {
		debug!("saving {} failed: {}", output_path, e);
		error_exit("Could not save output", 3)
	}
	println!("Compressed image saved to {}", output_path);

	if let Some(gif_path) = clap_matches.value_of("gif") {
		let frames = tree.frames(clap_matches.is_present("outline"));
		debug!("encoding {} frames", frames.len());
		let out_fh = match File::create(gif_path) {
			Ok(f) => f,
			Err(_) => error_exit("Could not open animation file", 3)
		};
		match animate::write_gif(&frames, BufWriter::new(out_fh), delay) {
			Ok(()) => println!("Animation saved to {}", gif_path),
			Err(ImageError::IoError(_)) => error_exit("Could not write to animation file", 3),
			Err(e) => image_error_exit(e)
		}
	}
}
