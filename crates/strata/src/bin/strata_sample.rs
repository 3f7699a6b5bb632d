//! # strata-sample
//!
//! Evaluates one feature of a terrain config over a square of chunks and
//! prints per-chunk statistics.
//!
//! ```bash
//! strata-sample crates/strata/data/terrain.toml --feature elevation --radius 2
//! strata-sample terrain.toml -f water --x -4 --y 10 --seed 99
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use strata::{summarize_region, ChunkCoord, TerrainConfig, TerrainResult};

/// Sample a feature of a terrain config.
#[derive(Debug, Parser)]
#[command(name = "strata-sample", version, about)]
struct Args {
    /// Terrain config (TOML).
    config: PathBuf,

    /// Feature to evaluate.
    #[arg(short, long, default_value = "elevation")]
    feature: String,

    /// Center chunk X.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    x: i32,

    /// Center chunk Y.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    y: i32,

    /// Chunks around the center in each direction.
    #[arg(short, long, default_value_t = 1)]
    radius: u32,

    /// Overrides the seed from the config.
    #[arg(long, allow_negative_numbers = true)]
    seed: Option<i32>,
}

fn run(args: &Args) -> TerrainResult<()> {
    let mut config = TerrainConfig::from_toml_file(&args.config)?;
    if let Some(seed) = args.seed {
        config.generation.seed = seed;
    }
    let generator = config.build_generator()?;

    println!(
        "feature '{}' around [{},{}], radius {}, seed {}",
        args.feature, args.x, args.y, args.radius, config.generation.seed
    );
    for summary in summarize_region(&generator, &args.feature, ChunkCoord::new(args.x, args.y), args.radius)? {
        println!("{summary}");
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("strata-sample: {e}");
            ExitCode::FAILURE
        }
    }
}
