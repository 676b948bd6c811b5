//! Pre-renders a noise-augmented copy of a study image, for piloting the
//! study with a fixed stimulus instead of the live endpoint.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use snowstudy::snow::{self, SnowParams, SnowSynthesizer};

#[derive(Parser)]
#[command(author, version, about = "Generate a noise-augmented copy of the study image")]
struct Args {
    /// Source image
    input: PathBuf,
    /// Output path; defaults to <stem>_noisy.jpg next to the source
    #[arg(long)]
    output: Option<PathBuf>,
    /// Noise blend intensity
    #[arg(long, default_value_t = 0.35)]
    intensity: f32,
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("image");
    input.with_file_name(format!("{stem}_noisy.jpg"))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let output = args.output.unwrap_or_else(|| default_output(&args.input));

    let source = snow::load_source(&args.input)?;
    let mut synthesizer = SnowSynthesizer::new();
    let result = synthesizer.apply(&source, &SnowParams::offline(args.intensity));
    result
        .save(&output)
        .with_context(|| format!("failed to save noisy image to {}", output.display()))?;

    info!("Noisy image saved to {}", output.display());
    Ok(())
}
