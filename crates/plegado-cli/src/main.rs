//! Plegado CLI - offline WAV renderer for the plegado pipeline.

mod wav;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use plegado_core::StereoBuffer;
use plegado_engine::{ParamKey, PlegadoProcessor, Processor};

#[derive(Parser)]
#[command(name = "plegado")]
#[command(author, version, about = "Plegado waveshaper/disperser CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a WAV file through the pipeline
    Process(ProcessArgs),

    /// List the parameter registry
    Params,
}

#[derive(Args)]
struct ProcessArgs {
    /// Input WAV file (16/24/32-bit int or 32-bit float, mono or stereo)
    input: PathBuf,

    /// Output WAV file (32-bit float stereo)
    output: PathBuf,

    /// Waveshaper drive (0-10)
    #[arg(long)]
    drive: Option<f32>,

    /// Dry level (0-1)
    #[arg(long)]
    dry: Option<f32>,

    /// Wet level (0-0.7)
    #[arg(long)]
    wet: Option<f32>,

    /// Stereo width (0-0.25)
    #[arg(long)]
    width: Option<f32>,

    /// Envelope modulation amount (0-1)
    #[arg(long)]
    env_amount: Option<f32>,

    /// Waveshape morph: 0=Chebyshev, 1=SineFold, 2=Triangle, 3=Foldback
    #[arg(long)]
    morph: Option<f32>,

    /// Spectral tilt in dB (-12 to 12)
    #[arg(long)]
    tilt: Option<f32>,

    /// Disperser amount (0-1)
    #[arg(long)]
    disperser_amount: Option<f32>,

    /// Disperser center frequency in Hz (20-20000)
    #[arg(long)]
    disperser_freq: Option<f32>,

    /// Disperser pinch (0.1-10)
    #[arg(long)]
    disperser_pinch: Option<f32>,

    /// Disable oversampling (faster, more aliasing)
    #[arg(long)]
    no_oversampling: bool,

    /// Processing block size in samples
    #[arg(long, default_value_t = 512)]
    block_size: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Process(args) => run_process(args),
        Commands::Params => run_params(),
    }
}

fn run_process(args: ProcessArgs) -> anyhow::Result<()> {
    let input = wav::read_stereo(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let block_size = args.block_size.clamp(16, 8192);
    let mut processor = PlegadoProcessor::new();
    processor
        .prepare(f64::from(input.sample_rate), block_size, 2)
        .context("preparing pipeline")?;

    let flags = [
        ("drive", args.drive),
        ("dry_level", args.dry),
        ("wet_level", args.wet),
        ("stereo_width", args.width),
        ("env_amount", args.env_amount),
        ("shape_morph", args.morph),
        ("tilt", args.tilt),
        ("disperser_amount", args.disperser_amount),
        ("disperser_freq", args.disperser_freq),
        ("disperser_pinch", args.disperser_pinch),
    ];
    for (id, value) in flags {
        if let Some(value) = value {
            processor.parameter_changed(id, value);
        }
    }
    if args.no_oversampling {
        processor.parameter_changed("oversampling", 0.0);
    }

    let total = input.left.len();
    let mut out_left = vec![0.0f32; total];
    let mut out_right = vec![0.0f32; total];
    let mut block = StereoBuffer::new(block_size);

    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} samples ({eta})")
            .expect("valid progress template"),
    );

    let mut offset = 0;
    while offset < total {
        let n = (total - offset).min(block_size);
        block.resize(n);
        block.left[..n].copy_from_slice(&input.left[offset..offset + n]);
        block.right[..n].copy_from_slice(&input.right[offset..offset + n]);

        processor.process(&mut block);

        out_left[offset..offset + n].copy_from_slice(&block.left[..n]);
        out_right[offset..offset + n].copy_from_slice(&block.right[..n]);
        block.resize(block_size);

        offset += n;
        bar.set_position(offset as u64);
    }
    bar.finish();

    wav::write_stereo(&args.output, &out_left, &out_right, input.sample_rate)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!(
        "Rendered {} samples at {} Hz (latency {} samples)",
        total,
        input.sample_rate,
        processor.latency_samples()
    );
    Ok(())
}

fn run_params() -> anyhow::Result<()> {
    println!(
        "{:<22} {:<18} {:>10} {:>10} {:>10}",
        "id", "name", "min", "max", "default"
    );
    for key in ParamKey::ALL {
        let d = key.descriptor();
        println!(
            "{:<22} {:<18} {:>10} {:>10} {:>10}",
            d.string_id, d.name, d.min, d.max, d.default
        );
    }
    Ok(())
}
