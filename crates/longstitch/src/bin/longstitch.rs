//! Stitch an ordered set of scroll screenshots from disk into one image.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{info, warn, LevelFilter};

use longstitch::convert::{dynamic_from_frame, frame_from_dynamic};
use longstitch::{SessionConfig, StitchOutcome, StitchSession};

#[derive(Parser, Debug)]
#[command(
    name = "longstitch",
    version,
    about = "Stitch scroll screenshots into one tall image"
)]
struct Args {
    /// Input frames in capture order.
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Output path; the extension selects the encoder.
    #[arg(short, long, default_value = "stitched.png")]
    output: PathBuf,

    /// Columns excluded from the right edge of row fingerprints, covering
    /// the scrollbar. Overrides the config file.
    #[arg(long)]
    ignore_right: Option<usize>,

    /// Minimum overlap as a fraction of frame height. Overrides the config
    /// file.
    #[arg(long)]
    min_overlap_ratio: Option<f32>,

    /// Accept the best match even when it would shrink the composite.
    #[arg(long)]
    tolerate_shrink: bool,

    /// Session configuration as JSON; explicit flags override its fields.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log progress to stderr; repeat for debug output.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn build_config(args: &Args) -> Result<SessionConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => SessionConfig::default(),
    };
    if let Some(margin) = args.ignore_right {
        config.signature.ignore_right_margin = margin;
    }
    if let Some(ratio) = args.min_overlap_ratio {
        config.matcher.min_overlap_ratio = ratio;
    }
    if args.tolerate_shrink {
        config.shrink_policy = longstitch::ShrinkPolicy::TolerateBestEffort;
    }
    Ok(config)
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = StitchSession::new(build_config(args)?);

    for path in &args.images {
        let img = image::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
        let frame = frame_from_dynamic(&img)?;
        match session.add_frame(&frame)? {
            StitchOutcome::Accepted {
                new_height,
                overlap_len,
            } => info!(
                "{}: {overlap_len}-row overlap, composite at {new_height} rows",
                path.display()
            ),
            StitchOutcome::NoOverlap => {
                warn!("{}: no overlap found, appended verbatim", path.display())
            }
            StitchOutcome::ShrinkRejected => {
                warn!("{}: match would shrink the composite, skipped", path.display())
            }
            StitchOutcome::EngineFailure => {
                warn!("{}: engine could not place the frame", path.display())
            }
        }
    }

    let composite = session
        .export()
        .ok_or("no frames were stitched; nothing to write")?;
    dynamic_from_frame(&composite)?.save(&args.output)?;
    info!(
        "wrote {} ({} rows from {} frames)",
        args.output.display(),
        composite.height(),
        args.images.len()
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if longstitch::core::init_with_level(level).is_err() {
        eprintln!("warning: a logger is already installed");
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
