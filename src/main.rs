//! red_vision: thresholding and red-region detection from the command line
//!
//! ```bash
//! red_vision --assets assets threshold apple.png --cutoff 128
//! red_vision detect apple.png --sensitivity 1.5 --report apple.json
//! red_vision generate dots.png --seed 42
//! red_vision batch a.png b.png c.png --percent 50 --workers 4
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use red_vision::config::{AnalysisConfig, load_config};
use red_vision::core_modules::test_image_generator::{self, GeneratorConfig, Polarity};
use red_vision::core_modules::utils::image_helper::ImageStore;
use red_vision::parallel_pipeline::{BatchProcessor, summarize};
use red_vision::{ImageSession, Operation, ThresholdSpec};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "red_vision")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbosity level (-v for debug output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory relative image names are read from
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    /// Directory results are written to
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Binarize an image at an absolute or percentage cutoff
    Threshold {
        image: PathBuf,
        #[command(flatten)]
        cutoff: CutoffArgs,
    },

    /// Write a mask of red-dominant pixels and print the red fraction
    Detect {
        image: PathBuf,
        /// Margin red must exceed green and blue by
        #[arg(long)]
        sensitivity: Option<f64>,
        /// Also write a JSON summary to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Synthesize a background with random disks
    Generate {
        name: PathBuf,
        #[arg(long, default_value_t = 400)]
        width: usize,
        #[arg(long, default_value_t = 400)]
        height: usize,
        #[arg(long, default_value_t = 25)]
        dots: usize,
        #[arg(long, default_value_t = 5)]
        min_radius: u32,
        #[arg(long, default_value_t = 20)]
        max_radius: u32,
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Synthesize a 256x256 grayscale ramp
    Gradient {
        name: PathBuf,
        #[arg(long)]
        inverted: bool,
    },

    /// Apply one operation to many images in parallel
    Batch {
        #[arg(required = true)]
        images: Vec<PathBuf>,
        #[command(flatten)]
        operation: BatchOperationArgs,
        /// Worker count (defaults to one per CPU)
        #[arg(long)]
        workers: Option<usize>,
    },
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct CutoffArgs {
    /// Absolute cutoff in [0, 255]
    #[arg(long)]
    cutoff: Option<i32>,
    /// Cutoff as a percentage of full scale in [0, 100]
    #[arg(long)]
    percent: Option<f64>,
}

impl CutoffArgs {
    fn spec(&self) -> Option<ThresholdSpec> {
        self.cutoff
            .map(ThresholdSpec::Absolute)
            .or(self.percent.map(ThresholdSpec::Percentage))
    }
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct BatchOperationArgs {
    /// Threshold every image at this absolute cutoff in [0, 255]
    #[arg(long)]
    cutoff: Option<i32>,
    /// Threshold every image at this percentage of full scale in [0, 100]
    #[arg(long)]
    percent: Option<f64>,
    /// Run redness detection with this sensitivity
    #[arg(long)]
    sensitivity: Option<f64>,
}

impl BatchOperationArgs {
    fn operation(&self) -> Option<Operation> {
        if let Some(sensitivity) = self.sensitivity {
            return Some(Operation::RednessDetect { sensitivity });
        }
        self.cutoff
            .map(ThresholdSpec::Absolute)
            .or(self.percent.map(ThresholdSpec::Percentage))
            .map(Operation::Threshold)
    }
}

/// Install the tracing subscriber. `-v` forces debug, otherwise `RUST_LOG` or info.
fn init_tracing(verbose: u8) {
    let env_filter = if verbose > 0 {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init()
        .ok();
}

fn build_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(assets) = &cli.assets {
        config.assets_dir = assets.clone();
    }
    if let Some(output) = &cli.output {
        config.output_dir = Some(output.clone());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut config = build_config(&cli)?;

    match cli.command {
        Commands::Threshold { image, cutoff } => {
            let spec = cutoff.spec().context("a cutoff is required")?;
            let mut session = ImageSession::open(&config, &image)?;
            session.run(Operation::Threshold(spec))?;
            let written = session.save_result()?;
            println!("{}", written.display());
        }
        Commands::Detect {
            image,
            sensitivity,
            report,
        } => {
            let sensitivity = sensitivity.unwrap_or(config.sensitivity);
            let mut session = ImageSession::open(&config, &image)?;
            let fraction = session
                .run(Operation::RednessDetect { sensitivity })?
                .red_fraction()
                .context("redness detection produced no red fraction")?;
            let written = session.save_result()?;
            if let Some(report) = report {
                let summary = session.write_summary(&report, Some(written.clone()))?;
                info!(path = %summary.display(), "wrote detection summary");
            }
            println!("{}\tred_fraction={fraction:.6}", written.display());
        }
        Commands::Generate {
            name,
            width,
            height,
            dots,
            min_radius,
            max_radius,
            seed,
        } => {
            let generator = GeneratorConfig {
                width,
                height,
                dot_count: dots,
                radius_range: (min_radius, max_radius),
                ..Default::default()
            };
            let buffer = test_image_generator::generate_seeded(&generator, seed)?;
            let written = ImageStore::new(config.output_dir()).save_image(&buffer, &name)?;
            println!("{}", written.display());
        }
        Commands::Gradient { name, inverted } => {
            let polarity = if inverted {
                Polarity::Inverted
            } else {
                Polarity::Normal
            };
            let buffer = test_image_generator::gradient(polarity)?;
            let written = ImageStore::new(config.output_dir()).save_image(&buffer, &name)?;
            println!("{}", written.display());
        }
        Commands::Batch {
            images,
            operation,
            workers,
        } => {
            let operation = operation.operation().context("an operation is required")?;
            if workers.is_some() {
                config.workers = workers;
            }
            config.validate()?;
            let processor = BatchProcessor::new(&config);
            let items = processor.process(images, operation).await;
            for item in &items {
                match &item.result {
                    Ok(output) => match output.red_fraction {
                        Some(fraction) => println!(
                            "{}\t{}\tred_fraction={fraction:.6}",
                            item.source.display(),
                            output.output.display()
                        ),
                        None => println!("{}\t{}", item.source.display(), output.output.display()),
                    },
                    Err(e) => eprintln!("{}\terror: {e}", item.source.display()),
                }
            }
            let summary = summarize(&items);
            info!(
                processed = summary.processed,
                failed = summary.failed,
                mean_red_fraction = ?summary.mean_red_fraction,
                "batch finished"
            );
            if summary.failed > 0 {
                anyhow::bail!("{} of {} images failed", summary.failed, items.len());
            }
        }
    }

    Ok(())
}
