use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use psrquant::assets::AssetLoader;
use psrquant::models::AppConfig;
use psrquant::services::{BatchRunner, SidecarInput};

#[derive(Parser)]
#[command(name = "psrquant")]
#[command(about = "Picrosirius Red collagen quantification for brightfield micrographs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Quantify every image of a directory
    Run {
        /// Directory with the input images
        #[arg(short, long)]
        input: PathBuf,

        /// Directory receiving psr/, tissue/ and data/
        #[arg(short, long)]
        output: PathBuf,

        /// Config file (default: CONFIG_FILE or the embedded config)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// 1-based images to process, e.g. "1-3,7"
        #[arg(short, long)]
        subset: Option<String>,
    },
    /// Quantify a single image
    Process {
        /// Input image
        #[arg(long)]
        image: PathBuf,

        /// Directory receiving psr/ and tissue/
        #[arg(short, long)]
        output: PathBuf,

        /// Config file (default: CONFIG_FILE or the embedded config)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the measurements as JSON
        #[arg(long)]
        json: bool,
    },
    /// Extract the embedded config.yaml for customization
    Init {
        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run {
            input,
            output,
            config,
            subset,
        }) => run_batch_command(&input, output, config, subset.as_deref()),
        Some(Commands::Process {
            image,
            output,
            config,
            json,
        }) => run_process_command(&image, output, config, json),
        Some(Commands::Init { force }) => run_init_command(force),
        None => {
            run_status_command();
            Ok(())
        }
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "psrquant=info,psr_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_config(config_file: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let loader = AssetLoader::from_env(config_file);
    Ok(AppConfig::load_from_assets(&loader)?)
}

/// Process a directory of images
fn run_batch_command(
    input: &Path,
    output: PathBuf,
    config_file: Option<PathBuf>,
    subset: Option<&str>,
) -> anyhow::Result<()> {
    init_logging();

    let config = load_config(config_file)?;
    let runner = BatchRunner::new(config, output)?;
    let report = runner.run(input, subset)?;

    println!("{report}");
    Ok(())
}

/// Process one image (no results table)
fn run_process_command(
    image: &Path,
    output: PathBuf,
    config_file: Option<PathBuf>,
    json: bool,
) -> anyhow::Result<()> {
    init_logging();

    let config = load_config(config_file)?;
    let runner = BatchRunner::new(config, output)?;
    let sidecar_dir = image
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let mut input = SidecarInput::new(sidecar_dir).wait(runner.config().manual.wait());
    let processed = runner.process_file(image, &mut input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&processed)?);
    } else {
        let row = &processed.row;
        println!("{}", row.image);
        println!("  PSR raw int den:    {}", row.psr_raw_int_den);
        println!("  Tissue raw int den: {}", row.tissue_raw_int_den);
        println!("  Tissue ROI area:    {} px", row.roi_area_px);
        match row.psr_fraction {
            Some(fraction) => println!("  PSR fraction:       {fraction:.4}"),
            None => println!("  PSR fraction:       n/a (no tissue)"),
        }
        println!("  Wrote {}", processed.psr_path.display());
        println!("  Wrote {}", processed.tissue_path.display());
    }
    Ok(())
}

/// Extract the embedded config to the filesystem
fn run_init_command(force: bool) -> anyhow::Result<()> {
    let loader = AssetLoader::from_env(None);
    let report = loader.init(force)?;

    for f in &report.written {
        println!("  + {f}");
    }
    for f in &report.skipped {
        println!("  - {f} exists (use --force to overwrite)");
    }
    Ok(())
}

/// Display status and configuration information
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let config_file = std::env::var("CONFIG_FILE").ok();

    println!("psrquant v{VERSION}");
    println!("Picrosirius Red collagen quantification\n");

    println!("Environment Variables:");
    println!(
        "  CONFIG_FILE = {}",
        config_file.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  RUST_LOG    = {}",
        std::env::var("RUST_LOG")
            .ok()
            .as_deref()
            .unwrap_or("psrquant=info,psr_core=info (default)")
    );

    let loader = AssetLoader::from_env(None);
    println!("\nConfig:  {}", loader.config_source());
    match AppConfig::load_from_assets(&loader) {
        Ok(config) => {
            println!("  canvas:     {:?}", config.canvas);
            println!("  trace:      {:?}", config.trace);
            println!("  extensions: {}", config.input.extensions.join(", "));
        }
        Err(e) => println!("  invalid: {e}"),
    }

    println!("\nCommands:");
    println!("  psrquant run       Quantify a directory of images");
    println!("  psrquant process   Quantify a single image");
    println!("  psrquant init      Extract the embedded config.yaml");
    println!("\nRun 'psrquant --help' for more details.");
}
