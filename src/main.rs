use clap::{Args, Parser, Subcommand};
use focal_crop::config::{self, SessionConfig};
use focal_crop::events::SessionEvent;
use focal_crop::focal::FocalPoint;
use focal_crop::imaging::{ExportFormat, Exporter, Quality, RustBackend};
use focal_crop::preset::CropPreset;
use focal_crop::session::Session;
use focal_crop::{logging, output};
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use tracing::debug;

#[derive(Parser)]
#[command(name = "focal-crop")]
#[command(about = "Focal-point driven multi-ratio image cropping")]
#[command(long_about = "\
Focal-point driven multi-ratio image cropping

Pick one focal point on an image and get a crop for every preset aspect
ratio. Each crop is the largest rectangle of its ratio that fits the image,
centered on the focal point and pushed back inside the image near edges.

Focal points are percentages of the image: 0,0 is the top-left corner,
50,50 the center, 100,100 the bottom-right corner.

Presets come from the config file or the built-in set:
  landscape 16:9, ultrawide 21:9, standard 4:3, square 1:1,
  portrait 9:16, social-portrait 4:5, og-image 1.91:1, banner 3:1

Run 'focal-crop gen-config' to generate a documented focal-crop.toml.")]
#[command(version)]
struct Cli {
    /// Config file (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "focal_crop=trace". RUST_LOG wins.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Flags shared by commands that compute crops.
#[derive(Args, Clone)]
struct CropArgs {
    /// Source image
    #[arg(long)]
    src: PathBuf,

    /// Focal point as X,Y percentages
    #[arg(long, value_parser = parse_focal)]
    focal: Option<FocalPoint>,

    /// Preset as NAME=RATIO; repeat to replace the configured presets
    #[arg(long = "preset", value_parser = parse_preset)]
    presets: Vec<CropPreset>,
}

#[derive(Subcommand)]
enum Command {
    /// Compute and print the crop for every preset
    Crops {
        #[command(flatten)]
        crop: CropArgs,

        /// Print the JSON snapshot instead of the table
        #[arg(long)]
        json: bool,
    },
    /// Write every crop as an image file
    Export {
        #[command(flatten)]
        crop: CropArgs,

        /// Existing output directory
        #[arg(long)]
        out: PathBuf,

        /// png, jpeg or webp (defaults to the config value)
        #[arg(long)]
        format: Option<ExportFormat>,

        /// JPEG quality 1-100 (defaults to the config value)
        #[arg(long)]
        quality: Option<u32>,

        /// Only export these presets; repeatable
        #[arg(long)]
        only: Vec<String>,
    },
    /// List the configured presets
    Presets,
    /// Print a stock focal-crop.toml with all options documented
    GenConfig,
}

fn parse_focal(value: &str) -> Result<FocalPoint, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{value}'"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid coordinate '{}': {e}", s.trim()))
    };
    Ok(FocalPoint::new(parse(x)?, parse(y)?))
}

fn parse_preset(value: &str) -> Result<CropPreset, String> {
    let (name, ratio) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=RATIO, got '{value}'"))?;
    Ok(CropPreset::new(name.trim(), ratio.trim()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut session_config = config::load_config(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        session_config.logging.level = level;
    }
    if cli.log_json {
        session_config.logging.json = true;
    }
    logging::init_logging(&session_config.logging);

    match cli.command {
        Command::Crops { crop, json } => {
            let (session, events) = open_session(session_config, &crop)?;
            log_events(&events);
            if json {
                println!("{}", session.export_json()?);
            } else if let (Some(src), Some(dims)) = (session.src(), session.dimensions()) {
                output::print_crops(
                    src,
                    dims,
                    session.focal_point(),
                    session.registry().list(),
                    &session.ordered_crops(),
                );
            }
        }
        Command::Export {
            crop,
            out,
            format,
            quality,
            only,
        } => {
            init_thread_pool(&session_config.processing);
            let exporter = Exporter::new(&out)?
                .with_format(format.unwrap_or(session_config.export.format))
                .with_quality(Quality::new(
                    quality.unwrap_or(session_config.export.quality),
                ));
            let (session, events) = open_session(session_config, &crop)?;
            log_events(&events);

            let results = session.export_all(&RustBackend::new(), &exporter, &only)?;
            output::print_export_results(&results);

            let failed = results.iter().filter(|r| r.outcome.is_err()).count();
            if failed > 0 {
                return Err(format!("{failed} of {} exports failed", results.len()).into());
            }
        }
        Command::Presets => {
            let session = Session::new(&session_config);
            output::print_presets(session.registry().list());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Build a session from config plus CLI overrides and load the image.
fn open_session(
    mut session_config: SessionConfig,
    args: &CropArgs,
) -> Result<(Session, Receiver<SessionEvent>), Box<dyn std::error::Error>> {
    if !args.presets.is_empty() {
        session_config.presets = args.presets.clone();
    }
    if let Some(focal) = args.focal {
        session_config.focal_point = focal;
    }

    let mut session = Session::new(&session_config);
    let events = session.subscribe();
    session.load(args.src.to_string_lossy(), &RustBackend::new())?;
    Ok((session, events))
}

fn log_events(events: &Receiver<SessionEvent>) {
    for event in events.try_iter() {
        debug!("{}", output::format_event(&event));
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
