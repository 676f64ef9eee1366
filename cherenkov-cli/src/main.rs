mod viewer;

use cherenkov_core::{
    format_ingest_error, load_file, CompressionConfig, EventStore, GeometryPreset, IngestConfig,
    IngestReport, Medium, StopReason, DEFAULT_BUCKET_WIDTH,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cherenkov")]
#[command(about = "Cherenkov - neutrino detector event loader and viewer", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one line per event
    Summary(LoadArgs),
    /// Print the particles of one event
    Show {
        #[command(flatten)]
        load: LoadArgs,
        /// Event index
        #[arg(short, long, default_value_t = 0)]
        event: usize,
    },
    /// Open the interactive event viewer
    View(LoadArgs),
}

#[derive(Args, Clone)]
struct LoadArgs {
    /// Path to the event stream
    file: PathBuf,
    /// Re-bucket events into fixed-width time windows
    #[arg(long)]
    compress: bool,
    /// Bucket width used with --compress
    #[arg(long, default_value_t = DEFAULT_BUCKET_WIDTH)]
    bucket_width: f64,
    /// Coordinate units
    #[arg(long, value_enum, default_value_t = Geometry::Feet)]
    geometry: Geometry,
    /// Refractive index of the detector medium
    #[arg(long, default_value_t = Medium::WATER.refractive_index)]
    refractive_index: f64,
    /// Fail on malformed records instead of stopping quietly
    #[arg(long)]
    strict: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Geometry {
    Feet,
    Metres,
}

impl LoadArgs {
    fn config(&self) -> IngestConfig {
        let preset = match self.geometry {
            Geometry::Feet => GeometryPreset::Feet,
            Geometry::Metres => GeometryPreset::Metres,
        };
        IngestConfig {
            geometry: preset.into(),
            medium: Medium {
                refractive_index: self.refractive_index,
            },
            compression: CompressionConfig {
                enabled: self.compress,
                bucket_width: self.bucket_width,
            },
            strict: self.strict,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Summary(load) => summary(&load),
        Commands::Show { load, event } => show(&load, event),
        Commands::View(load) => viewer::run(load.file.clone(), load.config()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load(args: &LoadArgs) -> Result<(EventStore, IngestReport), Box<dyn std::error::Error>> {
    load_file(&args.file, &args.config()).map_err(|e| {
        let source = std::fs::read_to_string(&args.file).ok();
        format_ingest_error(&e, source.as_deref()).into()
    })
}

fn summary(args: &LoadArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (store, report) = load(args)?;

    println!(
        "{:>5} {:>10} {:>10} {:>10} {:>6} {:>6}  particles",
        "event", "start", "end", "duration", "ID", "OD"
    );
    for (idx, event) in store.iter().enumerate() {
        println!(
            "{:>5} {:>10.4} {:>10.4} {:>10.4} {:>6} {:>6}  {}",
            idx,
            event.start_time,
            event.end_time,
            event.duration,
            event.hits.len(),
            event.outer_hits.len(),
            event.display_label()
        );
    }
    print_report(&args.file, &report);
    Ok(())
}

fn show(args: &LoadArgs, index: usize) -> Result<(), Box<dyn std::error::Error>> {
    let (store, _) = load(args)?;
    let event = store.at(index)?;

    println!(
        "event {} [{:.4}, {:.4}] vertex ({:.3}, {:.3}, {:.3})",
        index,
        event.start_time,
        event.end_time,
        event.vertex_position.x,
        event.vertex_position.y,
        event.vertex_position.z
    );
    println!(
        "  {} inner hits, {} outer hits, total charge {:.3}",
        event.hits.len(),
        event.outer_hits.len(),
        event.total_charge()
    );
    for particle in &event.particles {
        println!(
            "  {:<9} p = {:>9.3} MeV  E = {:>9.3} MeV  beta = {:.6}  cone = {:>6.2} deg{}",
            particle.name,
            particle.momentum,
            particle.energy,
            particle.velocity / cherenkov_core::kinematics::SPEED_OF_LIGHT,
            particle.cone_half_angle,
            if particle.display_enabled { "  *" } else { "" }
        );
    }
    if !event.merged_vertices.is_empty() {
        println!("  {} merged event vertices", event.merged_vertices.len());
    }
    Ok(())
}

fn print_report(path: &Path, report: &IngestReport) {
    println!();
    println!("{}: {} events read", path.display(), report.events_read);
    if let Some(buckets) = report.compressed_buckets {
        println!("compressed into {} time buckets", buckets);
    }
    if report.discarded_records > 0 {
        println!(
            "{} records after the last NEXTEVENT were discarded",
            report.discarded_records
        );
    }
    if let StopReason::Malformed { line, message } = &report.stop {
        println!("stopped early at line {}: {}", line, message);
    }
}
