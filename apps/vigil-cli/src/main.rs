mod script;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use vigil_common::Record;
use vigil_kernel::GridLayout;
use vigil_motion::forward_from_angles;
use vigil_render::{DebugLabelSurface, DebugTextRenderer, LabelSurface, RenderView, Renderer};
use vigil_session::{
    ChunkedLoader, FieldConfig, FieldSession, JsonFileSource, LoaderStatus, MemorySource,
    RecordSource,
};

use crate::script::{Cue, Script, parse_cue};

#[derive(Parser)]
#[command(name = "vigil-cli", about = "CLI tool for memorial field operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    Somber,
    Daylight,
}

impl Preset {
    fn config(self) -> FieldConfig {
        match self {
            Self::Somber => FieldConfig::somber(),
            Self::Daylight => FieldConfig::daylight(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and crate info
    Info,
    /// Print grid placements for a record count
    Place {
        /// Total number of records
        #[arg(short, long)]
        total: usize,
        /// Distance between block centers
        #[arg(short, long, default_value = "5")]
        spacing: f32,
        /// Only print this index
        #[arg(short, long)]
        index: Option<usize>,
    },
    /// Print a preset as YAML
    Config {
        #[arg(short, long, value_enum, default_value = "somber")]
        preset: Preset,
    },
    /// Load a dataset and walk through it headlessly
    Walk {
        /// JSON array of records; a synthetic dataset is used when omitted
        #[arg(short, long)]
        dataset: Option<PathBuf>,
        /// Synthetic record count
        #[arg(long, default_value = "100")]
        synthetic: usize,
        /// YAML config file (overrides --preset)
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value = "somber")]
        preset: Preset,
        /// Simulated seconds
        #[arg(long, default_value = "10")]
        seconds: f32,
        #[arg(long, default_value = "60")]
        fps: u32,
        /// View yaw in degrees; -90 looks down -Z
        #[arg(long, default_value = "-90", allow_hyphen_values = true)]
        yaw: f32,
        /// Input cues as SECONDS:ACTION (begin, +DIR, -DIR)
        #[arg(short = 'k', long = "cue", value_parser = parse_cue)]
        cues: Vec<Cue>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("vigil-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("collision: {}", vigil_collision::crate_info());
            println!("lod: {}", vigil_lod::crate_info());
            println!("input: {}", vigil_input::crate_info());
            println!("motion: {}", vigil_motion::crate_info());
            println!("session: {}", vigil_session::crate_info());
            println!("render: {}", vigil_render::crate_info());
        }
        Commands::Place {
            total,
            spacing,
            index,
        } => {
            let layout = GridLayout::new(total, spacing)?;
            println!(
                "Layout: total={}, side={}, spacing={}, ground={:.2}",
                layout.total_count(),
                layout.grid_side(),
                layout.spacing(),
                layout.ground_extent()
            );
            let indices = match index {
                Some(i) if i >= total => anyhow::bail!("index {i} is outside 0..{total}"),
                Some(i) => i..i + 1,
                None => 0..total,
            };
            for i in indices {
                let cell = layout.cell_of(i);
                let (x, z) = layout.place(i);
                println!("  #{i:<6} row={:<4} col={:<4} x={x:>9.3} z={z:>9.3}", cell.row, cell.col);
            }
        }
        Commands::Config { preset } => {
            print!("{}", preset.config().to_yaml()?);
        }
        Commands::Walk {
            dataset,
            synthetic,
            config,
            preset,
            seconds,
            fps,
            yaw,
            cues,
        } => {
            let config = match config {
                Some(path) => FieldConfig::load(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => preset.config(),
            };
            let forward = forward_from_angles(yaw.to_radians(), 0.0);
            let script = Script::new(cues);
            match dataset {
                Some(path) => {
                    let source = JsonFileSource::new(path);
                    println!("Dataset: {}", source.path().display());
                    walk(source, config, seconds, fps, forward, script)?
                }
                None => walk(
                    MemorySource::new(synthetic_records(synthetic)),
                    config,
                    seconds,
                    fps,
                    forward,
                    script,
                )?,
            }
        }
    }

    Ok(())
}

fn synthetic_records(count: usize) -> Vec<Record> {
    (0..count)
        .map(|i| Record::new(format!("Visitor {i}"), format!("No. {i}"), (i * 7 % 95) as u32))
        .collect()
}

/// Run a headless session: one chunk per frame while loading, input from
/// the cue script, labels mirrored onto a debug surface.
fn walk<S: RecordSource>(
    mut source: S,
    config: FieldConfig,
    seconds: f32,
    fps: u32,
    forward: glam::Vec3,
    mut script: Script,
) -> anyhow::Result<()> {
    let chunk_size = config.chunk_size;
    let mut session = FieldSession::establish(config, &mut source)?;
    let mut loader = ChunkedLoader::new(source, chunk_size);
    let mut surface = DebugLabelSurface::new();

    let dt = 1.0 / fps.max(1) as f32;
    let frames = (seconds.max(0.0) * fps as f32).ceil() as u64;
    for frame in 0..frames {
        let now = frame as f32 * dt;
        loader.pump(&mut session);
        for action in script.due(now) {
            session.handle(action);
        }
        let report = session.tick(dt, forward);
        surface.apply_all(&report.lod.transitions);
        if !report.lod.is_quiet() {
            tracing::debug!(
                frame,
                created = report.lod.stats.created,
                updated = report.lod.stats.updated,
                destroyed = report.lod.stats.destroyed,
                "labels changed"
            );
        }
    }

    if let LoaderStatus::Halted { offset } = loader.status() {
        println!("Ingest halted at offset {offset}; continuing with a partial field");
    }
    let timing = session.lod_timing();
    let (created, destroyed) = surface.churn();
    println!(
        "Frames: {}, phase: {:?}/{:?}, labels created={created} destroyed={destroyed}",
        session.frame_count(),
        session.phase(),
        session.motion_phase()
    );
    println!(
        "LOD pass: mean={:?} min={:?} max={:?} over {} frames",
        timing.mean, timing.min, timing.max, timing.samples
    );

    let view = RenderView::looking(session.observer().position, forward);
    print!(
        "{}",
        DebugTextRenderer::new().render(session.field(), session.lod(), &view)
    );
    Ok(())
}
