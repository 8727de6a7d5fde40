use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;

use crate::mesh_asset::MeshAsset;
use crate::session::MorphSession;
use crate::uniforms::MorphConfig;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one morph headless and dump per-frame snapshots
    Simulate {
        /// OBJ files, one shape each, in shape-index order
        #[arg(long, num_args = 2.., required = true)]
        shapes: Vec<PathBuf>,

        /// Shape index to morph to
        #[arg(long)]
        target: usize,

        /// Frames per second for the simulated clock
        #[arg(long, default_value_t = 60.0)]
        fps: f32,

        /// Optional JSON config file overriding morph parameters
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output JSON file (stdout summary only if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            shapes,
            target,
            fps,
            config,
            out,
        } => simulate(shapes, target, fps, config, out),
    }
}

/// Per-frame snapshot of the simulated morph.
#[derive(Serialize)]
struct FrameSnapshot {
    time: f32,
    progress: f32,
    /// Interpolated position of the first vertex slot.
    first: [f32; 3],
    /// Interpolated position of the last vertex slot.
    last: [f32; 3],
}

#[derive(Serialize)]
struct SimulationDump {
    shape_count: usize,
    particle_count: usize,
    target: usize,
    fps: f32,
    frames: Vec<FrameSnapshot>,
}

fn simulate(
    shape_paths: Vec<PathBuf>,
    target: usize,
    fps: f32,
    config_path: Option<PathBuf>,
    out: Option<PathBuf>,
) -> Result<()> {
    if fps <= 0.0 {
        return Err(anyhow!("fps must be positive"));
    }

    let config = match config_path {
        Some(path) => {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str::<MorphConfig>(&contents)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => MorphConfig::default(),
    };

    let mut raw = Vec::with_capacity(shape_paths.len());
    for path in &shape_paths {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read mesh {}", path.display()))?;
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let asset = MeshAsset::from_obj(id, &contents)
            .map_err(|e| anyhow!("{}: {}", path.display(), e))?;
        info!("loaded {}: {} vertices", asset.id, asset.vertex_count());
        raw.push(asset.positions);
    }

    let mut session = MorphSession::from_raw(&raw, config).map_err(|e| anyhow!(e))?;
    session.morph(target, 0.0).map_err(|e| anyhow!(e))?;

    let dt = 1.0 / fps;
    let mut frames = Vec::new();
    let mut frame = 0u32;
    loop {
        let now = frame as f32 * dt;
        session.advance(now);
        let particles = session.evaluate();
        frames.push(FrameSnapshot {
            time: now,
            progress: session.progress(),
            first: particles.first().map(|p| p.position).unwrap_or_default(),
            last: particles.last().map(|p| p.position).unwrap_or_default(),
        });
        if !session.is_animating() && session.progress() >= 1.0 {
            break;
        }
        frame += 1;
    }

    info!(
        "simulated {} frames, arrived at shape {}",
        frames.len(),
        session.current_index()
    );

    let dump = SimulationDump {
        shape_count: session.shape_count(),
        particle_count: session.particle_count(),
        target,
        fps,
        frames,
    };

    match out {
        Some(path) => {
            let json = serde_json::to_string_pretty(&dump)?;
            fs::write(&path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("wrote {}", path.display());
        }
        None => {
            println!(
                "{} shapes, {} particles, {} frames to reach shape {}",
                dump.shape_count,
                dump.particle_count,
                dump.frames.len(),
                target
            );
        }
    }

    Ok(())
}
