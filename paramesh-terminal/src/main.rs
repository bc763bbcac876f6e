//! Paramesh terminal viewer
//!
//! Renders a hollow cylinder (or a box) as ASCII art.
//! Controls:
//!   - WASD / E/R: Rotate the model
//!   - Arrow Keys: Orbit the camera, +/- to zoom, C to reset
//!   - F: Toggle wireframe outlines
//!   - 1-6: Toggle individual solid parts
//!   - Q/ESC: Quit

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use paramesh_core::{Cuboid, CuboidConfig, HollowCylinder, HollowCylinderConfig};
use paramesh_terminal::{TerminalApp, ViewerModel, ViewerOptions};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Shape {
    Cylinder,
    Cuboid,
}

#[derive(Parser, Debug)]
#[command(name = "paramesh-terminal", about = "Render parametric models in the terminal", version)]
struct Args {
    /// Model to display
    #[arg(long, value_enum, default_value = "cylinder")]
    shape: Shape,

    /// JSON file with the model configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target frame rate
    #[arg(long, default_value = "30")]
    fps: u32,

    /// Idle rotation per frame, in radians
    #[arg(long, default_value = "0.01")]
    spin: f32,

    /// Start with outlines hidden
    #[arg(long)]
    no_wireframe: bool,
}

fn read_config<T: serde::de::DeserializeOwned + Default>(path: Option<&PathBuf>) -> anyhow::Result<T> {
    let Some(path) = path else {
        return Ok(T::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they do not tear the rendered frame.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let viewer: ViewerModel = match args.shape {
        Shape::Cylinder => {
            let config: HollowCylinderConfig = read_config(args.config.as_ref())?;
            HollowCylinder::build(config)
                .context("failed to build hollow cylinder")?
                .into()
        }
        Shape::Cuboid => {
            let config: CuboidConfig = read_config(args.config.as_ref())?;
            Cuboid::build(&config).context("failed to build box")?.into()
        }
    };

    let options = ViewerOptions {
        target_fps: args.fps,
        wireframe: !args.no_wireframe,
        spin: args.spin,
    };

    let mut app = TerminalApp::new(viewer, options)?;
    app.run()
}
