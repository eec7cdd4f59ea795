//! `pathview`: inspect a pathway stored as a JSON array of elements through
//! the canvas scene graph.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use pathview::camera::Point;
use pathview::canvas::Canvas;
use pathview::config::CanvasConfig;
use pathview::error::{CanvasError, ConfigError, ModelError};
use pathview::model::{Pathway, PathwayElement};
use pathview::render::RecordingContext;
use pathview::zorder;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("invalid pathway JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid point `{0}`; expected x,y")]
    InvalidPoint(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Canvas(#[from] CanvasError),
}

#[derive(Parser, Debug)]
#[command(name = "pathview", about = "Inspect GPML pathway diagrams through the canvas scene graph")]
struct Cli {
    /// JSON file holding an array of pathway elements.
    file: PathBuf,

    /// Zoom in percent. Overrides PATHVIEW_ZOOM_PCT.
    #[arg(long)]
    zoom: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Count elements and views and report the extent.
    Summary,
    /// Report what lies under a view-space point.
    Hit(HitArgs),
    /// Run one redraw pass and count drawing commands.
    Render,
    /// Renumber z-order and print the elements back as JSON.
    Renumber,
}

#[derive(Args, Debug)]
struct HitArgs {
    /// View-space point as `x,y`.
    #[arg(long)]
    at: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = CanvasConfig::from_env()?;
    if let Some(zoom) = cli.zoom {
        config.zoom_pct = zoom;
    }
    let mut pathway = load(&cli.file)?;

    if matches!(cli.command, Command::Renumber) {
        let changed = zorder::auto_renumber(&mut pathway)?;
        tracing::info!(changed, "z-order renumbered");
        let elements: Vec<&PathwayElement> = pathway.elements().collect();
        println!("{}", serde_json::to_string_pretty(&elements)?);
        return Ok(());
    }

    let mut canvas = Canvas::new(pathway, config)?;
    match cli.command {
        Command::Summary => summary(&canvas),
        Command::Hit(args) => hit(&canvas, parse_point(&args.at)?),
        Command::Render => render(&mut canvas),
        Command::Renumber => {}
    }
    Ok(())
}

fn load(path: &Path) -> Result<Pathway, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read { path: path.display().to_string(), source })?;
    let elements: Vec<PathwayElement> = serde_json::from_str(&text)?;
    let mut pathway = Pathway::new();
    for e in elements {
        pathway.add(e)?;
    }
    tracing::debug!(count = pathway.len(), "pathway loaded");
    Ok(pathway)
}

fn parse_point(raw: &str) -> Result<Point, CliError> {
    let invalid = || CliError::InvalidPoint(raw.to_string());
    let (x, y) = raw.split_once(',').ok_or_else(invalid)?;
    let x: f64 = x.trim().parse().map_err(|_| invalid())?;
    let y: f64 = y.trim().parse().map_err(|_| invalid())?;
    Ok(Point::new(x, y))
}

fn summary(canvas: &Canvas) {
    let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
    for e in canvas.pathway().elements() {
        *by_type.entry(format!("{:?}", e.object_type)).or_default() += 1;
    }
    for (kind, count) in &by_type {
        println!("{kind:<10} {count}");
    }
    let (w, h) = canvas.pathway().extent();
    println!("views      {}", canvas.scene().live().count());
    println!("extent     {w:.1} x {h:.1}");
    println!("zoom       {:.0}%", canvas.zoom_pct());
}

fn hit(canvas: &Canvas, at: Point) {
    let label = |v| {
        canvas.scene().get(v).map_or_else(|| "?".to_string(), |e| e.kind.model().unwrap_or("(synthetic)").to_string())
    };
    match canvas.object_at(at) {
        Some(top) => println!("top        {}", label(top)),
        None => println!("top        (nothing)"),
    }
    for v in canvas.objects_at(at) {
        println!("under      {}", label(v));
    }
}

fn render(canvas: &mut Canvas) {
    let mut ctx = RecordingContext::new();
    canvas.draw(&mut ctx);
    println!("commands   {}", ctx.commands.len());
    println!("shapes     {}", ctx.shape_count());
    for text in ctx.texts() {
        println!("text       {text}");
    }
}
