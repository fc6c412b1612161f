use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use depthlift::DepthProvider as _;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "depthlift", version, about = "Render depth-driven parallax photos")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG after holding the pointer still for a number of ticks.
    Frame(FrameArgs),
    /// Render a PNG sequence while the pointer circles the viewport.
    Sweep(SweepArgs),
    /// Print the strategy a session would pick for a response.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct SessionArgs {
    /// Recorded provider response JSON. Relative image paths resolve next to it.
    #[arg(long)]
    response: PathBuf,

    /// Optional session config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Image file sent as the upload (only its name and size are logged).
    #[arg(long)]
    upload: Option<PathBuf>,

    /// Viewer width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Viewer height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Override parallax strength (0-100).
    #[arg(long)]
    strength: Option<f64>,

    /// Override depth intensity.
    #[arg(long)]
    intensity: Option<f64>,

    /// Override the number of layers shown.
    #[arg(long)]
    layers: Option<usize>,

    /// Override the mesh segment count.
    #[arg(long)]
    segments: Option<u32>,

    /// Never use the mesh strategy.
    #[arg(long)]
    no_mesh: bool,

    /// Skip the mesh shading pass.
    #[arg(long)]
    unlit: bool,

    /// Presenter to use.
    #[arg(long, value_enum, default_value_t = BackendChoice::Cpu)]
    backend: BackendChoice,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Pointer position as `x,y` in viewer pixels. Defaults to the center.
    #[arg(long, value_parser = parse_point)]
    pointer: Option<(f64, f64)>,

    /// Ticks to run before capturing.
    #[arg(long, default_value_t = 60)]
    ticks: u64,

    /// Wheel ticks to apply first; positive zooms in.
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    zoom: i32,
}

#[derive(Args, Debug)]
struct SweepArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Output directory for the PNG sequence.
    #[arg(long)]
    out_dir: PathBuf,

    /// Number of frames to render.
    #[arg(long, default_value_t = 120)]
    frames: u64,

    /// Sweep radius as a fraction of the half viewport.
    #[arg(long, default_value_t = 0.8)]
    radius: f64,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Recorded provider response JSON.
    #[arg(long)]
    response: PathBuf,

    /// Optional session config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Cpu,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Sweep(args) => cmd_sweep(args),
        Command::Inspect(args) => cmd_inspect(args),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_point(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got '{s}'"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x '{x}': {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y '{y}': {e}"))?;
    Ok((x, y))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<depthlift::SessionConfig> {
    let cfg = match path {
        Some(p) => depthlift::SessionConfig::from_json_file(p)?,
        None => depthlift::SessionConfig::default(),
    };
    Ok(cfg)
}

fn session_config(args: &SessionArgs) -> anyhow::Result<depthlift::SessionConfig> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(v) = args.strength {
        cfg.parallax_strength = v;
    }
    if let Some(v) = args.intensity {
        cfg.depth_intensity = v;
    }
    if let Some(v) = args.layers {
        cfg.max_layers = v;
    }
    if let Some(v) = args.segments {
        cfg.mesh.segments = v;
    }
    if args.no_mesh {
        cfg.prefer_mesh = false;
    }
    cfg.validate()?;
    Ok(cfg.sanitized())
}

fn make_backend(
    choice: BackendChoice,
    settings: &depthlift::RenderSettings,
) -> anyhow::Result<Box<dyn depthlift::Presenter>> {
    let kind = match choice {
        BackendChoice::Cpu => depthlift::BackendKind::Cpu,
    };
    Ok(depthlift::create_backend(kind, settings)?)
}

fn open_session(args: &SessionArgs) -> anyhow::Result<depthlift::RenderSessionController> {
    let cfg = session_config(args)?;
    let settings = depthlift::RenderSettings {
        clear_rgba: Some([18, 20, 28, 255]),
        unlit_mesh: args.unlit,
    };
    let presenter = make_backend(args.backend, &settings)?;
    let viewport = depthlift::Canvas::new(args.width, args.height)?;
    let mut controller = depthlift::RenderSessionController::new(cfg, presenter, viewport);

    let mut provider = depthlift::RecordedProvider::from_file(&args.response)?;
    let upload = match &args.upload {
        Some(p) => depthlift::Upload::from_path(p)?,
        None => depthlift::Upload {
            name: args
                .response
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            bytes: Vec::new(),
        },
    };
    let kind = controller
        .upload(&mut provider, &upload)
        .with_context(|| format!("build session from '{}'", args.response.display()))?;
    tracing::info!(strategy = ?kind, "session ready");
    Ok(controller)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut controller = open_session(&args.session)?;
    let viewport = controller.viewport();
    let (x, y) = args.pointer.unwrap_or((
        f64::from(viewport.width) / 2.0,
        f64::from(viewport.height) / 2.0,
    ));

    let delta = if args.zoom >= 0 { 1.0 } else { -1.0 };
    for _ in 0..args.zoom.unsigned_abs() {
        controller.push_event(depthlift::InputEvent::Wheel { delta_y: delta });
    }
    controller.push_event(depthlift::InputEvent::PointerMove {
        position: depthlift::Point::new(x, y),
    });
    for _ in 0..args.ticks.max(1) {
        controller.tick();
    }

    let frame = controller
        .last_frame()
        .context("presenter produced no frame")?;
    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    depthlift::write_png(&args.out, frame)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_sweep(args: SweepArgs) -> anyhow::Result<()> {
    let mut controller = open_session(&args.session)?;
    let viewport = controller.viewport();
    let center = viewport.center();
    let (rx, ry) = (
        f64::from(viewport.width) / 2.0 * args.radius,
        f64::from(viewport.height) / 2.0 * args.radius,
    );
    let frames = args.frames.max(1);

    let mut sink = depthlift::PngSequenceSink::new(&args.out_dir, "frame_");
    let written = controller.record(frames, &mut sink, |i| {
        let t = i as f64 / frames as f64 * std::f64::consts::TAU;
        vec![depthlift::InputEvent::PointerMove {
            position: depthlift::Point::new(center.x + rx * t.cos(), center.y + ry * t.sin()),
        }]
    })?;

    eprintln!("wrote {written} frames to {}", args.out_dir.display());
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let mut provider = depthlift::RecordedProvider::from_file(&args.response)?;
    let upload = depthlift::Upload {
        name: "inspect".to_string(),
        bytes: Vec::new(),
    };
    let response = provider.process(&upload)?;

    println!("image: {}x{}", response.width, response.height);
    println!("use_mesh hint: {}", response.use_mesh);
    match response.depth_data.as_deref().map(depthlift::DepthGrid::from_rows) {
        Some(Ok(grid)) => {
            let (lo, hi) = grid.range();
            println!(
                "depth grid: {}x{} (range {lo:.3}..{hi:.3})",
                grid.width(),
                grid.height()
            );
        }
        Some(Err(e)) => println!("depth grid: unusable ({e})"),
        None => println!("depth grid: none"),
    }
    println!("layers in response: {}", response.layers.len());

    let loader = depthlift::AssetResolver::new(provider.assets_root());
    let container = depthlift::Canvas::new(800, 600)?;
    match depthlift::prepare_strategy(&response, &loader, &cfg, true, container)? {
        depthlift::PreparedStrategy::Mesh(mesh) => {
            let size = mesh.render_size();
            println!("strategy: mesh");
            if let Some(surface) = mesh.surface() {
                println!(
                    "  segments {} -> {} vertices, {} triangles",
                    surface.segments(),
                    surface.vertex_count(),
                    surface.triangles().len()
                );
            }
            println!("  render size in 800x600: {}x{}", size.width, size.height);
        }
        depthlift::PreparedStrategy::Layers(layers) => {
            println!("strategy: layers");
            for l in layers.layers() {
                println!(
                    "  #{:<3} depth {:.3}  {}x{}  {}",
                    l.index, l.depth, l.image.width, l.image.height, l.name
                );
            }
        }
    }
    Ok(())
}
