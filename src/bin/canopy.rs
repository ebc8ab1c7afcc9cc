use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use canopy::{
    CommitStats, CpuEngineOpts, DynEngine, FontSource, FrameRGBA, RenderTarget, SceneNode,
    VelloCpuEngine,
};

#[derive(Parser, Debug)]
#[command(name = "canopy", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a scene description as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input scene JSON (an array of top-level nodes).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Default font file; paragraphs draw nothing without one.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Root surface width.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Root surface height.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Commit the same scene this many times (later commits reuse every element).
    #[arg(long, default_value_t = 1)]
    commits: u32,

    /// Largest surface dimension the engine accepts.
    #[arg(long, default_value_t = CpuEngineOpts::default().max_surface_dim)]
    max_surface_dim: u32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
    }
}

fn read_scene(path: &Path) -> anyhow::Result<Vec<SceneNode>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("open scene '{}'", path.display()))?;
    let mut nodes = SceneNode::list_from_json(&json)?;
    let root = path.parent().unwrap_or_else(|| Path::new("."));
    for node in &mut nodes {
        node.resolve_sources(root)?;
    }
    Ok(nodes)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let scene = read_scene(&args.in_path)?;

    let opts = CpuEngineOpts::default().with_max_surface_dim(args.max_surface_dim);
    let font = args.font.map_or(FontSource::Empty, FontSource::Path);
    let mut bridge = canopy::init(
        || Ok(Box::new(VelloCpuEngine::new(opts)) as DynEngine),
        font,
    )?;

    let mut target = RenderTarget::new(&mut bridge, args.width, args.height)?;
    let mut report = |s: &CommitStats| {
        eprintln!(
            "commit {}: rendered={} created={} cloned={} reused={}",
            s.commit, s.rendered, s.created, s.cloned, s.reused
        );
    };
    let mut result = Ok(());
    for _ in 0..args.commits.max(1) {
        if let Err(e) = canopy::render(&mut bridge, &scene, &mut target, Some(&mut report)) {
            result = Err(e);
            break;
        }
    }
    let frame = result.and_then(|()| target.read_pixels(&mut bridge));
    target.release(&mut bridge);
    drop(bridge.shutdown());
    let frame = frame?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let data = straight_alpha(frame);
    image::save_buffer_with_format(
        &args.out,
        &data.data,
        data.width,
        data.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn straight_alpha(mut frame: FrameRGBA) -> FrameRGBA {
    if !frame.premultiplied {
        return frame;
    }
    for px in frame.data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
    frame.premultiplied = false;
    frame
}
