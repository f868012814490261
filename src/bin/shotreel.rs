use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "shotreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the prepared media data, or the resolved shot timings, as JSON.
    Timeline(TimelineArgs),
    /// Render the frame at a time offset as a PNG.
    Frame(FrameArgs),
    /// Render an MP4 video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct SessionArgs {
    /// Input scene list JSON. Asset references resolve relative to its directory.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Options JSON; missing fields keep their defaults.
    #[arg(long)]
    opts: Option<PathBuf>,

    /// Render only this scene index.
    #[arg(long)]
    part: Option<usize>,

    /// Output width in pixels; height follows 16:9.
    #[arg(long)]
    width: Option<u32>,

    /// Frames per second.
    #[arg(long)]
    fps: Option<u32>,
}

#[derive(Args, Debug)]
struct TimelineArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Resolve all media and print shot timings instead of the unresolved media data.
    #[arg(long, default_value_t = false)]
    resolve: bool,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Time offset in milliseconds.
    #[arg(long, default_value_t = 0)]
    at_ms: u64,

    /// Draw the static poster frame of the shot instead of the animated one.
    #[arg(long, default_value_t = false)]
    poster: bool,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    session: SessionArgs,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Timeline(args) => cmd_timeline(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn load_opts(args: &SessionArgs) -> anyhow::Result<shotreel::CreatorOpts> {
    let mut opts = match &args.opts {
        Some(path) => shotreel::CreatorOpts::from_path(path)?,
        None => shotreel::CreatorOpts::default(),
    };
    opts.env = shotreel::Env::Export;
    if args.part.is_some() {
        opts.part = args.part;
    }
    if let Some(width) = args.width {
        opts.width = width;
    }
    if let Some(fps) = args.fps {
        opts.fps = shotreel::Fps::new(fps, 1)?;
    }
    opts.validate()?;
    Ok(opts)
}

fn assets_root(in_path: &Path) -> &Path {
    in_path.parent().unwrap_or_else(|| Path::new("."))
}

fn open_session(
    args: &SessionArgs,
) -> anyhow::Result<(shotreel::VideoCreator, Vec<shotreel::Scene>)> {
    let opts = load_opts(args)?;
    let scenes = shotreel::scenes_from_path(&args.in_path)?;
    let source = Arc::new(shotreel::FsSource::new(assets_root(&args.in_path)));
    let creator = shotreel::VideoCreator::new(opts, source)?;
    Ok((creator, scenes))
}

fn generate(
    creator: &mut shotreel::VideoCreator,
    scenes: &[shotreel::Scene],
) -> anyhow::Result<()> {
    let warnings = creator.generate(scenes, None, &shotreel::CancelToken::new())?;
    for w in &warnings {
        eprintln!("warning: {}", serde_json::to_string(w)?);
    }
    Ok(())
}

fn cmd_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    let (mut creator, scenes) = open_session(&args.session)?;
    let json = if args.resolve {
        generate(&mut creator, &scenes)?;
        let durations = creator.shot_durations()?;
        serde_json::to_string_pretty(&durations)?
    } else {
        let media = shotreel::prepare_media_data(&scenes, creator.options())?;
        serde_json::to_string_pretty(&media)?
    };
    println!("{json}");
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (mut creator, scenes) = open_session(&args.session)?;
    generate(&mut creator, &scenes)?;
    let frame = creator.frame_at(args.at_ms as f64, !args.poster)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame.save_png(&args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (mut creator, scenes) = open_session(&args.session)?;
    generate(&mut creator, &scenes)?;
    let duration_ms = creator.duration()?;
    let stats = creator.create_file(&args.out, &shotreel::CancelToken::new())?;

    eprintln!(
        "wrote {} ({} frames, {} ms)",
        args.out.display(),
        stats.frames,
        duration_ms
    );
    Ok(())
}
