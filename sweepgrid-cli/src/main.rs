use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "sweepgrid", version, about = "Lay out a parameter-sweep batch as a video grid")]
struct Cli {
    /// Debug-level logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the grid video (requires ffmpeg).
    Render(RenderArgs),
    /// Print the layout and composition plan as JSON without rendering.
    Plan(PlanArgs),
}

#[derive(Args, Debug)]
struct LayoutArgs {
    /// Batch directory with one subfolder per run.
    dir: PathBuf,

    /// Output MP4 path [default: <DIR>/<DIR name>_grid.mp4].
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Cell (thumbnail) side in pixels.
    #[arg(short = 's', long = "size")]
    size: Option<u32>,

    /// Output frame rate.
    #[arg(short, long)]
    fps: Option<u32>,

    /// Gap between cells in pixels.
    #[arg(short, long)]
    padding: Option<u32>,

    /// JSON config file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use this ffmpeg executable instead of searching for one.
    #[arg(long = "ffmpeg-path")]
    ffmpeg_path: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    layout: LayoutArgs,

    /// Probe and resize clips one at a time.
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Override rayon worker threads.
    #[arg(long, conflicts_with = "sequential")]
    threads: Option<usize>,

    /// Print the run report as JSON on stdout.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Args, Debug)]
struct PlanArgs {
    #[command(flatten)]
    layout: LayoutArgs,

    /// Probe clip durations (requires ffmpeg).
    #[arg(long, default_value_t = false)]
    probe: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Plan(args) => cmd_plan(args),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default = if verbose {
        "sweepgrid=debug"
    } else if quiet {
        "sweepgrid=warn"
    } else {
        "sweepgrid=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(args: &LayoutArgs) -> anyhow::Result<sweepgrid::SweepConfig> {
    let mut cfg = match &args.config {
        Some(path) => sweepgrid::SweepConfig::from_path(path)?,
        None => sweepgrid::SweepConfig::default(),
    };
    if let Some(size) = args.size {
        cfg.grid.cell_size = size;
    }
    if let Some(fps) = args.fps {
        cfg.grid.fps = sweepgrid::Fps::integer(fps)?;
    }
    if let Some(padding) = args.padding {
        cfg.grid.padding = padding;
    }
    cfg.validate()?;
    tracing::debug!(?cfg, "resolved config");
    Ok(cfg)
}

fn job(args: &LayoutArgs, cfg: sweepgrid::SweepConfig) -> sweepgrid::GridJob {
    let job = sweepgrid::GridJob::new(&args.dir, cfg);
    match &args.out {
        Some(out) => job.with_output(out),
        None => job,
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(&args.layout)?;
    if args.sequential {
        cfg.backend.parallel = false;
    }
    if args.threads.is_some() {
        cfg.backend.threads = args.threads;
    }

    let backend =
        sweepgrid::FfmpegBackend::locate(args.layout.ffmpeg_path.as_deref(), cfg.backend.clone())?;
    let report = job(&args.layout, cfg).render(&backend)?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serialize report")?
        );
    }
    eprintln!(
        "wrote {} ({}x{} grid, {:.2}s, {} placeholder cells)",
        report.output.display(),
        report.rows,
        report.cols,
        report.duration_secs,
        report.placeholders
    );
    if report.dropped > 0 || report.collisions > 0 {
        eprintln!(
            "note: {} clips dropped, {} cells overwritten",
            report.dropped, report.collisions
        );
    }
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.layout)?;
    let backend = if args.probe {
        Some(sweepgrid::FfmpegBackend::locate(
            args.layout.ffmpeg_path.as_deref(),
            cfg.backend.clone(),
        )?)
    } else {
        None
    };
    let summary = job(&args.layout, cfg).plan_summary(
        backend
            .as_ref()
            .map(|b| b as &dyn sweepgrid::RenderBackend),
    )?;
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("serialize plan")?
    );
    Ok(())
}
