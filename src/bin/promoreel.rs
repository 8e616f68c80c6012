use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use promoreel::{
    GenerateError, GenerateOptions, GeneratorConfig, Product, ProgressObserver, ReelError,
    RunControls, VideoGenerator, ensure_parent_dir, list_videos,
};

#[derive(Parser, Debug)]
#[command(name = "promoreel", version)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a promo MP4 and thumbnail (requires `ffmpeg` on PATH).
    Generate(GenerateArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render the thumbnail as a JPEG.
    Thumbnail(ThumbnailArgs),
    /// List finished videos in the output root.
    List,
}

#[derive(Args, Debug)]
struct ProductArg {
    /// Product JSON file.
    #[arg(long)]
    product: PathBuf,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    input: ProductArg,

    /// Video duration in seconds (drawn from the configured bounds when omitted).
    #[arg(long)]
    duration: Option<f64>,

    /// Frames per second.
    #[arg(long)]
    framerate: Option<u32>,

    /// Seed for duration and narration choice.
    #[arg(long)]
    seed: Option<u64>,

    /// Also write the artifact JSON here.
    #[arg(long)]
    out_json: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    input: ProductArg,

    /// Frame index (0-based).
    #[arg(long)]
    index: u64,

    /// Total frames in the sequence.
    #[arg(long)]
    total: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct ThumbnailArgs {
    #[command(flatten)]
    input: ProductArg,

    /// Output JPEG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();
    init_tracing(cli.log_json);

    match run(cli.cmd) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error [{}]: {e:#}", error_kind(&e));
            ExitCode::from(1)
        }
    }
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("promoreel=info"));
    let fmt = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        fmt.json().init();
    } else {
        fmt.init();
    }
}

fn error_kind(e: &anyhow::Error) -> String {
    let kind = if let Some(e) = e.downcast_ref::<GenerateError>() {
        Some(e.kind())
    } else {
        e.downcast_ref::<ReelError>().map(ReelError::kind)
    };
    match kind {
        Some(kind) => serde_json::to_value(kind)
            .ok()
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_else(|| format!("{kind:?}")),
        None => "other".to_owned(),
    }
}

fn run(cmd: Command) -> anyhow::Result<()> {
    let mut config = GeneratorConfig::from_env()?;
    match cmd {
        Command::Generate(args) => {
            if args.seed.is_some() {
                config.seed = args.seed;
            }
            cmd_generate(config, args)
        }
        Command::Frame(args) => cmd_frame(config, args),
        Command::Thumbnail(args) => cmd_thumbnail(config, args),
        Command::List => {
            let videos = list_videos(&config.output_root)?;
            println!("{}", serde_json::to_string_pretty(&videos)?);
            Ok(())
        }
    }
}

fn read_product(path: &Path) -> anyhow::Result<Product> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read product '{}'", path.display()))?;
    Ok(Product::from_json_str(&raw)?)
}

fn cmd_generate(config: GeneratorConfig, args: GenerateArgs) -> anyhow::Result<()> {
    let product = read_product(&args.input.product)?;
    let generator = VideoGenerator::new(config)?;
    let options = GenerateOptions {
        duration: args.duration,
        framerate: args.framerate,
    };

    let observer = |fraction: f64| tracing::debug!(fraction, "encode progress");
    let controls = RunControls::with_observer(&observer as &dyn ProgressObserver);
    let artifact = match generator.generate_with(&product, options, controls) {
        Ok(artifact) => artifact,
        Err(e) => {
            if let Some(artifact) = &e.artifact {
                println!("{}", artifact.to_json_pretty()?);
            }
            return Err(e.into());
        }
    };

    let json = artifact.to_json_pretty()?;
    if let Some(path) = &args.out_json {
        std::fs::write(path, &json)
            .with_context(|| format!("write artifact json '{}'", path.display()))?;
    }
    println!("{json}");
    Ok(())
}

fn cmd_frame(config: GeneratorConfig, args: FrameArgs) -> anyhow::Result<()> {
    let product = read_product(&args.input.product)?;
    product.validate()?;
    let generator = VideoGenerator::new(config)?;
    let frame = generator
        .composer()
        .render_frame(&product, args.index, args.total)?;
    ensure_parent_dir(&args.out)?;
    frame.write_png(&args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_thumbnail(config: GeneratorConfig, args: ThumbnailArgs) -> anyhow::Result<()> {
    let product = read_product(&args.input.product)?;
    product.validate()?;
    let generator = VideoGenerator::new(config)?;
    ensure_parent_dir(&args.out)?;
    generator.thumbnails().render_to(&product, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
