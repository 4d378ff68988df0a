use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use nerfmask::{
    ErrorResponse, GenerateMaskRequest, MaskEncoding, MaskSession, NerfmaskError, NerfmaskResult,
    SessionOpts,
};

#[derive(Parser, Debug)]
#[command(name = "nerfmask", version, about = "Edit per-frame masks of a transforms.json dataset")]
struct Cli {
    /// Enable debug logging.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load (and normalize) a dataset and print its summary.
    Load(DatasetArgs),
    /// Print the absolute image path of a frame.
    Image(FrameArgs),
    /// Write the mask overlay of a frame as a PNG.
    Mask(MaskArgs),
    /// Generate a mask for a frame from editor rectangles.
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct DatasetArgs {
    /// Absolute dataset root containing transforms.json.
    #[arg(long)]
    root: PathBuf,

    /// Skip the one-time backup of masks and manifest.
    #[arg(long)]
    no_safety_copy: bool,

    /// JPEG quality for empty and generated masks.
    #[arg(long, default_value_t = MaskEncoding::default().jpeg_quality)]
    jpeg_quality: u8,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    /// Frame index (0-based).
    #[arg(long, allow_hyphen_values = true)]
    index: i64,
}

#[derive(Args, Debug)]
struct MaskArgs {
    #[command(flatten)]
    frame: FrameArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    frame: FrameArgs,

    /// JSON file with `{ "rectangles": [...], "keep_mask": bool }`.
    #[arg(long)]
    request: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Load(args) => cmd_load(args),
        Command::Image(args) => cmd_image(args),
        Command::Mask(args) => cmd_mask(args),
        Command::Generate(args) => cmd_generate(args),
    }
}

fn open_session(args: &DatasetArgs) -> anyhow::Result<(MaskSession, serde_json::Value)> {
    let session = MaskSession::new(SessionOpts {
        encoding: MaskEncoding {
            jpeg_quality: args.jpeg_quality,
        },
        ..SessionOpts::default()
    });
    let summary = session.set_dataset_path(&args.root, !args.no_safety_copy);
    let body = respond(summary)?;
    Ok((session, body))
}

/// Serialize a successful response; failures are printed as `{"error": ...}` and exit non-zero.
fn respond<T: serde::Serialize>(res: NerfmaskResult<T>) -> anyhow::Result<serde_json::Value> {
    let v = res.map_err(report)?;
    Ok(serde_json::to_value(v)?)
}

fn report(e: NerfmaskError) -> anyhow::Error {
    match serde_json::to_string(&ErrorResponse::from(&e)) {
        Ok(body) => println!("{body}"),
        Err(ser) => tracing::error!(error = %ser, "failed to serialize error response"),
    }
    e.into()
}

fn cmd_load(args: DatasetArgs) -> anyhow::Result<()> {
    let (_, summary) = open_session(&args)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn cmd_image(args: FrameArgs) -> anyhow::Result<()> {
    let (session, _) = open_session(&args.dataset)?;
    let path = respond(session.get_image(args.index))?;
    println!("{}", serde_json::to_string(&serde_json::json!({ "image_path": path }))?);
    Ok(())
}

fn cmd_mask(args: MaskArgs) -> anyhow::Result<()> {
    let (session, _) = open_session(&args.frame.dataset)?;
    let png = session.get_mask(args.frame.index).map_err(report)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let req = read_request_json(&args.request)?;
    let (session, _) = open_session(&args.frame.dataset)?;
    let body = respond(session.generate_mask(args.frame.index, &req))?;
    println!("{}", serde_json::to_string(&body)?);
    Ok(())
}

fn read_request_json(path: &Path) -> anyhow::Result<GenerateMaskRequest> {
    let f = File::open(path).with_context(|| format!("open request '{}'", path.display()))?;
    let r = BufReader::new(f);
    let req: GenerateMaskRequest =
        serde_json::from_reader(r).with_context(|| "parse generate-mask request JSON")?;
    Ok(req)
}
