use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use tessera::{BitmapId, Config, DirAssetSource, FrameSelect, GraphicsContext, IntRect, StorageMode};

#[derive(Parser, Debug)]
#[command(name = "tessera", version)]
struct Cli {
    /// Config JSON (defaults apply when omitted).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print size, storage mode and frame count of an image.
    Info(InfoArgs),
    /// Apply filters and/or rescale an image, then save it.
    Convert(ConvertArgs),
    /// Extract one frame of an animated image.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input image.
    image: PathBuf,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output image; PNG, JPEG or BMP by extension.
    #[arg(long)]
    out: PathBuf,

    /// Hue rotation in degrees.
    #[arg(long, allow_hyphen_values = true)]
    hue: Option<i32>,

    /// 3-tap box blur.
    #[arg(long)]
    blur: bool,

    /// Radial blur: sweep angle in degrees and number of divisions.
    #[arg(long, num_args = 2, value_names = ["ANGLE", "DIVISIONS"])]
    radial_blur: Option<Vec<i32>>,

    /// Output size as WIDTHxHEIGHT (smooth scaling).
    #[arg(long, value_parser = parse_size)]
    scale: Option<(i32, i32)>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based, clamped to the last frame).
    #[arg(long)]
    index: usize,

    /// Output image; PNG, JPEG or BMP by extension.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    match cli.cmd {
        Command::Info(args) => cmd_info(config, args),
        Command::Convert(args) => cmd_convert(config, args),
        Command::Frame(args) => cmd_frame(config, args),
    }
}

fn parse_size(s: &str) -> Result<(i32, i32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<i32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| format!("invalid size component '{v}'"))
    };
    Ok((parse(w)?, parse(h)?))
}

/// Context reading assets from the input's directory, plus the file name to load.
fn open(config: Config, input: &Path) -> anyhow::Result<(GraphicsContext, String)> {
    let root = input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = input
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("input path '{}' has no file name", input.display()))?
        .to_string();
    let ctx = GraphicsContext::builder(config)
        .assets(DirAssetSource::new(root))
        .build()?;
    Ok((ctx, name))
}

fn load(ctx: &mut GraphicsContext, name: &str) -> anyhow::Result<BitmapId> {
    ctx.load_bitmap(name)
        .with_context(|| format!("load image '{name}'"))
}

fn save(ctx: &GraphicsContext, id: BitmapId, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    ctx.save_to_file(id, out)
        .with_context(|| format!("save '{}'", out.display()))
}

fn cmd_info(config: Config, args: InfoArgs) -> anyhow::Result<()> {
    let (mut ctx, name) = open(config, &args.image)?;
    let id = load(&mut ctx, &name)?;
    let mode = ctx.storage_mode(id)?;
    println!("size: {}x{}", ctx.width(id)?, ctx.height(id)?);
    println!("mode: {mode}");
    println!("frames: {}", ctx.frame_count(id)?);
    if mode == StorageMode::Animated {
        println!("fps: {}", ctx.animation_fps(id)?);
    }
    Ok(())
}

fn cmd_convert(config: Config, args: ConvertArgs) -> anyhow::Result<()> {
    let (mut ctx, name) = open(config, &args.in_path)?;
    let loaded = load(&mut ctx, &name)?;
    let mut id = match ctx.storage_mode(loaded)? {
        StorageMode::Animated => ctx.copy_bitmap(loaded, FrameSelect::Current)?,
        _ => loaded,
    };

    if let Some(hue) = args.hue {
        ctx.hue_change(id, hue)?;
    }
    if args.blur {
        ctx.blur(id)?;
    }
    if let Some(rb) = &args.radial_blur
        && let [angle, divisions] = rb.as_slice()
    {
        ctx.radial_blur(id, *angle, *divisions)?;
    }
    if let Some((w, h)) = args.scale {
        let src_rect = ctx.rect(id)?;
        let scaled = ctx.create_bitmap(w, h)?;
        ctx.stretch_blt(scaled, IntRect::new(0, 0, w, h), id, src_rect, 255, true)?;
        id = scaled;
    }

    save(&ctx, id, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frame(config: Config, args: FrameArgs) -> anyhow::Result<()> {
    let (mut ctx, name) = open(config, &args.in_path)?;
    let id = load(&mut ctx, &name)?;
    let frame = match ctx.storage_mode(id)? {
        StorageMode::Animated => ctx.copy_bitmap(id, FrameSelect::Index(args.index))?,
        _ => id,
    };
    save(&ctx, frame, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
