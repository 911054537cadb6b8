use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use futures::executor::block_on;
use photobooth::session::{self, Selection};
use photobooth::{
    BoothConfig, BoothError, ExportImage, FilterId, FrameBuffer, FrameColor, InMemoryDecoder,
    MAX_PHOTOS, PhotoRecord, ShapeId, StripComposer, render_polaroid,
};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "photobooth", version, about = "Webcam photo booth and polaroid strip maker")]
struct Cli {
    /// Debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the camera window.
    #[cfg(feature = "booth")]
    Booth,
    /// Compose up to three images into a polaroid strip.
    Strip(StripArgs),
    /// Put one image on a polaroid card.
    Polaroid(PolaroidArgs),
    /// Run a capture filter and clip shape over an image.
    Filter(FilterArgs),
}

#[derive(Parser, Debug)]
struct StripArgs {
    /// `PATH[:frame[:shape]]`, in strip order. Repeat up to three times.
    #[arg(long = "photo", required = true)]
    photos: Vec<PhotoArg>,

    /// Output PNG path, or a directory to save under the default name.
    #[arg(long)]
    out: PathBuf,

    /// Caption along the bottom of the strip.
    #[arg(long)]
    caption: Option<String>,
}

#[derive(Parser, Debug)]
struct PolaroidArgs {
    /// `PATH[:frame[:shape]]`
    #[arg(long)]
    photo: PhotoArg,

    /// Slot number shown in the caption.
    #[arg(long, default_value_t = 1)]
    number: usize,

    /// Output PNG path, or a directory.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct FilterArgs {
    #[arg(long = "in")]
    in_path: PathBuf,

    #[arg(long)]
    filter: FilterId,

    #[arg(long, default_value = "square")]
    shape: ShapeId,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

/// Image path with an optional frame color and shape, colon separated.
#[derive(Clone, Debug, PartialEq)]
struct PhotoArg {
    path: PathBuf,
    frame: FrameColor,
    shape: ShapeId,
}

impl FromStr for PhotoArg {
    type Err = BoothError;

    // Suffixes are only taken when they name real ids, so paths that contain
    // colons still work.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rest = s;
        let mut frame = FrameColor::default();
        let mut shape = ShapeId::default();

        if let Some((head, tail)) = rest.rsplit_once(':') {
            if let Ok(sh) = tail.parse::<ShapeId>() {
                shape = sh;
                rest = head;
            }
        }
        if let Some((head, tail)) = rest.rsplit_once(':') {
            if let Ok(fr) = tail.parse::<FrameColor>() {
                frame = fr;
                rest = head;
            }
        }
        if rest.is_empty() {
            return Err(BoothError::validation(format!("'{s}' has no image path")));
        }
        Ok(Self {
            path: PathBuf::from(rest),
            frame,
            shape,
        })
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    let cfg = match &cli.config {
        Some(path) => BoothConfig::load(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => BoothConfig::default(),
    };

    match cli.cmd {
        #[cfg(feature = "booth")]
        Command::Booth => photobooth::app::run(&cfg).context("booth window"),
        Command::Strip(args) => cmd_strip(args, &cfg),
        Command::Polaroid(args) => cmd_polaroid(args, &cfg),
        Command::Filter(args) => cmd_filter(args),
    }
}

fn cmd_strip(args: StripArgs, cfg: &BoothConfig) -> anyhow::Result<()> {
    if args.photos.len() > MAX_PHOTOS {
        anyhow::bail!("a strip holds at most {MAX_PHOTOS} photos, got {}", args.photos.len());
    }
    let photos = args
        .photos
        .iter()
        .map(load_photo)
        .collect::<anyhow::Result<Vec<_>>>()?;

    let caption = args.caption.unwrap_or_else(|| cfg.caption.clone());
    let composer = StripComposer::new(InMemoryDecoder).with_caption(caption);
    let strip = block_on(composer.compose(&photos)).context("compose strip")?;
    write_export(&strip, &args.out)
}

fn cmd_polaroid(args: PolaroidArgs, cfg: &BoothConfig) -> anyhow::Result<()> {
    if !(1..=MAX_PHOTOS).contains(&args.number) {
        anyhow::bail!("--number must be between 1 and {MAX_PHOTOS}");
    }
    let photo = load_photo(&args.photo)?;
    let card = render_polaroid(&photo, args.number, &cfg.polaroid_caption)?;
    write_export(&card, &args.out)
}

fn cmd_filter(args: FilterArgs) -> anyhow::Result<()> {
    let raw = read_image(&args.in_path)?;
    let selection = Selection {
        shape: args.shape,
        filter: args.filter,
        ..Selection::default()
    };
    let photo = session::develop(&raw, &selection, now_ms())?;
    let out = ExportImage {
        image: photo.image,
        file_name: photo_file_name(&args.out),
    };
    write_export(&out, &args.out)
}

fn read_image(path: &Path) -> anyhow::Result<FrameBuffer> {
    let img = image::open(path).with_context(|| format!("read image '{}'", path.display()))?;
    Ok(FrameBuffer::from_image(img.to_rgba8()))
}

fn load_photo(arg: &PhotoArg) -> anyhow::Result<PhotoRecord> {
    Ok(PhotoRecord {
        image: read_image(&arg.path)?,
        frame: arg.frame,
        shape: arg.shape,
        filter: FilterId::None,
        captured_at_ms: now_ms(),
    })
}

/// Directories get the export's own file name; anything else is the file.
fn write_export(export: &ExportImage, out: &Path) -> anyhow::Result<()> {
    let path = if out.is_dir() {
        out.join(&export.file_name)
    } else {
        if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        out.to_path_buf()
    };
    let bytes = export.encode_png()?;
    std::fs::write(&path, bytes).with_context(|| format!("write png '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn photo_file_name(out: &Path) -> String {
    out.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo.png".to_owned())
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
