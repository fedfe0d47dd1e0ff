//! `ember` - render built-in scenes and combine finished renders.

mod scenes;
mod settings;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;

use ember_renderer::{ImageBuffer, Sampling};

use scenes::{SceneAssets, SceneKind};
use settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "ember", version, about = "Offline Monte Carlo path tracer")]
struct Cli {
    /// More log output (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a built-in scene
    Render(RenderArgs),
    /// Average several PPM renders of the same scene
    Mix(MixArgs),
    /// List the built-in scenes
    List,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Scene to render
    #[arg(short, long, value_enum)]
    scene: SceneKind,

    /// Image width in pixels; height follows the scene's aspect ratio
    #[arg(short, long)]
    width: Option<u32>,

    /// Samples per pixel
    #[arg(long)]
    spp: Option<u32>,

    /// Maximum bounce depth
    #[arg(long)]
    depth: Option<u32>,

    /// Seed for scene construction and sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Bucket edge length in pixels
    #[arg(long)]
    bucket_size: Option<u32>,

    /// Follow material scattering only, without sampling lights
    #[arg(long, action)]
    direct: bool,

    /// JSON settings file, applied before the flags above
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Image used by the earth and final scenes
    #[arg(long, default_value = "earthmap.jpg")]
    earth_map: PathBuf,

    /// Output image (.ppm, or any format the image crate writes, e.g. .png)
    #[arg(short, long, default_value = "image.ppm")]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct MixArgs {
    /// PPM images to average
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output image
    #[arg(short, long, default_value = "mix.ppm")]
    output: PathBuf,
}

impl RenderArgs {
    fn flag_settings(&self) -> Settings {
        Settings {
            width: self.width,
            samples_per_pixel: self.spp,
            max_depth: self.depth,
            background: None,
            sampling: self.direct.then_some(Sampling::Direct),
            bucket_size: self.bucket_size,
            seed: self.seed,
        }
    }
}

fn render(args: &RenderArgs) -> Result<()> {
    let file_settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let defaults = args.scene.defaults();
    let (width, config) = file_settings.overlay(args.flag_settings()).apply(&defaults);

    let assets = SceneAssets {
        earth_map: args.earth_map.clone(),
    };
    let mut rng = StdRng::seed_from_u64(config.seed);
    let scene = args
        .scene
        .build(width, config, &assets, &mut rng)
        .with_context(|| format!("Failed to build scene '{}'", args.scene.name()))?;

    let image = ember_renderer::render(&scene);
    write_image(&image, &args.output)?;

    log::info!("Wrote {}", args.output.display());
    Ok(())
}

fn mix(args: &MixArgs) -> Result<()> {
    let mut images = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        // Renders that never finished are skipped, not fatal
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        let image = ImageBuffer::read_ppm(BufReader::new(file))
            .with_context(|| format!("Failed to read {}", path.display()))?;
        log::debug!("Read {} ({}x{})", path.display(), image.width(), image.height());
        images.push(image);
    }

    if images.is_empty() {
        return Err(anyhow!("None of the {} inputs could be opened", args.inputs.len()));
    }
    let mixed = ImageBuffer::average(&images).context("Failed to average images")?;
    write_image(&mixed, &args.output)?;

    log::info!("Mixed {} images into {}", images.len(), args.output.display());
    Ok(())
}

fn list() {
    for kind in SceneKind::value_variants() {
        let help = kind
            .to_possible_value()
            .and_then(|value| value.get_help().map(|help| help.to_string()))
            .unwrap_or_default();
        println!("{:<16} {}", kind.name(), help);
    }
}

/// Write PPM directly; anything else goes through the image crate.
fn write_image(image: &ImageBuffer, path: &Path) -> Result<()> {
    let is_ppm = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(true, |ext| ext.eq_ignore_ascii_case("ppm"));

    if is_ppm {
        let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        image
            .write_ppm(&mut BufWriter::new(file))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        return Ok(());
    }

    let rgb = image::RgbImage::from_raw(image.width(), image.height(), image.to_rgb8())
        .ok_or_else(|| anyhow!("Image buffer does not match {}x{}", image.width(), image.height()))?;
    rgb.save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose > 0 || std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(level);
    }
    logger.init();

    match &cli.command {
        Command::Render(args) => render(args),
        Command::Mix(args) => mix(args),
        Command::List => {
            list();
            Ok(())
        }
    }
}
