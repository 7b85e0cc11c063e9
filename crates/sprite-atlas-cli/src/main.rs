use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSet, GlobSetBuilder};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use sprite_atlas_core::prelude::*;
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "sprite-atlas",
    about = "Arrange, pack, and export texture atlases",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(short, long, default_value_t = false, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build an atlas from a folder of images and save it
    Pack(PackArgs),
    /// Re-pack a saved atlas in place
    Repack(RepackArgs),
    /// Flatten a saved atlas into one composite image
    Export(ExportArgs),
    /// Show a saved atlas's layout
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
struct PackArgs {
    /// Input directory, scanned recursively for images
    input: PathBuf,
    /// Output parent directory; the atlas is saved at <out_dir>/<name>
    #[arg(short, long, default_value = "out")]
    out_dir: PathBuf,
    /// Atlas name
    #[arg(short, long, default_value = "atlas")]
    name: String,
    /// Overwrite an existing <out_dir>/<name> instead of suffixing "(1)"
    #[arg(long, default_value_t = false)]
    overwrite: bool,
    /// Skip bin-packing and keep the cascading default layout
    #[arg(long, default_value_t = false)]
    no_pack: bool,
    /// Include patterns (glob); if set, only matching files are considered
    #[arg(long)]
    include: Vec<String>,
    /// Exclude patterns (glob)
    #[arg(long)]
    exclude: Vec<String>,
    /// Hide the image-loading progress bar
    #[arg(long, default_value_t = false)]
    no_progress: bool,
    #[command(flatten)]
    packer: PackerFlags,
}

#[derive(Parser, Debug)]
struct PackerFlags {
    /// Maximum atlas width
    #[arg(long, default_value_t = 1024, help_heading = "Packing")]
    max_width: u32,
    /// Maximum atlas height
    #[arg(long, default_value_t = 1024, help_heading = "Packing")]
    max_height: u32,
    /// Spacing added around each element's footprint (both axes)
    #[arg(long, default_value_t = 2, help_heading = "Packing")]
    margin: u32,
    /// Allow 90°-rotated footprints
    #[arg(long, default_value_t = false, help_heading = "Packing")]
    allow_rotation: bool,
    /// YAML settings file; set fields override the flags above
    #[arg(long, help_heading = "Packing")]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RepackArgs {
    /// Saved atlas directory
    atlas: PathBuf,
    #[command(flatten)]
    packer: PackerFlags,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Saved atlas directory
    atlas: PathBuf,
    /// Output image path
    #[arg(short, long, default_value = "atlas.png")]
    out: PathBuf,
    /// Also write the sibling map file (same path, .txt extension)
    #[arg(long, default_value_t = false)]
    map: bool,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Saved atlas directory
    atlas: PathBuf,
    /// Emit the layout as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, !cli.quiet),
        Commands::Repack(args) => run_repack(args),
        Commands::Export(args) => run_export(args),
        Commands::Info(args) => run_info(args),
    }
}

fn run_pack(args: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let files = collect_inputs(&args.input, &args.include, &args.exclude)?;
    anyhow::ensure!(
        !files.is_empty(),
        "no images found under {}",
        args.input.display()
    );

    let mut collection = PlacementCollection::default();
    let bar = progress_bar(files.len(), show_progress && !args.no_progress);
    for path in &files {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image")
            .to_string();
        if let Some(b) = &bar {
            b.set_message(name.clone());
        }
        collection.add_image(name, path, false);
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    info!("loaded {} images", collection.len());

    if !args.no_pack {
        pack_collection(&mut collection, &args.packer)?;
    }

    let mut atlas = Atlas::with_collection(args.name.clone(), collection);
    let dest = atlas
        .save_to_file(&args.out_dir, args.overwrite)
        .with_context(|| format!("saving under {}", args.out_dir.display()))?;
    remember_atlas(atlas.name(), &dest);
    println!("saved {}", dest.display());
    Ok(())
}

fn run_repack(args: &RepackArgs) -> anyhow::Result<()> {
    let mut atlas = Atlas::load_from_file(&args.atlas)
        .with_context(|| format!("loading {}", args.atlas.display()))?;
    pack_collection(atlas.collection_mut(), &args.packer)?;
    atlas.save().context("re-saving atlas")?;
    remember_atlas(atlas.name(), &args.atlas);
    println!("repacked {}", args.atlas.display());
    Ok(())
}

fn run_export(args: &ExportArgs) -> anyhow::Result<()> {
    let atlas = Atlas::load_from_file(&args.atlas)
        .with_context(|| format!("loading {}", args.atlas.display()))?;
    atlas
        .export_to_image(&args.out, args.map)
        .with_context(|| format!("exporting to {}", args.out.display()))?;
    println!("exported {}", args.out.display());
    Ok(())
}

fn run_info(args: &InfoArgs) -> anyhow::Result<()> {
    let atlas = Atlas::load_from_file(&args.atlas)
        .with_context(|| format!("loading {}", args.atlas.display()))?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&layout_json(&atlas))?);
        return Ok(());
    }
    println!("atlas: {} ({} elements)", atlas.name(), atlas.collection().len());
    for e in atlas.collection().iter() {
        let size = e.scaled_size();
        println!(
            "  {:24} pos ({:.1}, {:.1})  size {:.0}x{:.0}  scale ({:.2}, {:.2})",
            e.name(),
            e.position().x,
            e.position().y,
            size.x,
            size.y,
            e.scale().x,
            e.scale().y,
        );
    }
    Ok(())
}

fn pack_collection(
    collection: &mut PlacementCollection,
    flags: &PackerFlags,
) -> anyhow::Result<()> {
    let settings = load_settings(flags)?;
    let mut packer = AtlasPacker::new(settings);
    packer.load_rects(collection);
    let report = packer.pack().context("packing failed")?;
    packer.apply_changes(collection);
    info!("{}", report.summary());
    Ok(())
}

/// Optional YAML settings file; set fields override the CLI flags.
#[derive(Debug, Deserialize, Default)]
struct SettingsFile {
    max_width: Option<u32>,
    max_height: Option<u32>,
    margin: Option<u32>,
    allow_rotation: Option<bool>,
}

fn load_settings(flags: &PackerFlags) -> anyhow::Result<PackerSettings> {
    let mut settings = PackerSettings {
        max_size: (flags.max_width, flags.max_height),
        margin: (flags.margin, flags.margin),
        allow_rotation: flags.allow_rotation,
    };
    if let Some(path) = &flags.config {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let file: SettingsFile = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        if let Some(v) = file.max_width {
            settings.max_size.0 = v;
        }
        if let Some(v) = file.max_height {
            settings.max_size.1 = v;
        }
        if let Some(v) = file.margin {
            settings.margin = (v, v);
        }
        if let Some(v) = file.allow_rotation {
            settings.allow_rotation = v;
        }
    }
    settings.validate()?;
    Ok(settings)
}

fn collect_inputs(
    input: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    let include_set = build_globset(include)?;
    let exclude_set = build_globset(exclude)?;
    let mut files = Vec::new();
    for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_image(path) {
            continue;
        }
        if let Some(inc) = &include_set {
            if !inc.is_match(path) {
                continue;
            }
        }
        if let Some(exc) = &exclude_set {
            if exc.is_match(path) {
                continue;
            }
        }
        files.push(path.to_path_buf());
    }
    files.sort();
    Ok(files)
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for p in patterns {
        builder.add(Glob::new(p).with_context(|| format!("bad glob pattern {p:?}"))?);
    }
    Ok(Some(builder.build()?))
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "bmp" | "tga" | "gif")
    )
}

fn progress_bar(len: usize, show: bool) -> Option<ProgressBar> {
    if !show {
        return None;
    }
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner:.green} loading {pos}/{len} {wide_msg}")
    {
        bar.set_style(style);
    }
    Some(bar)
}

/// Updates the bounded recent-atlases list under the user config directory.
/// Best-effort: failures only log.
fn remember_atlas(name: &str, path: &Path) {
    let Some(dir) = dirs::config_dir().map(|d| d.join("sprite-atlas")) else {
        return;
    };
    if let Err(e) = fs::create_dir_all(&dir) {
        warn!("cannot create {}: {e}", dir.display());
        return;
    }
    let file = dir.join("recent.txt");
    let mut recent = RecentFiles::load(&file).unwrap_or_default();
    recent.add(name, path);
    if let Err(e) = recent.dump(&file) {
        warn!("cannot update {}: {e}", file.display());
    }
}

fn init_tracing(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}
