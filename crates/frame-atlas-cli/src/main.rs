use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use frame_atlas_core::{
    AtlasDescriptor, ExportFormat, Frame, FrameStore, PackConfig, PixelFormat, SplitRule,
    build_atlas, export, sheet_file_names,
};
use globset::{Glob, GlobSetBuilder};
use image::ImageReader;
use serde::Deserialize;
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "frame-atlas",
    about = "Pack animation frames into texture sheets",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack a directory of animations into sheets + descriptor
    Pack(PackArgs),
    /// Print the contents of a JSON descriptor
    Inspect(InspectArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input/Output
    /// Input directory; every directory holding images is one animation
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Atlas base name (files will be name.png/.json)
    #[arg(short, long, default_value = "atlas", help_heading = "Input/Output")]
    name: String,
    /// YAML config file path (overrides packing options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,
    /// Drop frames that fail to decode instead of aborting
    #[arg(long, default_value_t = false, help_heading = "Input/Output")]
    skip_invalid: bool,

    // Layout
    /// Max sheet width
    #[arg(long, default_value_t = 1024, help_heading = "Layout")]
    max_width: u32,
    /// Max sheet height
    #[arg(long, default_value_t = 1024, help_heading = "Layout")]
    max_height: u32,
    /// Padding between frames
    #[arg(long, default_value_t = 0, help_heading = "Layout")]
    padding: u32,
    /// Fail instead of opening a second sheet
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    single_sheet: bool,
    /// Allow rotation (90deg)
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    allow_rotation: bool,
    /// Resize sheet dims to power of two
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    pow2: bool,
    /// Guillotine split: slas|llas|minas|maxas|sas|las
    #[arg(long, default_value = "slas", help_heading = "Layout")]
    split: String,
    /// Keep duplicate frames as separate copies
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    no_dedup: bool,
    /// Treat input pixels as premultiplied alpha
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    premultiplied: bool,
    /// Fingerprint and composite in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    parallel: bool,

    // Export
    /// Metadata format: json | json-hash | plist
    #[arg(long, default_value = "json", help_heading = "Export")]
    metadata: String,
    /// Export packing stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct InspectArgs {
    /// Descriptor written with --metadata json
    descriptor: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet),
        Commands::Inspect(args) => run_inspect(args),
    }
}

fn run_pack(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let split: SplitRule = cli
        .split
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown split rule: {}", cli.split))?;
    let format: ExportFormat = cli
        .metadata
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown metadata format: {}", cli.metadata))?;

    let mut cfg = PackConfig {
        max_width: cli.max_width,
        max_height: cli.max_height,
        padding: cli.padding,
        allow_multiple_sheets: !cli.single_sheet,
        allow_rotation: cli.allow_rotation,
        power_of_two: cli.pow2,
        split,
        detect_duplicates: !cli.no_dedup,
        parallel: cli.parallel,
    };
    // Config file overrides flags field by field
    if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)?;
        cfg = y.into_pack_config(cfg)?;
    }

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let animations = gather_animations(&cli.input, &cli.include, &cli.exclude)?;
    let format_px = if cli.premultiplied {
        PixelFormat::Premultiplied
    } else {
        PixelFormat::Straight
    };
    let store = load_store_with_progress(&animations, format_px, show_progress, cli.skip_invalid)?;
    info!(
        animations = store.groups().len(),
        frames = store.len(),
        "loaded input frames"
    );

    let atlas = build_atlas(&store, &cfg)?;
    let sheet_names = sheet_file_names(&cli.name, atlas.sheet_count());

    let stats = atlas.stats();
    info!(
        sheets = stats.num_sheets,
        unique = stats.num_unique,
        duplicates = stats.num_duplicates,
        occupancy = %format!("{:.2}%", stats.occupancy * 100.0),
        "stats"
    );

    if !cli.dry_run {
        let written = atlas
            .save_sheets(&cli.out_dir, &sheet_names)
            .with_context(|| format!("write sheets to {}", cli.out_dir.display()))?;
        for png_path in &written {
            info!(?png_path, "wrote sheet");
        }

        let meta_path = cli
            .out_dir
            .join(format!("{}.{}", cli.name, format.extension()));
        let text = export(&atlas, format, &sheet_names)?;
        fs::write(&meta_path, text).with_context(|| format!("write {}", meta_path.display()))?;
        info!(?meta_path, sheets = atlas.sheet_count(), "atlas written");
    }

    if let Some(stats_path) = &cli.export_stats {
        if !cli.dry_run {
            fs::write(stats_path, serde_json::to_string_pretty(&stats)?)
                .with_context(|| format!("write {}", stats_path.display()))?;
            info!(?stats_path, "stats exported");
        } else {
            println!("{}", stats.summary());
        }
    }
    Ok(())
}

fn run_inspect(args: &InspectArgs) -> anyhow::Result<()> {
    let text = fs::read_to_string(&args.descriptor)
        .with_context(|| format!("read {}", args.descriptor.display()))?;
    let desc = AtlasDescriptor::from_json(&text)?;
    println!(
        "{} {} (schema {})",
        desc.meta.app, desc.meta.version, desc.meta.schema_version
    );
    for s in &desc.sheets {
        println!("sheet {}: {} ({}x{})", s.index, s.image, s.width, s.height);
    }
    for anim in &desc.animations {
        println!("animation {} ({} frames)", anim.name, anim.frames.len());
        for id in &anim.frames {
            let Some(rec) = desc.frame(id.as_str()) else {
                anyhow::bail!("descriptor has no entry for frame {}", id);
            };
            let alias = rec
                .alias_of
                .as_ref()
                .map(|a| format!(" -> {}", a))
                .unwrap_or_default();
            println!(
                "  {} sheet={} x={} y={} w={} h={}{}{}",
                id,
                rec.sheet,
                rec.frame.x,
                rec.frame.y,
                rec.frame.w,
                rec.frame.h,
                if rec.rotated { " rotated" } else { "" },
                alias
            );
        }
    }
    Ok(())
}

/// Image files grouped by their directory relative to `root`, sorted by path.
fn gather_animations(
    root: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<BTreeMap<String, Vec<PathBuf>>> {
    // Build glob matchers
    let mut inc_set = None;
    if !include.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in include {
            b.add(Glob::new(pat)?);
        }
        inc_set = Some(b.build()?);
    }
    let mut exc_set = None;
    if !exclude.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in exclude {
            b.add(Glob::new(pat)?);
        }
        exc_set = Some(b.build()?);
    }

    let root_name = root
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("default")
        .to_string();
    let mut groups: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let p = entry.path();
        if !p.is_file() || should_skip(p, inc_set.as_ref(), exc_set.as_ref()) || !is_image(p) {
            continue;
        }
        let anim = p
            .parent()
            .and_then(|d| d.strip_prefix(root).ok())
            .map(|d| d.to_string_lossy().replace('\\', "/"))
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| root_name.clone());
        groups.entry(anim).or_default().push(p.to_path_buf());
    }
    Ok(groups)
}

fn should_skip(
    p: &Path,
    include: Option<&globset::GlobSet>,
    exclude: Option<&globset::GlobSet>,
) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "bmp" | "tga" | "gif")
    )
}

fn load_store_with_progress(
    animations: &BTreeMap<String, Vec<PathBuf>>,
    format: PixelFormat,
    progress: bool,
    skip_invalid: bool,
) -> anyhow::Result<FrameStore> {
    use indicatif::{ProgressBar, ProgressStyle};
    let total: usize = animations.values().map(Vec::len).sum();
    let bar = if progress {
        let b = ProgressBar::new(total as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} loading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut store = FrameStore::new(format);
    for (anim, paths) in animations {
        let mut frames = Vec::with_capacity(paths.len());
        for p in paths {
            let stem = p.file_stem().and_then(|s| s.to_str()).unwrap_or("");
            if let Some(b) = &bar {
                b.set_message(format!("{}/{}", anim, stem));
            }
            match load_frame(p, anim, stem) {
                Ok(frame) => frames.push(frame),
                Err(e) if skip_invalid => {
                    warn!(?p, error = %e, "skip frame");
                }
                Err(e) => {
                    if let Some(b) = &bar {
                        b.abandon();
                    }
                    return Err(e.context(format!("load {}", p.display())));
                }
            }
            if let Some(b) = &bar {
                b.inc(1);
            }
        }
        store.add_animation(anim.clone(), frames)?;
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(store)
}

fn load_frame(p: &Path, anim: &str, stem: &str) -> anyhow::Result<Frame> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    let id = format!("{}/{}", anim, stem);
    Ok(Frame::from_rgba(id, anim, &img.to_rgba8()))
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    max_width: Option<u32>,
    max_height: Option<u32>,
    padding: Option<u32>,
    allow_multiple_sheets: Option<bool>,
    allow_rotation: Option<bool>,
    power_of_two: Option<bool>,
    split: Option<String>,
    detect_duplicates: Option<bool>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_pack_config(self, mut cfg: PackConfig) -> anyhow::Result<PackConfig> {
        if let Some(v) = self.max_width {
            cfg.max_width = v;
        }
        if let Some(v) = self.max_height {
            cfg.max_height = v;
        }
        if let Some(v) = self.padding {
            cfg.padding = v;
        }
        if let Some(v) = self.allow_multiple_sheets {
            cfg.allow_multiple_sheets = v;
        }
        if let Some(v) = self.allow_rotation {
            cfg.allow_rotation = v;
        }
        if let Some(v) = self.power_of_two {
            cfg.power_of_two = v;
        }
        if let Some(v) = self.split {
            cfg.split = v
                .parse()
                .map_err(|_| anyhow::anyhow!("unknown split rule in config: {}", v))?;
        }
        if let Some(v) = self.detect_duplicates {
            cfg.detect_duplicates = v;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        Ok(cfg)
    }
}
