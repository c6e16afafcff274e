use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSetBuilder};
use image::ImageReader;
use neurogen_core::{
    parse_export_name, plan_export, synthesize_normal_map, EngineConfig, MapKind, MapSource,
    NeuroGenError, PixelBuffer, ResampleFilter, SetId, SetIdAllocator, SlotStatus, TextureSet,
};
use serde::Deserialize;
use tracing::{error, info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "neurogen",
    about = "Assemble PBR texture sets: synthesize normal maps, pack HDRP mask maps, export under the neurogen naming contract",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --no-progress or --quiet)
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
    /// Derive tangent-space normal maps from an image or a directory of images
    Normal(NormalArgs),
    /// Pack metallic/occlusion/roughness maps into one HDRP mask map
    Pack(PackArgs),
    /// Build a texture set from a base image and export it
    Assemble(AssembleArgs),
    /// Discover exported texture sets in a directory by their filenames
    Scan(ScanArgs),
}

#[derive(Parser, Debug, Clone)]
struct NormalArgs {
    /// Input image file or directory
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// YAML config file path (overrides engine-related options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,
    /// Bump strength (> 0); higher values exaggerate surface detail
    #[arg(long, default_value_t = 2.0, help_heading = "Synthesis")]
    strength: f32,
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    /// Metallic map (red channel used)
    #[arg(long, help_heading = "Sources")]
    metallic: Option<PathBuf>,
    /// Occlusion map (red channel used)
    #[arg(long, help_heading = "Sources")]
    occlusion: Option<PathBuf>,
    /// Roughness map (red channel used; packed inverted as smoothness)
    #[arg(long, help_heading = "Sources")]
    roughness: Option<PathBuf>,
    /// Output mask width
    #[arg(long, default_value_t = 1024, help_heading = "Layout")]
    width: u32,
    /// Output mask height
    #[arg(long, default_value_t = 1024, help_heading = "Layout")]
    height: u32,
    /// Resample filter: nearest | bilinear
    #[arg(long, default_value = "bilinear", help_heading = "Layout")]
    filter: String,
    /// Output file
    #[arg(short, long, default_value = "mask.png", help_heading = "Input/Output")]
    out: PathBuf,
    /// YAML config file path (overrides engine-related options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
struct AssembleArgs {
    /// Base (albedo) image; the set's dimensions come from it
    #[arg(help_heading = "Input/Output")]
    albedo: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// YAML config file path (overrides engine-related options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Roughness map file to load into the set
    #[arg(long, help_heading = "Sources")]
    roughness: Option<PathBuf>,
    /// Metallic map file to load into the set
    #[arg(long, help_heading = "Sources")]
    metallic: Option<PathBuf>,
    /// Occlusion map file to load into the set
    #[arg(long, help_heading = "Sources")]
    occlusion: Option<PathBuf>,
    /// Height map file to load into the set
    #[arg(long, help_heading = "Sources")]
    height: Option<PathBuf>,
    /// Bump strength for the derived normal map
    #[arg(long, default_value_t = 2.0, help_heading = "Synthesis")]
    strength: f32,
    /// Skip local normal map synthesis
    #[arg(long, default_value_t = false, help_heading = "Synthesis")]
    no_normal: bool,
    /// Also pack and export an HDRP mask map
    #[arg(long, default_value_t = false, help_heading = "Export")]
    mask: bool,
    /// Resample filter: nearest | bilinear
    #[arg(long, default_value = "bilinear", help_heading = "Export")]
    filter: String,
    /// Set identifier; defaults to a millisecond timestamp
    #[arg(long, help_heading = "Export")]
    id: Option<String>,
    /// Filename prefix for exported maps
    #[arg(long, help_heading = "Export")]
    prefix: Option<String>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
}

#[derive(Parser, Debug, Clone)]
struct ScanArgs {
    /// Directory to scan for exported texture sets
    input: PathBuf,
    /// Only report sets exported with this filename prefix
    #[arg(long, default_value = "neurogen")]
    prefix: String,
    /// Emit the result as JSON instead of a table
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Normal(args) => run_normal(args, cli.progress && !cli.quiet),
        Commands::Pack(args) => run_pack(args),
        Commands::Assemble(args) => run_assemble(args),
        Commands::Scan(args) => run_scan(args),
    }
}

fn run_normal(cli: &NormalArgs, show_progress: bool) -> anyhow::Result<()> {
    let mut cfg = EngineConfig {
        normal_strength: cli.strength,
        ..Default::default()
    };
    cfg = apply_yaml_config(cfg, cli.config.as_deref())?;
    cfg.validate()?;

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;

    if cli.input.is_file() {
        let out_path = derive_one(&cli.input, &cli.out_dir, cfg.normal_strength)?;
        info!(?out_path, "normal map written");
        return Ok(());
    }

    let paths = gather_paths(&cli.input, &cli.include, &cli.exclude)?;
    if paths.is_empty() {
        anyhow::bail!("no input images found under {}", cli.input.display());
    }
    info!(count = paths.len(), "deriving normal maps");

    let bar = progress_bar(paths.len(), show_progress);
    let mut written = 0usize;
    for p in &paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        match derive_one(p, &cli.out_dir, cfg.normal_strength) {
            Ok(_) => written += 1,
            Err(e) => {
                error!(?p, error = %e, "skip image");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    info!(written, total = paths.len(), "batch complete");
    Ok(())
}

fn derive_one(input: &Path, out_dir: &Path, strength: f32) -> anyhow::Result<PathBuf> {
    let source = load_buffer(input)?;
    let normal = synthesize_normal_map(&source, strength)?;
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let out_path = out_dir.join(format!("{stem}_normal.png"));
    normal
        .to_rgba8()
        .save(&out_path)
        .with_context(|| format!("write {}", out_path.display()))?;
    Ok(out_path)
}

fn run_pack(cli: &PackArgs) -> anyhow::Result<()> {
    let mut cfg = EngineConfig {
        mask_width: cli.width,
        mask_height: cli.height,
        filter: parse_filter(&cli.filter)?,
        ..Default::default()
    };
    cfg = apply_yaml_config(cfg, cli.config.as_deref())?;
    cfg.validate()?;

    let metallic = cli.metallic.as_deref().map(load_buffer).transpose()?;
    let occlusion = cli.occlusion.as_deref().map(load_buffer).transpose()?;
    let roughness = cli.roughness.as_deref().map(load_buffer).transpose()?;

    let sources = neurogen_core::MaskSources {
        metallic: metallic.as_ref(),
        occlusion: occlusion.as_ref(),
        roughness: roughness.as_ref(),
    };
    let packed =
        neurogen_core::pack_mask_map(&sources, cfg.mask_width, cfg.mask_height, cfg.filter)
            .context("pack mask map")?;

    if let Some(parent) = cli.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    packed
        .to_rgba8()
        .save(&cli.out)
        .with_context(|| format!("write {}", cli.out.display()))?;
    info!(out = ?cli.out, width = cfg.mask_width, height = cfg.mask_height, "mask map written");
    Ok(())
}

fn run_assemble(cli: &AssembleArgs) -> anyhow::Result<()> {
    let mut cfg = EngineConfig {
        normal_strength: cli.strength,
        filter: parse_filter(&cli.filter)?,
        ..Default::default()
    };
    if let Some(prefix) = &cli.prefix {
        cfg.export_prefix = prefix.clone();
    }
    cfg = apply_yaml_config(cfg, cli.config.as_deref())?;
    cfg.validate()?;

    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let albedo = load_buffer(&cli.albedo)?;
    let id = match &cli.id {
        Some(token) => {
            // Underscores would shift the `{prefix}_{id}_{suffix}` segments
            // and break every external consumer of the naming contract.
            if token.is_empty() || token.contains('_') {
                anyhow::bail!("set id must be non-empty and underscore-free: {token:?}");
            }
            SetId::new(token.clone())
        }
        None => SetIdAllocator::new().allocate(),
    };
    let mut set = TextureSet::new(id, albedo);
    info!(id = %set.id(), dims = ?set.dimensions(), "texture set created");

    if !cli.no_normal {
        let status = set.populate(MapKind::Normal, &cfg, |albedo| {
            synthesize_normal_map(albedo, cfg.normal_strength)
        })?;
        report_slot(&set, MapKind::Normal, status);
    }

    let source = FileMapSource::new([
        (MapKind::Roughness, cli.roughness.clone()),
        (MapKind::Metallic, cli.metallic.clone()),
        (MapKind::Occlusion, cli.occlusion.clone()),
        (MapKind::Height, cli.height.clone()),
    ]);
    for kind in [
        MapKind::Roughness,
        MapKind::Metallic,
        MapKind::Occlusion,
        MapKind::Height,
    ] {
        if !source.provides(kind) {
            continue;
        }
        let status = set.populate_from(kind, &source, &cfg)?;
        report_slot(&set, kind, status);
    }

    let files = plan_export(&set, &cfg, cli.mask);
    if files.is_empty() {
        anyhow::bail!("nothing to export");
    }
    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("create out_dir {}", cli.out_dir.display()))?;
    for file in &files {
        let path = cli.out_dir.join(&file.file_name);
        file.rgba
            .save(&path)
            .with_context(|| format!("write {}", path.display()))?;
        info!(?path, "map written");
    }
    info!(id = %set.id(), files = files.len(), "texture set exported");
    Ok(())
}

fn report_slot(set: &TextureSet, kind: MapKind, status: SlotStatus) {
    match status {
        SlotStatus::Ready => info!(kind = %kind, "map ready"),
        SlotStatus::Failed => {
            warn!(kind = %kind, reason = set.failure(kind).unwrap_or("unknown"), "map failed; slot stays retryable");
        }
        _ => {}
    }
}

fn run_scan(cli: &ScanArgs) -> anyhow::Result<()> {
    let mut sets: BTreeMap<String, Vec<MapKind>> = BTreeMap::new();
    for entry in WalkDir::new(&cli.input).into_iter().filter_map(|e| e.ok()) {
        let p = entry.path();
        if !p.is_file() {
            continue;
        }
        let Some(name) = p.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        if let Some((prefix, id, kind)) = parse_export_name(name) {
            if prefix == cli.prefix {
                sets.entry(id.to_string()).or_default().push(kind);
            }
        }
    }
    for kinds in sets.values_mut() {
        kinds.sort_by_key(|k| MapKind::ALL.iter().position(|a| a == k));
        kinds.dedup();
    }

    if cli.json {
        let value: serde_json::Value = sets
            .iter()
            .map(|(id, kinds)| {
                (
                    id.clone(),
                    serde_json::to_value(kinds).expect("serializable kinds"),
                )
            })
            .collect::<serde_json::Map<String, serde_json::Value>>()
            .into();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if sets.is_empty() {
        println!("no texture sets found under {}", cli.input.display());
        return Ok(());
    }
    for (id, kinds) in &sets {
        let list = kinds
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!("{}_{}: {}", cli.prefix, id, list);
    }
    Ok(())
}

/// Map producer backed by user-supplied files, standing in for a remote
/// generator: opaque, fallible, no retries.
struct FileMapSource {
    paths: HashMap<MapKind, PathBuf>,
}

impl FileMapSource {
    fn new(entries: impl IntoIterator<Item = (MapKind, Option<PathBuf>)>) -> Self {
        let paths = entries
            .into_iter()
            .filter_map(|(kind, path)| path.map(|p| (kind, p)))
            .collect();
        Self { paths }
    }

    fn provides(&self, kind: MapKind) -> bool {
        self.paths.contains_key(&kind)
    }
}

impl MapSource for FileMapSource {
    fn produce(&self, _source: &PixelBuffer, kind: MapKind) -> neurogen_core::Result<PixelBuffer> {
        let path = self.paths.get(&kind).ok_or_else(|| {
            NeuroGenError::Upstream(format!("no file supplied for the {kind} map"))
        })?;
        let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        PixelBuffer::from_rgba8(img.to_rgba8())
    }
}

fn load_buffer(p: &Path) -> anyhow::Result<PixelBuffer> {
    let img = ImageReader::open(p)
        .with_context(|| format!("open {}", p.display()))?
        .with_guessed_format()?
        .decode()
        .with_context(|| format!("decode {}", p.display()))?;
    Ok(PixelBuffer::from_rgba8(img.to_rgba8())?)
}

fn parse_filter(s: &str) -> anyhow::Result<ResampleFilter> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown resample filter: {} (expected nearest|bilinear)", s))
}

fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
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
    let mut list: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
        let p = entry.path();
        if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
            list.push(p.to_path_buf());
        }
    }
    list.sort();
    Ok(list)
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

fn progress_bar(len: usize, show: bool) -> Option<indicatif::ProgressBar> {
    use indicatif::{ProgressBar, ProgressStyle};
    if !show {
        return None;
    }
    let b = ProgressBar::new(len as u64);
    b.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} deriving {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )
        .unwrap(),
    );
    Some(b)
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
    mask_width: Option<u32>,
    mask_height: Option<u32>,
    filter: Option<String>,
    normal_strength: Option<f32>,
    export_prefix: Option<String>,
}

impl YamlConfig {
    fn into_engine_config(self, mut cfg: EngineConfig) -> EngineConfig {
        if let Some(v) = self.mask_width {
            cfg.mask_width = v;
        }
        if let Some(v) = self.mask_height {
            cfg.mask_height = v;
        }
        if let Some(v) = self.filter {
            cfg.filter = v.parse().unwrap_or(cfg.filter);
        }
        if let Some(v) = self.normal_strength {
            cfg.normal_strength = v;
        }
        if let Some(v) = self.export_prefix {
            cfg.export_prefix = v;
        }
        cfg
    }
}

fn apply_yaml_config(cfg: EngineConfig, path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(cfg);
    };
    let file = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let y: YamlConfig = serde_yaml::from_str(&file)?;
    Ok(y.into_engine_config(cfg))
}
