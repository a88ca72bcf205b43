use clap::Parser;
use gridmatch::io::{load_frame, load_template};
use gridmatch::{
    CompareMode, Detection, EngineConfig, GridSpec, MatchConfig, MatchEngine, TemplateBank,
    TemplateId,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Gridmatch CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum CompareModeConfig {
    #[default]
    HigherIsBetter,
    LowerIsBetter,
}

impl From<CompareModeConfig> for CompareMode {
    fn from(value: CompareModeConfig) -> Self {
        match value {
            CompareModeConfig::HigherIsBetter => CompareMode::HigherIsBetter,
            CompareModeConfig::LowerIsBetter => CompareMode::LowerIsBetter,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct GridJson {
    cols: usize,
    rows: usize,
    overlap: usize,
}

impl Default for GridJson {
    fn default() -> Self {
        let spec = GridSpec::default();
        Self {
            cols: spec.cols,
            rows: spec.rows,
            overlap: spec.overlap,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct MatchConfigJson {
    nms_overlap: f32,
    min_var_i: f32,
    parallel: bool,
}

impl Default for MatchConfigJson {
    fn default() -> Self {
        let cfg = MatchConfig::default();
        Self {
            nms_overlap: cfg.nms_overlap,
            min_var_i: cfg.min_var_i,
            parallel: cfg.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TemplateJson {
    path: PathBuf,
    name: Option<String>,
    #[serde(default)]
    mode: CompareModeConfig,
    threshold: Option<f32>,
    #[serde(default = "default_divided")]
    divided: bool,
}

fn default_divided() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    frame_path: String,
    output_path: Option<String>,
    workers: Option<usize>,
    grid: GridJson,
    #[serde(rename = "match")]
    match_cfg: MatchConfigJson,
    templates: Vec<TemplateJson>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_path: String::new(),
            output_path: None,
            workers: None,
            grid: GridJson::default(),
            match_cfg: MatchConfigJson::default(),
            templates: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    score: f32,
}

impl From<&Detection> for DetectionRecord {
    fn from(value: &Detection) -> Self {
        Self {
            x: value.rect.x,
            y: value.rect.y,
            width: value.rect.width,
            height: value.rect.height,
            score: value.score,
        }
    }
}

#[derive(Debug, Serialize)]
struct TemplateRecord {
    id: u32,
    name: Option<String>,
    detections: Vec<DetectionRecord>,
}

#[derive(Debug, Serialize)]
struct Output {
    frame_width: usize,
    frame_height: usize,
    templates: Vec<TemplateRecord>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("gridmatch=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.frame_path.is_empty() {
        return Err("frame_path must be set in the config".into());
    }
    if config.templates.is_empty() {
        return Err("at least one template must be listed in the config".into());
    }

    let mut templates = Vec::with_capacity(config.templates.len());
    for (idx, entry) in config.templates.iter().enumerate() {
        let id = TemplateId(u32::try_from(idx)?);
        let mut tpl = load_template(id, &entry.path)?
            .with_mode(entry.mode.into())
            .with_divided(entry.divided);
        if let Some(threshold) = entry.threshold {
            tpl = tpl.with_threshold(threshold);
        }
        if let Some(name) = &entry.name {
            tpl = tpl.with_name(name.clone());
        }
        templates.push(tpl);
    }
    let bank = TemplateBank::new(templates)?;
    tracing::info!(templates = bank.len(), "template bank loaded");

    let mut engine_cfg = EngineConfig {
        grid: GridSpec {
            cols: config.grid.cols,
            rows: config.grid.rows,
            overlap: config.grid.overlap,
        },
        matching: MatchConfig {
            nms_overlap: config.match_cfg.nms_overlap,
            min_var_i: config.match_cfg.min_var_i,
            parallel: config.match_cfg.parallel,
        },
        ..EngineConfig::default()
    };
    if let Some(workers) = config.workers {
        engine_cfg.workers = workers;
    }
    let mut engine = MatchEngine::new(engine_cfg, bank)?;

    let frame = load_frame(&config.frame_path)?;
    let detections = engine.process(&frame);
    tracing::info!(
        detections = detections.values().map(Vec::len).sum::<usize>(),
        "frame processed"
    );

    let templates = engine
        .bank()
        .iter()
        .map(|compiled| {
            let tpl = compiled.template();
            TemplateRecord {
                id: tpl.id().0,
                name: tpl.name().map(str::to_owned),
                detections: detections
                    .get(&tpl.id())
                    .map(|found| found.iter().map(DetectionRecord::from).collect())
                    .unwrap_or_default(),
            }
        })
        .collect();
    let output = Output {
        frame_width: frame.width(),
        frame_height: frame.height(),
        templates,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
