use clap::Parser;
use detmerge::{
    BBox, ObjectPrediction, OverlapMetric, PostprocessConfig, PostprocessKind, Postprocessor,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "detmerge CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum KindConfig {
    Nms,
    Nmm,
    GreedyNmm,
}

impl From<KindConfig> for PostprocessKind {
    fn from(value: KindConfig) -> Self {
        match value {
            KindConfig::Nms => PostprocessKind::Nms,
            KindConfig::Nmm => PostprocessKind::Nmm,
            KindConfig::GreedyNmm => PostprocessKind::GreedyNmm,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum MetricConfig {
    Iou,
    Ios,
}

impl From<MetricConfig> for OverlapMetric {
    fn from(value: MetricConfig) -> Self {
        match value {
            MetricConfig::Iou => OverlapMetric::Iou,
            MetricConfig::Ios => OverlapMetric::Ios,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct PostprocessJson {
    kind: KindConfig,
    metric: MetricConfig,
    threshold: f32,
    class_agnostic: bool,
    parallel: bool,
}

impl Default for PostprocessJson {
    fn default() -> Self {
        let cfg = PostprocessConfig::default();
        Self {
            kind: KindConfig::GreedyNmm,
            metric: MetricConfig::Iou,
            threshold: cfg.threshold,
            class_agnostic: cfg.class_agnostic,
            parallel: cfg.parallel,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    input_path: String,
    output_path: Option<String>,
    /// Number of leading detections that are new; the rest are originals.
    len_new: Option<usize>,
    postprocess: PostprocessJson,
}

#[derive(Debug, Deserialize, Serialize)]
struct PredictionRecord {
    bbox: [f32; 4],
    score: f32,
    category_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category_name: Option<String>,
}

impl TryFrom<PredictionRecord> for ObjectPrediction {
    type Error = detmerge::DetMergeError;

    fn try_from(value: PredictionRecord) -> Result<Self, Self::Error> {
        let [x1, y1, x2, y2] = value.bbox;
        Ok(ObjectPrediction {
            bbox: BBox::new(x1, y1, x2, y2)?,
            score: value.score,
            category_id: value.category_id,
            category_name: value.category_name,
        })
    }
}

impl From<ObjectPrediction> for PredictionRecord {
    fn from(value: ObjectPrediction) -> Self {
        Self {
            bbox: [value.bbox.x1, value.bbox.y1, value.bbox.x2, value.bbox.y2],
            score: value.score,
            category_id: value.category_id,
            category_name: value.category_name,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    kind: String,
    input_count: usize,
    predictions: Vec<PredictionRecord>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("detmerge=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.input_path.is_empty() {
        return Err("input_path must be set in the config".into());
    }

    let input_text = fs::read_to_string(&config.input_path)?;
    let records: Vec<PredictionRecord> = serde_json::from_str(&input_text)?;
    let predictions = records
        .into_iter()
        .map(ObjectPrediction::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    tracing::info!(count = predictions.len(), path = %config.input_path, "loaded predictions");

    let kind: PostprocessKind = config.postprocess.kind.into();
    let postprocessor = Postprocessor::new(
        kind,
        PostprocessConfig {
            metric: config.postprocess.metric.into(),
            threshold: config.postprocess.threshold,
            class_agnostic: config.postprocess.class_agnostic,
            parallel: config.postprocess.parallel,
        },
    )?;

    let selected = postprocessor.run(&predictions, config.len_new);
    let output = Output {
        kind: kind.to_string(),
        input_count: predictions.len(),
        predictions: selected.into_iter().map(PredictionRecord::from).collect(),
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
