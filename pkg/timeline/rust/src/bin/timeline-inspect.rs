// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Loads a timeline document, runs layout, object replay and series merge,
//! and prints a JSON summary.
//!
//! ```bash
//! timeline-inspect trace.json
//! timeline-inspect trace.json --min-x 100 --max-x 200 --at 1500
//! DD_TIMELINE_CONFIG=timeline.yaml timeline-inspect trace.json
//! ```

// Correctness
#![deny(clippy::indexing_slicing)]
#![deny(clippy::string_slice)]
#![deny(clippy::cast_possible_wrap)]
// Panicking code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unimplemented)]
#![deny(clippy::todo)]
// Debug code that shouldn't be in production
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dd_timeline::config::CONFIG_ENV_VAR;
use dd_timeline::{Config, ImportWarning, ObjectEvent, SeriesMerger, SeriesPoint, SeriesRange, Span, TraceModel};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "timeline-inspect")]
#[command(about = "Index a timeline document and print what the indexes see")]
#[command(version)]
struct Args {
    /// JSON document with `spans`, `object_events` and `series`
    input: PathBuf,

    /// YAML configuration file
    #[arg(long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Lower revision bound for the series merge
    #[arg(long)]
    min_x: Option<f64>,

    /// Upper revision bound for the series merge
    #[arg(long)]
    max_x: Option<f64>,

    /// Resolve every object id at this timestamp
    #[arg(long)]
    at: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Document {
    spans: Vec<Span>,
    object_events: Vec<ObjectEvent>,
    series: Vec<Vec<SeriesPoint>>,
}

#[derive(Debug, Serialize)]
struct SpanSummary {
    count: usize,
    depth: usize,
    rows: Vec<Vec<String>>,
    malformed: usize,
}

#[derive(Debug, Serialize)]
struct ObjectSummary {
    ids: usize,
    instances: usize,
    by_name: Vec<(String, usize)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    resolved: Vec<Resolved>,
}

#[derive(Debug, Serialize)]
struct Resolved {
    id: String,
    name: String,
    creation_ts: f64,
    snapshot_ts: Option<f64>,
    snapshot: Option<Value>,
}

#[derive(Debug, Serialize)]
struct Summary<'a> {
    spans: SpanSummary,
    objects: ObjectSummary,
    series: Vec<SeriesPoint>,
    warnings: &'a [ImportWarning],
}

#[allow(clippy::print_stdout)]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::resolve(args.config.as_deref()).context("loading configuration")?;

    let contents = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let document: Document =
        serde_json::from_str(&contents).with_context(|| format!("parsing {}", args.input.display()))?;

    tracing::info!(
        input = %args.input.display(),
        spans = document.spans.len(),
        object_events = document.object_events.len(),
        series = document.series.len(),
        "loaded timeline document"
    );

    let range = SeriesRange::new(args.min_x, args.max_x);
    let series: Vec<SeriesPoint> =
        SeriesMerger::with_config(document.series.iter().map(Vec::as_slice), range, &config.merger)
            .map(|(_, point)| point)
            .collect();

    let mut model = TraceModel::new(config);
    model.add_spans(document.spans);
    model.import_object_events(document.object_events);
    let layout = model.finalize(None);

    let spans = SpanSummary {
        count: model.spans().len(),
        depth: layout.depth(),
        rows: layout
            .resolve(model.spans().spans())
            .into_iter()
            .map(|row| row.into_iter().map(|span| span.title.clone()).collect())
            .collect(),
        malformed: layout.malformed().len(),
    };

    let registry = model.objects();
    let resolved = match args.at {
        Some(ts) => registry
            .ids()
            .into_iter()
            .filter_map(|id| {
                let instance = registry.get_instance_at(id.as_str(), ts)?;
                let snapshot = instance.get_snapshot_at(ts);
                Some(Resolved {
                    id: id.to_string(),
                    name: instance.name().to_string(),
                    creation_ts: instance.creation_ts(),
                    snapshot_ts: snapshot.map(|s| s.ts),
                    snapshot: snapshot.map(|s| Value::Object(s.args.clone())),
                })
            })
            .collect(),
        None => Vec::new(),
    };
    let objects = ObjectSummary {
        ids: registry.len(),
        instances: registry.all_instances().len(),
        by_name: registry
            .instances_by_name()
            .into_iter()
            .map(|(name, instances)| (name.to_string(), instances.len()))
            .collect(),
        resolved,
    };

    let summary = Summary {
        spans,
        objects,
        series,
        warnings: model.warnings(),
    };
    let out = serde_json::to_string_pretty(&summary).context("serializing summary")?;
    println!("{out}");
    Ok(())
}
