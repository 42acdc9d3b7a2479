// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One datum of a timeseries, carrying running statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Revision (not necessarily a time) the series is ordered by.
    pub x: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    #[serde(default)]
    pub count: u64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub diagnostics: BTreeMap<String, Value>,
}

impl SeriesPoint {
    /// A point summarizing a single sample.
    pub fn from_value(x: f64, value: f64) -> Self {
        Self {
            x,
            min: Some(value),
            max: Some(value),
            sum: Some(value),
            avg: Some(value),
            std: Some(0.0),
            count: 1,
            ..Default::default()
        }
    }
}

/// Numbers that count as present when folding sums: zero and NaN do not.
fn is_truthy(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

fn combine(a: Option<f64>, b: Option<f64>, pick: fn(f64, f64) -> f64) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(pick(a, b)),
        (a, b) => a.or(b),
    }
}

/// Folds `source` into `target`. An empty target becomes a copy of `source`.
pub fn merge_data(target: &mut Option<SeriesPoint>, source: &SeriesPoint) {
    match target {
        Some(target) => {
            merge_statistics(target, source);
            target.x = target.x.min(source.x);
            target.timestamp = combine(target.timestamp, source.timestamp, f64::min);
            for (key, value) in &source.diagnostics {
                target.diagnostics.insert(key.clone(), value.clone());
            }
        }
        None => *target = Some(source.clone()),
    }
}

/// Combines the running statistics of two summaries.
///
/// `avg`, `std` and `count` use the pairwise combination
/// `std = sqrt(std_t² + std_s² + n_t·n_s·(avg_t − avg_s)² / (n_t + n_s))`
/// with both counts taken before `target.count` is updated. A zero source
/// sum leaves `target.sum` untouched, even when it is still unset.
pub fn merge_statistics(target: &mut SeriesPoint, source: &SeriesPoint) {
    target.min = combine(target.min, source.min, f64::min);
    target.max = combine(target.max, source.max, f64::max);

    if let Some(sum) = source.sum.filter(|s| is_truthy(*s)) {
        target.sum = Some(sum + target.sum.filter(|t| is_truthy(*t)).unwrap_or(0.0));
    }

    let target_count = target.count as f64;
    let source_count = source.count as f64;
    let count = target.count.saturating_add(source.count);

    match (target.avg, source.avg) {
        (Some(target_avg), Some(source_avg)) if count > 0 => {
            let new_count = count as f64;
            let delta_mean = target_avg - source_avg;
            target.avg = Some((target_avg * target_count + source_avg * source_count) / new_count);

            if let (Some(target_std), Some(source_std)) = (target.std, source.std) {
                if !target_std.is_nan() && !source_std.is_nan() {
                    target.std = Some(
                        (target_std * target_std
                            + source_std * source_std
                            + target_count * source_count * delta_mean * delta_mean / new_count)
                            .sqrt(),
                    );
                }
            }
        }
        (None, Some(_)) => {
            target.avg = source.avg;
            target.std = source.std;
        }
        _ => {}
    }

    target.count = count;
}
