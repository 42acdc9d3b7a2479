// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};

use super::point::{SeriesPoint, merge_data};
use crate::config::MergerConfig;
use crate::interval_index::find_low_index;

/// Default cap on the number of points visited per source.
pub const MAX_POINTS: usize = 1000;

/// Optional inclusive revision bounds for a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesRange {
    #[serde(default)]
    pub min_x: Option<f64>,
    #[serde(default)]
    pub max_x: Option<f64>,
}

impl SeriesRange {
    pub fn new(min_x: Option<f64>, max_x: Option<f64>) -> Self {
        Self { min_x, max_x }
    }
}

/// Fixed-stride cursor over one x-sorted source.
#[derive(Debug, Clone)]
pub struct SeriesIterator<'a> {
    source: &'a [SeriesPoint],
    cursor: f64,
    end_index: usize,
    stride: f64,
}

impl<'a> SeriesIterator<'a> {
    pub fn new(source: &'a [SeriesPoint], range: SeriesRange, max_points: usize) -> Self {
        let last = source.len().saturating_sub(1);
        // Not clamped: a range starting past the data leaves the cursor beyond
        // `end_index`, so the iterator is done before yielding anything.
        let start_index = match range.min_x {
            Some(min_x) if !source.is_empty() => find_low_index(source, |p| p.x, min_x),
            _ => 0,
        };
        let end_index = range
            .max_x
            .map_or(last, |max_x| find_low_index(source, |p| p.x, max_x).min(last));
        let stride = (end_index.saturating_sub(start_index) as f64 / max_points.max(1) as f64).max(1.0);

        Self {
            source,
            cursor: start_index as f64,
            end_index,
            stride,
        }
    }

    fn rounded(&self) -> usize {
        self.cursor.round() as usize
    }

    /// The point under the cursor. Once done this keeps returning the point
    /// at the end index.
    pub fn current(&self) -> Option<&'a SeriesPoint> {
        self.source.get(self.rounded().min(self.end_index))
    }

    pub fn is_done(&self) -> bool {
        self.source.is_empty() || self.rounded() > self.end_index
    }

    pub fn advance(&mut self) {
        self.cursor += self.stride;
    }
}

/// Merges several x-sorted sources into one downsampled series.
///
/// Each call to `next` folds the current point of every source, finished
/// ones included, into a fresh `SeriesPoint` keyed by the smallest x among
/// the unfinished sources, then advances the sources sitting on that x.
#[derive(Debug, Clone)]
pub struct SeriesMerger<'a> {
    iterators: Vec<SeriesIterator<'a>>,
}

impl<'a> SeriesMerger<'a> {
    pub fn new<I>(sources: I, range: SeriesRange) -> Self
    where
        I: IntoIterator<Item = &'a [SeriesPoint]>,
    {
        Self::with_max_points(sources, range, MAX_POINTS)
    }

    pub fn with_config<I>(sources: I, range: SeriesRange, config: &MergerConfig) -> Self
    where
        I: IntoIterator<Item = &'a [SeriesPoint]>,
    {
        Self::with_max_points(sources, range, config.max_points)
    }

    pub fn with_max_points<I>(sources: I, range: SeriesRange, max_points: usize) -> Self
    where
        I: IntoIterator<Item = &'a [SeriesPoint]>,
    {
        let iterators: Vec<_> = sources
            .into_iter()
            .map(|source| SeriesIterator::new(source, range, max_points))
            .collect();
        tracing::debug!(sources = iterators.len(), max_points, "starting series merge");
        Self { iterators }
    }
}

impl Iterator for SeriesMerger<'_> {
    type Item = (f64, SeriesPoint);

    fn next(&mut self) -> Option<Self::Item> {
        let min_x = self
            .iterators
            .iter()
            .filter(|it| !it.is_done())
            .filter_map(SeriesIterator::current)
            .map(|p| p.x)
            .min_by(f64::total_cmp)?;

        let mut merged = None;
        for it in &self.iterators {
            if let Some(point) = it.current() {
                merge_data(&mut merged, point);
            }
        }

        for it in &mut self.iterators {
            if !it.is_done() && it.current().is_some_and(|p| p.x == min_x) {
                it.advance();
            }
        }

        merged.map(|point| (min_x, point))
    }
}

impl FusedIterator for SeriesMerger<'_> {}
