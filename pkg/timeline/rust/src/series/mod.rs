// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Downsampled merging of several revision-ordered timeseries.

mod merger;
mod point;

pub use merger::{MAX_POINTS, SeriesIterator, SeriesMerger, SeriesRange};
pub use point::{SeriesPoint, merge_data, merge_statistics};
