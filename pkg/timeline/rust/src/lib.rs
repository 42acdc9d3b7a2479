// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Temporal indexing and aggregation core for the trace viewer.
//!
//! - [`interval_index`]: binary searches over start-sorted interval arrays.
//! - [`layout`]: nesting of spans into non-overlapping rows.
//! - [`objects`]: time-windowed object identity with snapshots.
//! - [`series`]: downsampled merge of several timeseries.
//!
//! [`model::TraceModel`] ties them together for an importer.

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

pub mod bounds;
pub mod config;
pub mod errors;
pub mod interval_index;
pub mod layout;
pub mod model;
pub mod objects;
pub mod series;
pub mod span;

pub use bounds::Bounds;
pub use config::Config;
pub use errors::{ConfigError, ObjectError, SpanError};
pub use interval_index::IntervalLookup;
pub use layout::SubRowLayout;
pub use model::{ImportWarning, ObjectEvent, ObjectPhase, TraceModel};
pub use objects::{ObjectId, ObjectInstance, ObjectRegistry};
pub use series::{SeriesMerger, SeriesPoint, SeriesRange};
pub use span::{Span, SpanGroup};
