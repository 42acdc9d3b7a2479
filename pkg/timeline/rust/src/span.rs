// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Spans and the begin/end builder that produces them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::bounds::Bounds;
use crate::errors::{SpanError, SpanResult};
use crate::layout::{self, SubRowLayout};

/// A named, categorized time interval `[start, start + duration)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub category: String,
    pub title: String,
    pub start: f64,
    #[serde(default)]
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub args: Map<String, Value>,
    /// Set when the span was still open at the end of the trace and had to be
    /// closed artificially.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub did_not_finish: bool,
}

impl Span {
    pub fn new(category: impl Into<String>, title: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            category: category.into(),
            title: title.into(),
            start,
            duration,
            args: Map::new(),
            did_not_finish: false,
        }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// A group of spans built from begin/end events.
///
/// Spans are pushed in the order they end, so `spans()` is sorted by end time
/// when only `begin_span`/`end_span` are used. Do not assume start order.
#[derive(Debug, Default, Clone)]
pub struct SpanGroup {
    spans: Vec<Span>,
    open: Vec<Span>,
}

impl SpanGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn push_span(&mut self, span: Span) {
        self.spans.push(span);
    }

    pub fn push_spans(&mut self, spans: impl IntoIterator<Item = Span>) {
        self.spans.extend(spans);
    }

    /// Opens a span. Calls to `begin_span` and `end_span` must use
    /// non-decreasing timestamps relative to the innermost open span.
    pub fn begin_span(
        &mut self,
        category: impl Into<String>,
        title: impl Into<String>,
        ts: f64,
        args: Map<String, Value>,
    ) -> SpanResult<&Span> {
        if let Some(previous) = self.open.last() {
            if ts < previous.start {
                return Err(SpanError::OutOfOrder {
                    ts,
                    previous: previous.start,
                });
            }
        }

        let mut span = Span::new(category, title, ts, 0.0);
        span.args = args;
        self.open.push(span);
        self.open.last().ok_or(SpanError::NoOpenSpan)
    }

    pub fn is_timestamp_valid_for_begin_or_end(&self, ts: f64) -> bool {
        self.open.last().is_none_or(|top| ts >= top.start)
    }

    /// Number of `begin_span` calls still waiting for their `end_span`.
    pub fn open_span_count(&self) -> usize {
        self.open.len()
    }

    pub fn most_recently_opened(&self) -> Option<&Span> {
        self.open.last()
    }

    /// Closes the innermost open span at `ts` and moves it into the group.
    pub fn end_span(&mut self, ts: f64) -> SpanResult<&Span> {
        let top = self.open.last().ok_or(SpanError::NoOpenSpan)?;
        if ts < top.start {
            return Err(SpanError::EndBeforeStart {
                title: top.title.clone(),
                start: top.start,
                end: ts,
            });
        }

        let Some(mut span) = self.open.pop() else {
            return Err(SpanError::NoOpenSpan);
        };
        span.duration = ts - span.start;
        self.spans.push(span);
        self.spans.last().ok_or(SpanError::NoOpenSpan)
    }

    /// Closes every open span at `max_ts`, or at the group's bounds when not
    /// given, marking them as unfinished. Returns how many were closed.
    pub fn auto_close_open_spans(&mut self, max_ts: Option<f64>) -> SpanResult<usize> {
        let Some(max_ts) = max_ts.or_else(|| self.bounds().max()) else {
            return Ok(0);
        };

        let mut closed = 0;
        while !self.open.is_empty() {
            self.end_span(max_ts)?;
            if let Some(span) = self.spans.last_mut() {
                span.did_not_finish = true;
            }
            closed += 1;
        }
        if closed > 0 {
            tracing::debug!(closed, max_ts, "auto-closed open spans");
        }
        Ok(closed)
    }

    pub fn shift_timestamps_forward(&mut self, amount: f64) {
        for span in self.spans.iter_mut().chain(self.open.iter_mut()) {
            span.start += amount;
        }
    }

    /// Min/max over finished span edges and the starts of open spans.
    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::new();
        for span in &self.spans {
            bounds.add_value(span.start);
            bounds.add_value(span.end());
        }
        if let (Some(first), Some(last)) = (self.open.first(), self.open.last()) {
            bounds.add_value(first.start);
            bounds.add_value(last.start);
        }
        bounds
    }

    /// Finished spans `lo..hi` by index.
    pub fn window(&self, lo: usize, hi: usize) -> SpanResult<&[Span]> {
        self.spans.get(lo..hi).ok_or(SpanError::OutOfBounds {
            lo,
            hi,
            len: self.spans.len(),
        })
    }

    /// Nesting layout of the finished spans.
    pub fn layout(&self) -> SubRowLayout {
        layout::layout(&self.spans)
    }
}
