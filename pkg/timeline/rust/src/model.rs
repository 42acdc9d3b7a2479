// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Replays typed import records into the indexes.
//!
//! Contract violations in the trace data do not abort an import. They are
//! collected as [`ImportWarning`]s and the offending record is skipped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::bounds::Bounds;
use crate::config::Config;
use crate::layout::SubRowLayout;
use crate::objects::ObjectRegistry;
use crate::span::{Span, SpanGroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectPhase {
    Created,
    Snapshot,
    Deleted,
}

impl ObjectPhase {
    fn verb(self) -> &'static str {
        match self {
            ObjectPhase::Created => "create",
            ObjectPhase::Snapshot => "snapshot",
            ObjectPhase::Deleted => "delete",
        }
    }
}

/// One object lifecycle record as handed over by the import layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectEvent {
    pub phase: ObjectPhase,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub name: String,
    pub ts: f64,
    /// State captured by a `Snapshot` event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    MissingField,
    ObjectEvent,
    MalformedSpan,
    SpanClose,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportWarning {
    pub kind: WarningKind,
    pub message: String,
}

/// Spans and objects of one trace, plus what went wrong importing them.
#[derive(Debug, Default)]
pub struct TraceModel {
    config: Config,
    spans: SpanGroup,
    objects: ObjectRegistry,
    warnings: Vec<ImportWarning>,
}

impl TraceModel {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn spans(&self) -> &SpanGroup {
        &self.spans
    }

    pub fn spans_mut(&mut self) -> &mut SpanGroup {
        &mut self.spans
    }

    pub fn objects(&self) -> &ObjectRegistry {
        &self.objects
    }

    pub fn warnings(&self) -> &[ImportWarning] {
        &self.warnings
    }

    fn warn(&mut self, kind: WarningKind, message: String) {
        tracing::warn!(kind = ?kind, "{message}");
        self.warnings.push(ImportWarning { kind, message });
    }

    pub fn add_spans(&mut self, spans: impl IntoIterator<Item = Span>) {
        self.spans.push_spans(spans);
    }

    /// Applies `events` in timestamp order. Events sharing a timestamp keep
    /// their input order. Returns how many were applied.
    pub fn import_object_events(&mut self, events: impl IntoIterator<Item = ObjectEvent>) -> usize {
        let mut events: Vec<ObjectEvent> = events.into_iter().collect();
        events.sort_by(|a, b| a.ts.total_cmp(&b.ts));

        let total = events.len();
        let mut applied = 0;
        for event in events {
            if self.apply_object_event(event) {
                applied += 1;
            }
        }
        tracing::debug!(total, applied, ids = self.objects.len(), "imported object events");
        applied
    }

    fn apply_object_event(&mut self, event: ObjectEvent) -> bool {
        let verb = event.phase.verb();
        if event.id.is_empty() {
            self.warn(
                WarningKind::MissingField,
                format!("While processing {verb} at ts={}: object events require an id", event.ts),
            );
            return false;
        }
        if event.name.is_empty() {
            self.warn(
                WarningKind::MissingField,
                format!(
                    "While processing {verb} of {} at ts={}: object events require a name",
                    event.id, event.ts
                ),
            );
        }

        let ObjectEvent {
            phase,
            id,
            category,
            name,
            ts,
            snapshot,
        } = event;
        let result = match phase {
            ObjectPhase::Created => self.objects.id_was_created(id.as_str(), &category, &name, ts).map(|_| ()),
            ObjectPhase::Deleted => self.objects.id_was_deleted(id.as_str(), &category, &name, ts).map(|_| ()),
            ObjectPhase::Snapshot => {
                let Some(args) = snapshot else {
                    self.warn(
                        WarningKind::MissingField,
                        format!("While processing {id} at ts={ts}: snapshots must carry a snapshot payload"),
                    );
                    return false;
                };
                self.objects
                    .add_snapshot(id.as_str(), &category, &name, ts, args)
                    .map(|_| ())
            }
        };

        match result {
            Ok(()) => true,
            Err(err) => {
                self.warn(
                    WarningKind::ObjectEvent,
                    format!("While processing {verb} of {id} at ts={ts}: {err}"),
                );
                false
            }
        }
    }

    /// Combined bounds of spans and objects.
    pub fn bounds(&self) -> Bounds {
        let mut bounds = self.spans.bounds();
        bounds.add_bounds(&self.objects.bounds());
        bounds
    }

    pub fn span_layout(&self) -> SubRowLayout {
        self.spans.layout()
    }

    /// Closes whatever the trace left open at `max_ts` (the model's upper
    /// bound when not given), then lays out the spans and records nesting
    /// violations as warnings.
    pub fn finalize(&mut self, max_ts: Option<f64>) -> SubRowLayout {
        let max_ts = max_ts.or_else(|| self.bounds().max());

        if self.config.spans.auto_close {
            if let Err(err) = self.spans.auto_close_open_spans(max_ts) {
                self.warn(WarningKind::SpanClose, format!("While closing open spans: {err}"));
            }
        }
        if self.config.objects.auto_delete {
            if let Some(max_ts) = max_ts {
                self.objects.auto_delete_objects(max_ts);
            }
        }

        let layout = self.span_layout();
        for &index in layout.malformed() {
            let Some(span) = self.spans.spans().get(index) else {
                continue;
            };
            let message = format!(
                "span '{}' at {} (duration {}) is not properly nested",
                span.title, span.start, span.duration
            );
            self.warn(WarningKind::MalformedSpan, message);
        }
        layout
    }
}
