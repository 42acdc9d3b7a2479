// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use serde::Serialize;
use serde_json::{Map, Value};

use super::ObjectId;
use crate::errors::{ObjectError, ObjectResult};
use crate::interval_index;

/// How an instance came into existence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InstanceOrigin {
    /// Opened by an explicit create event, or pinned by back-dating.
    Confirmed { creation_ts: f64 },
    /// Opened implicitly by the first snapshot or delete seen for the id.
    /// While it carries no snapshot its start may still move backwards.
    Tentative { first_seen_ts: f64 },
}

/// A point-in-time state capture of an object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectSnapshot {
    pub ts: f64,
    pub args: Map<String, Value>,
}

/// One incarnation of an id during `[creation_ts, deletion_ts)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectInstance {
    id: ObjectId,
    category: String,
    name: String,
    origin: InstanceOrigin,
    deletion_ts: f64,
    snapshots: Vec<ObjectSnapshot>,
    auto_deleted: bool,
}

impl ObjectInstance {
    pub(crate) fn new(id: ObjectId, category: &str, name: &str, origin: InstanceOrigin) -> Self {
        Self {
            id,
            category: category.to_string(),
            name: name.to_string(),
            origin,
            deletion_ts: f64::INFINITY,
            snapshots: Vec::new(),
            auto_deleted: false,
        }
    }

    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> InstanceOrigin {
        self.origin
    }

    pub fn creation_ts(&self) -> f64 {
        match self.origin {
            InstanceOrigin::Confirmed { creation_ts } => creation_ts,
            InstanceOrigin::Tentative { first_seen_ts } => first_seen_ts,
        }
    }

    pub fn creation_ts_was_explicit(&self) -> bool {
        matches!(self.origin, InstanceOrigin::Confirmed { .. })
    }

    /// `f64::INFINITY` while the instance is alive.
    pub fn deletion_ts(&self) -> f64 {
        self.deletion_ts
    }

    pub fn is_alive(&self) -> bool {
        self.deletion_ts == f64::INFINITY
    }

    /// True when the deletion came from `auto_delete_objects` rather than
    /// from the trace.
    pub fn was_auto_deleted(&self) -> bool {
        self.auto_deleted
    }

    pub fn snapshots(&self) -> &[ObjectSnapshot] {
        &self.snapshots
    }

    pub fn last_snapshot(&self) -> Option<&ObjectSnapshot> {
        self.snapshots.last()
    }

    pub(crate) fn lifetime(&self) -> f64 {
        self.deletion_ts - self.creation_ts()
    }

    /// Latest snapshot taken at or before `ts`.
    pub fn get_snapshot_at(&self, ts: f64) -> Option<&ObjectSnapshot> {
        let index = interval_index::find_low_index(&self.snapshots, |s| s.ts, ts);
        match self.snapshots.get(index) {
            Some(snapshot) if snapshot.ts == ts => Some(snapshot),
            _ => index.checked_sub(1).and_then(|i| self.snapshots.get(i)),
        }
    }

    pub(crate) fn check_identity(
        &self,
        operation: &'static str,
        category: &str,
        name: &str,
    ) -> ObjectResult<()> {
        if self.category == category && self.name == name {
            return Ok(());
        }
        Err(ObjectError::Mismatch {
            id: self.id.clone(),
            operation,
            category: category.to_string(),
            name: name.to_string(),
            expected_category: self.category.clone(),
            expected_name: self.name.clone(),
        })
    }

    pub(crate) fn can_back_date(&self) -> bool {
        matches!(self.origin, InstanceOrigin::Tentative { .. }) && self.snapshots.is_empty()
    }

    /// Moves the start of a tentative instance back to `ts` and pins it.
    pub(crate) fn back_date(&mut self, ts: f64) {
        self.origin = InstanceOrigin::Confirmed { creation_ts: ts };
    }

    pub(crate) fn add_snapshot(&mut self, ts: f64, args: Map<String, Value>) -> ObjectResult<&ObjectSnapshot> {
        if ts < self.creation_ts() {
            return Err(ObjectError::OutOfOrder {
                id: self.id.clone(),
                ts,
                previous: self.creation_ts(),
            });
        }
        if ts >= self.deletion_ts {
            return Err(ObjectError::NoLiveInstance {
                id: self.id.clone(),
                ts,
            });
        }
        if let Some(last) = self.snapshots.last() {
            if ts == last.ts {
                return Err(ObjectError::DuplicateSnapshot {
                    id: self.id.clone(),
                    ts,
                });
            }
            if ts < last.ts {
                return Err(ObjectError::OutOfOrder {
                    id: self.id.clone(),
                    ts,
                    previous: last.ts,
                });
            }
        }

        self.snapshots.push(ObjectSnapshot { ts, args });
        self.snapshots.last().ok_or_else(|| ObjectError::NoLiveInstance {
            id: self.id.clone(),
            ts,
        })
    }

    pub(crate) fn was_deleted(&mut self, ts: f64) -> ObjectResult<()> {
        if ts < self.creation_ts() {
            return Err(ObjectError::DeletedBeforeCreated {
                id: self.id.clone(),
                ts,
                creation_ts: self.creation_ts(),
            });
        }
        if let Some(last) = self.snapshots.last() {
            if last.ts > ts {
                return Err(ObjectError::OutOfOrder {
                    id: self.id.clone(),
                    ts,
                    previous: last.ts,
                });
            }
        }
        self.deletion_ts = ts;
        Ok(())
    }

    /// Closes a still-alive instance at the end of the trace, never before
    /// its own creation or last snapshot.
    pub(crate) fn auto_delete(&mut self, max_ts: f64) {
        let mut ts = max_ts.max(self.creation_ts());
        if let Some(last) = self.snapshots.last() {
            ts = ts.max(last.ts);
        }
        self.deletion_ts = ts;
        self.auto_deleted = true;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn confirmed(ts: f64) -> ObjectInstance {
        ObjectInstance::new(
            ObjectId::from("0x1"),
            "cat",
            "Layer",
            InstanceOrigin::Confirmed { creation_ts: ts },
        )
    }

    #[test]
    fn test_snapshot_ordering() {
        let mut instance = confirmed(10.0);
        assert_eq!(instance.add_snapshot(10.0, args(json!({"foo": 1}))).unwrap().ts, 10.0);
        assert_eq!(instance.add_snapshot(20.0, args(json!({"foo": 2}))).unwrap().args["foo"], 2);

        assert!(matches!(
            instance.add_snapshot(20.0, Map::new()),
            Err(ObjectError::DuplicateSnapshot { .. })
        ));
        assert!(matches!(
            instance.add_snapshot(15.0, Map::new()),
            Err(ObjectError::OutOfOrder { .. })
        ));
        assert!(matches!(
            instance.add_snapshot(5.0, Map::new()),
            Err(ObjectError::OutOfOrder { .. })
        ));
        assert_eq!(instance.snapshots().len(), 2);
    }

    #[test]
    fn test_get_snapshot_at() {
        let mut instance = confirmed(0.0);
        assert!(instance.get_snapshot_at(5.0).is_none());

        instance.add_snapshot(10.0, args(json!({"foo": 1}))).unwrap();
        instance.add_snapshot(20.0, args(json!({"foo": 2}))).unwrap();

        assert!(instance.get_snapshot_at(5.0).is_none());
        assert_eq!(instance.get_snapshot_at(10.0).unwrap().args["foo"], 1);
        assert_eq!(instance.get_snapshot_at(15.0).unwrap().args["foo"], 1);
        assert_eq!(instance.get_snapshot_at(20.0).unwrap().args["foo"], 2);
        assert_eq!(instance.get_snapshot_at(99.0).unwrap().args["foo"], 2);
    }

    #[test]
    fn test_delete_checks() {
        let mut instance = confirmed(10.0);
        instance.add_snapshot(12.0, Map::new()).unwrap();
        assert!(matches!(
            instance.was_deleted(5.0),
            Err(ObjectError::DeletedBeforeCreated { .. })
        ));
        assert!(matches!(
            instance.was_deleted(11.0),
            Err(ObjectError::OutOfOrder { .. })
        ));
        instance.was_deleted(12.0).unwrap();
        assert!(!instance.is_alive());
        assert!(matches!(
            instance.add_snapshot(13.0, Map::new()),
            Err(ObjectError::NoLiveInstance { .. })
        ));
    }

    #[test]
    fn test_tentative_back_dating() {
        let mut instance = ObjectInstance::new(
            ObjectId::from("0x1"),
            "cat",
            "Layer",
            InstanceOrigin::Tentative { first_seen_ts: 10.0 },
        );
        assert!(!instance.creation_ts_was_explicit());
        assert!(instance.can_back_date());

        instance.back_date(4.0);
        assert_eq!(instance.creation_ts(), 4.0);
        assert!(instance.creation_ts_was_explicit());
        assert!(!instance.can_back_date());
    }

    #[test]
    fn test_auto_delete_never_precedes_last_snapshot() {
        let mut instance = confirmed(0.0);
        instance.add_snapshot(30.0, Map::new()).unwrap();
        instance.auto_delete(20.0);
        assert_eq!(instance.deletion_ts(), 30.0);
        assert!(instance.was_auto_deleted());
    }

    #[test]
    fn test_identity_mismatch() {
        let instance = confirmed(0.0);
        assert!(instance.check_identity("snapshot", "cat", "Layer").is_ok());
        let err = instance.check_identity("snapshot", "cat", "Picture").unwrap_err();
        assert!(err.to_string().contains("name=Picture"));
    }
}
