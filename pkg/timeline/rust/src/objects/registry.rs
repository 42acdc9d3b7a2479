// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use super::instance::{InstanceOrigin, ObjectInstance, ObjectSnapshot};
use super::ObjectId;
use crate::bounds::Bounds;
use crate::errors::{ObjectError, ObjectResult};
use crate::interval_index::{self, IntervalLookup};

/// A snapshot together with the instance that owns it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotRef<'a> {
    pub instance: &'a ObjectInstance,
    pub snapshot: &'a ObjectSnapshot,
}

/// Where a snapshot lands, decided before anything is mutated.
enum SnapshotTarget {
    Existing(usize),
    BackDate(usize),
    New,
}

/// The instances one id referred to, ordered by time with disjoint
/// `[creation_ts, deletion_ts)` ranges.
///
/// Mutations must arrive in non-decreasing timestamp order. The one
/// sanctioned step backwards is a snapshot that widens a tentative,
/// snapshot-less instance to an earlier start.
#[derive(Debug, Clone)]
pub struct InstanceTimeline {
    id: ObjectId,
    instances: Vec<ObjectInstance>,
}

impl InstanceTimeline {
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            instances: Vec::new(),
        }
    }

    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    pub fn instances(&self) -> &[ObjectInstance] {
        &self.instances
    }

    pub fn last_instance(&self) -> Option<&ObjectInstance> {
        self.instances.last()
    }

    fn locate(&self, ts: f64) -> IntervalLookup {
        interval_index::find_interval_containing(
            &self.instances,
            ObjectInstance::creation_ts,
            ObjectInstance::lifetime,
            ts,
        )
    }

    fn open(&mut self, category: &str, name: &str, origin: InstanceOrigin) -> usize {
        self.instances
            .push(ObjectInstance::new(self.id.clone(), category, name, origin));
        self.instances.len() - 1
    }

    fn no_live_instance(&self, ts: f64) -> ObjectError {
        ObjectError::NoLiveInstance {
            id: self.id.clone(),
            ts,
        }
    }

    pub fn id_was_created(&mut self, category: &str, name: &str, ts: f64) -> ObjectResult<&ObjectInstance> {
        if let Some(last) = self.instances.last() {
            if last.is_alive() {
                return Err(ObjectError::StillAlive {
                    id: self.id.clone(),
                    ts,
                    creation_ts: last.creation_ts(),
                });
            }
            if ts < last.deletion_ts() {
                return Err(ObjectError::OutOfOrder {
                    id: self.id.clone(),
                    ts,
                    previous: last.deletion_ts(),
                });
            }
        }

        let index = self.open(category, name, InstanceOrigin::Confirmed { creation_ts: ts });
        self.instance_at_index(index, ts)
    }

    fn snapshot_target(&self, ts: f64) -> ObjectResult<SnapshotTarget> {
        let Some(last) = self.instances.last() else {
            return Ok(SnapshotTarget::New);
        };

        match self.locate(ts) {
            IntervalLookup::At(index) => Ok(SnapshotTarget::Existing(index)),
            IntervalLookup::Before => self.back_date_target(0, ts),
            IntervalLookup::After if ts >= last.deletion_ts() => Ok(SnapshotTarget::New),
            IntervalLookup::After => {
                // In a gap: only the instance right after it may stretch back.
                let next = interval_index::find_low_index(&self.instances, ObjectInstance::creation_ts, ts);
                self.back_date_target(next, ts)
            }
        }
    }

    fn back_date_target(&self, index: usize, ts: f64) -> ObjectResult<SnapshotTarget> {
        match self.instances.get(index) {
            Some(instance) if instance.can_back_date() && ts < instance.deletion_ts() => {
                Ok(SnapshotTarget::BackDate(index))
            }
            _ => Err(self.no_live_instance(ts)),
        }
    }

    pub fn add_snapshot(
        &mut self,
        category: &str,
        name: &str,
        ts: f64,
        args: Map<String, Value>,
    ) -> ObjectResult<SnapshotRef<'_>> {
        let index = match self.snapshot_target(ts)? {
            SnapshotTarget::Existing(index) => {
                self.instance_at_index(index, ts)?
                    .check_identity("snapshot", category, name)?;
                index
            }
            SnapshotTarget::BackDate(index) => {
                let instance = self.instance_at_index_mut(index, ts)?;
                instance.check_identity("snapshot", category, name)?;
                tracing::debug!(
                    id = %instance.id(),
                    from = instance.creation_ts(),
                    to = ts,
                    "back-dating implicitly created instance"
                );
                instance.back_date(ts);
                index
            }
            SnapshotTarget::New => self.open(category, name, InstanceOrigin::Tentative { first_seen_ts: ts }),
        };

        let instance = self.instance_at_index_mut(index, ts)?;
        instance.add_snapshot(ts, args)?;
        let instance = self.instance_at_index(index, ts)?;
        match instance.last_snapshot() {
            Some(snapshot) => Ok(SnapshotRef { instance, snapshot }),
            None => Err(self.no_live_instance(ts)),
        }
    }

    pub fn id_was_deleted(&mut self, category: &str, name: &str, ts: f64) -> ObjectResult<&ObjectInstance> {
        let index = match self.instances.last() {
            None => self.open(category, name, InstanceOrigin::Tentative { first_seen_ts: ts }),
            Some(last) if last.is_alive() => {
                last.check_identity("delete", category, name)?;
                self.instances.len() - 1
            }
            Some(last) if ts < last.deletion_ts() => {
                return Err(ObjectError::OutOfOrder {
                    id: self.id.clone(),
                    ts,
                    previous: last.deletion_ts(),
                });
            }
            Some(last) => {
                tracing::debug!(
                    id = %self.id,
                    ts,
                    deletion_ts = last.deletion_ts(),
                    "ignoring repeated delete"
                );
                return self.instance_at_index(self.instances.len() - 1, ts);
            }
        };

        let instance = self.instance_at_index_mut(index, ts)?;
        instance.was_deleted(ts)?;
        self.instance_at_index(index, ts)
    }

    /// The instance covering `ts`. Before the first instance, a tentative
    /// first instance still answers, since its real start is unknown.
    pub fn get_instance_at(&self, ts: f64) -> Option<&ObjectInstance> {
        match self.locate(ts) {
            IntervalLookup::At(index) => self.instances.get(index),
            IntervalLookup::Before => self
                .instances
                .first()
                .filter(|instance| !instance.creation_ts_was_explicit()),
            IntervalLookup::After => None,
        }
    }

    fn instance_at_index(&self, index: usize, ts: f64) -> ObjectResult<&ObjectInstance> {
        self.instances.get(index).ok_or_else(|| self.no_live_instance(ts))
    }

    fn instance_at_index_mut(&mut self, index: usize, ts: f64) -> ObjectResult<&mut ObjectInstance> {
        let id = &self.id;
        self.instances
            .get_mut(index)
            .ok_or_else(|| ObjectError::NoLiveInstance { id: id.clone(), ts })
    }
}

/// Registry of every object id seen in a trace.
#[derive(Debug, Default, Clone)]
pub struct ObjectRegistry {
    timelines: FxHashMap<ObjectId, InstanceTimeline>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct ids.
    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }

    fn timeline_mut(&mut self, id: ObjectId) -> &mut InstanceTimeline {
        self.timelines
            .entry(id)
            .or_insert_with_key(|id| InstanceTimeline::new(id.clone()))
    }

    pub fn id_was_created(
        &mut self,
        id: impl Into<ObjectId>,
        category: &str,
        name: &str,
        ts: f64,
    ) -> ObjectResult<&ObjectInstance> {
        self.timeline_mut(id.into()).id_was_created(category, name, ts)
    }

    pub fn add_snapshot(
        &mut self,
        id: impl Into<ObjectId>,
        category: &str,
        name: &str,
        ts: f64,
        args: Map<String, Value>,
    ) -> ObjectResult<SnapshotRef<'_>> {
        self.timeline_mut(id.into()).add_snapshot(category, name, ts, args)
    }

    pub fn id_was_deleted(
        &mut self,
        id: impl Into<ObjectId>,
        category: &str,
        name: &str,
        ts: f64,
    ) -> ObjectResult<&ObjectInstance> {
        self.timeline_mut(id.into()).id_was_deleted(category, name, ts)
    }

    pub fn timeline(&self, id: &str) -> Option<&InstanceTimeline> {
        self.timelines.get(id)
    }

    pub fn instances(&self, id: &str) -> &[ObjectInstance] {
        self.timeline(id).map(InstanceTimeline::instances).unwrap_or_default()
    }

    pub fn get_instance_at(&self, id: &str, ts: f64) -> Option<&ObjectInstance> {
        self.timeline(id)?.get_instance_at(ts)
    }

    /// Latest snapshot at or before `ts` of the instance covering `ts`.
    pub fn get_snapshot_at(&self, id: &str, ts: f64) -> Option<SnapshotRef<'_>> {
        let instance = self.get_instance_at(id, ts)?;
        let snapshot = instance.get_snapshot_at(ts)?;
        Some(SnapshotRef { instance, snapshot })
    }

    /// Ids in sorted order.
    pub fn ids(&self) -> Vec<&ObjectId> {
        let mut ids: Vec<&ObjectId> = self.timelines.keys().collect();
        ids.sort();
        ids
    }

    /// Every instance of every id, ordered by id then time.
    pub fn all_instances(&self) -> Vec<&ObjectInstance> {
        self.ids()
            .into_iter()
            .filter_map(|id| self.timelines.get(id))
            .flat_map(|timeline| timeline.instances().iter())
            .collect()
    }

    /// Instances grouped by object name.
    pub fn instances_by_name(&self) -> BTreeMap<&str, Vec<&ObjectInstance>> {
        let mut by_name: BTreeMap<&str, Vec<&ObjectInstance>> = BTreeMap::new();
        for instance in self.all_instances() {
            by_name.entry(instance.name()).or_default().push(instance);
        }
        by_name
    }

    /// Closes every instance still alive at the end of the trace. Returns how
    /// many were closed.
    pub fn auto_delete_objects(&mut self, max_ts: f64) -> usize {
        let mut deleted = 0;
        for timeline in self.timelines.values_mut() {
            if let Some(last) = timeline.instances.last_mut().filter(|i| i.is_alive()) {
                last.auto_delete(max_ts);
                deleted += 1;
            }
        }
        if deleted > 0 {
            tracing::debug!(deleted, max_ts, "auto-deleted objects alive at end of trace");
        }
        deleted
    }

    /// Span of time covered by instance creations, deletions and, for alive
    /// instances, their last snapshot.
    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::new();
        for timeline in self.timelines.values() {
            for instance in timeline.instances() {
                bounds.add_value(instance.creation_ts());
                if !instance.is_alive() {
                    bounds.add_value(instance.deletion_ts());
                } else if let Some(last) = instance.last_snapshot() {
                    bounds.add_value(last.ts);
                }
            }
        }
        bounds
    }
}
