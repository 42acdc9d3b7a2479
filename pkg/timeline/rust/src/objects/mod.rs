// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Time-windowed object identity.
//!
//! Traces reuse ids: the same pointer-like id can name several logical
//! objects over the lifetime of a process. The registry keeps, per id, the
//! ordered list of instances that id referred to and answers "which object
//! (and which snapshot of it) did this id mean at time `ts`".

mod instance;
mod registry;

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use instance::{InstanceOrigin, ObjectInstance, ObjectSnapshot};
pub use registry::{InstanceTimeline, ObjectRegistry, SnapshotRef};

/// Opaque object identifier as found in the trace (usually a hex pointer).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for ObjectId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
