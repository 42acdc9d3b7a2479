// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Contract violations raised by the mutation APIs.
//!
//! These represent bad trace data or misuse by the import layer, never an
//! internal failure. Lookups do not error: they use sentinels or `Option`.

use thiserror::Error;

use crate::objects::ObjectId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpanError {
    #[error("spans must be added in increasing timestamp order: {ts} is before {previous}")]
    OutOfOrder { ts: f64, previous: f64 },

    #[error("end_span called without an open span")]
    NoOpenSpan,

    #[error("span '{title}' end time {end} is before its start {start}")]
    EndBeforeStart { title: String, start: f64, end: f64 },

    #[error("span window {lo}..{hi} is out of bounds for {len} spans")]
    OutOfBounds { lo: usize, hi: usize, len: usize },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ObjectError {
    #[error("object {id}: mutation at ts={ts} is out of order (previous mutation at {previous})")]
    OutOfOrder { id: ObjectId, ts: f64, previous: f64 },

    #[error(
        "object {id}: created again at ts={ts} while the instance created at {creation_ts} is still alive"
    )]
    StillAlive {
        id: ObjectId,
        ts: f64,
        creation_ts: f64,
    },

    #[error("object {id}: no instance was alive at ts={ts}")]
    NoLiveInstance { id: ObjectId, ts: f64 },

    #[error("object {id}: cannot delete at ts={ts}, instance was created at {creation_ts}")]
    DeletedBeforeCreated {
        id: ObjectId,
        ts: f64,
        creation_ts: f64,
    },

    #[error("object {id}: a snapshot already exists at ts={ts}")]
    DuplicateSnapshot { id: ObjectId, ts: f64 },

    #[error(
        "object {id}: {operation} with cat={category} name={name} is impossible, \
         the instance was recorded with cat={expected_category} name={expected_name}"
    )]
    Mismatch {
        id: ObjectId,
        operation: &'static str,
        category: String,
        name: String,
        expected_category: String,
        expected_name: String,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type SpanResult<T> = std::result::Result<T, SpanError>;
pub type ObjectResult<T> = std::result::Result<T, ObjectError>;
