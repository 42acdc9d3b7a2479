// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

use serde::Serialize;

/// Running min/max over the values added to it. Empty until the first value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Bounds {
    min: Option<f64>,
    max: Option<f64>,
}

impl Bounds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_value(&mut self, value: f64) {
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    pub fn add_bounds(&mut self, other: &Bounds) {
        if let Some(min) = other.min {
            self.add_value(min);
        }
        if let Some(max) = other.max {
            self.add_value(max);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none()
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// `max - min`, or zero while empty.
    pub fn range(&self) -> f64 {
        match (self.min, self.max) {
            (Some(min), Some(max)) => max - min,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bounds() {
        let bounds = Bounds::new();
        assert!(bounds.is_empty());
        assert_eq!(bounds.min(), None);
        assert_eq!(bounds.range(), 0.0);
    }

    #[test]
    fn test_add_values_and_reset() {
        let mut bounds = Bounds::new();
        bounds.add_value(5.0);
        bounds.add_value(-2.0);
        bounds.add_value(3.0);
        assert_eq!(bounds.min(), Some(-2.0));
        assert_eq!(bounds.max(), Some(5.0));
        assert_eq!(bounds.range(), 7.0);

        let mut other = Bounds::new();
        other.add_value(10.0);
        bounds.add_bounds(&other);
        assert_eq!(bounds.max(), Some(10.0));

        bounds.reset();
        assert!(bounds.is_empty());
    }
}
