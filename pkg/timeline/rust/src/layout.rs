// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Span nesting ("subrow") layout.
//!
//! Partitions spans into depth-ordered rows so that spans in one row never
//! overlap and every span at row `d + 1` is contained by a span at row `d`.
//!
//! The walk visits spans by start time and inserts each one as deep as it
//! fits. Given
//!
//! ```text
//!  0:  [    a       ]
//!  1:    [  b  ]
//!  2:    [c][d]
//! ```
//!
//! a span `[e]` starting after `d` is checked against the last span of row 2
//! (`d`), then row 1 (`b`), then row 0 (`a`), which contains it, so it lands
//! in row 1 as a child of `a`. A span that fits nowhere becomes a new root in
//! row 0. Only the last span of each row is ever inspected: rows are built
//! left to right, so that span is the only one still able to contain later
//! starts.
//!
//! The result is index-based and never writes into the spans themselves, so
//! several layouts can be computed over shared span data.

use serde::Serialize;

use crate::span::Span;

/// Rows, parent/child relation and nesting violations for one layout pass.
///
/// Every index refers to the span slice the layout was computed from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubRowLayout {
    rows: Vec<Vec<usize>>,
    parent_of: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    malformed: Vec<usize>,
}

impl SubRowLayout {
    /// Rows from shallowest to deepest, each ordered by start time.
    pub fn rows(&self) -> &[Vec<usize>] {
        &self.rows
    }

    pub fn depth(&self) -> usize {
        self.rows.len()
    }

    pub fn roots(&self) -> &[usize] {
        self.rows.first().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn parent_of(&self, index: usize) -> Option<usize> {
        self.parent_of.get(index).copied().flatten()
    }

    pub fn children_of(&self, index: usize) -> &[usize] {
        self.children.get(index).map(Vec::as_slice).unwrap_or_default()
    }

    /// Spans that start before, or partially overlap, a span they should
    /// have nested under. They are still placed, best effort.
    pub fn malformed(&self) -> &[usize] {
        &self.malformed
    }

    /// Rows with indices resolved against `spans`.
    pub fn resolve<'a>(&self, spans: &'a [Span]) -> Vec<Vec<&'a Span>> {
        self.rows
            .iter()
            .map(|row| row.iter().filter_map(|&i| spans.get(i)).collect())
            .collect()
    }

    fn place(&mut self, depth: usize, index: usize) {
        while self.rows.len() <= depth {
            self.rows.push(Vec::new());
        }
        if let Some(row) = self.rows.get_mut(depth) {
            row.push(index);
        }
    }

    fn adopt(&mut self, parent: usize, child: usize) {
        if let Some(slot) = self.parent_of.get_mut(child) {
            *slot = Some(parent);
        }
        if let Some(children) = self.children.get_mut(parent) {
            children.push(child);
        }
    }
}

/// Lays out `spans`, which are expected to be pairwise disjoint or properly
/// nested. Violations are recorded in [`SubRowLayout::malformed`].
///
/// Spans are walked by start time; on equal starts the one earlier in
/// `spans` is placed first and so becomes the outer span.
pub fn layout(spans: &[Span]) -> SubRowLayout {
    let mut result = SubRowLayout {
        rows: Vec::new(),
        parent_of: vec![None; spans.len()],
        children: vec![Vec::new(); spans.len()],
        malformed: Vec::new(),
    };

    let mut order: Vec<(usize, &Span)> = spans.iter().enumerate().collect();
    order.sort_by(|(ia, a), (ib, b)| a.start.total_cmp(&b.start).then(ia.cmp(ib)));

    for (index, span) in order {
        let mut container = None;
        let mut malformed = false;

        for depth in (0..result.rows.len()).rev() {
            let Some(&last) = result.rows.get(depth).and_then(|row| row.last()) else {
                continue;
            };
            let Some(last_span) = spans.get(last) else {
                continue;
            };

            if span.start < last_span.start {
                malformed = true;
            } else if span.end() <= last_span.end() {
                container = Some((depth, last));
                break;
            } else if span.start < last_span.end() {
                malformed = true;
            }
        }

        if malformed {
            tracing::debug!(
                index,
                title = %span.title,
                start = span.start,
                end = span.end(),
                "span is not properly nested"
            );
            result.malformed.push(index);
        }

        match container {
            Some((depth, parent)) => {
                result.place(depth + 1, index);
                result.adopt(parent, index);
            }
            None => result.place(0, index),
        }
    }

    if !result.malformed.is_empty() {
        tracing::warn!(
            malformed = result.malformed.len(),
            total = spans.len(),
            "layout found improperly nested spans"
        );
    }

    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn span(title: &str, start: f64, end: f64) -> Span {
        Span::new("cat", title, start, end - start)
    }

    fn titles(layout: &SubRowLayout, spans: &[Span]) -> Vec<Vec<String>> {
        layout
            .resolve(spans)
            .into_iter()
            .map(|row| row.into_iter().map(|s| s.title.clone()).collect())
            .collect()
    }

    #[test]
    fn test_empty_input() {
        let result = layout(&[]);
        assert_eq!(result.depth(), 0);
        assert!(result.roots().is_empty());
        assert!(result.malformed().is_empty());
    }

    #[test]
    fn test_two_children_under_one_parent() {
        let spans = vec![span("a", 0.0, 10.0), span("b", 2.0, 4.0), span("c", 5.0, 8.0)];
        let result = layout(&spans);

        assert_eq!(result.rows(), &[vec![0], vec![1, 2]]);
        assert_eq!(result.children_of(0), &[1, 2]);
        assert_eq!(result.parent_of(1), Some(0));
        assert_eq!(result.parent_of(2), Some(0));
        assert_eq!(result.parent_of(0), None);
        assert!(result.malformed().is_empty());
    }

    #[test]
    fn test_unsorted_input_is_walked_by_start() {
        let spans = vec![span("c", 5.0, 8.0), span("a", 0.0, 10.0), span("b", 2.0, 4.0)];
        let result = layout(&spans);
        assert_eq!(titles(&result, &spans), vec![vec!["a"], vec!["b", "c"]]);
    }

    #[test]
    fn test_deepest_first_walk() {
        // a contains b, b contains c and d; e fits only in a; f fits nowhere.
        let spans = vec![
            span("a", 0.0, 14.0),
            span("b", 1.0, 7.0),
            span("c", 1.0, 3.0),
            span("d", 4.0, 6.0),
            span("e", 8.0, 10.0),
            span("f", 16.0, 18.0),
        ];
        let result = layout(&spans);

        assert_eq!(
            titles(&result, &spans),
            vec![vec!["a", "f"], vec!["b", "e"], vec!["c", "d"]]
        );
        assert_eq!(result.children_of(0), &[1, 4]);
        assert_eq!(result.children_of(1), &[2, 3]);
        assert!(result.children_of(5).is_empty());
    }

    #[test]
    fn test_equal_start_earlier_input_is_outer() {
        let spans = vec![span("outer", 0.0, 10.0), span("inner", 0.0, 5.0)];
        let result = layout(&spans);
        assert_eq!(result.parent_of(1), Some(0));
        assert_eq!(result.depth(), 2);
    }

    #[test]
    fn test_equal_start_wrong_input_order_is_malformed() {
        let spans = vec![span("short", 0.0, 5.0), span("long", 0.0, 10.0)];
        let result = layout(&spans);
        assert_eq!(result.malformed(), &[1]);
        assert_eq!(result.roots(), &[0, 1]);
    }

    #[test]
    fn test_partial_overlap_is_malformed_but_placed() {
        let spans = vec![span("a", 0.0, 10.0), span("b", 5.0, 15.0), span("c", 6.0, 7.0)];
        let result = layout(&spans);

        assert_eq!(result.malformed(), &[1]);
        assert_eq!(result.roots(), &[0, 1]);
        // c nests under the most recent root, b.
        assert_eq!(result.parent_of(2), Some(1));
    }

    #[test]
    fn test_zero_duration_spans() {
        let spans = vec![span("a", 0.0, 10.0), span("instant", 3.0, 3.0), span("edge", 10.0, 10.0)];
        let result = layout(&spans);
        assert_eq!(result.children_of(0), &[1, 2]);
        assert!(result.malformed().is_empty());
    }

    #[test]
    fn test_disjoint_spans_share_row_zero() {
        let spans = vec![span("a", 0.0, 1.0), span("b", 1.0, 2.0), span("c", 5.0, 6.0)];
        let result = layout(&spans);
        assert_eq!(result.rows(), &[vec![0, 1, 2]]);
    }
}
