//! Regression trees in flat-array layout.

use serde::{Deserialize, Serialize};

/// Marker for "no child" in `children_left` / `children_right`.
pub const LEAF: i64 = -1;

/// A binary regression tree stored as parallel arrays, one entry per node.
///
/// Node 0 is the root. A node is a leaf when `children_left[i] == -1`;
/// otherwise the row goes left when `x[feature[i]] <= threshold[i]`.
/// `value[i]` is only read at leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl Tree {
    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.children_left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children_left.is_empty()
    }

    /// Check array lengths, child links, and feature indices.
    ///
    /// Children must point strictly forward, which rules out cycles and
    /// bounds every traversal by the node count.
    pub fn validate(&self, num_features: usize) -> Result<(), String> {
        let n = self.len();
        if n == 0 {
            return Err("tree has no nodes".into());
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err("node arrays differ in length".into());
        }

        for i in 0..n {
            let (left, right) = (self.children_left[i], self.children_right[i]);
            if left == LEAF {
                if right != LEAF {
                    return Err(format!("node {i} has a right child but no left child"));
                }
                if !self.value[i].is_finite() {
                    return Err(format!("leaf {i} has a non-finite value"));
                }
                continue;
            }
            for child in [left, right] {
                if child <= i as i64 || child >= n as i64 {
                    return Err(format!("node {i} links to invalid child {child}"));
                }
            }
            let f = self.feature[i];
            if f < 0 || f as usize >= num_features {
                return Err(format!("node {i} splits on unknown feature {f}"));
            }
            if self.threshold[i].is_nan() {
                return Err(format!("node {i} has a NaN threshold"));
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf. Assumes [`Tree::validate`] passed.
    pub fn predict_row(&self, features: &[f64]) -> f64 {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let x = features[self.feature[node] as usize];
            node = if x <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        self.value[node]
    }
}
