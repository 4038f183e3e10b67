use std::collections::HashMap;

use rayon::prelude::*;

use crate::{Error, Result};

/// Index of a vertex inside a [`GraphModel`], `0..n`.
pub type VertexId = usize;

const SYMMETRY_RELATIVE_TOLERANCE: f64 = 1e-9;

/// Complete, undirected graph with nonnegative edge weights.
///
/// Weights live in a dense row-major `n x n` matrix; the diagonal is zero.
/// The model is immutable once built and is validated on construction.
#[derive(Clone, Debug)]
pub struct GraphModel {
    labels: Vec<String>,
    index: HashMap<String, VertexId>,
    weights: Vec<f64>,
}

/// A triple where going around `j` is cheaper than the direct edge `i -> k`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MetricViolation {
    pub i: VertexId,
    pub j: VertexId,
    pub k: VertexId,
    /// `w(i,k) - (w(i,j) + w(j,k))`, always positive.
    pub excess: f64,
}

impl GraphModel {
    /// Build from labels and a full distance matrix. The diagonal is ignored.
    pub fn from_matrix<S: Into<String>>(labels: Vec<S>, rows: Vec<Vec<f64>>) -> Result<Self> {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let n = labels.len();
        if rows.len() != n {
            return Err(Error::invalid_graph(format!(
                "expected {n} matrix rows, got {}",
                rows.len()
            )));
        }

        let mut weights = vec![0.0; n * n];
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(Error::invalid_graph(format!(
                    "row {i} has {} entries, expected {n}",
                    row.len()
                )));
            }
            for (j, &w) in row.iter().enumerate() {
                if i != j {
                    weights[i * n + j] = w;
                }
            }
        }

        Self::build(labels, weights)
    }

    /// Build from an edge list over `labels`. Every unordered pair must appear;
    /// a pair given twice must carry the same weight both times.
    pub fn from_weighted_edges<S, I>(labels: Vec<S>, edges: I) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = (String, String, f64)>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let index = build_index(&labels)?;
        let n = labels.len();
        let mut weights = vec![f64::NAN; n * n];
        for i in 0..n {
            weights[i * n + i] = 0.0;
        }

        for (a, b, w) in edges {
            let u = lookup(&index, &a)?;
            let v = lookup(&index, &b)?;
            if u == v {
                return Err(Error::invalid_graph(format!("self-loop on {a}")));
            }
            for (x, y) in [(u, v), (v, u)] {
                let slot = &mut weights[x * n + y];
                if !slot.is_nan() && !weights_agree(*slot, w) {
                    return Err(Error::invalid_graph(format!(
                        "conflicting weights for {a}-{b}: {} and {w}",
                        *slot
                    )));
                }
                *slot = w;
            }
        }

        Self::build(labels, weights)
    }

    /// Euclidean distances between planar points, one per label.
    pub fn from_points<S: Into<String>>(labels: Vec<S>, points: &[(f64, f64)]) -> Result<Self> {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.len() != points.len() {
            return Err(Error::invalid_graph(format!(
                "{} labels for {} points",
                labels.len(),
                points.len()
            )));
        }
        let rows = points
            .iter()
            .map(|&(ax, ay)| {
                points
                    .iter()
                    .map(|&(bx, by)| (ax - bx).hypot(ay - by))
                    .collect()
            })
            .collect();
        Self::from_matrix(labels, rows)
    }

    fn build(labels: Vec<String>, weights: Vec<f64>) -> Result<Self> {
        let index = build_index(&labels)?;
        let graph = Self {
            labels,
            index,
            weights,
        };
        graph.validate()?;
        Ok(graph)
    }

    /// Re-checks every structural invariant: n >= 1, complete, finite,
    /// nonnegative and symmetric weights.
    pub fn validate(&self) -> Result<()> {
        let n = self.n();
        if n == 0 {
            return Err(Error::invalid_graph("graph needs at least one vertex"));
        }
        if self.weights.len() != n * n || self.index.len() != n {
            return Err(Error::invalid_graph("weight matrix does not match vertex count"));
        }

        for i in 0..n {
            for j in (i + 1)..n {
                let a = self.weights[i * n + j];
                let b = self.weights[j * n + i];
                if a.is_nan() || b.is_nan() {
                    return Err(Error::invalid_graph(format!(
                        "missing weight for {}-{}",
                        self.labels[i], self.labels[j]
                    )));
                }
                if !a.is_finite() || !b.is_finite() {
                    return Err(Error::invalid_graph(format!(
                        "non-finite weight for {}-{}",
                        self.labels[i], self.labels[j]
                    )));
                }
                if a < 0.0 || b < 0.0 {
                    return Err(Error::invalid_graph(format!(
                        "negative weight for {}-{}",
                        self.labels[i], self.labels[j]
                    )));
                }
                if !weights_agree(a, b) {
                    return Err(Error::invalid_graph(format!(
                        "asymmetric weight for {}-{}: {a} vs {b}",
                        self.labels[i], self.labels[j]
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn n(&self) -> usize {
        self.labels.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn label(&self, v: VertexId) -> Result<&str> {
        self.labels
            .get(v)
            .map(String::as_str)
            .ok_or_else(|| Error::invalid_graph(format!("unknown vertex {v}")))
    }

    pub fn vertex(&self, label: &str) -> Result<VertexId> {
        lookup(&self.index, label)
    }

    /// Weight of the edge between two distinct vertices.
    pub fn weight(&self, u: VertexId, v: VertexId) -> Result<f64> {
        let n = self.n();
        if u >= n || v >= n {
            return Err(Error::invalid_graph(format!(
                "unknown vertex pair ({u}, {v}) for n={n}"
            )));
        }
        if u == v {
            return Err(Error::invalid_graph(format!("no self-loop at vertex {u}")));
        }
        Ok(self.w(u, v))
    }

    pub fn weight_by_label(&self, a: &str, b: &str) -> Result<f64> {
        self.weight(self.vertex(a)?, self.vertex(b)?)
    }

    /// Unchecked lookup for solver inner loops; `u == v` yields 0.
    #[inline]
    pub(crate) fn w(&self, u: VertexId, v: VertexId) -> f64 {
        self.weights[u * self.n() + v]
    }

    /// Scans all triples for a triangle-inequality violation larger than
    /// `tolerance`. Returns the one with the smallest `i`.
    pub fn find_metric_violation(&self, tolerance: f64) -> Option<MetricViolation> {
        let n = self.n();
        (0..n).into_par_iter().find_map_first(|i| {
            for j in 0..n {
                if j == i {
                    continue;
                }
                for k in 0..n {
                    if k == i || k == j {
                        continue;
                    }
                    let detour = self.w(i, j) + self.w(j, k);
                    let excess = self.w(i, k) - detour;
                    if excess > tolerance * detour.max(1.0) {
                        return Some(MetricViolation { i, j, k, excess });
                    }
                }
            }
            None
        })
    }
}

fn build_index(labels: &[String]) -> Result<HashMap<String, VertexId>> {
    let mut index = HashMap::with_capacity(labels.len());
    for (v, label) in labels.iter().enumerate() {
        if index.insert(label.clone(), v).is_some() {
            return Err(Error::invalid_graph(format!("duplicate vertex label {label}")));
        }
    }
    Ok(index)
}

fn lookup(index: &HashMap<String, VertexId>, label: &str) -> Result<VertexId> {
    index
        .get(label)
        .copied()
        .ok_or_else(|| Error::invalid_graph(format!("unknown vertex {label}")))
}

fn weights_agree(a: f64, b: f64) -> bool {
    (a - b).abs() <= SYMMETRY_RELATIVE_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}
