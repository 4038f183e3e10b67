use crate::{GraphModel, VertexId, algo::matching::Matching};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    pub u: VertexId,
    pub v: VertexId,
}

impl Edge {
    pub fn new(u: VertexId, v: VertexId) -> Self {
        Self { u, v }
    }

    /// Endpoint opposite `from`.
    #[inline]
    pub fn other(self, from: VertexId) -> VertexId {
        if self.u == from { self.v } else { self.u }
    }

    /// Orientation-free form, smaller endpoint first.
    pub fn normalized(self) -> Self {
        if self.u <= self.v {
            self
        } else {
            Self::new(self.v, self.u)
        }
    }
}

/// Edge list over `0..n` that may hold parallel edges, with per-vertex degree.
/// Spanning trees, doubled trees and tree-plus-matching unions all use it.
#[derive(Clone, Debug, Default)]
pub struct Multigraph {
    n: usize,
    edges: Vec<Edge>,
    degree: Vec<usize>,
}

impl Multigraph {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            edges: Vec::new(),
            degree: vec![0; n],
        }
    }

    /// Adds one edge; parallel edges and repeats are kept.
    ///
    /// # Panics
    ///
    /// If either endpoint is not below `n`.
    pub fn push(&mut self, edge: Edge) {
        self.degree[edge.u] += 1;
        self.degree[edge.v] += 1;
        self.edges.push(edge);
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn degrees(&self) -> &[usize] {
        &self.degree
    }

    pub fn total_weight(&self, graph: &GraphModel) -> f64 {
        self.edges.iter().map(|e| graph.w(e.u, e.v)).sum()
    }

    /// Vertices of odd degree, ascending. Always an even count for a tree.
    pub fn odd_degree_vertices(&self) -> Vec<VertexId> {
        self.degree
            .iter()
            .enumerate()
            .filter(|(_, d)| *d % 2 == 1)
            .map(|(v, _)| v)
            .collect()
    }

    /// Every edge twice, so every degree becomes even.
    pub fn doubled(&self) -> Self {
        let mut out = Self::new(self.n);
        for &edge in &self.edges {
            out.push(edge);
            out.push(edge);
        }
        out
    }

    /// Union with the edges of a matching (parallel copies allowed).
    pub fn with_matching(&self, matching: &Matching) -> Self {
        let mut out = self.clone();
        for (u, v) in matching.pairs() {
            out.push(Edge::new(u, v));
        }
        out
    }
}
