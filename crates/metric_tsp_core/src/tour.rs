use crate::{Error, GraphModel, Result, VertexId};

/// Closed Hamiltonian tour. The edge back to `vertices[0]` is implied.
#[derive(Clone, Debug, PartialEq)]
pub struct Tour {
    pub vertices: Vec<VertexId>,
    pub weight: f64,
}

impl Tour {
    /// Builds a tour from a visiting order and prices it against `graph`.
    pub fn from_order(graph: &GraphModel, vertices: Vec<VertexId>) -> Result<Self> {
        if !is_permutation(&vertices, graph.n()) {
            return Err(Error::other(format!(
                "tour of length {} is not a permutation of {} vertices",
                vertices.len(),
                graph.n()
            )));
        }
        let weight = closed_weight(graph, &vertices);
        Ok(Self { vertices, weight })
    }

    /// `0, 1, ..., n-1` for graphs too small to have a choice (n <= 2).
    pub(crate) fn trivial(graph: &GraphModel) -> Self {
        let vertices: Vec<VertexId> = (0..graph.n()).collect();
        let weight = closed_weight(graph, &vertices);
        Self { vertices, weight }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn is_permutation_of(&self, n: usize) -> bool {
        is_permutation(&self.vertices, n)
    }

    pub fn labels<'g>(&self, graph: &'g GraphModel) -> Result<Vec<&'g str>> {
        self.vertices.iter().map(|&v| graph.label(v)).collect()
    }

    pub fn metrics(&self, graph: &GraphModel) -> TourMetrics {
        let n = self.len();
        if n < 2 {
            return TourMetrics::default();
        }

        let (total, longest) = (0..n)
            .map(|i| graph.w(self.vertices[i], self.vertices[(i + 1) % n]))
            .fold((0.0, 0.0_f64), |(sum, max), d| (sum + d, max.max(d)));

        TourMetrics {
            total,
            longest,
            average: total / n as f64,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TourMetrics {
    pub total: f64,
    pub longest: f64,
    pub average: f64,
}

fn closed_weight(graph: &GraphModel, vertices: &[VertexId]) -> f64 {
    let n = vertices.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| graph.w(vertices[i], vertices[(i + 1) % n]))
        .sum()
}

fn is_permutation(vertices: &[VertexId], n: usize) -> bool {
    if vertices.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    vertices
        .iter()
        .all(|&v| v < n && !std::mem::replace(&mut seen[v], true))
}
