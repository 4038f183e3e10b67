use crate::{
    Error, Result, VertexId,
    algo::multigraph::{Edge, Multigraph},
};

/// Closed walk using every multigraph edge once, edges oriented in walk order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EulerianCircuit {
    start: VertexId,
    edges: Vec<Edge>,
}

impl EulerianCircuit {
    pub fn start(&self) -> VertexId {
        self.start
    }

    /// `edges()[i].v == edges()[i + 1].u`, and the last edge ends at `start()`.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Visited vertices, starting and ending at `start()`.
    pub fn vertex_sequence(&self) -> Vec<VertexId> {
        let mut out = Vec::with_capacity(self.edges.len() + 1);
        out.push(self.start);
        out.extend(self.edges.iter().map(|e| e.v));
        out
    }
}

/// Hierholzer's algorithm with an explicit stack.
///
/// Sub-circuits found at a vertex with unused edges are spliced in as the
/// stack unwinds. Each vertex keeps a cursor into its incidence list so the
/// walk is linear in the number of edges.
pub fn eulerian_circuit(multigraph: &Multigraph) -> Result<EulerianCircuit> {
    if let Some(v) = multigraph.odd_degree_vertices().first() {
        return Err(Error::not_eulerian(format!(
            "vertex {v} has odd degree {}",
            multigraph.degrees()[*v]
        )));
    }

    let edges = multigraph.edges();
    let Some(first) = edges.first() else {
        return Ok(EulerianCircuit::default());
    };
    let start = first.u;

    let mut incident: Vec<Vec<usize>> = vec![Vec::new(); multigraph.n()];
    for (idx, e) in edges.iter().enumerate() {
        incident[e.u].push(idx);
        if e.v != e.u {
            incident[e.v].push(idx);
        }
    }

    let mut cursor = vec![0usize; multigraph.n()];
    let mut used = vec![false; edges.len()];
    let mut stack: Vec<VertexId> = vec![start];
    let mut walk: Vec<Edge> = Vec::with_capacity(edges.len());

    while let Some(&current) = stack.last() {
        let list = &incident[current];
        while cursor[current] < list.len() && used[list[cursor[current]]] {
            cursor[current] += 1;
        }

        if let Some(&idx) = list.get(cursor[current]) {
            used[idx] = true;
            stack.push(edges[idx].other(current));
        } else {
            stack.pop();
            if let Some(&from) = stack.last() {
                walk.push(Edge::new(from, current));
            }
        }
    }

    if walk.len() != edges.len() {
        return Err(Error::not_eulerian(format!(
            "only {} of {} edges reachable from vertex {start}",
            walk.len(),
            edges.len()
        )));
    }

    walk.reverse();
    Ok(EulerianCircuit { start, edges: walk })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::eulerian_circuit;
    use crate::{
        ErrorKind,
        algo::multigraph::{Edge, Multigraph},
    };

    fn multiset(edges: &[Edge]) -> HashMap<Edge, usize> {
        let mut out = HashMap::new();
        for e in edges {
            *out.entry(e.normalized()).or_insert(0) += 1;
        }
        out
    }

    fn assert_closed_walk(m: &Multigraph) {
        let circuit = eulerian_circuit(m).expect("circuit");
        let edges = circuit.edges();
        assert_eq!(multiset(edges), multiset(m.edges()));
        for pair in edges.windows(2) {
            assert_eq!(pair[0].v, pair[1].u);
        }
        if let (Some(first), Some(last)) = (edges.first(), edges.last()) {
            assert_eq!(first.u, circuit.start());
            assert_eq!(last.v, circuit.start());
        }
        let seq = circuit.vertex_sequence();
        assert_eq!(seq.len(), edges.len() + 1);
        assert_eq!(seq.first(), seq.last());
    }

    #[test]
    fn triangle_is_a_single_loop() {
        let mut m = Multigraph::new(3);
        m.push(Edge::new(0, 1));
        m.push(Edge::new(1, 2));
        m.push(Edge::new(2, 0));
        assert_closed_walk(&m);
        assert_eq!(eulerian_circuit(&m).expect("circuit").vertex_sequence().len(), 4);
    }

    #[test]
    fn splices_sub_circuits_into_a_figure_eight() {
        let mut m = Multigraph::new(5);
        for (u, v) in [(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 2)] {
            m.push(Edge::new(u, v));
        }
        assert_closed_walk(&m);
    }

    #[test]
    fn doubled_random_trees_keep_their_edge_multiset() {
        let mut rng = StdRng::seed_from_u64(11);
        for n in 2..30 {
            let mut tree = Multigraph::new(n);
            for v in 1..n {
                tree.push(Edge::new(rng.random_range(0..v), v));
            }
            assert_closed_walk(&tree.doubled());
        }
    }

    #[test]
    fn parallel_edges_are_walked_separately() {
        let mut m = Multigraph::new(2);
        m.push(Edge::new(0, 1));
        m.push(Edge::new(1, 0));
        m.push(Edge::new(0, 1));
        m.push(Edge::new(0, 1));
        assert_closed_walk(&m);
    }

    #[test]
    fn empty_multigraph_gives_empty_circuit() {
        let circuit = eulerian_circuit(&Multigraph::new(1)).expect("circuit");
        assert!(circuit.is_empty());
        assert_eq!(circuit.vertex_sequence(), vec![0]);
    }

    #[test]
    fn odd_degree_is_rejected() {
        let mut m = Multigraph::new(3);
        m.push(Edge::new(0, 1));
        m.push(Edge::new(1, 2));
        let err = eulerian_circuit(&m).expect_err("path is not eulerian");
        assert_eq!(err.kind(), ErrorKind::NotEulerian);
    }

    #[test]
    fn disconnected_components_are_rejected() {
        let mut m = Multigraph::new(6);
        for (u, v) in [(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3)] {
            m.push(Edge::new(u, v));
        }
        let err = eulerian_circuit(&m).expect_err("two triangles");
        assert_eq!(err.kind(), ErrorKind::NotEulerian);
    }
}
