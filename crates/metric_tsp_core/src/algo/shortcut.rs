use crate::{Error, GraphModel, Result, Tour, algo::euler::EulerianCircuit};

/// Keeps the first visit of every vertex along the circuit.
///
/// The closing edge back to the first vertex is implied by `Tour`. Fails if
/// the circuit misses a vertex of `graph`.
pub fn shortcut(graph: &GraphModel, circuit: &EulerianCircuit) -> Result<Tour> {
    let n = graph.n();
    let mut seen = vec![false; n];
    let mut order = Vec::with_capacity(n);

    for v in circuit.vertex_sequence() {
        if v >= n {
            return Err(Error::invalid_graph(format!(
                "circuit visits vertex {v} outside a graph of {n}"
            )));
        }
        if !std::mem::replace(&mut seen[v], true) {
            order.push(v);
        }
    }

    if order.len() != n {
        return Err(Error::not_eulerian(format!(
            "circuit covers {} of {n} vertices",
            order.len()
        )));
    }

    Tour::from_order(graph, order)
}

#[cfg(test)]
mod tests {
    use super::shortcut;
    use crate::{
        ErrorKind, GraphModel,
        algo::{
            euler::eulerian_circuit,
            multigraph::{Edge, Multigraph},
        },
    };

    fn line(n: usize) -> GraphModel {
        let labels: Vec<String> = (0..n).map(|i| format!("p{i}")).collect();
        let points: Vec<(f64, f64)> = (0..n).map(|i| (i as f64, 0.0)).collect();
        GraphModel::from_points(labels, &points).expect("line")
    }

    #[test]
    fn doubled_path_collapses_to_a_line_sweep() {
        let g = line(4);
        let mut tree = Multigraph::new(4);
        tree.push(Edge::new(0, 1));
        tree.push(Edge::new(1, 2));
        tree.push(Edge::new(2, 3));
        let walk = tree.doubled();
        let circuit = eulerian_circuit(&walk).expect("circuit");

        let tour = shortcut(&g, &circuit).expect("tour");
        assert!(tour.is_permutation_of(4));
        assert_eq!(tour.vertices[0], circuit.start());
        assert!(tour.weight <= walk.total_weight(&g) + 1e-9);
        assert!((tour.weight - 6.0).abs() < 1e-9);
    }

    #[test]
    fn circuit_missing_a_vertex_is_rejected() {
        let g = line(4);
        let mut m = Multigraph::new(4);
        m.push(Edge::new(0, 1));
        m.push(Edge::new(1, 0));
        let circuit = eulerian_circuit(&m).expect("circuit");
        let err = shortcut(&g, &circuit).expect_err("vertices 2 and 3 unreached");
        assert_eq!(err.kind(), ErrorKind::NotEulerian);
    }
}
