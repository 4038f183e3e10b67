use crate::{
    Error, GraphModel, Result,
    algo::multigraph::{Edge, Multigraph},
};

/// Prim's algorithm over the dense weight matrix, O(n^2).
///
/// Grows the tree from vertex 0, keeping for every outside vertex the
/// cheapest edge into the tree. Ties go to the lower vertex index.
pub fn minimum_spanning_tree(graph: &GraphModel) -> Result<Multigraph> {
    let n = graph.n();
    let mut tree = Multigraph::new(n);
    if n == 0 {
        return Ok(tree);
    }

    let mut in_tree = vec![false; n];
    let mut best = vec![f64::INFINITY; n];
    let mut link = vec![0usize; n];

    in_tree[0] = true;
    for v in 1..n {
        best[v] = graph.w(0, v);
    }

    for _ in 1..n {
        let mut next: Option<usize> = None;
        for v in 0..n {
            if in_tree[v] || !best[v].is_finite() {
                continue;
            }
            if next.is_none_or(|u| best[v] < best[u]) {
                next = Some(v);
            }
        }

        let Some(v) = next else {
            return Err(Error::disconnected(format!(
                "spanning tree stalled at {} of {} edges",
                tree.edges().len(),
                n - 1
            )));
        };

        in_tree[v] = true;
        tree.push(Edge::new(link[v], v));

        for u in 0..n {
            if !in_tree[u] {
                let w = graph.w(v, u);
                if w < best[u] {
                    best[u] = w;
                    link[u] = v;
                }
            }
        }
    }

    Ok(tree)
}
