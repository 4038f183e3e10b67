use crate::{
    Error, GraphModel, Result, Tour, VertexId,
    algo::{
        close_multigraph,
        matching::{Matching, min_weight_perfect_matching},
        mst::minimum_spanning_tree,
        multigraph::Multigraph,
    },
    observe::{SolveContext, Stage},
};

/// Tree, odd-degree matching, Euler circuit, shortcut. At most 1.5x the
/// optimum on metric graphs.
pub(crate) fn solve(graph: &GraphModel, ctx: &SolveContext<'_>) -> Result<Tour> {
    if graph.n() <= 2 {
        return Ok(Tour::trivial(graph));
    }

    let tree = ctx.stage(
        Stage::SpanningTree,
        |t: &Multigraph| t.edges().len(),
        || minimum_spanning_tree(graph),
    )?;

    let odd = ctx.stage(
        Stage::OddDegree,
        |s: &Vec<VertexId>| s.len(),
        || {
            let odd = tree.odd_degree_vertices();
            if odd.len() % 2 == 1 {
                return Err(Error::other(format!(
                    "spanning tree has {} odd-degree vertices",
                    odd.len()
                )));
            }
            Ok(odd)
        },
    )?;
    if odd.is_empty() {
        return Ok(Tour::trivial(graph));
    }

    let matching = ctx.stage(
        Stage::Matching,
        |m: &Matching| m.len(),
        || min_weight_perfect_matching(graph, &odd),
    )?;

    let multigraph = ctx.stage(
        Stage::Multigraph,
        |m: &Multigraph| m.edges().len(),
        || Ok(tree.with_matching(&matching)),
    )?;

    close_multigraph(graph, &multigraph, ctx)
}
