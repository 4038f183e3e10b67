use crate::{
    GraphModel, Result, Tour,
    algo::{close_multigraph, mst::minimum_spanning_tree, multigraph::Multigraph},
    observe::{SolveContext, Stage},
};

/// Doubled spanning tree walked and shortcut. At most 2x the optimum.
pub(crate) fn solve(graph: &GraphModel, ctx: &SolveContext<'_>) -> Result<Tour> {
    if graph.n() <= 2 {
        return Ok(Tour::trivial(graph));
    }

    let tree = ctx.stage(
        Stage::SpanningTree,
        |t: &Multigraph| t.edges().len(),
        || minimum_spanning_tree(graph),
    )?;
    let doubled = ctx.stage(
        Stage::Multigraph,
        |m: &Multigraph| m.edges().len(),
        || Ok(tree.doubled()),
    )?;

    close_multigraph(graph, &doubled, ctx)
}
