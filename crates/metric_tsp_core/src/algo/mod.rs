pub(crate) mod christofides;
pub(crate) mod double_tree;
pub mod euler;
pub(crate) mod held_karp;
pub mod matching;
pub mod mst;
pub mod multigraph;
pub mod shortcut;

use crate::{
    GraphModel, Result, Tour,
    observe::{SolveContext, Stage},
};
use euler::{EulerianCircuit, eulerian_circuit};
use multigraph::Multigraph;

/// Shared tail of both approximation pipelines: Euler circuit, then shortcut.
pub(crate) fn close_multigraph(
    graph: &GraphModel,
    multigraph: &Multigraph,
    ctx: &SolveContext<'_>,
) -> Result<Tour> {
    let circuit = ctx.stage(
        Stage::EulerianCircuit,
        |c: &EulerianCircuit| c.len(),
        || eulerian_circuit(multigraph),
    )?;
    ctx.stage(
        Stage::Shortcut,
        |t: &Tour| t.len(),
        || shortcut::shortcut(graph, &circuit),
    )
}
