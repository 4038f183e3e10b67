use crate::{
    CancelToken, Error, GraphModel, Result, Tour,
    observe::{SolveContext, Stage},
};

/// Hard ceiling for the exact solver threshold; the table needs 2^(n-1)*(n-1) cells.
pub const MAX_EXACT_VERTICES: usize = 32;

/// Masks processed between two cancellation checks.
const CANCEL_STRIDE: usize = 1 << 14;

const NO_PARENT: u8 = u8::MAX;

/// Optimal tour for `n <= threshold`, `InstanceTooLarge` above it.
pub(crate) fn solve(graph: &GraphModel, threshold: usize, ctx: &SolveContext<'_>) -> Result<Tour> {
    let n = graph.n();
    if n > threshold || n > MAX_EXACT_VERTICES {
        return Err(Error::InstanceTooLarge { n, threshold });
    }
    if n <= 2 {
        return Ok(Tour::trivial(graph));
    }

    ctx.stage(
        Stage::HeldKarp,
        |t: &Tour| t.len(),
        || held_karp(graph, threshold, ctx.cancel),
    )
}

/// Vertex 0 is the fixed start; vertices `1..n` map to bits `0..n-1`.
/// `cost[mask * m + last]` is the cheapest path from 0 through exactly
/// `mask`, ending at `last`. Masks are visited in numeric order, which puts
/// every subset before its supersets.
fn held_karp(graph: &GraphModel, threshold: usize, cancel: &CancelToken) -> Result<Tour> {
    let n = graph.n();
    let m = n - 1;
    let too_large = || Error::InstanceTooLarge { n, threshold };

    let masks = 1usize.checked_shl(m as u32).ok_or_else(too_large)?;
    let cells = masks.checked_mul(m).ok_or_else(too_large)?;

    let mut cost: Vec<f64> = Vec::new();
    cost.try_reserve_exact(cells).map_err(|_| too_large())?;
    cost.resize(cells, f64::INFINITY);
    let mut parent: Vec<u8> = Vec::new();
    parent.try_reserve_exact(cells).map_err(|_| too_large())?;
    parent.resize(cells, NO_PARENT);

    for j in 0..m {
        cost[(1 << j) * m + j] = graph.w(0, j + 1);
    }

    for mask in 1..masks {
        if mask % CANCEL_STRIDE == 0 {
            cancel.check(Stage::HeldKarp.as_str())?;
        }
        for last in 0..m {
            if mask & (1 << last) == 0 {
                continue;
            }
            let base = cost[mask * m + last];
            if !base.is_finite() {
                continue;
            }
            for next in 0..m {
                if mask & (1 << next) != 0 {
                    continue;
                }
                let cell = (mask | (1 << next)) * m + next;
                let candidate = base + graph.w(last + 1, next + 1);
                if candidate < cost[cell] {
                    cost[cell] = candidate;
                    parent[cell] = last as u8;
                }
            }
        }
    }

    let full = masks - 1;
    let mut best: Option<(usize, f64)> = None;
    for last in 0..m {
        let total = cost[full * m + last] + graph.w(last + 1, 0);
        if best.is_none_or(|(_, cur)| total < cur) {
            best = Some((last, total));
        }
    }
    let (mut last, _) = best.ok_or_else(|| Error::other("held-karp table is empty"))?;

    let mut order = Vec::with_capacity(n);
    let mut mask = full;
    loop {
        order.push(last + 1);
        let p = parent[mask * m + last];
        mask ^= 1 << last;
        if p == NO_PARENT {
            break;
        }
        last = usize::from(p);
    }
    order.push(0);
    order.reverse();

    Tour::from_order(graph, order)
}
