//! Minimum-weight perfect matching on the complete graph induced by a vertex
//! subset, via the primal-dual blossom method.
//!
//! The search keeps a forest of alternating trees rooted at exposed vertices.
//! Vertices and blossoms carry dual variables; only edges with zero slack
//! are eligible for growth. When no tight edge allows progress, the duals
//! move by the largest step that keeps every slack nonnegative, which either
//! tightens a new edge or lets an inner blossom be expanded. Odd cycles found
//! between two outer vertices are contracted into blossoms, kept in an arena
//! indexed by integer id (ids `0..n` are the vertices themselves).
//!
//! Costs are turned into integer profits before the search so that every
//! tightness test is exact; maximising profit with maximum cardinality is
//! the same as minimising cost over perfect matchings.
//!
//! Each cost is rounded to a multiple of `max_cost / 2^40`, off by at most
//! half a step. Over `k / 2` matched pairs the returned matching therefore
//! costs at most `k / 2 * max_cost / 2^40` more than the true minimum, and
//! matchings closer than that may be treated as tied. `Matching::weight`
//! always sums the real costs.

use crate::{Error, GraphModel, Result, VertexId};

/// Resolution used when mapping real costs onto integers.
const COST_RESOLUTION: f64 = (1u64 << 40) as f64;

/// Pairing of vertices. `partner(v)` is symmetric; unmatched vertices have none.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Matching {
    partner: Vec<Option<VertexId>>,
}

impl Matching {
    pub fn empty(n: usize) -> Self {
        Self {
            partner: vec![None; n],
        }
    }

    /// Matching over `0..n` holding `pairs`, which must be vertex-disjoint.
    ///
    /// # Panics
    ///
    /// If a pair names a vertex not below `n`.
    pub fn from_pairs(n: usize, pairs: &[(VertexId, VertexId)]) -> Self {
        let mut matching = Self::empty(n);
        for &(u, v) in pairs {
            matching.partner[u] = Some(v);
            matching.partner[v] = Some(u);
        }
        matching
    }

    pub fn partner(&self, v: VertexId) -> Option<VertexId> {
        self.partner.get(v).copied().flatten()
    }

    /// Matched pairs with the smaller vertex first, ordered by that vertex.
    pub fn pairs(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        self.partner
            .iter()
            .enumerate()
            .filter_map(|(u, p)| p.filter(|&v| u < v).map(|v| (u, v)))
    }

    /// Number of matched pairs.
    pub fn len(&self) -> usize {
        self.pairs().count()
    }

    pub fn is_empty(&self) -> bool {
        self.partner.iter().all(Option::is_none)
    }

    pub fn weight(&self, graph: &GraphModel) -> f64 {
        self.pairs().map(|(u, v)| graph.w(u, v)).sum()
    }

    /// Every vertex of `subset` is matched to another vertex of `subset`.
    pub fn is_perfect_on(&self, subset: &[VertexId]) -> bool {
        let mut inside = vec![false; self.partner.len()];
        for &v in subset {
            if v >= inside.len() {
                return false;
            }
            inside[v] = true;
        }
        let covered = subset
            .iter()
            .all(|&v| self.partner(v).is_some_and(|p| inside[p] && self.partner(p) == Some(v)));
        covered && self.len() * 2 == subset.len()
    }
}

/// Minimum-weight perfect matching on the complete subgraph over `subset`.
pub fn min_weight_perfect_matching(graph: &GraphModel, subset: &[VertexId]) -> Result<Matching> {
    let n = graph.n();
    let k = subset.len();
    if k % 2 == 1 {
        return Err(Error::no_perfect_matching(format!(
            "odd vertex subset of size {k}"
        )));
    }

    let mut seen = vec![false; n];
    for &v in subset {
        if v >= n {
            return Err(Error::invalid_graph(format!("unknown vertex {v} in subset")));
        }
        if std::mem::replace(&mut seen[v], true) {
            return Err(Error::invalid_graph(format!("vertex {v} repeated in subset")));
        }
    }

    if k == 0 {
        return Ok(Matching::empty(n));
    }

    let max_cost = (0..k)
        .flat_map(|a| ((a + 1)..k).map(move |b| (a, b)))
        .map(|(a, b)| graph.w(subset[a], subset[b]))
        .fold(0.0_f64, f64::max);
    let scale = if max_cost > 0.0 {
        COST_RESOLUTION / max_cost
    } else {
        0.0
    };
    let quantize = |c: f64| (c * scale).round() as i64;
    let ceiling = quantize(max_cost);

    let mut edges = Vec::with_capacity(k * (k - 1) / 2);
    for a in 0..k {
        for b in (a + 1)..k {
            edges.push((a, b, ceiling - quantize(graph.w(subset[a], subset[b]))));
        }
    }

    let mate = BlossomSearch::new(k, edges).run()?;

    let mut pairs = Vec::with_capacity(k / 2);
    for (a, m) in mate.iter().enumerate() {
        let Some(b) = *m else {
            return Err(Error::no_perfect_matching(format!(
                "vertex {} left exposed",
                subset[a]
            )));
        };
        if a < b {
            pairs.push((subset[a], subset[b]));
        }
    }

    let matching = Matching::from_pairs(n, &pairs);
    if !matching.is_perfect_on(subset) {
        return Err(Error::no_perfect_matching("matching does not cover the subset"));
    }
    Ok(matching)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Label {
    Free,
    Outer,
    Inner,
    /// Temporary mark left by `scan_blossom` while walking towards the roots.
    Crumb,
}

/// One arena slot. Slots `0..nv` are vertices (trivial blossoms), slots
/// `nv..2nv` are non-trivial blossoms, recycled through `unused`.
#[derive(Clone, Debug)]
struct BlossomNode {
    parent: Option<usize>,
    /// Sub-blossoms around the odd cycle, starting at the base sub-blossom.
    children: Vec<usize>,
    /// `endpoints[i]` joins `children[i]` to `children[i + 1]`.
    endpoints: Vec<usize>,
    base: Option<usize>,
    label: Label,
    /// Endpoint through which the label was assigned.
    label_end: Option<usize>,
    best_edge: Option<usize>,
    /// Least-slack edges to neighbouring outer blossoms, one per neighbour.
    best_edges: Option<Vec<usize>>,
    dual: i64,
}

enum DualStep {
    Finish,
    GrowEdge(usize),
    BlossomEdge(usize),
    Expand(usize),
}

/// Maximum-weight maximum-cardinality matching over a general graph.
///
/// Edge `k` has endpoints `2k` and `2k + 1`; `p ^ 1` is the opposite end.
struct BlossomSearch {
    nv: usize,
    edges: Vec<(usize, usize, i64)>,
    endpoint: Vec<usize>,
    neighbend: Vec<Vec<usize>>,
    mate: Vec<Option<usize>>,
    in_blossom: Vec<usize>,
    nodes: Vec<BlossomNode>,
    unused: Vec<usize>,
    allow_edge: Vec<bool>,
    queue: Vec<usize>,
}

fn invariant<T>(value: Option<T>, what: &'static str) -> Result<T> {
    value.ok_or_else(|| Error::no_perfect_matching(format!("blossom invariant broken: {what}")))
}

/// Cyclic indexing with negative offsets, for walking a blossom both ways.
#[inline]
fn cyclic(list: &[usize], j: isize) -> usize {
    list[j.rem_euclid(list.len() as isize) as usize]
}

impl BlossomSearch {
    fn new(nv: usize, edges: Vec<(usize, usize, i64)>) -> Self {
        let max_weight = edges.iter().map(|e| e.2).max().unwrap_or(0).max(0);

        let mut endpoint = Vec::with_capacity(2 * edges.len());
        let mut neighbend = vec![Vec::new(); nv];
        for (k, &(i, j, _)) in edges.iter().enumerate() {
            endpoint.push(i);
            endpoint.push(j);
            neighbend[i].push(2 * k + 1);
            neighbend[j].push(2 * k);
        }

        let nodes = (0..2 * nv)
            .map(|b| BlossomNode {
                parent: None,
                children: Vec::new(),
                endpoints: Vec::new(),
                base: (b < nv).then_some(b),
                label: Label::Free,
                label_end: None,
                best_edge: None,
                best_edges: None,
                dual: if b < nv { max_weight } else { 0 },
            })
            .collect();

        let edge_count = edges.len();
        Self {
            nv,
            edges,
            endpoint,
            neighbend,
            mate: vec![None; nv],
            in_blossom: (0..nv).collect(),
            nodes,
            unused: (nv..2 * nv).rev().collect(),
            allow_edge: vec![false; edge_count],
            queue: Vec::new(),
        }
    }

    #[inline]
    fn slack(&self, k: usize) -> i64 {
        let (i, j, w) = self.edges[k];
        self.nodes[i].dual + self.nodes[j].dual - 2 * w
    }

    fn leaves(&self, b: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack = vec![b];
        while let Some(t) = stack.pop() {
            if t < self.nv {
                out.push(t);
            } else {
                stack.extend(self.nodes[t].children.iter().copied());
            }
        }
        out
    }

    /// Returns `mate[v]` as a vertex index for every vertex.
    fn run(mut self) -> Result<Vec<Option<usize>>> {
        let nv = self.nv;

        for _ in 0..nv {
            for node in &mut self.nodes {
                node.label = Label::Free;
                node.best_edge = None;
            }
            for b in nv..2 * nv {
                self.nodes[b].best_edges = None;
            }
            self.allow_edge.fill(false);
            self.queue.clear();

            for v in 0..nv {
                if self.mate[v].is_none() && self.nodes[self.in_blossom[v]].label == Label::Free {
                    self.assign_label(v, Label::Outer, None)?;
                }
            }

            let mut augmented = false;
            loop {
                while !augmented {
                    let Some(v) = self.queue.pop() else {
                        break;
                    };
                    augmented = self.scan_vertex(v)?;
                }
                if augmented {
                    break;
                }

                let (delta, step) = self.dual_step();
                self.apply_delta(delta);

                match step {
                    DualStep::Finish => break,
                    DualStep::GrowEdge(k) => {
                        self.allow_edge[k] = true;
                        let (i, j, _) = self.edges[k];
                        let outer = if self.nodes[self.in_blossom[i]].label == Label::Free {
                            j
                        } else {
                            i
                        };
                        self.queue.push(outer);
                    }
                    DualStep::BlossomEdge(k) => {
                        self.allow_edge[k] = true;
                        self.queue.push(self.edges[k].0);
                    }
                    DualStep::Expand(b) => self.expand_blossom(b, false)?,
                }
            }

            if !augmented {
                break;
            }

            for b in nv..2 * nv {
                let node = &self.nodes[b];
                if node.parent.is_none()
                    && node.base.is_some()
                    && node.label == Label::Outer
                    && node.dual == 0
                {
                    self.expand_blossom(b, true)?;
                }
            }
        }

        Ok(self.mate.iter().map(|m| m.map(|p| self.endpoint[p])).collect())
    }

    /// Looks at every edge leaving outer vertex `v`. Returns true on augmentation.
    fn scan_vertex(&mut self, v: usize) -> Result<bool> {
        for idx in 0..self.neighbend[v].len() {
            let p = self.neighbend[v][idx];
            let k = p / 2;
            let w = self.endpoint[p];
            if self.in_blossom[v] == self.in_blossom[w] {
                continue;
            }

            let mut kslack = 0;
            if !self.allow_edge[k] {
                kslack = self.slack(k);
                if kslack <= 0 {
                    self.allow_edge[k] = true;
                }
            }

            let bw = self.in_blossom[w];
            if self.allow_edge[k] {
                match self.nodes[bw].label {
                    Label::Free => self.assign_label(w, Label::Inner, Some(p ^ 1))?,
                    Label::Outer => match self.scan_blossom(v, w)? {
                        Some(base) => self.add_blossom(base, k)?,
                        None => {
                            self.augment_matching(k)?;
                            return Ok(true);
                        }
                    },
                    _ => {
                        // Inner blossom reached through a new tight edge: remember
                        // how its vertex could be reached in case it is expanded.
                        if self.nodes[w].label == Label::Free {
                            self.nodes[w].label = Label::Inner;
                            self.nodes[w].label_end = Some(p ^ 1);
                        }
                    }
                }
            } else if self.nodes[bw].label == Label::Outer {
                let b = self.in_blossom[v];
                if self.nodes[b]
                    .best_edge
                    .is_none_or(|cur| kslack < self.slack(cur))
                {
                    self.nodes[b].best_edge = Some(k);
                }
            } else if self.nodes[w].label == Label::Free
                && self.nodes[w]
                    .best_edge
                    .is_none_or(|cur| kslack < self.slack(cur))
            {
                self.nodes[w].best_edge = Some(k);
            }
        }
        Ok(false)
    }

    fn assign_label(&mut self, w: usize, label: Label, end: Option<usize>) -> Result<()> {
        let b = self.in_blossom[w];
        for t in [w, b] {
            self.nodes[t].label = label;
            self.nodes[t].label_end = end;
            self.nodes[t].best_edge = None;
        }
        match label {
            Label::Outer => {
                let leaves = self.leaves(b);
                self.queue.extend(leaves);
            }
            Label::Inner => {
                let base = invariant(self.nodes[b].base, "labelled blossom without base")?;
                let m = invariant(self.mate[base], "inner blossom base is exposed")?;
                self.assign_label(self.endpoint[m], Label::Outer, Some(m ^ 1))?;
            }
            Label::Free | Label::Crumb => {}
        }
        Ok(())
    }

    /// Walks from `v` and `w` towards their roots. Returns the base of the
    /// new blossom if both paths meet, or `None` for an augmenting path.
    fn scan_blossom(&mut self, v: usize, w: usize) -> Result<Option<usize>> {
        let mut path = Vec::new();
        let mut base = None;
        let mut v = Some(v);
        let mut w = Some(w);

        while let Some(cur) = v {
            let b = self.in_blossom[cur];
            if self.nodes[b].label == Label::Crumb {
                base = self.nodes[b].base;
                break;
            }
            path.push(b);
            self.nodes[b].label = Label::Crumb;

            v = match self.nodes[b].label_end {
                None => None,
                Some(p) => {
                    let bt = self.in_blossom[self.endpoint[p]];
                    let q = invariant(self.nodes[bt].label_end, "inner blossom without label end")?;
                    Some(self.endpoint[q])
                }
            };
            if w.is_some() {
                std::mem::swap(&mut v, &mut w);
            }
        }

        for b in path {
            self.nodes[b].label = Label::Outer;
        }
        Ok(base)
    }

    /// Contracts the odd cycle closed by edge `k` into a new blossom at `base`.
    fn add_blossom(&mut self, base: usize, k: usize) -> Result<()> {
        let (v, w, _) = self.edges[k];
        let bb = self.in_blossom[base];
        let mut bv = self.in_blossom[v];
        let mut bw = self.in_blossom[w];

        let b = invariant(self.unused.pop(), "blossom arena exhausted")?;
        self.nodes[b].base = Some(base);
        self.nodes[b].parent = None;
        self.nodes[bb].parent = Some(b);

        let mut children = Vec::new();
        let mut endpoints = Vec::new();
        while bv != bb {
            self.nodes[bv].parent = Some(b);
            children.push(bv);
            let p = invariant(self.nodes[bv].label_end, "cycle member without label end")?;
            endpoints.push(p);
            bv = self.in_blossom[self.endpoint[p]];
        }
        children.push(bb);
        children.reverse();
        endpoints.reverse();
        endpoints.push(2 * k);
        while bw != bb {
            self.nodes[bw].parent = Some(b);
            children.push(bw);
            let p = invariant(self.nodes[bw].label_end, "cycle member without label end")?;
            endpoints.push(p ^ 1);
            bw = self.in_blossom[self.endpoint[p]];
        }

        self.nodes[b].children = children.clone();
        self.nodes[b].endpoints = endpoints;
        self.nodes[b].label = Label::Outer;
        self.nodes[b].label_end = self.nodes[bb].label_end;
        self.nodes[b].dual = 0;

        for leaf in self.leaves(b) {
            if self.nodes[self.in_blossom[leaf]].label == Label::Inner {
                self.queue.push(leaf);
            }
            self.in_blossom[leaf] = b;
        }

        let mut best_to: Vec<Option<usize>> = vec![None; 2 * self.nv];
        for &sub in &children {
            let candidates: Vec<usize> = match self.nodes[sub].best_edges.take() {
                Some(list) => list,
                None => self
                    .leaves(sub)
                    .into_iter()
                    .flat_map(|leaf| self.neighbend[leaf].iter().map(|&p| p / 2))
                    .collect(),
            };
            for e in candidates {
                let (i, j, _) = self.edges[e];
                let far = if self.in_blossom[j] == b { i } else { j };
                let bj = self.in_blossom[far];
                if bj != b
                    && self.nodes[bj].label == Label::Outer
                    && best_to[bj].is_none_or(|cur| self.slack(e) < self.slack(cur))
                {
                    best_to[bj] = Some(e);
                }
            }
            self.nodes[sub].best_edge = None;
        }

        let best_edges: Vec<usize> = best_to.into_iter().flatten().collect();
        let mut best = None;
        for &e in &best_edges {
            if best.is_none_or(|cur| self.slack(e) < self.slack(cur)) {
                best = Some(e);
            }
        }
        self.nodes[b].best_edges = Some(best_edges);
        self.nodes[b].best_edge = best;
        Ok(())
    }

    /// Dissolves blossom `b`. Mid-stage expansion of an inner blossom relabels
    /// the even-length path from its entry child to its base.
    fn expand_blossom(&mut self, b: usize, end_stage: bool) -> Result<()> {
        let children = self.nodes[b].children.clone();
        for &s in &children {
            self.nodes[s].parent = None;
            if s < self.nv {
                self.in_blossom[s] = s;
            } else if end_stage && self.nodes[s].dual == 0 {
                self.expand_blossom(s, end_stage)?;
            } else {
                for leaf in self.leaves(s) {
                    self.in_blossom[leaf] = s;
                }
            }
        }

        if !end_stage && self.nodes[b].label == Label::Inner {
            let entry_end = invariant(self.nodes[b].label_end, "inner blossom without label end")?;
            let entry_child = self.in_blossom[self.endpoint[entry_end ^ 1]];
            let endpoints = self.nodes[b].endpoints.clone();
            let len = children.len() as isize;

            let mut j = invariant(
                children.iter().position(|&c| c == entry_child),
                "entry child outside blossom",
            )? as isize;
            let (step, trick): (isize, usize) = if j & 1 == 1 {
                j -= len;
                (1, 0)
            } else {
                (-1, 1)
            };

            let mut p = entry_end;
            while j != 0 {
                self.nodes[self.endpoint[p ^ 1]].label = Label::Free;
                let q = cyclic(&endpoints, j - trick as isize);
                self.nodes[self.endpoint[q ^ trick ^ 1]].label = Label::Free;
                self.assign_label(self.endpoint[p ^ 1], Label::Inner, Some(p))?;
                self.allow_edge[q / 2] = true;
                j += step;
                p = cyclic(&endpoints, j - trick as isize) ^ trick;
                self.allow_edge[p / 2] = true;
                j += step;
            }

            let bv = cyclic(&children, j);
            let entry_vertex = self.endpoint[p ^ 1];
            for t in [entry_vertex, bv] {
                self.nodes[t].label = Label::Inner;
                self.nodes[t].label_end = Some(p);
            }
            self.nodes[bv].best_edge = None;

            j += step;
            while cyclic(&children, j) != entry_child {
                let bv = cyclic(&children, j);
                if self.nodes[bv].label == Label::Outer {
                    j += step;
                    continue;
                }
                let labelled = self
                    .leaves(bv)
                    .into_iter()
                    .find(|&leaf| self.nodes[leaf].label != Label::Free);
                if let Some(v) = labelled {
                    self.nodes[v].label = Label::Free;
                    let base = invariant(self.nodes[bv].base, "sub-blossom without base")?;
                    let m = invariant(self.mate[base], "sub-blossom base is exposed")?;
                    self.nodes[self.endpoint[m]].label = Label::Free;
                    let end = self.nodes[v].label_end;
                    self.assign_label(v, Label::Inner, end)?;
                }
                j += step;
            }
        }

        let node = &mut self.nodes[b];
        node.label = Label::Free;
        node.label_end = None;
        node.children.clear();
        node.endpoints.clear();
        node.base = None;
        node.best_edges = None;
        node.best_edge = None;
        self.unused.push(b);
        Ok(())
    }

    /// Flips matched and unmatched edges along the alternating path through
    /// blossom `b` from vertex `v` to the base, then makes `v` the base.
    fn augment_blossom(&mut self, b: usize, v: usize) -> Result<()> {
        let mut t = v;
        while self.nodes[t].parent != Some(b) {
            t = invariant(self.nodes[t].parent, "vertex outside augmented blossom")?;
        }
        if t >= self.nv {
            self.augment_blossom(t, v)?;
        }

        let children = self.nodes[b].children.clone();
        let endpoints = self.nodes[b].endpoints.clone();
        let len = children.len() as isize;
        let i = invariant(
            children.iter().position(|&c| c == t),
            "child missing from blossom",
        )?;

        let mut j = i as isize;
        let (step, trick): (isize, usize) = if i & 1 == 1 {
            j -= len;
            (1, 0)
        } else {
            (-1, 1)
        };

        while j != 0 {
            j += step;
            let t = cyclic(&children, j);
            let p = cyclic(&endpoints, j - trick as isize) ^ trick;
            if t >= self.nv {
                self.augment_blossom(t, self.endpoint[p])?;
            }
            j += step;
            let t = cyclic(&children, j);
            if t >= self.nv {
                self.augment_blossom(t, self.endpoint[p ^ 1])?;
            }
            self.mate[self.endpoint[p]] = Some(p ^ 1);
            self.mate[self.endpoint[p ^ 1]] = Some(p);
        }

        let node = &mut self.nodes[b];
        node.children.rotate_left(i);
        node.endpoints.rotate_left(i);
        let first = node.children[0];
        self.nodes[b].base = self.nodes[first].base;
        Ok(())
    }

    /// Augments along the path through tight edge `k` joining two trees.
    fn augment_matching(&mut self, k: usize) -> Result<()> {
        let (v, w, _) = self.edges[k];
        for (start, start_end) in [(v, 2 * k + 1), (w, 2 * k)] {
            let mut s = start;
            let mut p = start_end;
            loop {
                let bs = self.in_blossom[s];
                if bs >= self.nv {
                    self.augment_blossom(bs, s)?;
                }
                self.mate[s] = Some(p);

                let Some(back) = self.nodes[bs].label_end else {
                    break;
                };
                let bt = self.in_blossom[self.endpoint[back]];
                let bt_end =
                    invariant(self.nodes[bt].label_end, "inner blossom without label end")?;
                s = self.endpoint[bt_end];
                let j = self.endpoint[bt_end ^ 1];
                if bt >= self.nv {
                    self.augment_blossom(bt, j)?;
                }
                self.mate[j] = Some(bt_end);
                p = bt_end ^ 1;
            }
        }
        Ok(())
    }

    /// Smallest dual adjustment that creates a new tight edge or empties an
    /// inner blossom's dual. Falls back to finishing the stage.
    fn dual_step(&self) -> (i64, DualStep) {
        let nv = self.nv;
        let mut best: Option<(i64, DualStep)> = None;
        let mut offer = |d: i64, step: DualStep| {
            if best.as_ref().is_none_or(|(cur, _)| d < *cur) {
                best = Some((d, step));
            }
        };

        for v in 0..nv {
            if self.nodes[self.in_blossom[v]].label == Label::Free
                && let Some(k) = self.nodes[v].best_edge
            {
                offer(self.slack(k), DualStep::GrowEdge(k));
            }
        }

        for b in 0..2 * nv {
            let node = &self.nodes[b];
            if node.parent.is_none()
                && node.label == Label::Outer
                && let Some(k) = node.best_edge
            {
                offer(self.slack(k) / 2, DualStep::BlossomEdge(k));
            }
        }

        for b in nv..2 * nv {
            let node = &self.nodes[b];
            if node.base.is_some() && node.parent.is_none() && node.label == Label::Inner {
                offer(node.dual, DualStep::Expand(b));
            }
        }

        best.unwrap_or_else(|| {
            let min_dual = (0..nv).map(|v| self.nodes[v].dual).min().unwrap_or(0);
            (min_dual.max(0), DualStep::Finish)
        })
    }

    fn apply_delta(&mut self, delta: i64) {
        let nv = self.nv;
        for v in 0..nv {
            match self.nodes[self.in_blossom[v]].label {
                Label::Outer => self.nodes[v].dual -= delta,
                Label::Inner => self.nodes[v].dual += delta,
                Label::Free | Label::Crumb => {}
            }
        }
        for b in nv..2 * nv {
            let node = &mut self.nodes[b];
            if node.base.is_some() && node.parent.is_none() {
                match node.label {
                    Label::Outer => node.dual += delta,
                    Label::Inner => node.dual -= delta,
                    Label::Free | Label::Crumb => {}
                }
            }
        }
    }
}
