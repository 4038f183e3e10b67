use std::time::Instant;

use metric_tsp_derive::{CliValue, KvDisplay};

use crate::{
    CancelToken, Error, GraphModel, Result, Tour,
    algo::{christofides, double_tree, held_karp},
    graph::MetricViolation,
    observe::{SolveContext, SolveEvent, SolveObserver, Stage},
};

pub const DEFAULT_EXACT_THRESHOLD: usize = 24;
pub const MAX_EXACT_THRESHOLD: usize = held_karp::MAX_EXACT_VERTICES;

/// Relative slack allowed before a triangle counts as a metric violation.
const METRIC_TOLERANCE: f64 = 1e-9;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, CliValue)]
#[cli_value(option = "strategy")]
pub enum Strategy {
    /// Held-Karp dynamic program, optimal.
    #[cli(alias = "held-karp")]
    Exact,
    /// Tree plus odd-degree matching, within 1.5x of optimal.
    Christofides,
    /// Doubled tree, within 2x of optimal.
    #[cli(alias = "double", alias = "2approx")]
    DoubleTree,
    /// Exact below the threshold, Christofides otherwise.
    #[default]
    Auto,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, KvDisplay)]
pub struct EngineConfig {
    /// Largest vertex count the exact solver accepts.
    pub exact_threshold: usize,
    /// Scan every triangle before dispatch.
    pub verify_metric: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            exact_threshold: DEFAULT_EXACT_THRESHOLD,
            verify_metric: false,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.exact_threshold == 0 || self.exact_threshold > MAX_EXACT_THRESHOLD {
            return Err(Error::invalid_input(format!(
                "exact threshold must be in 1..={MAX_EXACT_THRESHOLD}, got {}",
                self.exact_threshold
            )));
        }
        Ok(())
    }
}

/// Entry point: validates the graph, picks a solver and reports to an observer.
///
/// Holds no per-call state, so one engine can serve many threads at once.
#[derive(Clone, Debug, Default)]
pub struct TspEngine {
    config: EngineConfig,
}

impl TspEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Concrete strategy used for a graph of `n` vertices. Never `Auto`.
    pub fn resolve(&self, strategy: Strategy, n: usize) -> Strategy {
        match strategy {
            Strategy::Auto if n < self.config.exact_threshold => Strategy::Exact,
            Strategy::Auto => Strategy::Christofides,
            other => other,
        }
    }

    pub fn solve(
        &self,
        graph: &GraphModel,
        strategy: Strategy,
        observer: &dyn SolveObserver,
    ) -> Result<Tour> {
        self.solve_with_cancel(graph, strategy, observer, &CancelToken::new())
    }

    /// Like `solve`, failing with `Cancelled` once `cancel` is tripped.
    pub fn solve_with_cancel(
        &self,
        graph: &GraphModel,
        strategy: Strategy,
        observer: &dyn SolveObserver,
        cancel: &CancelToken,
    ) -> Result<Tour> {
        let started = Instant::now();
        let resolved = self.resolve(strategy, graph.n());
        let ctx = SolveContext::new(observer, cancel);
        ctx.emit(SolveEvent::Started {
            requested: strategy,
            resolved,
            n: graph.n(),
        });

        let result = self.dispatch(graph, resolved, &ctx);
        match &result {
            Ok(tour) => ctx.emit(SolveEvent::Finished {
                strategy: resolved,
                weight: tour.weight,
                elapsed: started.elapsed(),
            }),
            Err(err) => ctx.emit(SolveEvent::Failed {
                strategy: resolved,
                error: err.to_string(),
            }),
        }
        result
    }

    fn dispatch(
        &self,
        graph: &GraphModel,
        resolved: Strategy,
        ctx: &SolveContext<'_>,
    ) -> Result<Tour> {
        graph.validate()?;
        if self.config.verify_metric {
            self.check_metric(graph, resolved, ctx)?;
        }

        match resolved {
            Strategy::Exact => held_karp::solve(graph, self.config.exact_threshold, ctx),
            Strategy::DoubleTree => double_tree::solve(graph, ctx),
            Strategy::Christofides | Strategy::Auto => christofides::solve(graph, ctx),
        }
    }

    /// A violation only voids the approximation bounds, so the exact solver
    /// gets a warning event and the approximations get `InvalidGraph`.
    fn check_metric(
        &self,
        graph: &GraphModel,
        resolved: Strategy,
        ctx: &SolveContext<'_>,
    ) -> Result<()> {
        let violation = ctx.stage(
            Stage::MetricCheck,
            |v: &Option<MetricViolation>| usize::from(v.is_some()),
            || Ok(graph.find_metric_violation(METRIC_TOLERANCE)),
        )?;
        let Some(MetricViolation { i, j, k, excess }) = violation else {
            return Ok(());
        };

        ctx.emit(SolveEvent::MetricViolation { i, j, k, excess });
        if resolved == Strategy::Exact {
            return Ok(());
        }
        Err(Error::invalid_graph(format!(
            "triangle inequality violated: w({a},{c}) exceeds w({a},{b})+w({b},{c}) by {excess:.6}",
            a = graph.label(i)?,
            b = graph.label(j)?,
            c = graph.label(k)?,
        )))
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};
    use rayon::prelude::*;

    use super::{EngineConfig, Strategy, TspEngine};
    use crate::{
        CancelToken, ErrorKind, GraphModel,
        observe::{NoopObserver, RecordingObserver, SolveEvent, Stage},
    };

    const ALL: [Strategy; 4] = [
        Strategy::Exact,
        Strategy::Christofides,
        Strategy::DoubleTree,
        Strategy::Auto,
    ];

    fn triangle() -> GraphModel {
        GraphModel::from_matrix(
            vec!["A", "B", "C"],
            vec![
                vec![0.0, 1.0, 3.0],
                vec![1.0, 0.0, 2.0],
                vec![3.0, 2.0, 0.0],
            ],
        )
        .expect("triangle")
    }

    fn unit_square() -> GraphModel {
        GraphModel::from_points(
            vec!["A", "B", "C", "D"],
            &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)],
        )
        .expect("square")
    }

    fn random_euclidean(rng: &mut StdRng, n: usize) -> GraphModel {
        let points: Vec<(f64, f64)> = (0..n)
            .map(|_| (rng.random_range(0.0..1000.0), rng.random_range(0.0..1000.0)))
            .collect();
        let labels: Vec<String> = (0..n).map(|i| format!("c{i}")).collect();
        GraphModel::from_points(labels, &points).expect("euclidean graph")
    }

    #[test]
    fn triangle_has_one_tour_for_every_strategy() {
        let engine = TspEngine::default();
        let g = triangle();
        for strategy in ALL {
            let tour = engine.solve(&g, strategy, &NoopObserver).expect("tour");
            assert!(tour.is_permutation_of(3), "{strategy}");
            assert!((tour.weight - 6.0).abs() < 1e-12, "{strategy}");
        }
    }

    #[test]
    fn unit_square_bounds() {
        let engine = TspEngine::default();
        let g = unit_square();
        let exact = engine.solve(&g, Strategy::Exact, &NoopObserver).expect("exact");
        assert!((exact.weight - 4.0).abs() < 1e-9);

        let christofides = engine
            .solve(&g, Strategy::Christofides, &NoopObserver)
            .expect("christofides");
        assert!(christofides.weight >= 4.0 - 1e-9 && christofides.weight <= 6.0 + 1e-9);

        let double = engine
            .solve(&g, Strategy::DoubleTree, &NoopObserver)
            .expect("double tree");
        assert!(double.weight >= 4.0 - 1e-9 && double.weight <= 8.0 + 1e-9);
    }

    #[test]
    fn oversized_exact_is_rejected_but_christofides_succeeds() {
        let mut rng = StdRng::seed_from_u64(30);
        let g = random_euclidean(&mut rng, 30);
        let engine = TspEngine::default();

        let rec = RecordingObserver::new();
        let err = engine.solve(&g, Strategy::Exact, &rec).expect_err("too large");
        assert_eq!(err.kind(), ErrorKind::InstanceTooLarge);
        assert!(err.is_recoverable());
        assert!(matches!(rec.events().last(), Some(SolveEvent::Failed { .. })));

        let tour = engine
            .solve(&g, Strategy::Christofides, &NoopObserver)
            .expect("christofides");
        assert!(tour.is_permutation_of(30));
    }

    #[test]
    fn single_vertex_is_trivial_and_runs_no_stage() {
        let g = GraphModel::from_matrix(vec!["solo"], vec![vec![0.0]]).expect("n=1");
        let engine = TspEngine::default();
        for strategy in ALL {
            let rec = RecordingObserver::new();
            let tour = engine.solve(&g, strategy, &rec).expect("tour");
            assert_eq!(tour.vertices, vec![0]);
            assert_eq!(tour.weight, 0.0);
            assert!(rec.stages().is_empty(), "{strategy}");
        }
    }

    #[test]
    fn approximations_stay_within_bounds_of_the_optimum() {
        let engine = TspEngine::default();
        let mut rng = StdRng::seed_from_u64(2024);
        for trial in 0..40 {
            let n = rng.random_range(3..=10);
            let g = random_euclidean(&mut rng, n);
            let opt = engine.solve(&g, Strategy::Exact, &NoopObserver).expect("exact");
            let c = engine
                .solve(&g, Strategy::Christofides, &NoopObserver)
                .expect("christofides");
            let d = engine
                .solve(&g, Strategy::DoubleTree, &NoopObserver)
                .expect("double tree");

            for tour in [&opt, &c, &d] {
                assert!(tour.is_permutation_of(n), "trial {trial}");
                assert!(tour.weight >= opt.weight - 1e-6, "trial {trial}");
            }
            assert!(c.weight <= 1.5 * opt.weight + 1e-6, "trial {trial}");
            assert!(d.weight <= 2.0 * opt.weight + 1e-6, "trial {trial}");
        }
    }

    #[test]
    fn repeated_solves_give_identical_weight() {
        let engine = TspEngine::default();
        let mut rng = StdRng::seed_from_u64(99);
        let g = random_euclidean(&mut rng, 40);
        for strategy in [Strategy::Christofides, Strategy::DoubleTree] {
            let first = engine.solve(&g, strategy, &NoopObserver).expect("first");
            let second = engine.solve(&g, strategy, &NoopObserver).expect("second");
            assert_eq!(first.weight, second.weight);
        }
    }

    #[test]
    fn auto_switches_at_the_threshold() {
        let engine = TspEngine::new(EngineConfig {
            exact_threshold: 8,
            verify_metric: false,
        })
        .expect("engine");
        assert_eq!(engine.resolve(Strategy::Auto, 7), Strategy::Exact);
        assert_eq!(engine.resolve(Strategy::Auto, 8), Strategy::Christofides);
        assert_eq!(engine.resolve(Strategy::DoubleTree, 3), Strategy::DoubleTree);

        let mut rng = StdRng::seed_from_u64(8);
        let rec = RecordingObserver::new();
        engine
            .solve(&random_euclidean(&mut rng, 12), Strategy::Auto, &rec)
            .expect("auto");
        assert!(rec.stages().contains(&Stage::Matching));
        assert!(matches!(
            rec.events().first(),
            Some(SolveEvent::Started {
                requested: Strategy::Auto,
                resolved: Strategy::Christofides,
                n: 12
            })
        ));
    }

    #[test]
    fn metric_check_rejects_approximations_only() {
        let g = GraphModel::from_matrix(
            vec!["A", "B", "C", "D"],
            vec![
                vec![0.0, 1.0, 10.0, 1.0],
                vec![1.0, 0.0, 1.0, 1.0],
                vec![10.0, 1.0, 0.0, 1.0],
                vec![1.0, 1.0, 1.0, 0.0],
            ],
        )
        .expect("non-metric");
        let engine = TspEngine::new(EngineConfig {
            verify_metric: true,
            ..EngineConfig::default()
        })
        .expect("engine");

        let err = engine
            .solve(&g, Strategy::Christofides, &NoopObserver)
            .expect_err("violation");
        assert_eq!(err.kind(), ErrorKind::InvalidGraph);

        let rec = RecordingObserver::new();
        let tour = engine.solve(&g, Strategy::Exact, &rec).expect("exact ignores metric");
        assert!(tour.is_permutation_of(4));
        assert!(
            rec.events()
                .iter()
                .any(|e| matches!(e, SolveEvent::MetricViolation { .. }))
        );
        assert_eq!(rec.stages().first(), Some(&Stage::MetricCheck));
    }

    #[test]
    fn config_rejects_out_of_range_thresholds() {
        for exact_threshold in [0, 33, 100] {
            let config = EngineConfig {
                exact_threshold,
                ..EngineConfig::default()
            };
            let err = TspEngine::new(config).expect_err("bad threshold");
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        }
        assert!(TspEngine::new(EngineConfig::default()).is_ok());
        assert_eq!(
            EngineConfig::default().to_string(),
            "exact_threshold=24 verify_metric=false"
        );
    }

    #[test]
    fn cancelled_token_fails_without_a_tour() {
        let engine = TspEngine::default();
        let mut rng = StdRng::seed_from_u64(1);
        let g = random_euclidean(&mut rng, 20);
        let cancel = CancelToken::new();
        cancel.cancel();
        for strategy in [Strategy::Exact, Strategy::Christofides, Strategy::DoubleTree] {
            let err = engine
                .solve_with_cancel(&g, strategy, &NoopObserver, &cancel)
                .expect_err("cancelled");
            assert_eq!(err.kind(), ErrorKind::Cancelled);
        }
    }

    #[test]
    fn independent_graphs_solve_concurrently() {
        let engine = TspEngine::default();
        let graphs: Vec<GraphModel> = (0..32)
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                // Even seeds stay small enough for the exact solver.
                let n = if seed % 2 == 0 { 5 + seed as usize % 8 } else { 30 + seed as usize };
                random_euclidean(&mut rng, n)
            })
            .collect();
        let rec = RecordingObserver::new();

        let weights: Vec<f64> = graphs
            .par_iter()
            .map(|g| engine.solve(g, Strategy::Auto, &rec).expect("parallel solve").weight)
            .collect();
        let sequential: Vec<f64> = graphs
            .iter()
            .map(|g| engine.solve(g, Strategy::Auto, &NoopObserver).expect("solve").weight)
            .collect();

        assert_eq!(weights, sequential);
        let finished = rec
            .events()
            .iter()
            .filter(|e| matches!(e, SolveEvent::Finished { .. }))
            .count();
        assert_eq!(finished, graphs.len());
    }

    #[test]
    fn strategy_parses_canonical_names_and_aliases() {
        assert_eq!(Strategy::parse("exact").expect("exact"), Strategy::Exact);
        assert_eq!(Strategy::parse("Held-Karp").expect("alias"), Strategy::Exact);
        assert_eq!(Strategy::parse("double").expect("alias"), Strategy::DoubleTree);
        assert_eq!(Strategy::parse("2approx").expect("alias"), Strategy::DoubleTree);
        assert_eq!(" auto ".parse::<Strategy>().expect("trim"), Strategy::Auto);
        assert_eq!(Strategy::DoubleTree.to_string(), "double-tree");
        let err = Strategy::parse("greedy").expect_err("unknown");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
