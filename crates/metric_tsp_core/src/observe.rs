//! Observability sink handed to every `solve` call.
//!
//! The engine reports progress as `SolveEvent`s to a caller-supplied
//! `SolveObserver` instead of writing to a process-wide logger. `LogObserver`
//! forwards to the `log` facade, `RecordingObserver` keeps the events.

use std::{
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use crate::{CancelToken, Result, engine::Strategy};

/// Pipeline steps reported through `SolveEvent::Stage`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    MetricCheck,
    SpanningTree,
    OddDegree,
    Matching,
    Multigraph,
    EulerianCircuit,
    Shortcut,
    HeldKarp,
}

impl Stage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MetricCheck => "metric_check",
            Self::SpanningTree => "spanning_tree",
            Self::OddDegree => "odd_degree",
            Self::Matching => "matching",
            Self::Multigraph => "multigraph",
            Self::EulerianCircuit => "eulerian_circuit",
            Self::Shortcut => "shortcut",
            Self::HeldKarp => "held_karp",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SolveEvent {
    Started {
        requested: Strategy,
        resolved: Strategy,
        n: usize,
    },
    /// A stage finished; `size` is its output size (edges, vertices, pairs...).
    Stage {
        stage: Stage,
        size: usize,
        elapsed: Duration,
    },
    MetricViolation {
        i: usize,
        j: usize,
        k: usize,
        excess: f64,
    },
    Finished {
        strategy: Strategy,
        weight: f64,
        elapsed: Duration,
    },
    Failed {
        strategy: Strategy,
        error: String,
    },
}

pub trait SolveObserver: Send + Sync {
    fn on_event(&self, event: &SolveEvent);
}

/// Drops every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl SolveObserver for NoopObserver {
    fn on_event(&self, _event: &SolveEvent) {}
}

/// Forwards events to the `log` facade, tagged with a job name.
#[derive(Clone, Debug, Default)]
pub struct LogObserver {
    job: Option<String>,
}

impl LogObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_job(job: impl Into<String>) -> Self {
        Self {
            job: Some(job.into()),
        }
    }

    fn job(&self) -> &str {
        self.job.as_deref().unwrap_or("-")
    }
}

impl SolveObserver for LogObserver {
    fn on_event(&self, event: &SolveEvent) {
        match event {
            SolveEvent::Started {
                requested,
                resolved,
                n,
            } => log::info!(
                "engine.solve: start job={} strategy={requested} resolved={resolved} n={n}",
                self.job()
            ),
            SolveEvent::Stage {
                stage,
                size,
                elapsed,
            } => log::debug!(
                "engine.{stage}: done job={} size={size} secs={:.3}",
                self.job(),
                elapsed.as_secs_f32()
            ),
            SolveEvent::MetricViolation { i, j, k, excess } => log::warn!(
                "engine.metric_check: triangle inequality violated job={} i={i} j={j} k={k} excess={excess:.6}",
                self.job()
            ),
            SolveEvent::Finished {
                strategy,
                weight,
                elapsed,
            } => log::info!(
                "engine.solve: done job={} strategy={strategy} weight={weight:.3} secs={:.3}",
                self.job(),
                elapsed.as_secs_f32()
            ),
            SolveEvent::Failed { strategy, error } => log::warn!(
                "engine.solve: failed job={} strategy={strategy} error={error}",
                self.job()
            ),
        }
    }
}

/// Keeps every event in arrival order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<SolveEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SolveEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stages in the order they completed.
    pub fn stages(&self) -> Vec<Stage> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SolveEvent::Stage { stage, .. } => Some(stage),
                _ => None,
            })
            .collect()
    }
}

impl SolveObserver for RecordingObserver {
    fn on_event(&self, event: &SolveEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

/// Observer and cancel token threaded through one solver pipeline.
#[derive(Clone, Copy)]
pub(crate) struct SolveContext<'a> {
    pub(crate) observer: &'a dyn SolveObserver,
    pub(crate) cancel: &'a CancelToken,
}

impl<'a> SolveContext<'a> {
    pub(crate) fn new(observer: &'a dyn SolveObserver, cancel: &'a CancelToken) -> Self {
        Self { observer, cancel }
    }

    pub(crate) fn emit(&self, event: SolveEvent) {
        self.observer.on_event(&event);
    }

    /// Checks for cancellation, runs `work`, and reports the stage with the
    /// size `size` computes from its output.
    pub(crate) fn stage<T>(
        &self,
        stage: Stage,
        size: impl FnOnce(&T) -> usize,
        work: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        self.cancel.check(stage.as_str())?;
        let started = Instant::now();
        let out = work()?;
        self.emit(SolveEvent::Stage {
            stage,
            size: size(&out),
            elapsed: started.elapsed(),
        });
        Ok(out)
    }
}
