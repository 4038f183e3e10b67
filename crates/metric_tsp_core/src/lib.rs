//! Tour construction for the metric travelling salesman problem.
//! Exact Held-Karp for small graphs, Christofides and double-tree approximations
//! for everything else, behind a single `TspEngine::solve` entry point.

pub mod algo;
mod cancel;
mod engine;
mod error;
mod graph;
pub mod io;
pub mod logging;
pub mod observe;
mod tour;

pub use cancel::CancelToken;
pub use engine::{DEFAULT_EXACT_THRESHOLD, EngineConfig, MAX_EXACT_THRESHOLD, Strategy, TspEngine};
pub use error::{Error, ErrorKind, Result};
pub use graph::{GraphModel, MetricViolation, VertexId};
pub use io::options::{LogFormat, LogLevel, RunOptions};
pub use observe::{
    LogObserver, NoopObserver, RecordingObserver, SolveEvent, SolveObserver, Stage,
};
pub use tour::{Tour, TourMetrics};
