use std::{
    fmt,
    time::{Duration, Instant},
};

use log::{error, info, warn};
use metric_tsp_core::{
    CancelToken, LogObserver, Result, RunOptions, TspEngine,
    io::{
        input::{read_graph, read_manifest},
        output::write_tour,
    },
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub jobs: usize,
    pub ok: usize,
    /// Exact strategy refused the graph; no output written.
    pub too_large: usize,
    pub failed: usize,
    /// Not started because the run was cancelled.
    pub skipped: usize,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "jobs={} ok={} too_large={} failed={} skipped={} secs={:.2}",
            self.jobs,
            self.ok,
            self.too_large,
            self.failed,
            self.skipped,
            self.elapsed.as_secs_f32()
        )
    }
}

#[derive(Debug, PartialEq)]
enum JobOutcome {
    Written { n: usize, weight: f64 },
    TooLarge,
}

/// Solves every job named in the manifest, one after another.
///
/// A failing job is logged and counted; the remaining jobs still run. Only a
/// missing or malformed manifest fails the whole batch.
pub fn run_batch(
    options: &RunOptions,
    engine: &TspEngine,
    cancel: &CancelToken,
) -> Result<BatchSummary> {
    let started = Instant::now();
    let manifest = options.manifest_path();
    let jobs = read_manifest(&manifest)?;
    info!(
        "batch: start manifest={} jobs={} strategy={}",
        manifest.display(),
        jobs.len(),
        options.strategy
    );

    let mut summary = BatchSummary {
        jobs: jobs.len(),
        ..BatchSummary::default()
    };

    for (idx, job) in jobs.iter().enumerate() {
        if cancel.is_cancelled() {
            summary.skipped = jobs.len() - idx;
            warn!("batch: cancelled skipped={}", summary.skipped);
            break;
        }

        match run_job(options, engine, cancel, job) {
            Ok(JobOutcome::Written { n, weight }) => {
                summary.ok += 1;
                info!("batch.job: done job={job} n={n} weight={weight:.3}");
            }
            Ok(JobOutcome::TooLarge) => summary.too_large += 1,
            Err(err) => {
                summary.failed += 1;
                error!("batch.job: failed job={job} kind={:?} error={err}", err.kind());
            }
        }
    }

    summary.elapsed = started.elapsed();
    info!("batch: done {summary}");
    Ok(summary)
}

fn run_job(
    options: &RunOptions,
    engine: &TspEngine,
    cancel: &CancelToken,
    job: &str,
) -> Result<JobOutcome> {
    let graph = read_graph(&options.job_input_path(job))?;
    let observer = LogObserver::for_job(job);

    match engine.solve_with_cancel(&graph, options.strategy, &observer, cancel) {
        Ok(tour) => {
            write_tour(&options.job_output_path(job), &graph, &tour)?;
            Ok(JobOutcome::Written {
                n: tour.len(),
                weight: tour.weight,
            })
        }
        Err(err) if err.is_recoverable() => {
            warn!("batch.job: too many vertices job={job} error={err}");
            Ok(JobOutcome::TooLarge)
        }
        Err(err) => Err(err),
    }
}
