//! Parallel ingestion across a fixed list of files.
//!
//! Each file is ingested by its own task on a bounded rayon pool. Tasks return
//! owned results; `par_iter().map().collect()` keeps `results[i]` aligned to
//! `paths[i]`, and the merge below runs single-threaded after the join. The
//! merged series is therefore always in path-list order, whatever the
//! completion order was.

use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use log::{info, warn};
use rayon::prelude::*;
use thiserror::Error;

use crate::domain::{CollectOptions, FileErrorPolicy, IngestOptions, Observation};
use crate::io::ingest::{IngestError, IngestReport, IngestedFile, ingest_file};

#[derive(Debug, Error)]
pub enum CollectError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Failed to build the ingest worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("Failed to start the ingest coordinator thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Ingestion did not finish within {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("An ingest worker terminated before reporting its result")]
    WorkerLost,
}

/// A file that could not be ingested under `FileErrorPolicy::Skip`.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: IngestError,
}

/// Merged output of all files.
#[derive(Debug)]
pub struct Collected {
    /// Observations in path-list order, each file's rows in row order.
    pub observations: Vec<Observation>,
    /// One report per successfully ingested file, in path-list order.
    pub reports: Vec<IngestReport>,
    pub failures: Vec<FileFailure>,
}

type FileResult = Result<IngestedFile, IngestError>;

/// Ingest every path concurrently and concatenate the results in path order.
///
/// An empty merged series is not an error here; the forecaster rejects it.
pub fn collect_observations(
    paths: &[PathBuf],
    ingest: &IngestOptions,
    opts: &CollectOptions,
) -> Result<Collected, CollectError> {
    let results = match opts.timeout {
        None => ingest_all(paths, ingest, opts.max_workers)?,
        Some(limit) => ingest_all_with_deadline(paths.to_vec(), ingest.clone(), opts.max_workers, limit)?,
    };
    merge(paths, results, opts.on_file_error)
}

fn ingest_all(
    paths: &[PathBuf],
    ingest: &IngestOptions,
    max_workers: Option<usize>,
) -> Result<Vec<FileResult>, CollectError> {
    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("ingest-{i}"));
    if let Some(n) = max_workers {
        builder = builder.num_threads(n.max(1));
    }
    let pool = builder.build()?;

    Ok(pool.install(|| paths.par_iter().map(|path| ingest_file(path, ingest)).collect()))
}

/// Run `ingest_all` on a coordinator thread and wait at most `limit`.
///
/// On timeout the coordinator is detached; its result is dropped when it
/// eventually finishes.
fn ingest_all_with_deadline(
    paths: Vec<PathBuf>,
    ingest: IngestOptions,
    max_workers: Option<usize>,
    limit: Duration,
) -> Result<Vec<FileResult>, CollectError> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("ingest-coordinator".to_string())
        .spawn(move || {
            // The receiver is gone after a timeout.
            let _ = tx.send(ingest_all(&paths, &ingest, max_workers));
        })
        .map_err(CollectError::Spawn)?;

    match rx.recv_timeout(limit) {
        Ok(results) => results,
        Err(RecvTimeoutError::Timeout) => {
            warn!("ingestion exceeded the {}s deadline; abandoning running tasks", limit.as_secs_f64());
            Err(CollectError::Timeout(limit))
        }
        Err(RecvTimeoutError::Disconnected) => Err(CollectError::WorkerLost),
    }
}

fn merge(paths: &[PathBuf], results: Vec<FileResult>, policy: FileErrorPolicy) -> Result<Collected, CollectError> {
    let mut observations = Vec::new();
    let mut reports = Vec::with_capacity(results.len());
    let mut failures = Vec::new();

    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(file) => {
                observations.extend(file.observations);
                reports.push(file.report);
            }
            Err(error) => match policy {
                FileErrorPolicy::Abort => return Err(error.into()),
                FileErrorPolicy::Skip => {
                    warn!("skipping '{}': {error}", path.display());
                    failures.push(FileFailure {
                        path: path.clone(),
                        error,
                    });
                }
            },
        }
    }

    info!(
        "collected {} observation(s) from {} file(s), {} skipped",
        observations.len(),
        reports.len(),
        failures.len()
    );

    Ok(Collected {
        observations,
        reports,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use chrono::NaiveDate;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    fn ingest_opts() -> IngestOptions {
        IngestOptions {
            date_column: "Data".to_string(),
            temperature_column: "Temp".to_string(),
            ..IngestOptions::default()
        }
    }

    /// Named pipe: opening it for reading blocks until a writer shows up.
    #[cfg(unix)]
    fn fifo(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let status = std::process::Command::new("mkfifo").arg(&path).status().unwrap();
        assert!(status.success(), "mkfifo failed for {}", path.display());
        path
    }

    #[cfg(unix)]
    fn feed(path: &Path, body: &str) {
        use std::io::Write;
        let mut pipe = std::fs::OpenOptions::new().write(true).open(path).unwrap();
        pipe.write_all(body.as_bytes()).unwrap();
    }

    #[test]
    fn results_are_concatenated_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.csv", "Data;Temp\n2020-01-01;1,0\n2020-01-02;2,0\n2020-01-03;3,0\n");
        let b = write(dir.path(), "b.csv", "Data;Temp\n2021-06-01;10,0\n2021-06-02;11,0\n");

        let out = collect_observations(&[a.clone(), b.clone()], &ingest_opts(), &CollectOptions::default()).unwrap();

        let temps: Vec<f64> = out.observations.iter().map(|o| o.temperature()).collect();
        assert_eq!(temps, vec![1.0, 2.0, 3.0, 10.0, 11.0]);
        assert_eq!(out.reports[0].path, a);
        assert_eq!(out.reports[1].path, b);
        assert!(out.failures.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn later_file_finishing_first_does_not_reorder_results() {
        let dir = tempfile::tempdir().unwrap();
        let a = fifo(dir.path(), "a.csv");
        let b = fifo(dir.path(), "b.csv");

        // B's contents are delivered and closed before A is even opened for
        // writing, so A's task cannot finish before B's read has completed.
        let (a_w, b_w) = (a.clone(), b.clone());
        let writer = thread::spawn(move || {
            feed(&b_w, "Data;Temp\n2021-06-01;10,0\n2021-06-02;11,0\n");
            thread::sleep(Duration::from_millis(100));
            feed(&a_w, "Data;Temp\n2020-01-01;1,0\n2020-01-02;2,0\n2020-01-03;3,0\n");
        });

        let opts = CollectOptions {
            max_workers: Some(2),
            timeout: Some(Duration::from_secs(30)),
            ..CollectOptions::default()
        };
        let out = collect_observations(&[a.clone(), b.clone()], &ingest_opts(), &opts).unwrap();
        writer.join().unwrap();

        let temps: Vec<f64> = out.observations.iter().map(|o| o.temperature()).collect();
        assert_eq!(temps, vec![1.0, 2.0, 3.0, 10.0, 11.0]);
        assert_eq!(out.reports[0].path, a);
        assert_eq!(out.reports[1].path, b);
    }

    #[test]
    fn abort_policy_returns_first_failing_file_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(dir.path(), "good.csv", "Data;Temp\n2021-06-01;10,0\n");
        let missing = dir.path().join("missing.csv");
        let bad_schema = write(dir.path(), "bad.csv", "Data;Umidade\n2021-06-01;80\n");

        let err = collect_observations(
            &[good, missing, bad_schema],
            &ingest_opts(),
            &CollectOptions::default(),
        )
        .unwrap_err();

        match err {
            CollectError::Ingest(IngestError::Io { path, .. }) => assert!(path.ends_with("missing.csv")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn skip_policy_reports_gaps_and_keeps_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.csv");
        let good = write(dir.path(), "good.csv", "Data;Temp\n2021-06-01;10,0\n");

        let opts = CollectOptions {
            on_file_error: FileErrorPolicy::Skip,
            ..CollectOptions::default()
        };
        let out = collect_observations(&[missing.clone(), good], &ingest_opts(), &opts).unwrap();

        assert_eq!(out.observations.len(), 1);
        assert_eq!(
            out.observations[0].date(),
            NaiveDate::from_ymd_opt(2021, 6, 1).unwrap()
        );
        assert_eq!(out.failures.len(), 1);
        assert_eq!(out.failures[0].path, missing);
        assert!(matches!(out.failures[0].error, IngestError::Io { .. }));
    }

    #[test]
    fn empty_files_yield_an_empty_series() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.csv", "Data;Temp\n");
        let b = write(dir.path(), "b.csv", "Data;Temp\n;\n");

        let out = collect_observations(&[a, b], &ingest_opts(), &CollectOptions::default()).unwrap();
        assert!(out.observations.is_empty());
        assert_eq!(out.reports[1].rows_missing, 1);
    }

    #[test]
    fn completes_within_a_generous_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.csv", "Data;Temp\n2021-06-01;10,0\n");

        let opts = CollectOptions {
            max_workers: Some(1),
            timeout: Some(Duration::from_secs(30)),
            ..CollectOptions::default()
        };
        let out = collect_observations(&[a], &ingest_opts(), &opts).unwrap();
        assert_eq!(out.observations.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn blocked_ingestion_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let stuck = fifo(dir.path(), "stuck.csv");

        let opts = CollectOptions {
            max_workers: Some(1),
            timeout: Some(Duration::from_millis(200)),
            ..CollectOptions::default()
        };
        let err = collect_observations(&[stuck.clone()], &ingest_opts(), &opts).unwrap_err();
        assert!(matches!(err, CollectError::Timeout(limit) if limit == Duration::from_millis(200)));

        let app_err: crate::error::AppError = err.into();
        assert_eq!(app_err.exit_code(), 4);

        // Release the abandoned reader.
        feed(&stuck, "");
    }
}
