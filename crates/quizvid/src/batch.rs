//! Rendering many quiz files with a bounded pool of worker threads.

use crate::config::AppConfig;
use crate::error::{QuizError, QuizResult};
use crate::loader::QuizFormat;
use serde::Serialize;
use std::path::{Path, PathBuf};
use rayon::prelude::*;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Outcome of one job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Job produced its output
    Completed,
    /// Every attempt failed
    Failed,
}

/// Result for one input file
#[derive(Debug, Clone, Serialize)]
pub struct JobResult {
    /// Quiz file
    pub input: PathBuf,
    /// Rendered output, when completed
    pub output: Option<PathBuf>,
    /// Final status
    pub status: JobStatus,
    /// Attempts made (1 when the first attempt succeeded)
    pub attempts: u32,
    /// Last error, when failed
    pub error: Option<String>,
    /// Time spent including retries
    pub elapsed: Duration,
}

/// Results of a batch run, in input order
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Per-input results
    pub results: Vec<JobResult>,
    /// Wall-clock time
    pub elapsed: Duration,
}

impl BatchReport {
    /// Number of jobs
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Jobs that completed
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == JobStatus::Completed)
            .count()
    }

    /// Jobs that failed
    #[must_use]
    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// Whether every job completed
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Worker pool settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProcessor {
    /// Upper bound on concurrent jobs
    pub max_workers: usize,
    /// Retry retryable failures
    pub retry_failed: bool,
    /// Extra attempts per job
    pub max_retries: u32,
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self {
            max_workers: 4,
            retry_failed: true,
            max_retries: 2,
        }
    }
}

impl From<&AppConfig> for BatchProcessor {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_workers: config.max_workers,
            retry_failed: config.retry_failed,
            max_retries: config.max_retries,
        }
    }
}

/// List quiz files in `dir`, sorted.
///
/// Without a pattern every file with a supported quiz extension matches.
pub fn discover(dir: &Path, pattern: Option<&str>) -> QuizResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(QuizError::Batch {
            message: format!("input directory not found: {}", dir.display()),
        });
    }

    let base = glob::Pattern::escape(&dir.to_string_lossy());
    let patterns: Vec<String> = match pattern {
        Some(p) => vec![format!("{base}/{p}")],
        None => QuizFormat::EXTENSIONS
            .iter()
            .map(|ext| format!("{base}/*.{ext}"))
            .collect(),
    };

    let options = glob::MatchOptions {
        case_sensitive: false,
        ..glob::MatchOptions::new()
    };
    let mut files = Vec::new();
    for pattern in &patterns {
        let entries = glob::glob_with(pattern, options).map_err(|e| QuizError::Batch {
            message: format!("invalid pattern '{pattern}': {e}"),
        })?;
        files.extend(entries.filter_map(Result::ok).filter(|p| p.is_file()));
    }
    files.sort();
    files.dedup();
    debug!(dir = %dir.display(), count = files.len(), "discovered quiz files");
    Ok(files)
}

impl BatchProcessor {
    /// Attempts allowed per job
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        if self.retry_failed {
            self.max_retries + 1
        } else {
            1
        }
    }

    fn run_job<F>(&self, input: &Path, work: &F) -> JobResult
    where
        F: Fn(&Path) -> QuizResult<PathBuf>,
    {
        let started = Instant::now();
        let mut attempts = 0;
        loop {
            attempts += 1;
            match work(input) {
                Ok(output) => {
                    return JobResult {
                        input: input.to_path_buf(),
                        output: Some(output),
                        status: JobStatus::Completed,
                        attempts,
                        error: None,
                        elapsed: started.elapsed(),
                    };
                }
                Err(e) if e.is_retryable() && attempts < self.max_attempts() => {
                    warn!(input = %input.display(), attempt = attempts, error = %e, "retrying");
                }
                Err(e) => {
                    warn!(input = %input.display(), error = %e, "job failed");
                    return JobResult {
                        input: input.to_path_buf(),
                        output: None,
                        status: JobStatus::Failed,
                        attempts,
                        error: Some(e.to_string()),
                        elapsed: started.elapsed(),
                    };
                }
            }
        }
    }

    /// Run `work` on every input.
    ///
    /// Jobs run on a dedicated pool of at most `max_workers` threads.
    /// `on_done` fires once per finished job, from the worker thread.
    pub fn run<F, P>(&self, inputs: &[PathBuf], work: F, on_done: P) -> QuizResult<BatchReport>
    where
        F: Fn(&Path) -> QuizResult<PathBuf> + Sync,
        P: Fn(&JobResult) + Sync,
    {
        let started = Instant::now();
        let workers = self.max_workers.clamp(1, inputs.len().max(1));
        info!(jobs = inputs.len(), workers, "starting batch");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("quizvid-batch-{i}"))
            .build()
            .map_err(|e| QuizError::Batch {
                message: format!("cannot start worker pool: {e}"),
            })?;

        let results: Vec<JobResult> = pool.install(|| {
            inputs
                .par_iter()
                .map(|input| {
                    let result = self.run_job(input, &work);
                    on_done(&result);
                    result
                })
                .collect()
        });

        let report = BatchReport {
            results,
            elapsed: started.elapsed(),
        };
        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "batch finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn inputs(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("quiz_{i:02}.json"))).collect()
    }

    #[test]
    fn test_results_in_input_order() {
        let processor = BatchProcessor {
            max_workers: 3,
            ..BatchProcessor::default()
        };
        let files = inputs(10);
        let report = processor.run(
            &files,
            |p| Ok(p.with_extension("mp4")),
            |_| {},
        )
        .unwrap();
        assert_eq!(report.total(), 10);
        assert!(report.is_success());
        for (result, input) in report.results.iter().zip(&files) {
            assert_eq!(&result.input, input);
            assert_eq!(result.output, Some(input.with_extension("mp4")));
            assert_eq!(result.attempts, 1);
        }
    }

    #[test]
    fn test_order_kept_when_jobs_finish_out_of_order() {
        let processor = BatchProcessor {
            max_workers: 4,
            ..BatchProcessor::default()
        };
        let files = inputs(8);
        let finished = Mutex::new(Vec::new());
        let report = processor
            .run(
                &files,
                |p| {
                    let index = files.iter().position(|f| f == p).unwrap();
                    std::thread::sleep(Duration::from_millis(5 * (8 - index as u64)));
                    Ok(p.to_path_buf())
                },
                |r| finished.lock().unwrap().push(r.input.clone()),
            )
            .unwrap();
        assert_eq!(finished.lock().unwrap().len(), 8);
        let order: Vec<&PathBuf> = report.results.iter().map(|r| &r.input).collect();
        assert_eq!(order, files.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_never_exceeds_max_workers() {
        let processor = BatchProcessor {
            max_workers: 2,
            ..BatchProcessor::default()
        };
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        processor.run(
            &inputs(8),
            |p| {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(10));
                active.fetch_sub(1, Ordering::SeqCst);
                Ok(p.to_path_buf())
            },
            |_| {},
        )
        .unwrap();
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_retryable_failures_retried() {
        let processor = BatchProcessor {
            max_workers: 1,
            retry_failed: true,
            max_retries: 2,
        };
        let calls = Mutex::new(HashMap::<PathBuf, u32>::new());
        let report = processor.run(
            &inputs(2),
            |p| {
                let mut calls = calls.lock().unwrap();
                let n = calls.entry(p.to_path_buf()).or_insert(0);
                *n += 1;
                if *n < 3 {
                    Err(QuizError::ffmpeg("transient"))
                } else {
                    Ok(p.to_path_buf())
                }
            },
            |_| {},
        )
        .unwrap();
        assert!(report.is_success());
        assert!(report.results.iter().all(|r| r.attempts == 3));
    }

    #[test]
    fn test_validation_errors_not_retried() {
        let processor = BatchProcessor::default();
        let calls = AtomicU32::new(0);
        let report = processor.run(
            &inputs(1),
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(QuizError::Validation {
                    issues: vec!["Question 1: Missing question text".to_string()],
                })
            },
            |_| {},
        )
        .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.results[0].attempts, 1);
        assert!(report.results[0].error.as_ref().unwrap().contains("Missing question text"));
    }

    #[test]
    fn test_retry_disabled() {
        let processor = BatchProcessor {
            retry_failed: false,
            ..BatchProcessor::default()
        };
        assert_eq!(processor.max_attempts(), 1);
        let report = processor.run(&inputs(1), |_| Err(QuizError::ffmpeg("boom")), |_| {})
            .unwrap();
        assert_eq!(report.results[0].attempts, 1);
        assert_eq!(report.results[0].status, JobStatus::Failed);
    }

    #[test]
    fn test_on_done_called_per_job() {
        let processor = BatchProcessor::default();
        let done = AtomicUsize::new(0);
        processor
            .run(&inputs(5), |p| Ok(p.to_path_buf()), |_| {
                done.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        assert_eq!(done.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_empty_batch() {
        let report = BatchProcessor::default()
            .run(&[], |p| Ok(p.to_path_buf()), |_| {})
            .unwrap();
        assert_eq!(report.total(), 0);
        assert!(report.is_success());
    }

    #[test]
    fn test_discover_default_and_pattern() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.json", "a.csv", "c.xml", "notes.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        let names = |files: Vec<PathBuf>| -> Vec<String> {
            files
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
                .collect()
        };

        let all = discover(dir.path(), None).unwrap();
        assert_eq!(names(all), vec!["a.csv", "b.json", "c.xml"]);

        let json = discover(dir.path(), Some("*.json")).unwrap();
        assert_eq!(names(json), vec!["b.json"]);
    }

    #[test]
    fn test_discover_ignores_extension_case() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["QUIZ.JSON", "week2.Csv", "notes.TXT"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        let found: Vec<String> = discover(dir.path(), None)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(found, vec!["QUIZ.JSON", "week2.Csv"]);
    }

    #[test]
    fn test_discover_missing_dir() {
        let err = discover(Path::new("/nonexistent/quizzes"), None).unwrap_err();
        assert!(matches!(err, QuizError::Batch { .. }));
    }

    #[test]
    fn test_discover_bad_pattern() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover(dir.path(), Some("[")).is_err());
    }

    #[test]
    fn test_from_config() {
        let config = AppConfig {
            max_workers: 7,
            retry_failed: false,
            ..AppConfig::default()
        };
        let processor = BatchProcessor::from(&config);
        assert_eq!(processor.max_workers, 7);
        assert_eq!(processor.max_attempts(), 1);
    }
}
