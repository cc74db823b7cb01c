//! Snapshot job runner
//!
//! This module drives a capture run: it validates the job config, prepares
//! the output directory, opens one browser session, walks the target list in
//! order, and writes one image per target. A failing target is recorded and
//! skipped rather than aborting the run; the session is closed on every exit
//! path once it has been opened.

use crate::config::{JobConfig, WaitPolicy};
use crate::error::{Error, NavigationError, Result};
use crate::storage::OutputDir;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// One open browser session used for every capture in a run
///
/// The concrete implementation lives in [`crate::browser`]; tests substitute
/// a scripted mock to exercise the runner without a browser.
#[async_trait]
pub trait CaptureSession: Send {
    /// Navigate the session's page to `url`, blocking until the wait policy
    /// is satisfied or `timeout` elapses, whichever comes first
    async fn navigate(&mut self, url: &str, policy: WaitPolicy, timeout: Duration) -> Result<()>;

    /// Capture a full-page image of the current page state
    async fn capture(&mut self) -> Result<Vec<u8>>;

    /// Release the session (page, context, browser)
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Opens capture sessions for a job
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Open a session parameterized by the job's viewport and user agent
    async fn open(&self, config: &JobConfig) -> Result<Box<dyn CaptureSession>>;
}

/// Broad classification of a per-target failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Navigation did not complete within the timeout
    NavigationTimeout,
    /// Navigation failed for another reason
    Navigation,
    /// Screenshot capture failed
    Capture,
    /// The image could not be written to disk
    Write,
    /// The run deadline was exceeded before this target was navigated
    Cancelled,
}

/// Why a target failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReason {
    /// Failure classification
    pub kind: FailureKind,
    /// Human-readable detail
    pub message: String,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl FailureReason {
    fn cancelled() -> Self {
        Self {
            kind: FailureKind::Cancelled,
            message: "run deadline exceeded".to_string(),
        }
    }
}

/// Classify a per-target error into a failure reason
fn classify(err: &Error, stage: Stage) -> FailureReason {
    let kind = match err {
        Error::Navigation(NavigationError::Timeout(_)) => FailureKind::NavigationTimeout,
        Error::Navigation(_) => FailureKind::Navigation,
        Error::Capture(_) => FailureKind::Capture,
        Error::Storage(_) | Error::Io(_) => FailureKind::Write,
        _ => match stage {
            Stage::Navigate => FailureKind::Navigation,
            Stage::Capture => FailureKind::Capture,
            Stage::Write => FailureKind::Write,
        },
    };
    FailureReason {
        kind,
        message: err.to_string(),
    }
}

/// Which step of target processing an error came from
#[derive(Debug, Clone, Copy)]
enum Stage {
    Navigate,
    Capture,
    Write,
}

/// Outcome for one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunResult {
    /// The target's image was written to `path`
    Saved {
        /// The target URL that was captured
        url: String,
        /// Full path of the written image
        path: PathBuf,
    },
    /// The target could not be captured
    Failed {
        /// The target URL that failed
        url: String,
        /// Why it failed
        reason: FailureReason,
    },
}

impl RunResult {
    /// Whether this target was saved
    pub fn is_saved(&self) -> bool {
        matches!(self, RunResult::Saved { .. })
    }

    /// The target URL this result belongs to
    pub fn url(&self) -> &str {
        match self {
            RunResult::Saved { url, .. } => url,
            RunResult::Failed { url, .. } => url,
        }
    }
}

/// Ordered per-target outcomes of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// One result per target, in target order
    pub results: Vec<RunResult>,
}

impl RunReport {
    /// Number of targets that were saved
    pub fn saved_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_saved()).count()
    }

    /// Number of targets that failed
    pub fn failed_count(&self) -> usize {
        self.results.len() - self.saved_count()
    }

    /// Whether every target was saved
    pub fn all_saved(&self) -> bool {
        self.failed_count() == 0
    }

    /// Iterate over failed results only
    pub fn failures(&self) -> impl Iterator<Item = &RunResult> {
        self.results.iter().filter(|r| !r.is_saved())
    }
}

/// Drives capture runs against sessions opened by a [`SessionFactory`]
pub struct JobRunner<F> {
    factory: F,
}

impl<F: SessionFactory> JobRunner<F> {
    /// Create a runner over the given session factory
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    /// Execute one capture run
    ///
    /// Fatal errors (invalid config, unusable output directory, session
    /// launch failure) return `Err` with no results. Everything after the
    /// session opens is per-target: a failing target is recorded as
    /// `Failed` and the run continues. The returned report holds exactly
    /// one result per target, in target order.
    #[instrument(skip(self, config), fields(targets = config.targets.len()))]
    pub async fn run(&self, config: &JobConfig) -> Result<RunReport> {
        config.validate()?;

        let output = OutputDir::prepare(&config.output_dir)
            .await
            .map_err(|source| crate::error::ConfigError::OutputDir {
                path: config.output_dir.clone(),
                source,
            })?;

        let mut session = self.factory.open(config).await?;
        info!("Session open, {} targets to capture", config.targets.len());

        let started = Instant::now();
        let deadline = config.run_deadline_ms.map(Duration::from_millis);
        let nav_timeout = Duration::from_millis(config.nav_timeout_ms);
        let settle = Duration::from_millis(config.settle_ms);

        let mut results = Vec::with_capacity(config.targets.len());
        for target in &config.targets {
            if let Some(limit) = deadline {
                if started.elapsed() >= limit {
                    warn!("Run deadline exceeded, cancelling {}", target.url);
                    results.push(RunResult::Failed {
                        url: target.url.clone(),
                        reason: FailureReason::cancelled(),
                    });
                    continue;
                }
            }

            let outcome = Self::capture_target(
                session.as_mut(),
                &output,
                &target.url,
                &target.filename,
                config.wait_policy,
                nav_timeout,
                settle,
            )
            .await;
            match &outcome {
                RunResult::Saved { path, .. } => info!("Saved: {}", path.display()),
                RunResult::Failed { url, reason } => {
                    warn!("Failed: {}: {}", url, reason.message)
                }
            }
            results.push(outcome);
        }

        // Teardown is unconditional: one open, one close per run.
        if let Err(e) = session.close().await {
            warn!("Session teardown failed: {}", e);
        }

        Ok(RunReport { results })
    }

    /// Process one target through navigation, settle, capture, and write.
    /// Errors are converted to a `Failed` result here and never propagate.
    async fn capture_target(
        session: &mut dyn CaptureSession,
        output: &OutputDir,
        url: &str,
        filename: &str,
        policy: WaitPolicy,
        nav_timeout: Duration,
        settle: Duration,
    ) -> RunResult {
        info!("Navigating to {}...", url);
        if let Err(e) = session.navigate(url, policy, nav_timeout).await {
            return RunResult::Failed {
                url: url.to_string(),
                reason: classify(&e, Stage::Navigate),
            };
        }

        // Give late-loading content a chance to render before capture.
        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }

        let data = match session.capture().await {
            Ok(data) => data,
            Err(e) => {
                return RunResult::Failed {
                    url: url.to_string(),
                    reason: classify(&e, Stage::Capture),
                }
            }
        };

        match output.write(filename, &data).await {
            Ok(path) => RunResult::Saved {
                url: url.to_string(),
                path,
            },
            Err(e) => RunResult::Failed {
                url: url.to_string(),
                reason: classify(&Error::Storage(e), Stage::Write),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CaptureError, StorageError};

    #[test]
    fn test_classify_navigation_timeout() {
        let err = Error::Navigation(NavigationError::Timeout(30000));
        let reason = classify(&err, Stage::Navigate);
        assert_eq!(reason.kind, FailureKind::NavigationTimeout);
        assert!(reason.message.contains("30000ms"));
    }

    #[test]
    fn test_classify_load_failure() {
        let err = Error::Navigation(NavigationError::LoadFailed("dns".to_string()));
        assert_eq!(classify(&err, Stage::Navigate).kind, FailureKind::Navigation);
    }

    #[test]
    fn test_classify_capture_error() {
        let err = Error::Capture(CaptureError::EmptyCapture);
        assert_eq!(classify(&err, Stage::Capture).kind, FailureKind::Capture);
    }

    #[test]
    fn test_classify_storage_error() {
        let err = Error::Storage(StorageError::InvalidPath("..".to_string()));
        assert_eq!(classify(&err, Stage::Write).kind, FailureKind::Write);
    }

    #[test]
    fn test_classify_cdp_error_follows_stage() {
        let err = Error::cdp("connection reset");
        assert_eq!(classify(&err, Stage::Navigate).kind, FailureKind::Navigation);
        assert_eq!(classify(&err, Stage::Capture).kind, FailureKind::Capture);
    }

    #[test]
    fn test_report_counts() {
        let report = RunReport {
            results: vec![
                RunResult::Saved {
                    url: "https://example.com/".to_string(),
                    path: PathBuf::from("out/home.png"),
                },
                RunResult::Failed {
                    url: "https://example.com/about".to_string(),
                    reason: FailureReason {
                        kind: FailureKind::NavigationTimeout,
                        message: "timed out".to_string(),
                    },
                },
            ],
        };
        assert_eq!(report.saved_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert!(!report.all_saved());
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_run_result_accessors() {
        let saved = RunResult::Saved {
            url: "https://example.com/".to_string(),
            path: PathBuf::from("out/home.png"),
        };
        assert!(saved.is_saved());
        assert_eq!(saved.url(), "https://example.com/");
    }
}
