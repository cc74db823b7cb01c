//! pagesnap - Sequential Full-Page Snapshot Capture
//!
//! This crate captures full-page PNG screenshots for an ordered list of URL
//! targets using one headless Chromium session driven over CDP.
//!
//! # Features
//!
//! - **Job runner**: one browser session, targets captured strictly in
//!   declaration order, one result per target
//! - **Continue-on-error**: a failing target is recorded and skipped, never
//!   aborting the rest of the run
//! - **Wait policies**: network-idle, load-event, or fixed-delay readiness
//!   after each navigation, under a per-navigation timeout
//! - **Classified failures**: navigation timeouts, capture errors, and write
//!   errors stay distinguishable in the run report
//!
//! # Architecture
//!
//! ```text
//! JobConfig ──▶ JobRunner ──▶ CaptureSession (CDP)
//!                  │                │
//!                  ▼                ▼
//!            ┌──────────┐    ┌──────────────┐
//!            │ Storage  │    │ Navigation + │
//!            │ (writes) │    │ Capture      │
//!            └────┬─────┘    └──────┬───────┘
//!                 │                 │
//!                 ▼                 ▼
//!          output_dir/*.png    full-page PNG bytes
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pagesnap::{ChromeSessionFactory, JobConfig, JobRunner, Target};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = JobConfig {
//!         targets: vec![
//!             Target::new("https://example.com/", "home.png"),
//!             Target::new("https://example.com/about", "about.png"),
//!         ],
//!         output_dir: "./out".into(),
//!         ..JobConfig::default()
//!     };
//!
//!     let runner = JobRunner::new(ChromeSessionFactory::default());
//!     let report = runner.run(&config).await?;
//!
//!     println!("{} saved, {} failed", report.saved_count(), report.failed_count());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod browser;
pub mod config;
pub mod error;
pub mod runner;
pub mod storage;

// Re-exports for convenience
pub use browser::{ChromeOptions, ChromeSessionFactory};
pub use config::{JobConfig, Target, Viewport, WaitPolicy};
pub use error::{Error, Result};
pub use runner::{CaptureSession, JobRunner, RunReport, RunResult, SessionFactory};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
