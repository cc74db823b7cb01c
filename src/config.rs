//! Job configuration
//!
//! This module defines the capture job model: the ordered target list, the
//! viewport and user agent the page is created with, the wait policy applied
//! after each navigation, and the timing knobs. A `JobConfig` is constructed
//! once (from a JSON file or the embedded demo list), validated, and then
//! treated as immutable for the duration of a run.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Default navigation timeout in milliseconds
pub const DEFAULT_NAV_TIMEOUT_MS: u64 = 30_000;

/// Default settle delay after navigation, before capture, in milliseconds
pub const DEFAULT_SETTLE_MS: u64 = 2_000;

/// One (URL, output filename) pair to capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Absolute URL to navigate to (http, https, or file scheme)
    pub url: String,
    /// Output filename, relative to the job's output directory.
    /// May contain subdirectories; must be unique within a run.
    pub filename: String,
}

impl Target {
    /// Create a new target
    pub fn new<U: Into<String>, F: Into<String>>(url: U, filename: F) -> Self {
        Self {
            url: url.into(),
            filename: filename.into(),
        }
    }
}

/// Page viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Viewport width (must be non-zero)
    pub width: u32,
    /// Viewport height (must be non-zero)
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl Viewport {
    /// A phone-sized portrait viewport (390x844)
    pub fn mobile() -> Self {
        Self {
            width: 390,
            height: 844,
        }
    }

    /// Whether this viewport is portrait-oriented
    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }
}

/// Condition to wait for after navigation, before the settle delay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WaitPolicy {
    /// Wait until the load event has fired and the network has gone quiet
    #[default]
    NetworkIdle,
    /// Wait until the load event fires
    Load,
    /// Wait a fixed number of milliseconds after navigation commits
    FixedDelay(u64),
}

/// User agent string matching an iPhone running mobile Safari
pub const MOBILE_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Mobile/15E148 Safari/604.1";

fn default_output_dir() -> PathBuf {
    PathBuf::from("snapshots")
}

fn default_nav_timeout_ms() -> u64 {
    DEFAULT_NAV_TIMEOUT_MS
}

fn default_settle_ms() -> u64 {
    DEFAULT_SETTLE_MS
}

/// Configuration for one capture run
///
/// Constructed once before the run and immutable for its duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Viewport the page is created with
    #[serde(default)]
    pub viewport: Viewport,
    /// User agent override (None = browser default)
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Directory output files are written under (created if absent)
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Wait condition applied after each navigation
    #[serde(default)]
    pub wait_policy: WaitPolicy,
    /// Ordered list of targets to capture
    pub targets: Vec<Target>,
    /// Per-navigation timeout in milliseconds
    #[serde(default = "default_nav_timeout_ms")]
    pub nav_timeout_ms: u64,
    /// Settle delay after navigation, before capture, in milliseconds
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// Optional whole-run deadline in milliseconds; once exceeded, remaining
    /// targets are reported as cancelled without being navigated
    #[serde(default)]
    pub run_deadline_ms: Option<u64>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            user_agent: None,
            output_dir: default_output_dir(),
            wait_policy: WaitPolicy::default(),
            targets: Vec::new(),
            nav_timeout_ms: DEFAULT_NAV_TIMEOUT_MS,
            settle_ms: DEFAULT_SETTLE_MS,
            run_deadline_ms: None,
        }
    }
}

impl JobConfig {
    /// The embedded demo job: a phone-sized capture of a couple of public
    /// pages, used when no config file is given on the command line.
    pub fn builtin() -> Self {
        Self {
            viewport: Viewport::mobile(),
            user_agent: Some(MOBILE_USER_AGENT.to_string()),
            targets: vec![
                Target::new("https://example.com/", "example-home.png"),
                Target::new("https://www.rust-lang.org/", "rust-lang.png"),
            ],
            ..Self::default()
        }
    }

    /// Load a job config from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Validate the config before a run
    ///
    /// Checks the viewport, every target URL and filename, and filename
    /// uniqueness. The first duplicate filename encountered is reported.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(ConfigError::ZeroViewport);
        }

        let mut seen = HashSet::new();
        for target in &self.targets {
            validate_url(&target.url)?;
            validate_filename(&target.filename)?;
            if !seen.insert(target.filename.as_str()) {
                return Err(ConfigError::DuplicateFilename(target.filename.clone()));
            }
        }
        Ok(())
    }
}

/// Check that a target URL is absolute and uses a navigable scheme
fn validate_url(raw: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" | "file" => Ok(()),
        other => Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme: {}", other),
        }),
    }
}

/// Check that a target filename is a safe relative path
fn validate_filename(filename: &str) -> Result<(), ConfigError> {
    if filename.is_empty() {
        return Err(ConfigError::InvalidFilename {
            filename: filename.to_string(),
            reason: "filename is empty".to_string(),
        });
    }
    let path = Path::new(filename);
    if path.is_absolute() {
        return Err(ConfigError::InvalidFilename {
            filename: filename.to_string(),
            reason: "filename must be relative".to_string(),
        });
    }
    for component in path.components() {
        match component {
            Component::Normal(_) => {}
            Component::ParentDir => {
                return Err(ConfigError::InvalidFilename {
                    filename: filename.to_string(),
                    reason: "filename must not contain '..'".to_string(),
                });
            }
            _ => {
                return Err(ConfigError::InvalidFilename {
                    filename: filename.to_string(),
                    reason: "filename contains an unsupported path component".to_string(),
                });
            }
        }
    }
    Ok(())
}
