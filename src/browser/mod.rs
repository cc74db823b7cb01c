//! Browser automation module
//!
//! Chromium-backed implementation of the capture session: lifecycle
//! management, navigation with wait policies, and full-page screenshots,
//! all driven over CDP via ChromiumOxide.

pub mod capture;
pub mod navigation;
pub mod session;

pub use session::{ChromeOptions, ChromeSession, ChromeSessionFactory};
