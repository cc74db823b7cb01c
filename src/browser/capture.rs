//! Full-page capture
//!
//! Captures span the entire scrollable page, not just the viewport, and are
//! always encoded as PNG by the browser.

use crate::error::{CaptureError, Result};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use tracing::{debug, instrument};

/// Capture a full-page PNG screenshot of the page's current state
#[instrument(skip(page))]
pub async fn full_page_png(page: &Page) -> Result<Vec<u8>> {
    let params = ScreenshotParams::builder()
        .format(CaptureScreenshotFormat::Png)
        .from_surface(true)
        .capture_beyond_viewport(true)
        .build();

    let data = page
        .screenshot(params)
        .await
        .map_err(|e| CaptureError::ScreenshotFailed(e.to_string()))?;

    if data.is_empty() {
        return Err(CaptureError::EmptyCapture.into());
    }

    debug!("Screenshot captured: {} bytes", data.len());
    Ok(data)
}
