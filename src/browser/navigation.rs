//! Page navigation
//!
//! Navigation blocks until the configured wait policy is satisfied or the
//! navigation timeout elapses, whichever comes first. The timeout covers the
//! whole sequence (commit plus readiness wait).

use crate::config::WaitPolicy;
use crate::error::{Error, NavigationError, Result};
use chromiumoxide::Page;
use std::time::Duration;
use tracing::{debug, instrument};

const LOAD_SCRIPT: &str = r#"
    new Promise(resolve => {
        if (document.readyState === 'complete') {
            resolve(true);
        } else {
            window.addEventListener('load', () => resolve(true));
        }
    })
"#;

// Approximates network idle: load event plus a quiet period. CDP does not
// expose Playwright's connection-count idle signal directly.
const NETWORK_IDLE_SCRIPT: &str = r#"
    new Promise(resolve => {
        if (document.readyState === 'complete') {
            setTimeout(() => resolve(true), 500);
        } else {
            window.addEventListener('load', () => {
                setTimeout(() => resolve(true), 500);
            });
        }
    })
"#;

/// Navigate `page` to `url` and wait for readiness per `policy`
#[instrument(skip(page))]
pub async fn goto(page: &Page, url: &str, policy: WaitPolicy, timeout: Duration) -> Result<()> {
    if !url.starts_with("http://") && !url.starts_with("https://") && !url.starts_with("file://") {
        return Err(NavigationError::InvalidUrl(format!(
            "URL must start with http://, https://, or file://: {}",
            url
        ))
        .into());
    }

    debug!("Navigating to {}...", url);
    let timeout_ms = timeout.as_millis() as u64;

    tokio::time::timeout(timeout, async {
        page.goto(url)
            .await
            .map_err(|e| Error::from(NavigationError::LoadFailed(e.to_string())))?;
        wait_for_ready(page, policy).await
    })
    .await
    .map_err(|_| NavigationError::Timeout(timeout_ms))??;

    debug!("Navigation complete: {}", url);
    Ok(())
}

/// Block until the page satisfies `policy`
async fn wait_for_ready(page: &Page, policy: WaitPolicy) -> Result<()> {
    match policy {
        WaitPolicy::Load => {
            page.evaluate(LOAD_SCRIPT)
                .await
                .map_err(|e| Error::cdp(e.to_string()))?;
        }
        WaitPolicy::NetworkIdle => {
            page.evaluate(NETWORK_IDLE_SCRIPT)
                .await
                .map_err(|e| Error::cdp(e.to_string()))?;
        }
        WaitPolicy::FixedDelay(ms) => {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
    Ok(())
}
