//! Browser session lifecycle
//!
//! This module handles browser launch, page setup, and shutdown. One
//! [`ChromeSession`] holds the browser + page pair used for every capture in
//! a run; the factory parameterizes it with the job's viewport and user
//! agent plus host-level launch options.

use crate::config::JobConfig;
use crate::error::{Error, Result, SessionError};
use crate::runner::{CaptureSession, SessionFactory};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Host-level browser launch options
///
/// Job-level settings (viewport, user agent) come from [`JobConfig`]; these
/// cover how Chromium itself is started on the host.
#[derive(Debug, Clone)]
pub struct ChromeOptions {
    /// Run in headless mode (default: true)
    pub headless: bool,
    /// Enable sandbox (default: true for production)
    pub sandbox: bool,
    /// Path to Chrome/Chromium executable (None = auto-detect)
    pub chrome_path: Option<String>,
    /// Additional Chrome arguments
    pub extra_args: Vec<String>,
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: true,
            chrome_path: None,
            extra_args: Vec::new(),
        }
    }
}

impl ChromeOptions {
    /// Create a new options builder
    pub fn builder() -> ChromeOptionsBuilder {
        ChromeOptionsBuilder::default()
    }
}

/// Builder for [`ChromeOptions`]
#[derive(Default)]
pub struct ChromeOptionsBuilder {
    options: ChromeOptions,
}

impl ChromeOptionsBuilder {
    /// Set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.options.headless = headless;
        self
    }

    /// Enable/disable sandbox
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.options.sandbox = sandbox;
        self
    }

    /// Set Chrome path
    pub fn chrome_path<S: Into<String>>(mut self, path: S) -> Self {
        self.options.chrome_path = Some(path.into());
        self
    }

    /// Add extra Chrome argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.options.extra_args.push(arg.into());
        self
    }

    /// Build the options
    pub fn build(self) -> ChromeOptions {
        self.options
    }
}

/// Opens Chromium-backed capture sessions
#[derive(Debug, Clone, Default)]
pub struct ChromeSessionFactory {
    options: ChromeOptions,
}

impl ChromeSessionFactory {
    /// Create a factory with the given launch options
    pub fn new(options: ChromeOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl SessionFactory for ChromeSessionFactory {
    #[instrument(skip(self, config))]
    async fn open(&self, config: &JobConfig) -> Result<Box<dyn CaptureSession>> {
        let session = ChromeSession::launch(&self.options, config).await?;
        Ok(Box::new(session))
    }
}

/// One open browser + page pair, exclusively owned by the runner for a run
pub struct ChromeSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
}

impl ChromeSession {
    /// Launch the browser and create the single page used for all captures
    #[instrument(skip(options, config))]
    pub async fn launch(options: &ChromeOptions, config: &JobConfig) -> Result<Self> {
        info!(
            "Launching browser: headless={}, viewport={}x{}",
            options.headless, config.viewport.width, config.viewport.height
        );

        let mut builder = CdpBrowserConfig::builder();

        builder = builder.viewport(chromiumoxide::handler::viewport::Viewport {
            width: config.viewport.width,
            height: config.viewport.height,
            device_scale_factor: None,
            emulating_mobile: config.viewport.is_portrait(),
            is_landscape: !config.viewport.is_portrait(),
            has_touch: config.viewport.is_portrait(),
        });

        if !options.headless {
            builder = builder.with_head();
        }

        if !options.sandbox {
            builder = builder.arg("--no-sandbox");
        }

        if let Some(ref path) = options.chrome_path {
            builder = builder.chrome_executable(path);
        }

        for arg in &options.extra_args {
            builder = builder.arg(arg);
        }

        let cdp_config = builder
            .build()
            .map_err(SessionError::InvalidConfig)?;

        let (browser, mut handler) = Browser::launch(cdp_config)
            .await
            .map_err(|e| SessionError::LaunchFailed(e.to_string()))?;

        // Drive CDP events until the browser goes away.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    warn!("Browser handler event error");
                    break;
                }
            }
            debug!("Browser handler finished");
        });

        match Self::setup_page(&browser, config).await {
            Ok(page) => {
                info!("Browser launched successfully");
                Ok(Self {
                    browser,
                    handler: handler_task,
                    page,
                })
            }
            Err(e) => {
                // Launch half-succeeded; tear the browser down before failing.
                let mut browser = browser;
                if let Err(close_err) = browser.close().await {
                    warn!("Cleanup after failed launch: {}", close_err);
                }
                handler_task.abort();
                Err(e)
            }
        }
    }

    async fn setup_page(browser: &Browser, config: &JobConfig) -> Result<Page> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| SessionError::PageCreationFailed(e.to_string()))?;

        if let Some(ref ua) = config.user_agent {
            page.set_user_agent(ua.as_str())
                .await
                .map_err(|e| SessionError::PageCreationFailed(e.to_string()))?;
        }

        debug!("Page ready");
        Ok(page)
    }

    /// Get the underlying chromiumoxide Page
    pub fn page(&self) -> &Page {
        &self.page
    }
}

#[async_trait]
impl CaptureSession for ChromeSession {
    async fn navigate(
        &mut self,
        url: &str,
        policy: crate::config::WaitPolicy,
        timeout: Duration,
    ) -> Result<()> {
        super::navigation::goto(&self.page, url, policy, timeout).await
    }

    async fn capture(&mut self) -> Result<Vec<u8>> {
        super::capture::full_page_png(&self.page).await
    }

    #[instrument(skip(self))]
    async fn close(self: Box<Self>) -> Result<()> {
        info!("Closing browser");

        let Self {
            mut browser,
            handler,
            page: _,
        } = *self;

        browser
            .close()
            .await
            .map_err(|e| Error::Session(SessionError::CloseFailed(e.to_string())))?;

        // Give the handler a bounded window to drain.
        let _ = tokio::time::timeout(Duration::from_secs(5), handler).await;

        info!("Browser closed");
        Ok(())
    }
}
