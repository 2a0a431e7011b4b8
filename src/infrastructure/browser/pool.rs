//! Shared headless-browser pool.
//!
//! Owns exactly one Chromium process for the whole server lifetime: launched
//! lazily on the first dynamic extraction, reused by every subsequent one.
//! Each render opens its own incognito context (own cookies/viewport) so
//! concurrent extractions do not observe each other; the pool itself holds no
//! per-request state beyond the single browser handle.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetBlockedUrLsParams;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams,
};
use futures::StreamExt;
use tokio::sync::{Mutex, OnceCell};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::DomainError;

/// URL patterns blocked during dynamic rendering; pages load dramatically
/// faster without images, media, fonts, and stylesheets.
const BLOCKED_URL_PATTERNS: [&str; 12] = [
    "*.png", "*.jpg", "*.jpeg", "*.gif", "*.svg", "*.webp", "*.ico", "*.woff", "*.woff2",
    "*.ttf", "*.css", "*.mp4",
];

/// In-page extraction script: strips unwanted tags, walks a prioritized list
/// of content selectors, de-duplicates exact fragments, and drops fragments
/// under 20 characters.
const EXTRACTION_SCRIPT: &str = r#"
(() => {
    ['script', 'style', 'nav', 'footer', 'iframe', 'noscript']
        .forEach(tag => document.querySelectorAll(tag).forEach(el => el.remove()));

    const selectors = [
        'main', 'article', '[role="main"]',
        'h1', 'h2', 'h3', 'h4', 'h5', 'h6', 'p',
        '[class*="content"]', '[class*="article"]', '[class*="post"]', '[class*="text"]',
    ];

    const seen = new Set();
    const parts = [];

    for (const selector of selectors) {
        for (const el of document.querySelectorAll(selector)) {
            const text = (el.innerText || '').trim();
            if (text.length < 20 || seen.has(text)) continue;
            seen.add(text);
            parts.push(text);
        }
    }

    return parts.join('\n\n');
})()
"#;

/// Timeouts and toggles for dynamic rendering
#[derive(Debug, Clone)]
pub struct BrowserPoolConfig {
    /// Navigation timeout
    pub navigation_timeout: Duration,
    /// Extra settle delay after navigation for late-rendering frameworks
    pub settle_delay: Duration,
    /// Timeout for the in-page extraction script
    pub evaluate_timeout: Duration,
}

impl Default for BrowserPoolConfig {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_millis(1500),
            evaluate_timeout: Duration::from_secs(5),
        }
    }
}

/// Result of rendering a page in the browser
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub text: String,
    pub title: Option<String>,
}

/// Sandboxed, timeout-bounded page rendering.
///
/// The dynamic extractor depends on this seam rather than the pool directly
/// so tests never need a Chromium binary.
#[async_trait]
pub trait PageRenderer: Send + Sync + std::fmt::Debug {
    async fn render(&self, url: &str) -> Result<RenderedPage, DomainError>;
}

struct BrowserHandle {
    browser: Mutex<Browser>,
    event_loop: JoinHandle<()>,
}

impl std::fmt::Debug for BrowserHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserHandle").finish()
    }
}

/// Lifecycle-managed handle to the single shared browser
#[derive(Debug)]
pub struct BrowserPool {
    config: BrowserPoolConfig,
    handle: OnceCell<BrowserHandle>,
}

impl BrowserPool {
    pub fn new(config: BrowserPoolConfig) -> Self {
        Self {
            config,
            handle: OnceCell::new(),
        }
    }

    /// Launch the browser if it is not already running. `OnceCell` makes the
    /// first-time launch single-flight: two tasks racing here produce one
    /// Chromium process.
    async fn browser(&self) -> Result<&BrowserHandle, DomainError> {
        self.handle
            .get_or_try_init(|| async {
                info!("launching shared headless browser");

                let config = BrowserConfig::builder()
                    .no_sandbox()
                    .build()
                    .map_err(DomainError::internal)?;

                let (browser, mut handler) = Browser::launch(config)
                    .await
                    .map_err(|e| DomainError::internal(format!("browser launch failed: {}", e)))?;

                let event_loop = tokio::spawn(async move {
                    while let Some(event) = handler.next().await {
                        if event.is_err() {
                            break;
                        }
                    }
                });

                Ok(BrowserHandle {
                    browser: Mutex::new(browser),
                    event_loop,
                })
            })
            .await
    }

    /// Close the browser cleanly; no-op if it was never launched.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.handle.get() {
            info!("shutting down shared headless browser");

            let mut browser = handle.browser.lock().await;

            if let Err(e) = browser.close().await {
                warn!(error = %e, "browser close failed");
            }

            if let Err(e) = browser.wait().await {
                warn!(error = %e, "browser wait failed");
            }

            handle.event_loop.abort();
        }
    }

    /// Close the browser when the process receives a termination signal, so
    /// no orphaned Chromium processes outlive the server.
    pub fn spawn_shutdown_hook(self: &Arc<Self>) -> JoinHandle<()> {
        let pool = Arc::clone(self);

        tokio::spawn(async move {
            let ctrl_c = tokio::signal::ctrl_c();

            #[cfg(unix)]
            {
                let mut sigterm = tokio::signal::unix::signal(
                    tokio::signal::unix::SignalKind::terminate(),
                )
                .expect("failed to install SIGTERM handler");

                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }

            #[cfg(not(unix))]
            {
                let _ = ctrl_c.await;
            }

            pool.shutdown().await;
        })
    }
}

#[async_trait]
impl PageRenderer for BrowserPool {
    async fn render(&self, url: &str) -> Result<RenderedPage, DomainError> {
        let handle = self.browser().await?;

        // Context creation needs the browser handle; rendering itself runs on
        // the page and does not hold the lock, so extractions overlap freely.
        let (context, page) = {
            let browser = handle.browser.lock().await;

            let context = browser
                .create_browser_context(CreateBrowserContextParams::default())
                .await
                .map_err(|e| {
                    DomainError::extraction("dynamic", format!("browser context failed: {}", e))
                })?;

            let mut params = CreateTargetParams::new("about:blank");
            params.browser_context_id = Some(context.clone());

            let page = browser.new_page(params).await.map_err(|e| {
                DomainError::extraction("dynamic", format!("page creation failed: {}", e))
            })?;

            (context, page)
        };

        let result = self.render_on_page(&page, url).await;

        // The page and its context always close, success or failure; only the
        // shared browser survives the request.
        if let Err(e) = page.close().await {
            debug!(error = %e, "page close failed");
        }

        {
            let browser = handle.browser.lock().await;
            if let Err(e) = browser.dispose_browser_context(context).await {
                debug!(error = %e, "incognito context close failed");
            }
        }

        result
    }
}

impl BrowserPool {
    async fn render_on_page(
        &self,
        page: &chromiumoxide::Page,
        url: &str,
    ) -> Result<RenderedPage, DomainError> {
        page.execute(SetBlockedUrLsParams::new(
            BLOCKED_URL_PATTERNS.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
        ))
        .await
        .map_err(|e| {
            DomainError::extraction("dynamic", format!("request blocking failed: {}", e))
        })?;

        tokio::time::timeout(self.config.navigation_timeout, async {
            page.goto(url).await.map_err(|e| {
                DomainError::extraction("dynamic", format!("navigation failed: {}", e))
            })?;

            page.wait_for_navigation().await.map_err(|e| {
                DomainError::extraction("dynamic", format!("navigation wait failed: {}", e))
            })
        })
        .await
        .map_err(|_| {
            DomainError::extraction("dynamic", format!("navigation to {} timed out", url))
        })??;

        tokio::time::sleep(self.config.settle_delay).await;

        let text: String = tokio::time::timeout(self.config.evaluate_timeout, async {
            page.evaluate(EXTRACTION_SCRIPT)
                .await
                .map_err(|e| {
                    DomainError::extraction("dynamic", format!("page evaluation failed: {}", e))
                })?
                .into_value()
                .map_err(|e| {
                    DomainError::extraction(
                        "dynamic",
                        format!("page evaluation returned no text: {}", e),
                    )
                })
        })
        .await
        .map_err(|_| DomainError::extraction("dynamic", "page evaluation timed out"))??;

        let title = page.get_title().await.ok().flatten();

        debug!(url, chars = text.len(), "dynamic render complete");

        Ok(RenderedPage { text, title })
    }
}
