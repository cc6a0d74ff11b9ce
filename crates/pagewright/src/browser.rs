//! Real browser control over the Chrome DevTools Protocol.
//!
//! [`ChromiumDriver`] implements [`Driver`](crate::Driver) with chromiumoxide.
//! Selectors are compiled to JavaScript (see [`Selector::to_query_all`]) and
//! handles are re-located by `(selector, index)` on every call, so a handle
//! that no longer matches fails with a driver error instead of acting on a
//! stale node.
//!
//! [`Selector::to_query_all`]: crate::Selector::to_query_all

/// Browser launch configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run without a window
    pub headless: bool,
    /// Window width
    pub viewport_width: u32,
    /// Window height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 800,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

#[cfg(feature = "browser")]
pub use cdp::ChromiumDriver;

#[cfg(feature = "browser")]
mod cdp {
    use super::BrowserConfig;
    use crate::driver::{DocumentState, Driver, ElementHandle};
    use crate::locator::Selector;
    use crate::result::{PageError, PageResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use serde::Deserialize;
    use std::fmt;
    use std::path::Path;
    use tokio::sync::Mutex;

    const BLANK: &str = "about:blank";

    /// What `query_all` reads about each match
    #[derive(Debug, Deserialize)]
    struct Queried {
        tag: String,
        text: String,
        visible: bool,
    }

    /// [`Driver`] over a single chromium tab
    pub struct ChromiumDriver {
        browser: Mutex<CdpBrowser>,
        page: CdpPage,
        handler: tokio::task::JoinHandle<()>,
    }

    impl fmt::Debug for ChromiumDriver {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("ChromiumDriver").finish_non_exhaustive()
        }
    }

    fn cdp_error(e: impl fmt::Display) -> PageError {
        PageError::driver(e.to_string())
    }

    impl ChromiumDriver {
        /// Launch chromium and open one blank tab
        pub async fn launch(config: &BrowserConfig) -> PageResult<Self> {
            let mut builder = CdpConfig::builder().window_size(config.viewport_width, config.viewport_height);
            if !config.headless {
                builder = builder.with_head();
            }
            if !config.sandbox {
                builder = builder.no_sandbox();
            }
            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }
            let cdp_config = builder.build().map_err(|e| PageError::Config {
                message: format!("browser configuration: {e}"),
            })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(cdp_error)?;
            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });
            let page = browser.new_page(BLANK).await.map_err(cdp_error)?;
            tracing::info!(headless = config.headless, "browser launched");

            Ok(Self {
                browser: Mutex::new(browser),
                page,
                handler,
            })
        }

        /// Close the browser
        pub async fn close(self) -> PageResult<()> {
            let mut browser = self.browser.lock().await;
            browser.close().await.map_err(cdp_error)?;
            let _ = browser.wait().await;
            self.handler.abort();
            Ok(())
        }

        async fn eval<T: DeserializeOwned>(&self, expression: String) -> PageResult<T> {
            self.page
                .evaluate_expression(expression)
                .await
                .map_err(cdp_error)?
                .into_value()
                .map_err(cdp_error)
        }

        /// Run `body` with `el` bound to the handle's element
        async fn with_element<T: DeserializeOwned>(&self, element: &ElementHandle, body: &str) -> PageResult<T> {
            let expression = format!(
                "(() => {{ const el = {}[{}]; if (!el) throw new Error('element ' + {} + ' is detached'); {body} }})()",
                element.selector.to_query_all(),
                element.index,
                js_str(&element.to_string()),
            );
            self.eval(expression).await
        }
    }

    fn js_str(s: &str) -> String {
        serde_json::Value::String(s.to_string()).to_string()
    }

    #[async_trait]
    impl Driver for ChromiumDriver {
        async fn navigate(&self, url: &str) -> PageResult<()> {
            self.page
                .goto(url)
                .await
                .map_err(|e| PageError::Navigation {
                    target: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn document_state(&self) -> PageResult<DocumentState> {
            self.eval(
                "({ ready_state: document.readyState, \
                 resource_count: performance.getEntriesByType('resource').length })"
                    .to_string(),
            )
            .await
        }

        async fn query_all(&self, selector: &Selector) -> PageResult<Vec<ElementHandle>> {
            let expression = format!(
                "{}.map(el => {{ const s = getComputedStyle(el); return {{ \
                 tag: el.tagName.toLowerCase(), \
                 text: (el.textContent || '').trim(), \
                 visible: el.getClientRects().length > 0 && s.visibility !== 'hidden' && s.display !== 'none' }}; }})",
                selector.to_query_all()
            );
            let found: Vec<Queried> = self.eval(expression).await?;
            Ok(found
                .into_iter()
                .enumerate()
                .map(|(index, q)| {
                    ElementHandle::new(selector.clone(), index, q.tag)
                        .with_text(q.text)
                        .with_visible(q.visible)
                })
                .collect())
        }

        async fn fill(&self, element: &ElementHandle, text: &str) -> PageResult<()> {
            let body = format!(
                "el.focus(); \
                 const setter = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(el), 'value').set; \
                 setter.call(el, {}); \
                 el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                 el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
                 return true;",
                js_str(text)
            );
            self.with_element::<bool>(element, &body).await.map(|_| ())
        }

        async fn click(&self, element: &ElementHandle) -> PageResult<()> {
            self.with_element::<bool>(element, "el.scrollIntoView({ block: 'center' }); el.click(); return true;")
                .await
                .map(|_| ())
        }

        async fn text(&self, element: &ElementHandle) -> PageResult<String> {
            self.with_element(element, "return (el.textContent || '').trim();")
                .await
        }

        async fn input_value(&self, element: &ElementHandle) -> PageResult<String> {
            self.with_element(element, "return el.value ?? '';").await
        }

        async fn attribute(&self, element: &ElementHandle, name: &str) -> PageResult<Option<String>> {
            self.with_element(element, &format!("return el.getAttribute({});", js_str(name)))
                .await
        }

        async fn current_url(&self) -> PageResult<String> {
            Ok(self
                .page
                .url()
                .await
                .map_err(cdp_error)?
                .unwrap_or_else(|| BLANK.to_string()))
        }

        async fn title(&self) -> PageResult<String> {
            Ok(self.page.get_title().await.map_err(cdp_error)?.unwrap_or_default())
        }

        async fn screenshot(&self, path: &Path) -> PageResult<()> {
            use base64::Engine;

            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build();
            let shot = self.page.execute(params).await.map_err(cdp_error)?;
            let png = base64::engine::general_purpose::STANDARD
                .decode(&shot.data)
                .map_err(cdp_error)?;
            tokio::fs::write(path, png).await?;
            Ok(())
        }
    }
}
