use super::{scripts, Key, Page, ScrollMetrics, Viewport};
use crate::error::{Error, Result};
use async_trait::async_trait;
use fantoccini::key::Key as WebDriverKey;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// A [`Page`] backed by a WebDriver session
pub struct WebDriverPage {
    client: Client,
    navigation_timeout: Duration,
}

impl WebDriverPage {
    /// Wrap an already-connected client
    pub fn new(client: Client, navigation_timeout: Duration) -> Self {
        Self {
            client,
            navigation_timeout,
        }
    }

    /// Access the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// End the WebDriver session
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }

    async fn run(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.client
            .execute(script, args)
            .await
            .map_err(|e| Error::Evaluation(e.to_string()))
    }
}

/// Connects to the WebDriver instance.
///
/// Tries the given URL first, then the usual local driver ports.
pub async fn connect(webdriver_url: &str) -> Result<Client> {
    match ClientBuilder::native().connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
        }
    }

    let fallback_urls = [
        "http://localhost:9515", // ChromeDriver default
        "http://localhost:4444", // Selenium / geckodriver default
        "http://127.0.0.1:4444", // Try with IP instead of localhost
    ];

    for url in fallback_urls.iter() {
        if *url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = ClientBuilder::native().connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    Err(Error::WebDriver(format!(
        "no WebDriver server reachable (tried {} and fallbacks); set WEBDRIVER_URL",
        webdriver_url
    )))
}

#[async_trait]
impl Page for WebDriverPage {
    async fn url(&self) -> Result<String> {
        Ok(self.client.current_url().await?.to_string())
    }

    async fn html(&self) -> Result<String> {
        self.client
            .source()
            .await
            .map_err(|e| Error::Evaluation(e.to_string()))
    }

    async fn evaluate(&self, script: &str) -> Result<Value> {
        self.run(script, vec![]).await
    }

    async fn goto(&self, url: &str) -> Result<()> {
        match timeout(self.navigation_timeout, self.client.goto(url)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(Error::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(Error::Navigation {
                url: url.to_string(),
                reason: format!("timed out after {:?}", self.navigation_timeout),
            }),
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<bool> {
        match self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
        {
            Ok(_) => Ok(true),
            Err(fantoccini::error::CmdError::WaitTimeout) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<()> {
        // WebDriver has no network events; poll the ready state instead
        let start = Instant::now();
        while start.elapsed() < timeout {
            let state = self.run(scripts::READY_STATE, vec![]).await?;
            if state.as_str() == Some("complete") {
                tokio::time::sleep(Duration::from_millis(500)).await;
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
        Err(Error::Timeout(timeout))
    }

    async fn scroll_metrics(&self) -> Result<ScrollMetrics> {
        let value = self.run(scripts::SCROLL_METRICS, vec![]).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn scroll_to(&self, x: f64, y: f64) -> Result<()> {
        self.run(scripts::SCROLL_TO, vec![json!(x), json!(y)]).await?;
        Ok(())
    }

    async fn viewport(&self) -> Result<Viewport> {
        // Outer window size, the same unit `set_window_size` takes
        let (width, height) = self.client.get_window_size().await?;
        Ok(Viewport {
            width: u32::try_from(width).unwrap_or(u32::MAX),
            height: u32::try_from(height).unwrap_or(u32::MAX),
        })
    }

    async fn set_viewport(&self, viewport: Viewport) -> Result<()> {
        self.client
            .set_window_size(viewport.width, viewport.height)
            .await?;
        Ok(())
    }

    async fn scroll_into_view(&self, selector: &str) -> Result<bool> {
        let value = self.run(scripts::SCROLL_INTO_VIEW, vec![json!(selector)]).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn is_visible(&self, selector: &str) -> Result<bool> {
        let value = self.run(scripts::IS_VISIBLE, vec![json!(selector)]).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .client
            .find(Locator::Css(selector))
            .await
            .map_err(|_| Error::SelectorNotFound(selector.to_string()))?;

        if let Err(e) = element.click().await {
            // Overlays often intercept native clicks; fall back to a DOM click
            ::log::debug!("Native click on {} failed ({}), using DOM click", selector, e);
            let clicked = self.run(scripts::CLICK, vec![json!(selector)]).await?;
            if clicked.as_bool() != Some(true) {
                return Err(Error::SelectorNotFound(selector.to_string()));
            }
        }
        Ok(())
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        let value = self.run(scripts::COUNT, vec![json!(selector)]).await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    async fn press_key(&self, key: Key) -> Result<()> {
        let key = match key {
            Key::PageDown => WebDriverKey::PageDown,
            Key::End => WebDriverKey::End,
            Key::Home => WebDriverKey::Home,
        };
        let body = self.client.find(Locator::Css("body")).await?;
        body.send_keys(&char::from(key).to_string()).await?;
        Ok(())
    }

    async fn dispatch_hover(&self) -> Result<usize> {
        let value = self.run(scripts::DISPATCH_HOVER, vec![]).await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }
}
