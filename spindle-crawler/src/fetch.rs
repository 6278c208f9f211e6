use crate::error::Result;
use fantoccini::Locator;
use reqwest::Client;
use reqwest::header::REFERER;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "Spindle/0.3 (https://github.com/mhaske/spindle)";

/// Resolves a URL to its HTML body. `Static` issues a plain HTTP GET;
/// `Rendered` drives a WebDriver session so pages can finish rendering
/// (optionally waiting on a selector or a fixed duration) before the source
/// is read.
pub enum PageFetcher {
    Static(Client),
    Rendered(fantoccini::Client),
}

/// Per-request options honored by [`PageFetcher::fetch`].
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub referrer: Option<String>,
    pub wait: Option<WaitFor>,
}

/// Wait condition applied by the rendered fetcher after navigation.
#[derive(Debug, Clone)]
pub enum WaitFor {
    /// Poll for an element matching the CSS selector, bounded by the
    /// timeout.
    Selector(String, Duration),
    /// Sleep for a fixed duration before reading the page source.
    Sleep(Duration),
}

/// Build the HTTP client with the connection settings a polite crawler
/// wants. Shared between the static fetcher and the binary downloader.
pub fn default_client(user_agent: &str, timeout: Duration) -> Client {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout / 2)
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .expect("Failed to create HTTP client")
}

impl PageFetcher {
    pub fn new_static(user_agent: &str, timeout: Duration) -> Self {
        Self::Static(default_client(user_agent, timeout))
    }

    pub fn new_rendered(client: fantoccini::Client) -> Self {
        Self::Rendered(client)
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered(_))
    }

    /// Fetch `url` and return the page body. Non-2xx responses fail.
    pub async fn fetch(&self, url: &Url, options: &FetchOptions) -> Result<String> {
        debug!("fetching {}", url);
        match self {
            Self::Static(client) => {
                let mut request = client.get(url.clone());
                if let Some(referrer) = &options.referrer {
                    request = request.header(REFERER, referrer.as_str());
                }
                let response = request.send().await?.error_for_status()?;
                Ok(response.text().await?)
            }
            Self::Rendered(client) => {
                client.goto(url.as_str()).await?;
                match &options.wait {
                    Some(WaitFor::Selector(css, timeout)) => {
                        client
                            .wait()
                            .at_most(*timeout)
                            .for_element(Locator::Css(css.as_str()))
                            .await?;
                    }
                    Some(WaitFor::Sleep(duration)) => {
                        tokio::time::sleep(*duration).await;
                    }
                    None => {}
                }
                Ok(client.source().await?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fetcher_is_static() {
        let fetcher = PageFetcher::new_static(DEFAULT_USER_AGENT, Duration::from_secs(10));
        assert!(!fetcher.is_rendered());
    }
}
