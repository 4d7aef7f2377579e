use std::time::Duration;

use anyhow::Context;
use log::debug;

use crate::config::HttpConfig;

/// Fetches a page body as text.
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> anyhow::Result<String>;
}

/// Blocking HTTP client backed by `ureq`.
pub struct HttpFetcher {
    agent: ureq::Agent,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(config.connect_timeout_secs))
            .timeout_read(Duration::from_secs(config.read_timeout_secs))
            .timeout_write(Duration::from_secs(config.read_timeout_secs))
            .build();
        Self {
            agent,
            user_agent: config.user_agent.clone(),
        }
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> anyhow::Result<String> {
        debug!("GET {url}");
        let response = self
            .agent
            .get(url)
            .set("User-Agent", &self.user_agent)
            .set("Accept-Language", "en-US,en;q=0.8")
            .call()
            .with_context(|| format!("request to {url} failed"))?;
        response
            .into_string()
            .with_context(|| format!("failed to read body of {url}"))
    }
}

/// Appends `query` to a base url that ends with its query parameter.
pub fn query_url(base: &str, query: &str) -> String {
    format!("{base}{}", urlencoding::encode(query))
}
