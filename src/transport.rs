//! Byte-level transport to the anti-captcha API.

use crate::error::Result;
use async_trait::async_trait;
use rquest::{header, Client, Proxy};
use std::net::IpAddr;

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "https://api.anti-captcha.com";

/// Issues one request and returns the raw response body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST a JSON body to `path` (e.g. `/createTask`).
    async fn post(&self, path: &str, body: Vec<u8>) -> Result<Vec<u8>>;
}

/// HTTPS transport backed by `rquest`.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for `base_url`, optionally through a proxy and
    /// bound to a local address.
    pub fn new(
        base_url: impl Into<String>,
        proxy: Option<&str>,
        local_address: Option<IpAddr>,
    ) -> Result<Self> {
        let mut builder = Client::builder();

        if let Some(addr) = local_address {
            builder = builder.local_address(addr);
        }

        if let Some(proxy_url) = proxy {
            builder = builder.proxy(Proxy::all(proxy_url)?);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, path: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        let url = format!("{}{}", self.base_url, path);
        let bytes = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalised() {
        let transport = HttpTransport::new("https://api.example.test/", None, None).unwrap();
        assert_eq!(transport.base_url(), "https://api.example.test");
    }
}
