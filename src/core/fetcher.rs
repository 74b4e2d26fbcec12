use crate::core::errors::{Error, Result};
use log::info;
use std::time::Duration;

/*-------------------------------------------------------------------------------------------------
  Fetcher
-------------------------------------------------------------------------------------------------*/

/// Retrieves the raw AWS IP Ranges JSON from a URL. Implementations make a single attempt;
/// any non-success outcome is reported as [Error::Fetch].
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/*-------------------------------------------------------------------------------------------------
  HTTP Fetcher
-------------------------------------------------------------------------------------------------*/

/// Blocking HTTPS [Fetcher] with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    timeout: u64,
}

impl HttpFetcher {
    /// Create an [HttpFetcher] whose requests time out after `timeout` milliseconds.
    pub fn new(timeout: u64) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_millis(timeout))
            .build()
            .map_err(|error| Error::Config(format!("unable to build HTTP client: {error}")))?;

        Ok(Self { client, timeout })
    }

    /// Request timeout in milliseconds.
    pub fn timeout(&self) -> u64 {
        self.timeout
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        info!("Get AWS IP Ranges from URL: GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|error| transport_error(url, error))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch {
                url: url.to_string(),
                status: Some(status.as_u16()),
                reason: status
                    .canonical_reason()
                    .unwrap_or("unsuccessful response")
                    .to_string(),
            });
        }

        let body = response
            .bytes()
            .map_err(|error| transport_error(url, error))?;

        info!("Get AWS IP Ranges from URL: {} ({} bytes)", status, body.len());
        Ok(body.to_vec())
    }
}

fn transport_error(url: &str, error: reqwest::Error) -> Error {
    Error::Fetch {
        url: url.to_string(),
        status: error.status().map(|status| status.as_u16()),
        reason: error.to_string(),
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
