//! Raw HTTP request layer.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Method;

use crate::error::{IdpError, IdpResult};

/// Issues single HTTP requests with a fixed client-side timeout.
///
/// The response body is always read to the end before returning, on success
/// and on error status alike, so the connection goes back to the pool. No
/// request is ever retried here.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    /// Creates a transport applying `timeout` to every request.
    pub fn new(timeout: Duration) -> IdpResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IdpError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, timeout })
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends a request and returns the full response body.
    ///
    /// Fails with [`IdpError::Transport`] if no response arrives (including
    /// timeouts) and with [`IdpError::HttpStatus`] for non-2xx responses.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> IdpResult<Vec<u8>> {
        let mut request = self.client.request(method.clone(), url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        tracing::debug!(%method, url, status = status.as_u16(), len = bytes.len(), "IdP request");

        if status.is_success() {
            Ok(bytes.to_vec())
        } else {
            Err(IdpError::HttpStatus {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&bytes).into_owned(),
            })
        }
    }
}
