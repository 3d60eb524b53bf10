//! Authenticated request layer over the admin endpoint.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::endpoint::EndpointResolver;
use crate::error::{IdpError, IdpResult};
use crate::http::HttpTransport;
use crate::token::{Token, TokenBroker};

/// Issues admin API requests carrying a bearer token.
///
/// The client holds no mutable state. Callers obtain headers once per
/// operation with [`IdentityClient::auth_headers`] and pass them to every
/// request of that operation.
#[derive(Clone)]
pub struct IdentityClient {
    transport: HttpTransport,
    broker: TokenBroker,
    endpoints: EndpointResolver,
}

impl IdentityClient {
    /// Creates a client.
    pub fn new(transport: HttpTransport, broker: TokenBroker, endpoints: EndpointResolver) -> Self {
        Self {
            transport,
            broker,
            endpoints,
        }
    }

    /// Returns the token broker.
    #[must_use]
    pub fn broker(&self) -> &TokenBroker {
        &self.broker
    }

    /// Builds JSON request headers carrying `token`.
    pub fn headers_for(token: &Token) -> IdpResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&token.bearer())
            .map_err(|e| IdpError::Auth(format!("token is not a valid header value: {e}")))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Obtains a fresh admin token and builds request headers from it.
    pub async fn auth_headers(&self) -> IdpResult<HeaderMap> {
        let token = self.broker.admin_token().await?;
        Self::headers_for(&token)
    }

    /// Joins `path` onto the admin endpoint.
    pub async fn admin_url(&self, path: &str) -> IdpResult<String> {
        let base = self.endpoints.admin().await?;
        Ok(format!("{base}/{}", path.trim_start_matches('/')))
    }

    /// Sends a request to the admin endpoint and returns the response body.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        headers: &HeaderMap,
        body: Option<Vec<u8>>,
    ) -> IdpResult<Vec<u8>> {
        let url = self.admin_url(path).await?;
        self.transport
            .request(method, &url, headers.clone(), body)
            .await
    }

    /// GETs `path` and decodes the JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, headers: &HeaderMap) -> IdpResult<T> {
        let body = self.request(Method::GET, path, headers, None).await?;
        serde_json::from_slice(&body)
            .map_err(|e| IdpError::directory(format!("undecodable response from {path}: {e}")))
    }

    /// POSTs a JSON body, ignoring the response body.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        headers: &HeaderMap,
    ) -> IdpResult<()> {
        self.send_json(Method::POST, path, body, headers).await
    }

    /// PUTs a JSON body, ignoring the response body.
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        headers: &HeaderMap,
    ) -> IdpResult<()> {
        self.send_json(Method::PUT, path, body, headers).await
    }

    /// DELETEs `path`, optionally with a JSON body.
    pub async fn delete<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
        headers: &HeaderMap,
    ) -> IdpResult<()> {
        let body = body.map(encode).transpose()?;
        self.request(Method::DELETE, path, headers, body).await?;
        Ok(())
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        headers: &HeaderMap,
    ) -> IdpResult<()> {
        let body = encode(body)?;
        self.request(method, path, headers, Some(body)).await?;
        Ok(())
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> IdpResult<Vec<u8>> {
    serde_json::to_vec(body).map_err(|e| IdpError::Config(format!("unencodable request body: {e}")))
}
