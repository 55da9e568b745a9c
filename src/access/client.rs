//! HTTP client for the access endpoints with a consistent timeout and error
//! mapping. Backend `detail` messages are preserved verbatim so the caller can
//! show them; every other failure carries no user-facing detail.

use crate::{
    APP_USER_AGENT,
    access::{
        error::AccessError,
        types::{AccessCode, AccessRequest, ErrorBody, VerifyCodeRequest, VerifyCodeResponse},
    },
};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::{future::Future, time::Duration};
use tracing::{debug, error, instrument, warn};
use url::Url;

/// Default request timeout applied to every call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const ACCESS_REQUESTS_PATH: &str = "/access-requests";
pub const ACCESS_VERIFY_PATH: &str = "/access-verify";
pub const PENDING_CODES_PATH: &str = "/access-requests/pending";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl ClientConfig {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Backend operations the access flow depends on.
pub trait AccessBackend {
    fn submit_request(
        &self,
        request: &AccessRequest,
    ) -> impl Future<Output = Result<(), AccessError>>;

    fn exchange_code(
        &self,
        request: &VerifyCodeRequest,
    ) -> impl Future<Output = Result<SecretString, AccessError>>;

    fn pending_codes(
        &self,
        session: Option<&SecretString>,
    ) -> impl Future<Output = Result<Vec<AccessCode>, AccessError>>;
}

#[derive(Clone, Debug)]
pub struct AccessClient {
    http: Client,
    base_url: Url,
}

impl AccessClient {
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, AccessError> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `POST /access-requests`
    ///
    /// # Errors
    /// Returns the backend detail on a non-success status, or a transport error.
    #[instrument(skip_all, fields(page_route = %request.page_route))]
    pub async fn submit_request(&self, request: &AccessRequest) -> Result<(), AccessError> {
        let response = self
            .http
            .post(self.endpoint(ACCESS_REQUESTS_PATH))
            .json(request)
            .send()
            .await?;

        ensure_success(response).await?;
        debug!("access request accepted");
        Ok(())
    }

    /// `POST /access-verify`, returning the raw signed token.
    ///
    /// # Errors
    /// Returns the backend detail on a non-success status, a transport error, or
    /// [`AccessError::MalformedGrant`] when a successful response has no token.
    #[instrument(skip_all, fields(page_route = %request.page_route))]
    pub async fn exchange_code(
        &self,
        request: &VerifyCodeRequest,
    ) -> Result<SecretString, AccessError> {
        let response = self
            .http
            .post(self.endpoint(ACCESS_VERIFY_PATH))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = ensure_success(response).await?.text().await?;

        let parsed: VerifyCodeResponse = serde_json::from_str(&body).unwrap_or_default();
        match parsed.access_token {
            Some(token) if !token.trim().is_empty() => Ok(SecretString::from(token)),
            _ => {
                error!(
                    status = status.as_u16(),
                    "verification succeeded without an access token in the response"
                );
                Err(AccessError::MalformedGrant)
            }
        }
    }

    /// `GET /access-requests/pending`
    ///
    /// # Errors
    /// Returns the backend detail on a non-success status, a transport error, or
    /// a parse error when the body is not a list of codes.
    #[instrument(skip_all)]
    pub async fn pending_codes(
        &self,
        session: Option<&SecretString>,
    ) -> Result<Vec<AccessCode>, AccessError> {
        let mut request = self.http.get(self.endpoint(PENDING_CODES_PATH));
        if let Some(token) = session {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let codes: Vec<AccessCode> = parse_json(ensure_success(response).await?).await?;
        debug!(count = codes.len(), "pending codes fetched");
        Ok(codes)
    }

    fn endpoint(&self, path: &str) -> String {
        build_url_with_base(self.base_url.as_str(), path)
    }
}

impl AccessBackend for AccessClient {
    fn submit_request(
        &self,
        request: &AccessRequest,
    ) -> impl Future<Output = Result<(), AccessError>> {
        AccessClient::submit_request(self, request)
    }

    fn exchange_code(
        &self,
        request: &VerifyCodeRequest,
    ) -> impl Future<Output = Result<SecretString, AccessError>> {
        AccessClient::exchange_code(self, request)
    }

    fn pending_codes(
        &self,
        session: Option<&SecretString>,
    ) -> impl Future<Output = Result<Vec<AccessCode>, AccessError>> {
        AccessClient::pending_codes(self, session)
    }
}

/// Joins a base URL and a path without doubling or dropping slashes.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

async fn ensure_success(response: Response) -> Result<Response, AccessError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|body| body.detail_text());

    warn!(status = status.as_u16(), has_detail = detail.is_some(), "request rejected");

    Err(AccessError::Backend {
        status: status.as_u16(),
        detail,
    })
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, AccessError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|err| AccessError::Parse(err.to_string()))
}
