//! Request pipeline: build, send with bounded retry, classify.
//!
//! # Stages
//!
//! ```text
//! params ──▶ inject apikey ──▶ inject authkey/uid ──▶ encode ──▶ send ──┬─▶ decode ─▶ ApiResponse
//!            (every call)       (privileged only)                      │            └▶ Api error
//!                                                                      └─▶ transport failure
//!                                                                            ├─ budget left: retry
//!                                                                            └─ exhausted: RetriesExhausted
//! ```
//!
//! The request is built once per call. Retries resend the same encoded
//! request, including any injected credentials. Only transport failures are
//! retried; an `error_code > 0` payload is returned to the caller at once.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::auth::Authorization;
use crate::catalog::Endpoint;
use crate::config::ClientConfig;
use crate::error::{AuthError, PhishnetError, Result};
use crate::http_client::{HttpClient, HttpError, HttpMethod, HttpRequest};
use crate::params::Params;
use crate::response::ApiResponse;

pub const API_KEY_FIELD: &str = "apikey";
pub const AUTH_KEY_FIELD: &str = "authkey";
pub const USER_ID_FIELD: &str = "uid";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

pub struct RequestPipeline {
    config: ClientConfig,
    transport: Arc<dyn HttpClient>,
}

impl RequestPipeline {
    pub fn new(config: ClientConfig, transport: Arc<dyn HttpClient>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends an application-key call with the configured retry budget.
    pub async fn send(
        &self,
        method: HttpMethod,
        endpoint: &Endpoint<'_>,
        params: Params,
    ) -> Result<ApiResponse> {
        self.send_with_retries(method, endpoint, params, None, self.config.retry.max_retries)
            .await
    }

    /// Full form of [`send`](Self::send): optional user credentials and an
    /// explicit retry budget.
    pub async fn send_with_retries(
        &self,
        method: HttpMethod,
        endpoint: &Endpoint<'_>,
        params: Params,
        user: Option<&Authorization>,
        retries: u32,
    ) -> Result<ApiResponse> {
        let request = self.build(method, endpoint, params, user)?;
        self.execute(endpoint, request, retries).await
    }

    /// Merges credentials into `params` and encodes the HTTP request.
    pub fn build(
        &self,
        method: HttpMethod,
        endpoint: &Endpoint<'_>,
        params: Params,
        user: Option<&Authorization>,
    ) -> Result<HttpRequest> {
        let mut params = self.inject_api_key(endpoint, params)?;

        if endpoint.requires_auth {
            let user = user.ok_or_else(|| AuthError::NoAuthorizedUser {
                endpoint: endpoint.path.to_owned(),
            })?;
            inject_user(&mut params, user);
        }

        Ok(self.encode(method, endpoint, &params))
    }

    /// Fails when no API key is configured. Every call needs one.
    pub fn check_api_key(&self, endpoint: &Endpoint<'_>) -> Result<()> {
        if self.config.api_key.trim().is_empty() {
            return Err(AuthError::MissingApiKey {
                endpoint: endpoint.path.to_owned(),
            }
            .into());
        }
        Ok(())
    }

    fn inject_api_key(&self, endpoint: &Endpoint<'_>, mut params: Params) -> Result<Params> {
        self.check_api_key(endpoint)?;
        params.insert(API_KEY_FIELD, self.config.api_key.as_str());
        Ok(params)
    }

    fn encode(&self, method: HttpMethod, endpoint: &Endpoint<'_>, params: &Params) -> HttpRequest {
        let url = self.config.endpoint_url(endpoint.path);
        let form = params.to_form_string();
        let request = match method {
            HttpMethod::Post => HttpRequest::post(url)
                .with_header("content-type", FORM_CONTENT_TYPE)
                .with_body(form),
            HttpMethod::Get if form.is_empty() => HttpRequest::get(url),
            HttpMethod::Get => HttpRequest::get(format!("{url}?{form}")),
        };

        debug!(
            endpoint = endpoint.path,
            method = %method,
            fields = params.len(),
            "built request"
        );
        request.with_timeout_ms(self.config.timeout_ms())
    }

    /// Sends `request`, retrying transport failures up to `retries` times.
    #[instrument(
        name = "phishnet_request",
        skip_all,
        fields(endpoint = endpoint.path, method = %request.method, retries = retries)
    )]
    pub async fn execute(
        &self,
        endpoint: &Endpoint<'_>,
        request: HttpRequest,
        retries: u32,
    ) -> Result<ApiResponse> {
        let mut remaining = retries;
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let failure = match self.attempt(endpoint, request.clone()).await {
                Ok(body) => return ApiResponse::decode(endpoint.path, &body),
                Err(failure) => failure,
            };

            if !failure.retryable() {
                return Err(PhishnetError::Transport {
                    endpoint: endpoint.path.to_owned(),
                    source: failure,
                });
            }

            if remaining == 0 {
                warn!(attempts, error = %failure, "retry budget exhausted");
                return Err(PhishnetError::RetriesExhausted {
                    endpoint: endpoint.path.to_owned(),
                    attempts,
                    source: failure,
                });
            }

            remaining -= 1;
            warn!(attempt = attempts, remaining, error = %failure, "transport failure, retrying");

            let delay = self.config.retry.delay_for_attempt(attempts - 1);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    /// One HTTP exchange. Anything other than a non-empty 200 is a transport failure.
    async fn attempt(
        &self,
        endpoint: &Endpoint<'_>,
        request: HttpRequest,
    ) -> std::result::Result<String, HttpError> {
        let response = self.transport.execute(request).await?;
        debug!(status = response.status, "received response");

        if !response.is_success() {
            return Err(HttpError::new(format!(
                "{} returned HTTP status {}",
                endpoint.path, response.status
            )));
        }
        if response.body.trim().is_empty() {
            return Err(HttpError::new(format!(
                "unable to retrieve HTTP response from {}",
                endpoint.path
            )));
        }

        Ok(response.body)
    }
}

fn inject_user(params: &mut Params, user: &Authorization) {
    params.insert(AUTH_KEY_FIELD, user.auth_key.as_str());
    params.insert(USER_ID_FIELD, user.user_id);
}
