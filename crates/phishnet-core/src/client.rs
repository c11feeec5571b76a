use std::sync::Arc;

use tracing::{info, instrument};

use crate::auth::{AuthNegotiator, AuthState, Authorization};
use crate::catalog::{self, Endpoint};
use crate::config::ClientConfig;
use crate::error::{AuthError, Result};
use crate::http_client::{HttpClient, HttpMethod, ReqwestHttpClient};
use crate::params::Params;
use crate::pipeline::RequestPipeline;
use crate::response::ApiResponse;
use crate::validate::ParamValidator;

/// Session with the phish.net API.
///
/// Every call runs validate, authenticate, then send. Validation and
/// credential failures return before anything reaches the transport.
///
/// A client holds one user's authorization at a time. Methods that can
/// change it take `&mut self`; wrap the client in a mutex to share it.
pub struct PhishnetClient {
    pipeline: RequestPipeline,
    validator: ParamValidator,
    auth: AuthState,
    /// Salt from the last successful `authorize`, reused for re-negotiation.
    private_salt: Option<String>,
}

impl PhishnetClient {
    /// Builds a client over the reqwest transport.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestHttpClient::new(config.verify_tls)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Builds a client over any [`HttpClient`].
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpClient>) -> Self {
        Self {
            pipeline: RequestPipeline::new(config, transport),
            validator: ParamValidator::new(),
            auth: AuthState::new(),
            private_salt: None,
        }
    }

    /// Replaces the validator, e.g. to pin the current year.
    pub fn with_validator(mut self, validator: ParamValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        self.pipeline.config()
    }

    pub fn auth_state(&self) -> &AuthState {
        &self.auth
    }

    /// User privileged calls act for.
    pub fn user_id(&self) -> Option<u64> {
        self.auth.active_user()
    }

    pub fn auth_key(&self) -> Option<&str> {
        self.auth.active().map(|auth| auth.auth_key.as_str())
    }

    /// Application id reported by the last negotiation, else the configured one.
    pub fn app_id(&self) -> Option<u64> {
        self.auth
            .authorization()
            .map(|auth| auth.app_id)
            .or(self.config().app_id)
    }

    /// Authorizes this session to make privileged calls for `user_id`.
    ///
    /// The user must already have granted the application access on
    /// phish.net. At most one network call per distinct user.
    #[instrument(name = "phishnet_authorize", skip(self, private_salt))]
    pub async fn authorize(&mut self, user_id: u64, private_salt: &str) -> Result<()> {
        self.get_auth_key(user_id, private_salt).await?;
        self.auth.activate(user_id);
        self.private_salt = Some(private_salt.to_owned());
        info!("session authorized");
        Ok(())
    }

    /// [`authorize`](Self::authorize) with the salt from [`ClientConfig`].
    pub async fn authorize_configured(&mut self, user_id: u64) -> Result<()> {
        let private_salt = self
            .config()
            .private_salt
            .clone()
            .ok_or(AuthError::MissingPrivateSalt { user_id })?;
        self.authorize(user_id, &private_salt).await
    }

    /// Auth key for `user_id`, from the cache when possible. Does not change
    /// the active user.
    pub async fn get_auth_key(&mut self, user_id: u64, private_salt: &str) -> Result<String> {
        self.pipeline.check_api_key(&catalog::GET_AUTHORITY)?;
        let authorization = AuthNegotiator::new(&self.pipeline)
            .get_auth_key(&mut self.auth, user_id, private_salt)
            .await?;
        Ok(authorization.auth_key)
    }

    /// Runs a catalog operation with the configured retry budget.
    pub async fn call(&mut self, endpoint: &Endpoint<'_>, params: Params) -> Result<ApiResponse> {
        let retries = self.config().retry.max_retries;
        self.call_with(HttpMethod::Post, endpoint, params, retries).await
    }

    /// Posts to `path`. Known paths pick up their catalog metadata, so
    /// privileged paths are authenticated and validated like typed calls.
    pub async fn post(&mut self, path: &str, params: Params) -> Result<ApiResponse> {
        let retries = self.config().retry.max_retries;
        let endpoint = resolve(path);
        self.call_with(HttpMethod::Post, &endpoint, params, retries).await
    }

    /// Lowest-level entry: any method name, any path, explicit retry budget.
    /// Methods other than GET and POST fail before anything is sent.
    pub async fn request(
        &mut self,
        method: &str,
        path: &str,
        params: Params,
        retries: u32,
    ) -> Result<ApiResponse> {
        let method: HttpMethod = method.parse()?;
        let endpoint = resolve(path);
        self.call_with(method, &endpoint, params, retries).await
    }

    async fn call_with(
        &mut self,
        method: HttpMethod,
        endpoint: &Endpoint<'_>,
        params: Params,
        retries: u32,
    ) -> Result<ApiResponse> {
        self.validator.validate(endpoint, &params)?;
        self.pipeline.check_api_key(endpoint)?;

        let user = if endpoint.requires_auth {
            Some(self.resolve_authorization(endpoint).await?)
        } else {
            None
        };

        self.pipeline
            .send_with_retries(method, endpoint, params, user.as_ref(), retries)
            .await
    }

    /// Credentials of the active user, negotiated on demand when the cache
    /// was replaced by a lookup for another user.
    async fn resolve_authorization(&mut self, endpoint: &Endpoint<'_>) -> Result<Authorization> {
        let user_id = self
            .auth
            .active_user()
            .ok_or_else(|| AuthError::NoAuthorizedUser {
                endpoint: endpoint.path.to_owned(),
            })?;

        if let Some(cached) = self.auth.cached(user_id) {
            return Ok(cached.clone());
        }

        let private_salt = self
            .private_salt
            .clone()
            .or_else(|| self.config().private_salt.clone())
            .ok_or(AuthError::MissingPrivateSalt { user_id })?;

        AuthNegotiator::new(&self.pipeline)
            .get_auth_key(&mut self.auth, user_id, &private_salt)
            .await
    }
}

fn resolve(path: &str) -> Endpoint<'_> {
    match catalog::lookup_path(path) {
        Some(endpoint) => *endpoint,
        None => Endpoint::custom(path.trim_matches('/')),
    }
}
