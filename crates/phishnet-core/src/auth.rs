//! Per-user auth key negotiation and the session's credential cache.
//!
//! A phish.net user who has granted an application access can be acted on
//! behalf of once the application proves it holds the private salt paired
//! with its API key:
//!
//! ```text
//! unique_hash = hex(md5(private_salt + api_key + uid))
//! POST authority/get {apikey, uid, unique_hash} -> {appid, authkey}
//! ```
//!
//! The key is cached for the session. Asking again for the same uid is
//! answered from the cache without touching the network.

use std::fmt::{Debug, Formatter};

use md5::{Digest, Md5};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::catalog::GET_AUTHORITY;
use crate::error::{AuthError, PhishnetError, Result};
use crate::http_client::HttpMethod;
use crate::params::Params;
use crate::pipeline::{RequestPipeline, USER_ID_FIELD};
use crate::response::ApiResponse;

pub const UNIQUE_HASH_FIELD: &str = "unique_hash";

/// Credentials for acting on behalf of one user.
#[derive(Clone, PartialEq, Eq)]
pub struct Authorization {
    pub user_id: u64,
    pub auth_key: String,
    pub app_id: u64,
}

impl Debug for Authorization {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorization")
            .field("user_id", &self.user_id)
            .field("auth_key", &"<redacted>")
            .field("app_id", &self.app_id)
            .finish()
    }
}

/// Mutable authorization state of one client session.
///
/// The cached [`Authorization`] is replaced as a whole, so a reader can never
/// see a key paired with the wrong uid.
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    active_user: Option<u64>,
    authorization: Option<Authorization>,
}

impl AuthState {
    pub fn new() -> Self {
        Self::default()
    }

    /// User privileged calls are made for, set by a successful `authorize`.
    pub fn active_user(&self) -> Option<u64> {
        self.active_user
    }

    pub fn authorization(&self) -> Option<&Authorization> {
        self.authorization.as_ref()
    }

    /// Cached credentials, only if they belong to `user_id`.
    pub fn cached(&self, user_id: u64) -> Option<&Authorization> {
        self.authorization
            .as_ref()
            .filter(|auth| auth.user_id == user_id && !auth.auth_key.is_empty())
    }

    /// Cached credentials of the active user.
    pub fn active(&self) -> Option<&Authorization> {
        self.active_user.and_then(|user_id| self.cached(user_id))
    }

    pub fn activate(&mut self, user_id: u64) {
        self.active_user = Some(user_id);
    }

    pub fn store(&mut self, authorization: Authorization) {
        self.authorization = Some(authorization);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// `hex(md5(private_salt + api_key + user_id))`, lowercase.
pub fn unique_hash(private_salt: &str, api_key: &str, user_id: u64) -> String {
    let mut hasher = Md5::new();
    hasher.update(private_salt.as_bytes());
    hasher.update(api_key.as_bytes());
    hasher.update(user_id.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Fetches auth keys through a [`RequestPipeline`] and caches them in an
/// [`AuthState`].
pub struct AuthNegotiator<'a> {
    pipeline: &'a RequestPipeline,
}

impl<'a> AuthNegotiator<'a> {
    pub fn new(pipeline: &'a RequestPipeline) -> Self {
        Self { pipeline }
    }

    /// Returns the auth key for `user_id`, negotiating it when the cache
    /// holds nothing for that user.
    #[instrument(name = "phishnet_auth", skip_all, fields(uid = user_id))]
    pub async fn get_auth_key(
        &self,
        state: &mut AuthState,
        user_id: u64,
        private_salt: &str,
    ) -> Result<Authorization> {
        if let Some(cached) = state.cached(user_id) {
            debug!("auth key cache hit");
            return Ok(cached.clone());
        }

        let authorization = self
            .negotiate(user_id, private_salt)
            .await
            .map_err(|source| AuthError::Negotiation {
                user_id,
                source: Box::new(source),
            })?;

        info!(app_id = authorization.app_id, "negotiated auth key");
        state.store(authorization.clone());
        Ok(authorization)
    }

    async fn negotiate(&self, user_id: u64, private_salt: &str) -> Result<Authorization> {
        let hash = unique_hash(private_salt, &self.pipeline.config().api_key, user_id);
        let params = Params::new()
            .with(USER_ID_FIELD, user_id)
            .with(UNIQUE_HASH_FIELD, hash);

        let response = self
            .pipeline
            .send(HttpMethod::Post, &GET_AUTHORITY, params)
            .await?;
        parse_authority(user_id, &response).map_err(PhishnetError::from)
    }
}

fn parse_authority(
    user_id: u64,
    response: &ApiResponse,
) -> std::result::Result<Authorization, AuthError> {
    let data = &response.data;

    let app_id = match data.get("appid") {
        Some(Value::Number(number)) => number.as_u64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    }
    .ok_or(AuthError::MalformedAuthority { field: "appid" })?;

    let auth_key = data
        .get("authkey")
        .and_then(Value::as_str)
        .filter(|key| !key.is_empty())
        .ok_or(AuthError::MalformedAuthority { field: "authkey" })?;

    Ok(Authorization {
        user_id,
        auth_key: auth_key.to_owned(),
        app_id,
    })
}
