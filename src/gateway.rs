//! Session gateway: the single point of authenticated access to the Remote API.
//!
//! DESIGN
//! ======
//! Every authenticated call goes through `authenticated_request`:
//!
//! ```text
//! no token ───────────────────────────────► Unauthenticated (no request sent)
//! attempt 1 (Bearer T) ── non-401 ────────► done, response returned as-is
//!        └── 401 ──► refresh(T) ── ok ────► attempt 2 (Bearer T') ► done
//!                               └─ fail ──► clear session ► SessionExpired
//! ```
//!
//! Exactly one refresh per call and no loop. Transport failures at any step
//! propagate unchanged and are never retried.
//!
//! SINGLE-FLIGHT REFRESH
//! =====================
//! Refreshes are serialized behind `refresh_lock`. A caller holding a 401 for
//! token `T` re-reads the store after acquiring the lock: a different token
//! means another caller already refreshed, so it replays with that token; an
//! absent token means the session was torn down meanwhile. Concurrent 401s
//! for one expired token therefore cost one refresh.
//!
//! ERROR HANDLING
//! ==============
//! `login`, `logout`, and `verify_session` absorb their failures (logged,
//! reflected in session state). Resource calls return `Result` so the caller
//! decides how to tell the user.

use std::sync::Arc;

use serde_json::json;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::models::{SessionUser, TokenBody, WhoAmI, parse_json};
use crate::session::{FileTokenStore, Session};
use crate::transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};

pub const LOGIN_PATH: &str = "/login";
pub const USER_PATH: &str = "/user";
pub const REFRESH_PATH: &str = "/refresh-token";
pub const LOGOUT_PATH: &str = "/admin/logout";

/// Cheap to clone; clones share the session and the refresh lock.
#[derive(Clone)]
pub struct SessionGateway {
    transport: Arc<dyn Transport>,
    session: Arc<Session>,
    refresh_lock: Arc<tokio::sync::Mutex<()>>,
}

impl SessionGateway {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, session: Session) -> Self {
        Self { transport, session: Arc::new(session), refresh_lock: Arc::new(tokio::sync::Mutex::new(())) }
    }

    /// Production wiring: `reqwest` transport plus a file-backed token store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let transport = ReqwestTransport::new(&config.api_base_url, config.connect_timeout())?;
        let session = Session::new(FileTokenStore::new(&config.token_file));
        Ok(Self::new(Arc::new(transport), session))
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn current_user(&self) -> Option<SessionUser> {
        self.session.user()
    }

    /// `true` until [`SessionGateway::verify_session`] has completed.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.session.is_loading()
    }

    // =========================================================================
    // LOGIN / LOGOUT / VERIFY
    // =========================================================================

    /// Sign in. The token is persisted only when both the login and the
    /// follow-up identity lookup succeed.
    pub async fn login(&self, identifier: &str, secret: &str) -> bool {
        match self.try_login(identifier, secret).await {
            Ok(user) => {
                tracing::info!(user_id = user.id, name = %user.name, "signed in");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "login failed");
                false
            }
        }
    }

    async fn try_login(&self, identifier: &str, secret: &str) -> Result<SessionUser, GatewayError> {
        let request = ApiRequest::post(LOGIN_PATH).json(json!({ "email": identifier, "password": secret }));
        let response = self.transport.send(&request).await?.error_for_status()?;
        let TokenBody { token } = parse_json(&response.body)?;

        self.session.set_token(&token)?;
        match self.fetch_current_user().await {
            Ok(user) => {
                self.session.set_user(user.clone());
                Ok(user)
            }
            Err(e) => {
                self.session.clear();
                Err(e)
            }
        }
    }

    /// Best-effort server logout, then unconditional local teardown.
    /// Safe to call repeatedly.
    pub async fn logout(&self) {
        match self.authenticated_request(ApiRequest::post(LOGOUT_PATH)).await {
            Ok(response) if response.is_success() => tracing::debug!("server session closed"),
            Ok(response) => tracing::warn!(status = response.status, "logout rejected by server"),
            Err(GatewayError::Unauthenticated) => tracing::debug!("logout without a stored token"),
            Err(e) => tracing::warn!(error = %e, "logout request failed"),
        }
        self.session.clear();
    }

    /// Startup check: validate a stored token and load the user. Clears the
    /// loading flag on every path.
    pub async fn verify_session(&self) {
        match self.session.token() {
            Ok(None) => {}
            Ok(Some(_)) => match self.fetch_current_user().await {
                Ok(user) => {
                    tracing::debug!(user_id = user.id, "stored session verified");
                    self.session.set_user(user);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stored session invalid; discarding token");
                    self.session.clear();
                }
            },
            Err(e) => tracing::warn!(error = %e, "token store unreadable"),
        }
        self.session.finish_loading();
    }

    async fn fetch_current_user(&self) -> Result<SessionUser, GatewayError> {
        let response = self.authenticated_request(ApiRequest::get(USER_PATH)).await?.error_for_status()?;
        let who: WhoAmI = parse_json(&response.body)?;
        Ok(who.into())
    }

    // =========================================================================
    // AUTHENTICATED REQUESTS
    // =========================================================================

    /// Send `request` with the current token, refreshing and replaying once
    /// on a 401. Non-401 statuses are returned for the caller to inspect.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Unauthenticated`] when no token is stored (nothing is sent)
    /// - [`GatewayError::SessionExpired`] when the refresh was refused
    /// - [`GatewayError::Transport`] when any step failed to get a response
    pub async fn authenticated_request(&self, request: ApiRequest) -> Result<ApiResponse, GatewayError> {
        let Some(token) = self.session.token()? else {
            return Err(GatewayError::Unauthenticated);
        };

        let response = self.transport.send(&request.clone().with_bearer(&token)).await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        tracing::debug!(path = %request.path, "token rejected; refreshing");
        let fresh = self.refresh_after_rejection(&token).await?;
        self.transport.send(&request.with_bearer(&fresh)).await
    }

    async fn refresh_after_rejection(&self, rejected: &str) -> Result<String, GatewayError> {
        let _guard = self.refresh_lock.lock().await;

        match self.session.token()? {
            None => return Err(GatewayError::SessionExpired),
            Some(current) if current != rejected => return Ok(current),
            Some(_) => {}
        }

        let request = ApiRequest::post(REFRESH_PATH).json(json!({ "token": rejected }));
        let response = self.transport.send(&request).await?;
        let refreshed = if response.is_success() {
            parse_json::<TokenBody>(&response.body).ok()
        } else {
            None
        };

        let Some(TokenBody { token }) = refreshed else {
            tracing::warn!(status = response.status, "token refresh refused; ending session");
            self.session.clear();
            return Err(GatewayError::SessionExpired);
        };

        self.session.set_token(&token)?;
        tracing::info!("session token refreshed");
        Ok(token)
    }

    /// Authenticated request that must come back 2xx.
    pub(crate) async fn send_expecting_success(&self, request: ApiRequest) -> Result<ApiResponse, GatewayError> {
        self.authenticated_request(request).await?.error_for_status()
    }

    /// Unauthenticated request (public forms) that must come back 2xx.
    pub(crate) async fn send_public(&self, request: ApiRequest) -> Result<ApiResponse, GatewayError> {
        self.transport.send(&request).await?.error_for_status()
    }
}

#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;
