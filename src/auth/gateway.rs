//! The auth gateway: turns an identity claim into a verified session.
//!
//! Every login path ends the same way: a token is issued, the profile is
//! fetched with that token, and only when both succeeded is the pair committed
//! to the session store. A failure anywhere in between leaves the session
//! exactly as it was.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::validation::{validate_code, validate_credentials, validate_identity};
use crate::error::AuthError;
use crate::http::ApiClient;
use crate::models::{
    mask_identity, CredentialsLoginRequest, LoginRequest, OtpChallenge, TokenResponse, User,
    VerifyOtpRequest,
};
use crate::session::SessionStore;

pub const LOGIN_PATH: &str = "/auth/login";
pub const VERIFY_OTP_PATH: &str = "/auth/verify-otp";
pub const PROFILE_PATH: &str = "/auth/me";
pub const ADMIN_LOGIN_PATH: &str = "/auth/admin/login";
pub const PROVIDER_LOGIN_PATH: &str = "/auth/sp/login";

pub struct AuthGateway {
    client: Arc<ApiClient>,
    session: Arc<SessionStore>,
}

impl AuthGateway {
    pub fn new(client: Arc<ApiClient>, session: Arc<SessionStore>) -> Self {
        AuthGateway { client, session }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Asks the backend to send a one-time code for `identity`.
    pub async fn request_code(&self, identity: &str) -> Result<OtpChallenge, AuthError> {
        let identity = validate_identity(identity)?;
        debug!(aadhar = %mask_identity(identity), "requesting one-time code");

        let challenge: OtpChallenge = self
            .client
            .post(LOGIN_PATH, &LoginRequest { aadhar: identity })
            .await
            .map_err(AuthError::rejected)?;

        info!(
            event_name = "auth.code_requested",
            event_domain = "auth",
            aadhar = %mask_identity(identity),
            expires_in = challenge.expires_in,
            "one-time code issued"
        );
        Ok(challenge)
    }

    /// Verifies the code and fetches the profile, without touching the session.
    pub async fn exchange_code(
        &self,
        identity: &str,
        challenge_id: &str,
        code: &str,
    ) -> Result<(String, User), AuthError> {
        let identity = validate_identity(identity)?;
        let code = validate_code(code)?;

        let issued: TokenResponse = self
            .client
            .post(
                VERIFY_OTP_PATH,
                &VerifyOtpRequest {
                    aadhar: identity,
                    otp_id: challenge_id,
                    otp_code: code,
                },
            )
            .await
            .map_err(|e| {
                warn!(aadhar = %mask_identity(identity), "code verification failed: {}", e);
                AuthError::invalid_code(e)
            })?;

        let user = self.fetch_profile(&issued.access_token).await?;
        Ok((issued.access_token, user))
    }

    /// Verifies the code, fetches the profile and commits the session.
    pub async fn verify_code(
        &self,
        identity: &str,
        challenge_id: &str,
        code: &str,
    ) -> Result<User, AuthError> {
        let (token, user) = self.exchange_code(identity, challenge_id, code).await?;
        self.session.commit(token, user.clone()).await?;
        Ok(user)
    }

    /// Username/password login for administrators.
    pub async fn admin_login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let (username, password) = validate_credentials(username, password)?;

        let issued: TokenResponse = self
            .client
            .post(ADMIN_LOGIN_PATH, &CredentialsLoginRequest { username, password })
            .await
            .map_err(|e| {
                warn!(username, "admin login failed: {}", e);
                AuthError::rejected(e)
            })?;

        self.install(issued).await
    }

    /// One-step login for registered service providers, keyed on their Aadhaar
    /// number alone.
    pub async fn provider_login(&self, identity: &str) -> Result<User, AuthError> {
        let identity = validate_identity(identity)?;

        let issued: TokenResponse = self
            .client
            .post(PROVIDER_LOGIN_PATH, &LoginRequest { aadhar: identity })
            .await
            .map_err(|e| {
                warn!(aadhar = %mask_identity(identity), "provider login failed: {}", e);
                AuthError::rejected(e)
            })?;

        self.install(issued).await
    }

    /// Fetches the profile for a freshly issued token and commits the pair.
    async fn install(&self, issued: TokenResponse) -> Result<User, AuthError> {
        let user = self.fetch_profile(&issued.access_token).await?;
        self.session.commit(issued.access_token, user.clone()).await?;
        info!(
            event_name = "auth.login",
            event_domain = "auth",
            role = %user.role_name(),
            "logged in"
        );
        Ok(user)
    }

    async fn fetch_profile(&self, token: &str) -> Result<User, AuthError> {
        self.client
            .get_with_token(PROFILE_PATH, token)
            .await
            .map_err(|e| {
                warn!("profile fetch after token issuance failed: {}", e);
                AuthError::rejected(e)
            })
    }

    /// Ends the session on this client.
    ///
    /// There is no server round-trip: the token stays valid on the backend until
    /// it expires.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.session.clear().await?;
        info!(event_name = "auth.logout", event_domain = "auth", "logged out");
        Ok(())
    }
}
