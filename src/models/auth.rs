use serde::{Deserialize, Serialize};

/// Body of `POST /auth/login` and of the provider login `POST /auth/sp/login`.
#[derive(Serialize, Debug, Clone)]
pub struct LoginRequest<'a> {
    pub aadhar: &'a str,
}

/// The one-time code challenge issued by `POST /auth/login`.
///
/// Held only by the login flow, never persisted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    pub otp_id: String,
    #[serde(default)]
    pub message: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    300
}

/// Body of `POST /auth/verify-otp`.
#[derive(Serialize, Debug, Clone)]
pub struct VerifyOtpRequest<'a> {
    pub aadhar: &'a str,
    pub otp_id: &'a str,
    pub otp_code: &'a str,
}

/// Body of the administrator login `POST /auth/admin/login`.
#[derive(Serialize, Debug, Clone)]
pub struct CredentialsLoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Token issued by every login endpoint. Only `access_token` is relied upon.
#[derive(Deserialize, Debug, Clone)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub role: Option<String>,
}
