use crate::error::AuthError;

/// Longest identity claim (Aadhaar number or equivalent) the backend accepts.
pub const MAX_IDENTITY_LEN: usize = 20;
pub const MAX_CODE_LEN: usize = 16;

/// Checks an identity claim before it is sent anywhere and returns it trimmed.
///
/// The claim must be non-empty, ASCII alphanumeric and at most
/// [`MAX_IDENTITY_LEN`] characters. Anything finer is the backend's call.
pub fn validate_identity(identity: &str) -> Result<&str, AuthError> {
    let identity = identity.trim();
    if identity.is_empty() {
        return Err(AuthError::InvalidInput("identity must not be empty".into()));
    }
    if identity.len() > MAX_IDENTITY_LEN {
        return Err(AuthError::InvalidInput(format!(
            "identity must be at most {} characters",
            MAX_IDENTITY_LEN
        )));
    }
    if !identity.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AuthError::InvalidInput(
            "identity must contain only letters and digits".into(),
        ));
    }
    Ok(identity)
}

pub fn validate_code(code: &str) -> Result<&str, AuthError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(AuthError::InvalidInput("code must not be empty".into()));
    }
    if code.len() > MAX_CODE_LEN {
        return Err(AuthError::InvalidInput(format!(
            "code must be at most {} characters",
            MAX_CODE_LEN
        )));
    }
    Ok(code)
}

pub fn validate_credentials<'a>(
    username: &'a str,
    password: &'a str,
) -> Result<(&'a str, &'a str), AuthError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AuthError::InvalidInput("username must not be empty".into()));
    }
    if password.is_empty() {
        return Err(AuthError::InvalidInput("password must not be empty".into()));
    }
    Ok((username, password))
}
