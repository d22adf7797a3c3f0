//! The citizen login flow: identity claim, one-time code, verified session.
//!
//! ```text
//! Idle --submit_identity--> CodeRequested --submit_code--> Verifying --ok--> Authenticated
//!                               ^                              |
//!                               +---- invalid code / network --+
//! CodeRequested | Verifying --change_identity--> Idle
//! ```
//!
//! Only one submission runs at a time; a second one while the first is pending
//! fails with [`AuthError::Busy`] without sending anything. Changing identity or
//! cancelling the flow abandons the pending call, and an abandoned call never
//! commits a session.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{debug, info};

use super::gateway::AuthGateway;
use super::validation::validate_identity;
use crate::error::AuthError;
use crate::guard::dashboard_route;
use crate::models::{OtpChallenge, User};
use crate::navigation::Navigator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    Idle,
    CodeRequested {
        identity: String,
        challenge: OtpChallenge,
    },
    Verifying {
        identity: String,
        challenge_id: String,
    },
    Authenticated {
        user: User,
    },
}

struct FlowState {
    state: LoginState,
    // When the current challenge was issued; drives local expiry.
    issued_at: Option<Instant>,
    last_error: Option<String>,
}

pub struct LoginFlow {
    gateway: Arc<AuthGateway>,
    navigator: Arc<dyn Navigator>,
    inner: Mutex<FlowState>,
    pending: AtomicBool,
    closed: AtomicBool,
    // Bumped whenever pending work must be abandoned.
    epoch: watch::Sender<u64>,
}

/// Clears the pending flag when a submission finishes, however it finishes.
struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl LoginFlow {
    pub fn new(gateway: Arc<AuthGateway>, navigator: Arc<dyn Navigator>) -> Self {
        let (epoch, _) = watch::channel(0);
        LoginFlow {
            gateway,
            navigator,
            inner: Mutex::new(FlowState {
                state: LoginState::Idle,
                issued_at: None,
                last_error: None,
            }),
            pending: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            epoch,
        }
    }

    pub fn state(&self) -> LoginState {
        self.lock().state.clone()
    }

    /// Message of the last failed step, for inline display. Cleared on success.
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Requests a one-time code for `identity`. Allowed from `Idle`, and from
    /// `CodeRequested` to ask for a fresh code.
    pub async fn submit_identity(&self, identity: &str) -> Result<OtpChallenge, AuthError> {
        let _pending = self.begin()?;
        let identity = validate_identity(identity)?.to_string();

        if matches!(self.state(), LoginState::Authenticated { .. }) {
            return Err(AuthError::InvalidInput("already authenticated".into()));
        }

        let requested = self.abandonable(self.gateway.request_code(&identity)).await;
        match requested {
            Ok(challenge) => {
                let mut inner = self.lock();
                inner.state = LoginState::CodeRequested {
                    identity,
                    challenge: challenge.clone(),
                };
                inner.issued_at = Some(Instant::now());
                inner.last_error = None;
                Ok(challenge)
            }
            Err(AuthError::Cancelled) => Err(AuthError::Cancelled),
            Err(e) => {
                let mut inner = self.lock();
                inner.state = LoginState::Idle;
                inner.issued_at = None;
                inner.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Submits the code for the current challenge.
    ///
    /// On success the session is committed and the user is sent to their role's
    /// dashboard. A wrong code or a network failure returns to `CodeRequested`
    /// with the same challenge so the code can be entered again.
    pub async fn submit_code(&self, code: &str) -> Result<User, AuthError> {
        let _pending = self.begin()?;

        let (identity, challenge) = {
            let mut inner = self.lock();
            let (identity, challenge) = match &inner.state {
                LoginState::CodeRequested {
                    identity,
                    challenge,
                } => (identity.clone(), challenge.clone()),
                _ => {
                    return Err(AuthError::InvalidInput(
                        "no one-time code has been requested".into(),
                    ))
                }
            };

            let expired = inner.issued_at.map_or(true, |issued_at| {
                issued_at.elapsed() >= Duration::from_secs(challenge.expires_in)
            });
            if expired {
                debug!(otp_id = %challenge.otp_id, "challenge expired before submission");
                let err = AuthError::InvalidCode("OTP expired".into());
                inner.state = LoginState::Idle;
                inner.issued_at = None;
                inner.last_error = Some(err.to_string());
                return Err(err);
            }

            inner.state = LoginState::Verifying {
                identity: identity.clone(),
                challenge_id: challenge.otp_id.clone(),
            };
            (identity, challenge)
        };

        let exchanged = self
            .abandonable(
                self.gateway
                    .exchange_code(&identity, &challenge.otp_id, code),
            )
            .await;

        let outcome = match exchanged {
            Ok((token, user)) => self
                .gateway
                .session()
                .commit(token, user.clone())
                .await
                .map(|_| user)
                .map_err(AuthError::from),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(user) => {
                {
                    let mut inner = self.lock();
                    inner.state = LoginState::Authenticated { user: user.clone() };
                    inner.issued_at = None;
                    inner.last_error = None;
                }
                info!(
                    event_name = "auth.login_flow.authenticated",
                    event_domain = "auth",
                    role = %user.role_name(),
                    "login flow completed"
                );
                self.navigator.navigate(dashboard_route(user.role_name()));
                Ok(user)
            }
            Err(AuthError::Cancelled) => Err(AuthError::Cancelled),
            Err(e) => {
                let mut inner = self.lock();
                inner.state = LoginState::CodeRequested {
                    identity,
                    challenge,
                };
                inner.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Discards the current challenge and returns to `Idle`, abandoning any
    /// pending call. The flow stays usable.
    pub fn change_identity(&self) {
        self.abandon_pending();
        let mut inner = self.lock();
        if !matches!(inner.state, LoginState::Authenticated { .. }) {
            inner.state = LoginState::Idle;
            inner.issued_at = None;
            inner.last_error = None;
        }
    }

    /// Ends the flow. Pending calls are abandoned and every later submission
    /// fails with [`AuthError::Cancelled`].
    pub fn cancel(&self) {
        self.closed.store(true, Ordering::Release);
        self.abandon_pending();
        let mut inner = self.lock();
        if !matches!(inner.state, LoginState::Authenticated { .. }) {
            inner.state = LoginState::Idle;
            inner.issued_at = None;
        }
        debug!("login flow cancelled");
    }

    pub fn is_cancelled(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn begin(&self) -> Result<PendingGuard<'_>, AuthError> {
        if self.is_cancelled() {
            return Err(AuthError::Cancelled);
        }
        self.pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AuthError::Busy)?;
        Ok(PendingGuard(&self.pending))
    }

    fn abandon_pending(&self) {
        self.epoch.send_modify(|epoch| *epoch += 1);
    }

    /// Runs `work` unless the epoch moves on first; the result of work that
    /// completes after the epoch moved is discarded as well.
    async fn abandonable<T, F>(&self, work: F) -> Result<T, AuthError>
    where
        F: Future<Output = Result<T, AuthError>>,
    {
        let mut epoch = self.epoch.subscribe();
        let started = *epoch.borrow_and_update();

        tokio::select! {
            result = work => {
                if *self.epoch.borrow() != started || self.is_cancelled() {
                    Err(AuthError::Cancelled)
                } else {
                    result
                }
            }
            _ = epoch.changed() => Err(AuthError::Cancelled),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FlowState> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
