//! Composition root.
//!
//! Builds the storage, restores the persisted session and wires the session
//! store into the HTTP client, the auth gateway and the route resolver.

use std::sync::Arc;

use tracing::info;

use crate::auth::{AuthGateway, LoginFlow};
use crate::config::ConfigV1;
use crate::error::{ApiError, AuthError};
use crate::guard::{resolve, RouteOutcome};
use crate::http::ApiClient;
use crate::navigation::Navigator;
use crate::resources::Resources;
use crate::session::SessionStore;
use crate::storage::create_storage;

/// Everything a running client needs, shared behind `Arc`s.
#[derive(Clone)]
pub struct Portal {
    pub config: Arc<ConfigV1>,
    pub session: Arc<SessionStore>,
    pub client: Arc<ApiClient>,
    pub gateway: Arc<AuthGateway>,
    pub resources: Arc<Resources>,
    pub navigator: Arc<dyn Navigator>,
}

impl Portal {
    /// Restores any persisted session and builds the client stack.
    ///
    /// No network call is made: a restored session is trusted until the
    /// backend rejects its token.
    pub async fn bootstrap(
        config: ConfigV1,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let config = Arc::new(config);
        let storage = create_storage(&config.storage);
        let durable = storage.is_durable();
        let session = Arc::new(SessionStore::restore(storage).await?);

        let client = Arc::new(ApiClient::new(
            &config.api,
            session.clone(),
            navigator.clone(),
        )?);
        let gateway = Arc::new(AuthGateway::new(client.clone(), session.clone()));
        let resources = Arc::new(Resources::new(client.clone()));

        info!(
            base_url = client.base_url(),
            authenticated = session.is_authenticated(),
            durable,
            "portal client ready"
        );

        Ok(Portal {
            config,
            session,
            client,
            gateway,
            resources,
            navigator,
        })
    }

    /// A fresh citizen login flow bound to this portal.
    pub fn login_flow(&self) -> LoginFlow {
        LoginFlow::new(self.gateway.clone(), self.navigator.clone())
    }

    /// What navigating to `path` would show right now.
    pub fn resolve(&self, path: &str) -> RouteOutcome {
        resolve(&self.session.snapshot(), path)
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        self.gateway.logout().await
    }
}
