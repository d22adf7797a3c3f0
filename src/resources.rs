//! Bearer-authenticated portal resources.
//!
//! Thin typed wrappers over [`ApiClient`]. An empty listing comes back as
//! `Ok(vec![])` and a failed fetch as `Err(..)`; no call ever substitutes
//! sample data for a failure.

use std::sync::Arc;

use tracing::debug;

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::models::{
    ActivityLog, ActivityLogRequest, Appointment, AppointmentAction, AppointmentActionReceipt,
    CitizenProfile, OnboardingRequest, Product, ProductFilter, SpRegistrationReceipt,
    SpRegistrationRequest,
};

pub struct Resources {
    client: Arc<ApiClient>,
}

impl Resources {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Resources { client }
    }

    pub async fn citizen_profile(&self) -> Result<CitizenProfile, ApiError> {
        self.client.get("/citizen/profile").await
    }

    pub async fn activity_history(&self) -> Result<Vec<ActivityLog>, ApiError> {
        let history: Vec<ActivityLog> = self.client.get("/activity-logs/my-history").await?;
        debug!(entries = history.len(), "fetched activity history");
        Ok(history)
    }

    pub async fn log_activity(&self, entry: &ActivityLogRequest) -> Result<ActivityLog, ApiError> {
        self.client.post("/activity-logs/log", entry).await
    }

    pub async fn my_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        self.client.get("/appointments/my-appointments").await
    }

    /// Consultation requests addressed to the logged in service provider.
    pub async fn provider_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        self.client.get("/appointments/provider/appointments").await
    }

    pub async fn act_on_appointment(
        &self,
        consultation_id: &str,
        action: &AppointmentAction,
    ) -> Result<AppointmentActionReceipt, ApiError> {
        let path = format!(
            "/appointments/provider/appointments/{}/action",
            consultation_id
        );
        self.client.put(&path, action).await
    }

    pub async fn mkisan_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, ApiError> {
        let products: Vec<Product> = self.client.get_query("/mkisan/products", filter).await?;
        debug!(
            count = products.len(),
            category = filter.category.as_deref().unwrap_or("*"),
            "fetched mKisan products"
        );
        Ok(products)
    }

    pub async fn onboarding_requests(&self) -> Result<Vec<OnboardingRequest>, ApiError> {
        self.client.get("/admin/onboarding-requests").await
    }

    /// Submits a request to become a service provider; approval happens on the
    /// backend, by an administrator.
    pub async fn register_service_provider(
        &self,
        request: &SpRegistrationRequest,
    ) -> Result<SpRegistrationReceipt, ApiError> {
        self.client.post("/sp-registration/register", request).await
    }
}
