//! Payloads of the bearer-authenticated portal resources.
//!
//! Fields the backend may omit are optional so that a partially filled record
//! still decodes; nothing here is ever substituted with sample data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `GET /citizen/profile`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct CitizenProfile {
    pub citizen_id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub kisan_id: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ActivityLog {
    pub activity_id: String,
    pub citizen_id: String,
    pub activity_type: String,
    pub activity_description: String,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, Value>>,
    pub created_at: String,
}

/// Body of `POST /activity-logs/log`.
#[derive(Serialize, Debug, Clone, Default)]
pub struct ActivityLogRequest {
    pub activity_type: String,
    pub activity_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, Value>>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Appointment {
    pub consultation_id: String,
    pub esanjeevani_provider_id: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub status: String,
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub provider_notes: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentDecision {
    Approve,
    Reject,
}

/// Body of `PUT /appointments/provider/appointments/{id}/action`.
///
/// A rejection always carries its reason; notes only accompany an approval.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AppointmentAction {
    pub action: AppointmentDecision,
    pub rejection_reason: Option<String>,
    pub provider_notes: Option<String>,
}

impl AppointmentAction {
    pub fn approve(notes: Option<String>) -> Self {
        AppointmentAction {
            action: AppointmentDecision::Approve,
            rejection_reason: None,
            provider_notes: notes,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        AppointmentAction {
            action: AppointmentDecision::Reject,
            rejection_reason: Some(reason.into()),
            provider_notes: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AppointmentActionReceipt {
    pub message: String,
    pub consultation_id: String,
}

/// A listing on the mKisan agricultural exchange.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Product {
    pub product_id: String,
    pub product_name: String,
    pub product_type: String,
    pub category: String,
    pub quantity: f64,
    pub price_per_unit: f64,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub seller_name: Option<String>,
    #[serde(default)]
    pub seller_phone: Option<String>,
}

/// Query parameters for `GET /mkisan/products`; unset fields are not sent.
#[derive(Serialize, Debug, Clone, Default)]
pub struct ProductFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnboardingStatus {
    Pending,
    Approved,
    Rejected,
    ChangesRequested,
}

/// A service onboarding request as listed for administrators.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct OnboardingRequest {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub base_url: String,
    pub category: String,
    pub service_id: String,
    pub status: OnboardingStatus,
    #[serde(default)]
    pub admin_notes: Option<String>,
    pub submitted_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpRequestType {
    Esanjeevani,
    Mkisan,
}

/// Body of `POST /sp-registration/register`.
///
/// Only the fields matching `request_type` are expected to be set; the rest are
/// left out of the payload.
#[derive(Serialize, Debug, Clone)]
pub struct SpRegistrationRequest {
    pub aadhar: String,
    pub request_type: SpRequestType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_in_business: Option<u32>,
}

impl SpRegistrationRequest {
    pub fn new(aadhar: impl Into<String>, request_type: SpRequestType) -> Self {
        SpRegistrationRequest {
            aadhar: aadhar.into(),
            request_type,
            organization_name: None,
            registration_number: None,
            provider_type: None,
            specialization: None,
            years_of_experience: None,
            provider_category: None,
            business_license: None,
            gst_number: None,
            years_in_business: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct AssignedAdmin {
    #[serde(default)]
    pub admin_id: Option<String>,
    pub full_name: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SpRegistrationReceipt {
    pub request_id: String,
    pub assigned_admin: AssignedAdmin,
}
