use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The three portal roles. The set is closed: every role check in the crate
/// matches on it exhaustively.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleName {
    Citizen,
    ServiceProvider,
    Admin,
}

impl RoleName {
    pub const ALL: [RoleName; 3] = [RoleName::Citizen, RoleName::ServiceProvider, RoleName::Admin];

    /// Wire name, e.g. `"SERVICE_PROVIDER"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Citizen => "CITIZEN",
            RoleName::ServiceProvider => "SERVICE_PROVIDER",
            RoleName::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Role {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: RoleName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// The authenticated user as returned by `GET /auth/me`.
///
/// Fetched once per login and kept unchanged for the lifetime of the session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub aadhar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
    pub created_at: String,
}

impl User {
    pub fn new(id: i64, aadhar: impl Into<String>, role: RoleName) -> Self {
        User {
            id,
            aadhar: aadhar.into(),
            phone: None,
            role: Role {
                id: None,
                name: role,
                created_at: None,
            },
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn role_name(&self) -> RoleName {
        self.role.name
    }
}

/// Masks an identity claim for logging, keeping only the last four characters.
pub fn mask_identity(identity: &str) -> String {
    let chars: Vec<char> = identity.chars().collect();
    let visible = chars.len().min(4);
    let hidden = chars.len() - visible;
    std::iter::repeat('*')
        .take(hidden)
        .chain(chars[hidden..].iter().copied())
        .collect()
}
