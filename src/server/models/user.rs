use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::server::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Applicant,
    Employee,
    Hr,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
}

impl CreateUser {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(ApiError::Validation("a valid email is required".into()));
        }
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(ApiError::Validation(
                "first and last name are required".into(),
            ));
        }
        Ok(())
    }
}
