use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::server::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCompany {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: Address,
}

impl RegisterCompany {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.phone.trim().is_empty()
        {
            return Err(ApiError::Validation("all fields are required".into()));
        }
        if !self.email.contains('@') {
            return Err(ApiError::Validation("a valid email is required".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompany {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
}

impl Company {
    pub fn apply_update(&mut self, patch: UpdateCompany, now: DateTime<Utc>) {
        if let Some(name) = patch.name.filter(|n| !n.trim().is_empty()) {
            self.name = name;
        }
        if let Some(email) = patch.email.filter(|e| !e.trim().is_empty()) {
            self.email = email;
        }
        if let Some(phone) = patch.phone.filter(|p| !p.trim().is_empty()) {
            self.phone = phone;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        self.updated_at = now;
    }
}
