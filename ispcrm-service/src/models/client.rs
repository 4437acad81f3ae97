//! Client (subscriber) model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Service state of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    Active,
    Inactive,
    Suspended,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Active => "active",
            ClientStatus::Inactive => "inactive",
            ClientStatus::Suspended => "suspended",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "inactive" => ClientStatus::Inactive,
            "suspended" => ClientStatus::Suspended,
            _ => ClientStatus::Active,
        }
    }
}

impl std::str::FromStr for ClientStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ClientStatus::Active),
            "inactive" => Ok(ClientStatus::Inactive),
            "suspended" => Ok(ClientStatus::Suspended),
            _ => Err(format!("Invalid client status: {}", s)),
        }
    }
}

/// A client row. `monthly_fee` is the default charge when a billing period
/// is first submitted without an explicit amount.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Client {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub package: Option<String>,
    pub monthly_fee: Option<Decimal>,
    pub status: String,
    pub mikrotik_username: Option<String>,
    pub joining_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Filter parameters for listing clients.
#[derive(Debug, Clone, Default)]
pub struct ListClientsFilter {
    pub search: Option<String>,
    pub status: Option<ClientStatus>,
}

/// Input for creating or replacing a client.
#[derive(Debug, Clone)]
pub struct ClientInput {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub package: Option<String>,
    pub monthly_fee: Option<Decimal>,
    pub status: Option<ClientStatus>,
    pub mikrotik_username: Option<String>,
}
