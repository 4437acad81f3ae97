use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

/// Body of `POST /api/clients` and `PUT /api/clients/:id`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    pub phone: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    pub address: Option<String>,

    pub package: Option<String>,

    #[validate(custom(function = "crate::dtos::non_negative"))]
    pub monthly_fee: Option<Decimal>,

    pub status: Option<String>,

    pub mikrotik_username: Option<String>,
}

/// Query parameters of `GET /api/clients`.
#[derive(Debug, Default, Deserialize)]
pub struct ListClientsQuery {
    pub search: Option<String>,
    pub status: Option<String>,
}
