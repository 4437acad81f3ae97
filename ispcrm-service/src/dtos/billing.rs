use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

/// Body of `POST /api/billing`. Field names are the wire contract; the
/// frontend submits camelCase.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BillingUpsertRequest {
    pub client_id: i64,

    #[validate(range(min = 1, max = 12, message = "Month must be between 1 and 12"))]
    pub month: i32,

    #[validate(range(min = 2000, max = 2100, message = "Year is out of range"))]
    pub year: i32,

    /// Billed total for the period. When omitted, the owning client's
    /// monthly fee is charged.
    #[validate(custom(function = "crate::dtos::non_negative"))]
    pub amount: Option<Decimal>,

    #[serde(default)]
    #[validate(custom(function = "crate::dtos::non_negative"))]
    pub amount_paid: Decimal,

    #[serde(default)]
    #[validate(custom(function = "crate::dtos::non_negative"))]
    pub bkash_payment: Decimal,

    pub payment_method: Option<String>,

    pub payment_date: Option<NaiveDate>,
}

/// Query parameters of `GET /api/billing`. All present filters are AND-ed.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBillingQuery {
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub status: Option<String>,
    pub client_id: Option<i64>,
}
