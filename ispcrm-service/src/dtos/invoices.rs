use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

/// Body of `POST /api/invoices`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub client_id: i64,

    #[validate(custom(function = "crate::dtos::non_negative"))]
    pub amount: Decimal,

    pub due_date: Option<NaiveDate>,
}

/// Body of `PATCH /api/invoices/:id/status`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvoiceStatusRequest {
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,

    pub paid_date: Option<NaiveDate>,
}

/// Query parameters of `GET /api/invoices`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInvoicesQuery {
    pub status: Option<String>,
    pub client_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
