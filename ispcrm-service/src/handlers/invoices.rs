use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::invoices::{CreateInvoiceRequest, ListInvoicesQuery, UpdateInvoiceStatusRequest},
    middleware::AuthUser,
    models::{generate_invoice_number, CreateInvoice, InvoiceStatus, ListInvoicesFilter},
    utils::ValidatedJson,
    AppState,
};

/// List the caller's invoices, newest first.
pub async fn list_invoices(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<ListInvoicesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<InvoiceStatus>)
        .transpose()
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e)))?;

    let invoices = state
        .db
        .list_invoices(
            claims.sub,
            &ListInvoicesFilter {
                status,
                client_id: query.client_id,
                start_date: query.start_date,
                end_date: query.end_date,
            },
        )
        .await?;

    Ok(Json(invoices))
}

/// Get one of the caller's invoices.
pub async fn get_invoice(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(invoice_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = state
        .db
        .get_invoice(claims.sub, invoice_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

    Ok(Json(invoice))
}

/// Create an invoice for one of the caller's clients.
pub async fn create_invoice(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ValidatedJson(req): ValidatedJson<CreateInvoiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let client = state
        .db
        .get_client(claims.sub, req.client_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client not found")))?;

    let invoice = state
        .db
        .create_invoice(
            &CreateInvoice {
                client_id: client.id,
                amount: req.amount,
                due_date: req.due_date,
            },
            &generate_invoice_number(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(invoice)))
}

/// Update the status of one of the caller's invoices.
pub async fn update_invoice_status(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(invoice_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateInvoiceStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let status = req
        .status
        .parse::<InvoiceStatus>()
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e)))?;

    let invoice = state
        .db
        .update_invoice_status(claims.sub, invoice_id, status.as_str(), req.paid_date)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

    Ok(Json(invoice))
}
