use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::billing::{BillingUpsertRequest, ListBillingQuery},
    middleware::AuthUser,
    models::{settle, BillingStatus, ListBillingFilter, PaymentMethod, UpsertBilling},
    services::metrics,
    utils::ValidatedJson,
    AppState,
};

/// List the caller's ledger records. Filters are AND-ed; the owner scope
/// is applied by the query layer regardless of what is asked for.
pub async fn list_billing(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<ListBillingQuery>,
) -> Result<impl IntoResponse, AppError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<BillingStatus>)
        .transpose()
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e)))?;

    let records = state
        .db
        .list_billing(
            claims.sub,
            &ListBillingFilter {
                month: query.month,
                year: query.year,
                status,
                client_id: query.client_id,
            },
        )
        .await?;

    Ok(Json(records))
}

/// Create or replace the ledger record for a client period.
///
/// The submission's figures fully replace any previous record for the same
/// (client, month, year); payments are not accumulated across calls.
pub async fn upsert_billing(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ValidatedJson(req): ValidatedJson<BillingUpsertRequest>,
) -> Result<impl IntoResponse, AppError> {
    // Resolving through the owner scope both authorizes the write and
    // supplies the fee default.
    let client = state
        .db
        .get_client(claims.sub, req.client_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Client not found")))?;

    let amount = match req.amount.or(client.monthly_fee) {
        Some(amount) => amount,
        None => {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Amount is required for a client without a monthly fee"
            )))
        }
    };

    let payment_method = req
        .payment_method
        .as_deref()
        .map(str::parse::<PaymentMethod>)
        .transpose()
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e)))?;

    let settlement = settle(amount, req.amount_paid, req.bkash_payment);

    let record = state
        .db
        .upsert_billing(&UpsertBilling {
            client_id: client.id,
            month: req.month,
            year: req.year,
            amount,
            amount_paid: req.amount_paid,
            amount_due: settlement.amount_due,
            bkash_payment: req.bkash_payment,
            payment_method,
            status: settlement.status,
            payment_date: req.payment_date,
        })
        .await?;

    metrics::record_billing_upsert(settlement.status.as_str());

    Ok(Json(record))
}

/// Owner-scoped dashboard aggregates.
pub async fn dashboard_stats(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let stats = state.db.dashboard_stats(claims.sub).await?;
    Ok(Json(stats))
}
