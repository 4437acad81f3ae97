pub mod auth;
pub mod billing;
pub mod clients;
pub mod invoices;
pub mod mikrotik;

use rust_decimal::Decimal;
use serde::Serialize;
use validator::ValidationError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Money fields must not be negative.
pub fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}
