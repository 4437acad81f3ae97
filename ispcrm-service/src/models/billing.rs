//! Billing ledger model: one record per client per calendar month.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Derived payment state of a ledger record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingStatus {
    Paid,
    Partial,
    Due,
}

impl BillingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingStatus::Paid => "paid",
            BillingStatus::Partial => "partial",
            BillingStatus::Due => "due",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "paid" => BillingStatus::Paid,
            "partial" => BillingStatus::Partial,
            _ => BillingStatus::Due,
        }
    }
}

impl std::str::FromStr for BillingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paid" => Ok(BillingStatus::Paid),
            "partial" => Ok(BillingStatus::Partial),
            "due" => Ok(BillingStatus::Due),
            _ => Err(format!("Invalid billing status: {}", s)),
        }
    }
}

/// Payment channel reported with a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Bkash,
    Bank,
    Mixed,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Bkash => "bkash",
            PaymentMethod::Bank => "bank",
            PaymentMethod::Mixed => "mixed",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "bkash" => PaymentMethod::Bkash,
            "bank" => PaymentMethod::Bank,
            "mixed" => PaymentMethod::Mixed,
            _ => PaymentMethod::Cash,
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "bkash" => Ok(PaymentMethod::Bkash),
            "bank" => Ok(PaymentMethod::Bank),
            "mixed" => Ok(PaymentMethod::Mixed),
            _ => Err(format!("Invalid payment method: {}", s)),
        }
    }
}

/// Outcome of reconciling a submission's figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub amount_due: Decimal,
    pub status: BillingStatus,
}

/// Reconcile the billed total against the two payment channels.
///
/// `amount_due` is clamped at zero; overpayment never produces a negative
/// balance. Status is `paid` when nothing remains due, otherwise `partial`
/// only when the cash channel is nonzero. A bkash-only partial payment
/// therefore stays `due`: the partial/due split is driven by `amount_paid`
/// alone, and callers rely on that exact behavior.
pub fn settle(amount: Decimal, amount_paid: Decimal, bkash_payment: Decimal) -> Settlement {
    let outstanding = amount - (amount_paid + bkash_payment);

    let status = if outstanding <= Decimal::ZERO {
        BillingStatus::Paid
    } else if amount_paid > Decimal::ZERO {
        BillingStatus::Partial
    } else {
        BillingStatus::Due
    };

    Settlement {
        amount_due: outstanding.max(Decimal::ZERO),
        status,
    }
}

/// A billing ledger row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BillingRecord {
    pub id: i64,
    pub client_id: i64,
    pub month: i32,
    pub year: i32,
    pub amount: Decimal,
    pub amount_paid: Decimal,
    pub amount_due: Decimal,
    pub bkash_payment: Decimal,
    pub payment_method: Option<String>,
    pub status: String,
    pub payment_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// A ledger row joined with the owning client's display fields.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BillingWithClient {
    pub id: i64,
    pub client_id: i64,
    pub month: i32,
    pub year: i32,
    pub amount: Decimal,
    pub amount_paid: Decimal,
    pub amount_due: Decimal,
    pub bkash_payment: Decimal,
    pub payment_method: Option<String>,
    pub status: String,
    pub payment_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub client_name: String,
    pub package: Option<String>,
}

/// Filter parameters for listing ledger records. All present filters are
/// AND-ed; the owner scope is applied unconditionally by the query layer.
#[derive(Debug, Clone, Default)]
pub struct ListBillingFilter {
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub status: Option<BillingStatus>,
    pub client_id: Option<i64>,
}

/// Fully-derived input for the atomic period upsert.
#[derive(Debug, Clone)]
pub struct UpsertBilling {
    pub client_id: i64,
    pub month: i32,
    pub year: i32,
    pub amount: Decimal,
    pub amount_paid: Decimal,
    pub amount_due: Decimal,
    pub bkash_payment: Decimal,
    pub payment_method: Option<PaymentMethod>,
    pub status: BillingStatus,
    pub payment_date: Option<NaiveDate>,
}

/// Owner-scoped dashboard aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DashboardStats {
    pub total_clients: i64,
    pub active_clients: i64,
    pub total_revenue: Decimal,
    pub pending_payments: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn unpaid_period_is_due_in_full() {
        let s = settle(dec(500), dec(0), dec(0));
        assert_eq!(s.amount_due, dec(500));
        assert_eq!(s.status, BillingStatus::Due);
    }

    #[test]
    fn cash_partial_payment_is_partial() {
        let s = settle(dec(500), dec(300), dec(0));
        assert_eq!(s.amount_due, dec(200));
        assert_eq!(s.status, BillingStatus::Partial);
    }

    #[test]
    fn bkash_full_payment_is_paid() {
        let s = settle(dec(500), dec(0), dec(500));
        assert_eq!(s.amount_due, dec(0));
        assert_eq!(s.status, BillingStatus::Paid);
    }

    #[test]
    fn overpayment_clamps_due_at_zero() {
        let s = settle(dec(500), dec(600), dec(0));
        assert_eq!(s.amount_due, dec(0));
        assert_eq!(s.status, BillingStatus::Paid);
    }

    #[test]
    fn bkash_only_partial_payment_stays_due() {
        // The partial/due split keys on the cash channel only; an
        // incomplete bkash payment does not promote the row to partial.
        let s = settle(dec(500), dec(0), dec(300));
        assert_eq!(s.amount_due, dec(200));
        assert_eq!(s.status, BillingStatus::Due);
    }

    #[test]
    fn mixed_channels_with_cash_present_is_partial() {
        let s = settle(dec(500), dec(100), dec(100));
        assert_eq!(s.amount_due, dec(300));
        assert_eq!(s.status, BillingStatus::Partial);
    }

    #[test]
    fn combined_channels_covering_total_is_paid() {
        let s = settle(dec(500), dec(250), dec(250));
        assert_eq!(s.amount_due, dec(0));
        assert_eq!(s.status, BillingStatus::Paid);
    }

    #[test]
    fn zero_amount_with_no_payment_is_paid() {
        // Nothing billed means nothing outstanding.
        let s = settle(dec(0), dec(0), dec(0));
        assert_eq!(s.amount_due, dec(0));
        assert_eq!(s.status, BillingStatus::Paid);
    }

    #[test]
    fn exact_payment_boundary_is_paid() {
        let s = settle(dec(500), dec(500), dec(0));
        assert_eq!(s.amount_due, dec(0));
        assert_eq!(s.status, BillingStatus::Paid);
    }

    #[test]
    fn fractional_amounts_settle_exactly() {
        let s = settle(
            Decimal::new(49999, 2),
            Decimal::new(12550, 2),
            Decimal::new(10000, 2),
        );
        assert_eq!(s.amount_due, Decimal::new(27449, 2));
        assert_eq!(s.status, BillingStatus::Partial);
    }

    #[test]
    fn settle_is_deterministic_for_repeated_submissions() {
        // Resubmitting identical figures for a period must derive the same
        // state; the upsert then replaces the row in place.
        let first = settle(dec(500), dec(500), dec(0));
        let second = settle(dec(500), dec(500), dec(0));
        assert_eq!(first, second);
        assert_eq!(first.status, BillingStatus::Paid);
        assert_eq!(first.amount_due, dec(0));
    }

    #[test]
    fn due_never_negative_across_channel_combinations() {
        let amounts = [dec(0), dec(100), dec(500)];
        for amount in amounts {
            for paid in amounts {
                for bkash in amounts {
                    let s = settle(amount, paid, bkash);
                    assert!(s.amount_due >= Decimal::ZERO);
                    let raw = amount - (paid + bkash);
                    if raw <= Decimal::ZERO {
                        assert_eq!(s.status, BillingStatus::Paid);
                    } else if paid > Decimal::ZERO {
                        assert_eq!(s.status, BillingStatus::Partial);
                    } else {
                        assert_eq!(s.status, BillingStatus::Due);
                    }
                }
            }
        }
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [BillingStatus::Paid, BillingStatus::Partial, BillingStatus::Due] {
            assert_eq!(BillingStatus::from_string(status.as_str()), status);
        }
        assert_eq!(BillingStatus::from_string("garbage"), BillingStatus::Due);
    }

    #[test]
    fn payment_method_round_trips_through_strings() {
        for method in [
            PaymentMethod::Cash,
            PaymentMethod::Bkash,
            PaymentMethod::Bank,
            PaymentMethod::Mixed,
        ] {
            assert_eq!(PaymentMethod::from_string(method.as_str()), method);
        }
        assert_eq!(PaymentMethod::from_string("unknown"), PaymentMethod::Cash);
    }
}
