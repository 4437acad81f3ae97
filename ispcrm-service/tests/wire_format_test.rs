//! Wire-format guarantees: response rows keep their snake_case field names
//! and request bodies accept the frontend's camelCase names.

use chrono::NaiveDate;
use ispcrm_service::dtos::billing::{BillingUpsertRequest, ListBillingQuery};
use ispcrm_service::dtos::invoices::CreateInvoiceRequest;
use ispcrm_service::models::{BillingWithClient, DashboardStats};
use rust_decimal::Decimal;
use validator::Validate;

fn sample_record() -> BillingWithClient {
    BillingWithClient {
        id: 7,
        client_id: 1,
        month: 3,
        year: 2024,
        amount: Decimal::from(500),
        amount_paid: Decimal::from(300),
        amount_due: Decimal::from(200),
        bkash_payment: Decimal::ZERO,
        payment_method: Some("cash".to_string()),
        status: "partial".to_string(),
        payment_date: NaiveDate::from_ymd_opt(2024, 3, 5),
        due_date: None,
        client_name: "Akash Traders".to_string(),
        package: Some("10mbps".to_string()),
    }
}

#[test]
fn billing_row_serializes_with_contract_field_names() {
    let value = serde_json::to_value(sample_record()).unwrap();
    let object = value.as_object().unwrap();

    for field in [
        "id",
        "client_id",
        "month",
        "year",
        "amount",
        "amount_paid",
        "amount_due",
        "bkash_payment",
        "payment_method",
        "status",
        "payment_date",
        "due_date",
        "client_name",
        "package",
    ] {
        assert!(object.contains_key(field), "missing field {}", field);
    }
    assert_eq!(object.len(), 14);
}

#[test]
fn dashboard_stats_serialize_with_contract_field_names() {
    let stats = DashboardStats {
        total_clients: 12,
        active_clients: 10,
        total_revenue: Decimal::from(42_000),
        pending_payments: 3,
    };

    let value = serde_json::to_value(stats).unwrap();
    let object = value.as_object().unwrap();

    for field in [
        "total_clients",
        "active_clients",
        "total_revenue",
        "pending_payments",
    ] {
        assert!(object.contains_key(field), "missing field {}", field);
    }
    assert_eq!(object.len(), 4);
}

#[test]
fn upsert_body_accepts_camel_case_names() {
    let body = serde_json::json!({
        "clientId": 1,
        "month": 3,
        "year": 2024,
        "amount": 500,
        "amountPaid": 300,
        "bkashPayment": 0,
        "paymentMethod": "cash",
        "paymentDate": "2024-03-05"
    });

    let req: BillingUpsertRequest = serde_json::from_value(body).unwrap();
    assert!(req.validate().is_ok());
    assert_eq!(req.client_id, 1);
    assert_eq!(req.amount, Some(Decimal::from(500)));
    assert_eq!(req.amount_paid, Decimal::from(300));
    assert_eq!(req.bkash_payment, Decimal::ZERO);
    assert_eq!(req.payment_method.as_deref(), Some("cash"));
    assert_eq!(req.payment_date, NaiveDate::from_ymd_opt(2024, 3, 5));
}

#[test]
fn upsert_body_payment_figures_default_to_zero() {
    let body = serde_json::json!({
        "clientId": 1,
        "month": 1,
        "year": 2024
    });

    let req: BillingUpsertRequest = serde_json::from_value(body).unwrap();
    assert!(req.validate().is_ok());
    assert_eq!(req.amount, None);
    assert_eq!(req.amount_paid, Decimal::ZERO);
    assert_eq!(req.bkash_payment, Decimal::ZERO);
}

#[test]
fn upsert_body_rejects_out_of_range_month() {
    let body = serde_json::json!({
        "clientId": 1,
        "month": 13,
        "year": 2024,
        "amount": 500
    });

    let req: BillingUpsertRequest = serde_json::from_value(body).unwrap();
    assert!(req.validate().is_err());
}

#[test]
fn upsert_body_rejects_negative_amounts() {
    for field in ["amount", "amountPaid", "bkashPayment"] {
        let mut body = serde_json::json!({
            "clientId": 1,
            "month": 3,
            "year": 2024,
            "amount": 500
        });
        body[field] = serde_json::json!(-1);

        let req: BillingUpsertRequest = serde_json::from_value(body).unwrap();
        assert!(req.validate().is_err(), "negative {} accepted", field);
    }
}

#[test]
fn billing_list_query_accepts_camel_case_client_id() {
    let query: ListBillingQuery = query_from_str("month=3&year=2024&status=due&clientId=9");
    assert_eq!(query.month, Some(3));
    assert_eq!(query.year, Some(2024));
    assert_eq!(query.status.as_deref(), Some("due"));
    assert_eq!(query.client_id, Some(9));
}

#[test]
fn invoice_body_accepts_camel_case_names() {
    let body = serde_json::json!({
        "clientId": 4,
        "amount": 1200,
        "dueDate": "2024-04-10"
    });

    let req: CreateInvoiceRequest = serde_json::from_value(body).unwrap();
    assert!(req.validate().is_ok());
    assert_eq!(req.client_id, 4);
    assert_eq!(req.due_date, NaiveDate::from_ymd_opt(2024, 4, 10));
}

fn query_from_str(input: &str) -> ListBillingQuery {
    let mut map = serde_json::Map::new();
    for pair in input.split('&') {
        let (key, value) = pair.split_once('=').unwrap();
        let value = value
            .parse::<i64>()
            .map(serde_json::Value::from)
            .unwrap_or_else(|_| serde_json::Value::from(value));
        map.insert(key.to_string(), value);
    }
    serde_json::from_value(serde_json::Value::Object(map)).unwrap()
}
