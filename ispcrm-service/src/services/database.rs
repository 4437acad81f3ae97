//! Database service for ispcrm-service.

use crate::models::{
    BillingRecord, BillingWithClient, Client, ClientInput, CreateInvoice, CreateUser,
    DashboardStats, Invoice, InvoiceWithClient, ListBillingFilter, ListClientsFilter,
    ListInvoicesFilter, UpsertBilling, User,
};
use crate::services::metrics::DB_QUERY_DURATION;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "ispcrm-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // User Operations
    // -------------------------------------------------------------------------

    /// Create an operator account.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn create_user(&self, input: &CreateUser) -> Result<User, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_user"])
            .start_timer();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password, name, email, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, password, name, email, role, created_at
            "#,
        )
        .bind(&input.username)
        .bind(&input.password)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::BadRequest(anyhow::anyhow!("Username already exists"))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create user: {}", e)),
        })?;

        timer.observe_duration();

        info!(user_id = %user.id, username = %user.username, "Operator account created");

        Ok(user)
    }

    /// Look up an operator by username.
    #[instrument(skip(self))]
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_user_by_username"])
            .start_timer();

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, name, email, role, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to find user: {}", e)))?;

        timer.observe_duration();

        Ok(user)
    }

    // -------------------------------------------------------------------------
    // Client Operations
    // -------------------------------------------------------------------------

    /// List clients owned by an operator.
    #[instrument(skip(self, filter), fields(user_id = %user_id))]
    pub async fn list_clients(
        &self,
        user_id: i64,
        filter: &ListClientsFilter,
    ) -> Result<Vec<Client>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_clients"])
            .start_timer();

        let status_str = filter.status.map(|s| s.as_str().to_string());

        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, user_id, name, phone, email, address, package, monthly_fee,
                status, mikrotik_username, joining_date, created_at
            FROM clients
            WHERE user_id = $1
              AND ($2::varchar IS NULL OR name ILIKE '%' || $2 || '%' OR phone ILIKE '%' || $2 || '%')
              AND ($3::varchar IS NULL OR status = $3)
            ORDER BY name
            "#,
        )
        .bind(user_id)
        .bind(&filter.search)
        .bind(&status_str)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list clients: {}", e)))?;

        timer.observe_duration();

        Ok(clients)
    }

    /// Get a client by id, scoped to its owner.
    #[instrument(skip(self), fields(user_id = %user_id, client_id = %client_id))]
    pub async fn get_client(
        &self,
        user_id: i64,
        client_id: i64,
    ) -> Result<Option<Client>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_client"])
            .start_timer();

        let client = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, user_id, name, phone, email, address, package, monthly_fee,
                status, mikrotik_username, joining_date, created_at
            FROM clients
            WHERE user_id = $1 AND id = $2
            "#,
        )
        .bind(user_id)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get client: {}", e)))?;

        timer.observe_duration();

        Ok(client)
    }

    /// Create a client under an operator.
    #[instrument(skip(self, input), fields(user_id = %user_id))]
    pub async fn create_client(
        &self,
        user_id: i64,
        input: &ClientInput,
    ) -> Result<Client, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_client"])
            .start_timer();

        let status = input
            .status
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| "active".to_string());

        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (
                user_id, name, phone, email, address, package, monthly_fee, status, mikrotik_username
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, user_id, name, phone, email, address, package, monthly_fee,
                status, mikrotik_username, joining_date, created_at
            "#,
        )
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.package)
        .bind(input.monthly_fee)
        .bind(&status)
        .bind(&input.mikrotik_username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create client: {}", e)))?;

        timer.observe_duration();

        info!(client_id = %client.id, "Client created");

        Ok(client)
    }

    /// Replace a client's fields, scoped to its owner.
    #[instrument(skip(self, input), fields(user_id = %user_id, client_id = %client_id))]
    pub async fn update_client(
        &self,
        user_id: i64,
        client_id: i64,
        input: &ClientInput,
    ) -> Result<Option<Client>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_client"])
            .start_timer();

        let status_str = input.status.map(|s| s.as_str().to_string());

        let client = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET name = $3,
                phone = $4,
                email = $5,
                address = $6,
                package = $7,
                monthly_fee = $8,
                status = COALESCE($9, status),
                mikrotik_username = $10
            WHERE user_id = $1 AND id = $2
            RETURNING id, user_id, name, phone, email, address, package, monthly_fee,
                status, mikrotik_username, joining_date, created_at
            "#,
        )
        .bind(user_id)
        .bind(client_id)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.package)
        .bind(input.monthly_fee)
        .bind(&status_str)
        .bind(&input.mikrotik_username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update client: {}", e)))?;

        timer.observe_duration();

        if let Some(ref c) = client {
            info!(client_id = %c.id, "Client updated");
        }

        Ok(client)
    }

    /// Delete a client, scoped to its owner. Billing rows cascade.
    #[instrument(skip(self), fields(user_id = %user_id, client_id = %client_id))]
    pub async fn delete_client(&self, user_id: i64, client_id: i64) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_client"])
            .start_timer();

        let result = sqlx::query(
            r#"
            DELETE FROM clients
            WHERE user_id = $1 AND id = $2
            "#,
        )
        .bind(user_id)
        .bind(client_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to delete client: {}", e)))?;

        timer.observe_duration();

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(client_id = %client_id, "Client deleted");
        }

        Ok(deleted)
    }

    // -------------------------------------------------------------------------
    // Billing Ledger Operations
    // -------------------------------------------------------------------------

    /// List ledger records for an operator. The owner join is
    /// unconditional; a `client_id` filter naming a foreign client matches
    /// nothing.
    #[instrument(skip(self, filter), fields(user_id = %user_id))]
    pub async fn list_billing(
        &self,
        user_id: i64,
        filter: &ListBillingFilter,
    ) -> Result<Vec<BillingWithClient>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_billing"])
            .start_timer();

        let status_str = filter.status.map(|s| s.as_str().to_string());

        let records = sqlx::query_as::<_, BillingWithClient>(
            r#"
            SELECT b.id, b.client_id, b.month, b.year, b.amount, b.amount_paid, b.amount_due,
                b.bkash_payment, b.payment_method, b.status, b.payment_date, b.due_date,
                c.name AS client_name, c.package
            FROM billing b
            JOIN clients c ON b.client_id = c.id
            WHERE c.user_id = $1
              AND ($2::int IS NULL OR b.month = $2)
              AND ($3::int IS NULL OR b.year = $3)
              AND ($4::varchar IS NULL OR b.status = $4)
              AND ($5::bigint IS NULL OR b.client_id = $5)
            ORDER BY b.year DESC, b.month DESC, c.name
            "#,
        )
        .bind(user_id)
        .bind(filter.month)
        .bind(filter.year)
        .bind(&status_str)
        .bind(filter.client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list billing records: {}", e))
        })?;

        timer.observe_duration();

        Ok(records)
    }

    /// Atomically create or replace the ledger record for a client period.
    /// One statement keyed on (client_id, month, year); concurrent
    /// submissions serialize in the store and the last writer wins.
    #[instrument(
        skip(self, input),
        fields(client_id = %input.client_id, month = %input.month, year = %input.year)
    )]
    pub async fn upsert_billing(&self, input: &UpsertBilling) -> Result<BillingRecord, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["upsert_billing"])
            .start_timer();

        let method_str = input.payment_method.map(|m| m.as_str().to_string());

        let record = sqlx::query_as::<_, BillingRecord>(
            r#"
            INSERT INTO billing (
                client_id, month, year, amount, amount_paid, amount_due,
                bkash_payment, payment_method, payment_date, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (client_id, month, year) DO UPDATE
            SET amount = EXCLUDED.amount,
                amount_paid = EXCLUDED.amount_paid,
                amount_due = EXCLUDED.amount_due,
                bkash_payment = EXCLUDED.bkash_payment,
                payment_method = EXCLUDED.payment_method,
                payment_date = EXCLUDED.payment_date,
                status = EXCLUDED.status
            RETURNING id, client_id, month, year, amount, amount_paid, amount_due,
                bkash_payment, payment_method, status, payment_date, due_date, created_at
            "#,
        )
        .bind(input.client_id)
        .bind(input.month)
        .bind(input.year)
        .bind(input.amount)
        .bind(input.amount_paid)
        .bind(input.amount_due)
        .bind(input.bkash_payment)
        .bind(&method_str)
        .bind(input.payment_date)
        .bind(input.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::NotFound(anyhow::anyhow!("Client not found"))
            }
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Billing record for this period was written concurrently, retry"
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to save billing record: {}", e)),
        })?;

        timer.observe_duration();

        info!(
            billing_id = %record.id,
            status = %record.status,
            amount_due = %record.amount_due,
            "Billing record saved"
        );

        Ok(record)
    }

    /// Owner-scoped dashboard aggregates over clients and billing history.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn dashboard_stats(&self, user_id: i64) -> Result<DashboardStats, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["dashboard_stats"])
            .start_timer();

        let stats = sqlx::query_as::<_, DashboardStats>(
            r#"
            SELECT
                COUNT(DISTINCT c.id) AS total_clients,
                COUNT(DISTINCT CASE WHEN c.status = 'active' THEN c.id END) AS active_clients,
                COALESCE(SUM(b.amount_paid + b.bkash_payment), 0) AS total_revenue,
                COUNT(CASE WHEN b.status = 'due' THEN 1 END) AS pending_payments
            FROM clients c
            LEFT JOIN billing b ON c.id = b.client_id
            WHERE c.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to compute dashboard stats: {}", e))
        })?;

        timer.observe_duration();

        Ok(stats)
    }

    // -------------------------------------------------------------------------
    // Invoice Operations
    // -------------------------------------------------------------------------

    /// List invoices for an operator, newest first.
    #[instrument(skip(self, filter), fields(user_id = %user_id))]
    pub async fn list_invoices(
        &self,
        user_id: i64,
        filter: &ListInvoicesFilter,
    ) -> Result<Vec<InvoiceWithClient>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_invoices"])
            .start_timer();

        let status_str = filter.status.map(|s| s.as_str().to_string());

        let invoices = sqlx::query_as::<_, InvoiceWithClient>(
            r#"
            SELECT i.id, i.client_id, i.invoice_number, i.amount, i.status, i.issue_date,
                i.due_date, i.paid_date, c.name AS client_name, c.phone, c.email, c.address
            FROM invoices i
            JOIN clients c ON i.client_id = c.id
            WHERE c.user_id = $1
              AND ($2::varchar IS NULL OR i.status = $2)
              AND ($3::bigint IS NULL OR i.client_id = $3)
              AND ($4::date IS NULL OR i.issue_date >= $4)
              AND ($5::date IS NULL OR i.issue_date <= $5)
            ORDER BY i.created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(&status_str)
        .bind(filter.client_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list invoices: {}", e)))?;

        timer.observe_duration();

        Ok(invoices)
    }

    /// Get an invoice by id, scoped to the owning operator.
    #[instrument(skip(self), fields(user_id = %user_id, invoice_id = %invoice_id))]
    pub async fn get_invoice(
        &self,
        user_id: i64,
        invoice_id: i64,
    ) -> Result<Option<InvoiceWithClient>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_invoice"])
            .start_timer();

        let invoice = sqlx::query_as::<_, InvoiceWithClient>(
            r#"
            SELECT i.id, i.client_id, i.invoice_number, i.amount, i.status, i.issue_date,
                i.due_date, i.paid_date, c.name AS client_name, c.phone, c.email, c.address
            FROM invoices i
            JOIN clients c ON i.client_id = c.id
            WHERE i.id = $2 AND c.user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(invoice_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice: {}", e)))?;

        timer.observe_duration();

        Ok(invoice)
    }

    /// Create an invoice with a pre-generated document number.
    #[instrument(skip(self, input), fields(client_id = %input.client_id))]
    pub async fn create_invoice(
        &self,
        input: &CreateInvoice,
        invoice_number: &str,
    ) -> Result<Invoice, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_invoice"])
            .start_timer();

        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            INSERT INTO invoices (client_id, invoice_number, amount, due_date, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING id, client_id, invoice_number, amount, status, issue_date,
                due_date, paid_date, created_at
            "#,
        )
        .bind(input.client_id)
        .bind(invoice_number)
        .bind(input.amount)
        .bind(input.due_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Invoice number {} already exists, retry",
                    invoice_number
                ))
            }
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::NotFound(anyhow::anyhow!("Client not found"))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create invoice: {}", e)),
        })?;

        timer.observe_duration();

        info!(invoice_id = %invoice.id, invoice_number = %invoice.invoice_number, "Invoice created");

        Ok(invoice)
    }

    /// Update an invoice's status, scoped to the owning operator.
    #[instrument(skip(self), fields(user_id = %user_id, invoice_id = %invoice_id))]
    pub async fn update_invoice_status(
        &self,
        user_id: i64,
        invoice_id: i64,
        status: &str,
        paid_date: Option<chrono::NaiveDate>,
    ) -> Result<Option<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_invoice_status"])
            .start_timer();

        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            UPDATE invoices i
            SET status = $3, paid_date = $4
            FROM clients c
            WHERE i.id = $2 AND i.client_id = c.id AND c.user_id = $1
            RETURNING i.id, i.client_id, i.invoice_number, i.amount, i.status, i.issue_date,
                i.due_date, i.paid_date, i.created_at
            "#,
        )
        .bind(user_id)
        .bind(invoice_id)
        .bind(status)
        .bind(paid_date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update invoice status: {}", e))
        })?;

        timer.observe_duration();

        if let Some(ref inv) = invoice {
            info!(invoice_id = %inv.id, status = %inv.status, "Invoice status updated");
        }

        Ok(invoice)
    }
}
