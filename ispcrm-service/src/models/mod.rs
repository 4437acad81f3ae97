pub mod billing;
pub mod client;
pub mod invoice;
pub mod user;

pub use billing::{
    settle, BillingRecord, BillingStatus, BillingWithClient, DashboardStats, ListBillingFilter,
    PaymentMethod, Settlement, UpsertBilling,
};
pub use client::{Client, ClientInput, ClientStatus, ListClientsFilter};
pub use invoice::{
    generate_invoice_number, CreateInvoice, Invoice, InvoiceStatus, InvoiceWithClient,
    ListInvoicesFilter,
};
pub use user::{CreateUser, SanitizedUser, User};
