pub mod auth;
pub mod billing;
pub mod clients;
pub mod invoices;
pub mod metrics;
pub mod mikrotik;
