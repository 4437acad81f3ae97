pub mod database;
pub mod jwt;
pub mod metrics;
pub mod mikrotik;

pub use database::Database;
pub use jwt::{AccessClaims, JwtService};
pub use mikrotik::MikrotikClient;
