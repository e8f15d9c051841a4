pub mod accounts;
pub mod config;
pub mod cookie;
pub mod jwt;
pub mod password;

pub use accounts::AccountError;
pub use config::AuthConfig;
pub use jwt::{Claims, JwtService};
