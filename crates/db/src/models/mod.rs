pub mod api_config;
pub mod credit_transaction;
pub mod generation;
pub mod profile;
pub mod session;
