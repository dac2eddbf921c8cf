//! Request handlers, grouped by resource.

pub mod auth;
pub mod credits;
pub mod generations;
pub mod profile;
pub mod settings;
