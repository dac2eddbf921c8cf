//! Vendor proxy layer.
//!
//! The original system repeated the same HTTP-call-and-poll shape once per
//! vendor. Here it is one parameterized client ([`client::VendorClient`],
//! configured with an auth header scheme and base URL), one bounded
//! cancellable polling loop ([`poll::poll_until_terminal`]), and a thin
//! wire-format adapter per vendor.

pub mod client;
pub mod elevenlabs;
pub mod error;
pub mod luma;
pub mod openai;
pub mod poll;

pub use client::{AuthScheme, VendorClient};
pub use error::VendorError;
