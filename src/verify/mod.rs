//! Delegated verify adapter.
//!
//! Pass-through to an external consent-management service: OAuth
//! client-credentials tokens, token introspection for inbound bearer tokens,
//! a single refresh-and-retry on auth expiry, and field remapping between
//! the upstream wire format and ours.

mod client;
mod error;
mod remap;

pub use client::{Introspection, VerifyClient, VerifyConfig};
pub use error::{Result, VerifyError};
pub use remap::{
    display_type_name, prepare_consents, remap_assessment, remap_metadata, remap_store_response,
    split_error_string, state_code, state_name, status_name,
};
