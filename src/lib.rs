//! Consent Gateway Library
//!
//! HTTP facade for privacy consent assessment, metadata retrieval, and
//! consent storage.
//!
//! ## Modules
//!
//! - [`domain`] - Core domain types (consent records, decisions, catalog)
//! - [`infra`] - In-memory store and the services operating on it
//! - [`auth`] - Bearer-token authentication via token introspection
//! - [`verify`] - Delegated verify adapter (external consent service)
//! - [`api`] - REST API routes
//! - [`server`] - Server bootstrap and configuration

pub mod api;
pub mod auth;
pub mod domain;
pub mod infra;
pub mod server;
pub mod verify;

// Re-export commonly used types
pub use domain::{
    AssessmentStatus, Catalog, ConsentKey, ConsentRecord, ConsentState, ConsentStatus, Decision,
    ReasonCode, RequestedItem,
};

pub use infra::{Assessor, ConsentRecorder, MemoryConsentStore, MetadataAssembler};
