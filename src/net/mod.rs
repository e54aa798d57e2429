//! Networking modules for the REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` owns the HTTP gateway and its `Api` seam, `error` the failure
//! taxonomy, and `types` the auth wire schema.

pub mod api;
pub mod error;
pub mod types;
