//! # papermatch
//!
//! Client core for the paper/requirement matching service: an HTTP gateway
//! with bearer credentials and centralized failure handling, a guarded
//! client-side router, and a session store that keeps the login state and
//! per-session caches in key-value storage.
//!
//! The `papermatch` binary drives the same pieces from a terminal.

pub mod app;
pub mod config;
pub mod net;
pub mod notify;
pub mod router;
pub mod state;
