//! Client-side session state and its storage.
//!
//! DESIGN
//! ======
//! `storage` is the key-value port, `session` the shared credential/profile
//! handle, and `user` the login/register/logout operations built on both.

pub mod session;
pub mod storage;
pub mod user;
