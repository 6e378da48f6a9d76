//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: user and project repositories (in-memory and remote
//!   document store)
//! - **session**: server-side session state for `actix-session`
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations.

pub mod persistence;
pub mod session;
