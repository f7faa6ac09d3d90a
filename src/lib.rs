//! Access-gating client for the distribution portal.
//!
//! The portal backend owns the truth about roles, permissions and
//! per-page maintenance flags; this crate owns everything a front end
//! needs to consume that truth safely: the persisted session, api-base
//! resolution, the role/permission resolution chain with its fallbacks,
//! and the authorization and maintenance gates that turn fetched state
//! into render decisions.

pub mod access;
pub mod cancel;
pub mod client;
pub mod cmd;
pub mod config;
pub mod display;
pub mod filelock;
pub mod logs;
pub mod maintenance;
pub mod route;
pub mod session;
pub mod storage;
pub mod types;
pub mod utils;
