//! HTTP gate: cookie authentication and policy-guarded pages.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;
pub mod session;
