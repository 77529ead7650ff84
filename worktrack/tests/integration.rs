//! Integration Tests
//!
//! Aggregates the integration suites for the worktrack server: the dispatch
//! path, the auth endpoints, and event emission.

#[path = "common.rs"]
mod common;

#[path = "integration/auth_http_test.rs"]
mod auth_http_test;

#[path = "integration/dispatch_test.rs"]
mod dispatch_test;

#[path = "integration/push_test.rs"]
mod push_test;
