//! End-to-End Tests
//!
//! Full-stack scenarios over a served instance: the WebSocket push channel.

#[path = "common.rs"]
mod common;

#[path = "e2e/push_channel_test.rs"]
mod push_channel_test;
