//! Shared database repository test infrastructure
//!
//! The same test logic runs against both backends:
//!
//! - **Unit tests (SQLite)**: Fast, in-memory tests that run with every `cargo test`
//! - **Integration tests (PostgreSQL)**: Slower tests using testcontainers, run with `cargo test -- --ignored`
//!
//! Each repository test module contains shared test functions that take
//! `&dyn CustomerRepo`, plus per-backend wiring at the bottom.

mod customers;
