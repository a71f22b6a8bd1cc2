//! Core business logic, independent of the HTTP layer.
//!
//! Every operation takes an explicit database connection and the identity it
//! acts for, and returns plain entity models. The HTTP layer resolves the
//! identity once and threads it through.

/// Registration, login, and session-token handling
pub mod auth;
/// Per-user shopping cart operations
pub mod cart;
/// Product and category catalog operations
pub mod catalog;
/// Checkout and the order status state machine
pub mod order;
