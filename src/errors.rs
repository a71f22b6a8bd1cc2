//! Unified error type for the storefront.
//!
//! Every fallible operation in the crate returns [`Result`]. The variants are
//! grouped by how the HTTP layer reports them: validation (400), auth (401),
//! forbidden (403), not-found (404), conflict (409), and internal (500).
//! Internal errors are logged and surfaced to clients as a generic message so
//! that database details never leak into responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::entities::order::OrderStatus;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    // --- Validation ---
    /// Cart quantity outside the accepted range.
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity {
        /// The rejected quantity
        quantity: i32,
    },

    /// Checkout attempted with no items in the cart.
    #[error("Cannot place an order from an empty cart")]
    EmptyCart,

    /// A request field failed validation.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input
        message: String,
    },

    // --- Conflict ---
    /// Requested quantity exceeds the available stock.
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    OutOfStock {
        /// Product that ran short
        product_id: i64,
        /// Quantity the caller asked for
        requested: i32,
        /// Quantity actually available
        available: i32,
    },

    /// Registration attempted with an email that already has an account.
    #[error("An account already exists for email '{email}'")]
    DuplicateEmail {
        /// The conflicting email address
        email: String,
    },

    /// Order status change that the state machine does not permit.
    #[error("Order status cannot change from {from} to {to}")]
    InvalidTransition {
        /// Current order status
        from: OrderStatus,
        /// Requested order status
        to: OrderStatus,
    },

    // --- Auth ---
    /// Email/password pair did not match any account.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Session token past its expiry.
    #[error("Session token has expired")]
    ExpiredToken,

    /// Session token failed signature or claims validation.
    #[error("Invalid session token")]
    InvalidToken,

    /// Protected endpoint called without an authorization header.
    #[error("Missing authorization token")]
    MissingToken,

    /// Authenticated identity lacks the required role.
    #[error("Operation requires administrator privileges")]
    Forbidden,

    // --- Not found ---
    /// No product with the given id (or the product is no longer active).
    #[error("Product {id} not found")]
    ProductNotFound {
        /// Requested product id
        id: i64,
    },

    /// No category with the given id.
    #[error("Category {id} not found")]
    CategoryNotFound {
        /// Requested category id
        id: i64,
    },

    /// The user's cart has no row for the given product.
    #[error("Product {product_id} is not in the cart")]
    CartItemNotFound {
        /// Product id the caller tried to update
        product_id: i64,
    },

    /// No order with the given id.
    #[error("Order {id} not found")]
    OrderNotFound {
        /// Requested order id
        id: i64,
    },

    /// No user with the given id.
    #[error("User {id} not found")]
    UserNotFound {
        /// Requested user id
        id: i64,
    },

    // --- Internal ---
    /// Error propagated from the database layer.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration error during startup.
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong with the configuration
        message: String,
    },

    /// I/O error (e.g. binding the listener).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected internal failure.
    #[error("Internal error: {message}")]
    Internal {
        /// Description, kept out of client responses
        message: String,
    },
}

impl Error {
    /// HTTP status this error maps to.
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidQuantity { .. } | Self::EmptyCart | Self::InvalidInput { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::OutOfStock { .. }
            | Self::DuplicateEmail { .. }
            | Self::InvalidTransition { .. } => StatusCode::CONFLICT,
            Self::InvalidCredentials
            | Self::ExpiredToken
            | Self::InvalidToken
            | Self::MissingToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::ProductNotFound { .. }
            | Self::CategoryNotFound { .. }
            | Self::CartItemNotFound { .. }
            | Self::OrderNotFound { .. }
            | Self::UserNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Config { .. } | Self::Io(_) | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal errors are logged in full but reported generically.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed with internal error");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_by_taxonomy() {
        assert_eq!(
            Error::InvalidQuantity { quantity: -1 }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::EmptyCart.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::OutOfStock {
                product_id: 1,
                requested: 2,
                available: 1
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::DuplicateEmail {
                email: "a@b.com".to_string()
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(Error::ExpiredToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            Error::ProductNotFound { id: 9 }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::Internal {
                message: "boom".to_string()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
