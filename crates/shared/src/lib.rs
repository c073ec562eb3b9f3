//! Shared types, errors, and configuration for Tallybook.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for journals, ledger lines and users
//! - Pagination types for list endpoints
//! - Application-wide error types and the error taxonomy
//! - JWT verification for the acting user's identity
//! - Configuration management

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

#[cfg(test)]
mod jwt_tests;

pub use auth::Claims;
pub use config::AppConfig;
pub use error::{AppError, AppResult, ErrorKind, FieldError};
pub use jwt::{JwtConfig, JwtError, JwtService};
