//! # API Shared
//!
//! Shared wire definitions for the therapist dashboard.
//!
//! Contains:
//! - JSON request/response types (`dto` module) used by both the REST service and its clients
//! - Shared services like `HealthService`
//!
//! The types carry `utoipa` schemas so `api-rest` can publish them in its OpenAPI document.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
