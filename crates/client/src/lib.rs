//! # Dashboard Client
//!
//! Client side of the therapist dashboard.
//!
//! Contains:
//! - `DashboardApi`, the seam between the controller and the network, with a reqwest-backed
//!   implementation (`HttpDashboardApi`)
//! - `DashboardController`, which owns all view state and implements loading, selection,
//!   insight generation and summary saving
//! - `view`, a plain-text rendering of the controller used by the `therapist` CLI
//!
//! No rendering toolkit is assumed: any front-end drives the controller through its methods and
//! reads state back through its getters.

pub mod api;
pub mod config;
pub mod controller;
pub mod status;
pub mod view;

pub use api::{ApiError, DashboardApi, HttpDashboardApi};
pub use config::ClientConfig;
pub use controller::{DashboardController, PendingInsight, PendingSave, RequestToken};
pub use status::StatusMessage;
