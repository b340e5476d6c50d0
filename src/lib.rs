//! # Role Exporter Library
//!
//! Exports Mimecast internal users and their assigned roles to a CSV file:
//! acquire a bearer token, page through the internal users list, look up each
//! user's profile role and write the exportable `email,role` pairs.
//!
//! Modules:
//! - `config` — YAML configuration, defaults and validation
//! - `auth` — bearer token and the client-credentials acquirer
//! - `api` — user listing and profile lookup
//! - `resilience` — retry delays and rate-limit waits
//! - `export` — row filtering and CSV output
//! - `orchestrator` — the end-to-end run

pub mod config;
pub mod auth;
pub mod api;
pub mod resilience;
pub mod export;
pub mod orchestrator;
pub mod observability;
pub mod helpers;
pub mod utils;
pub mod error;

#[cfg(test)]
mod tests;

pub use crate::config::settings::ExporterConfig;
pub use crate::error::ExportError;
