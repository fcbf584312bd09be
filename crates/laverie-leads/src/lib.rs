//! Lead-capture backend for the Ma Petite Laverie marketing site.
//!
//! The marketing site's multi-step wizard posts prospect details to a single
//! HTTP endpoint. This crate owns everything behind that endpoint: input
//! sanitization and validation, sliding-window rate limiting, the append-only
//! submission journal, and the best-effort notification fan-out (internal
//! alert email, confirmation email, push alert).

pub mod config;
pub mod error;
pub mod intake;
pub mod telemetry;
