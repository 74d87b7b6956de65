//! Floodgate - Request-Admission Rate Limiting
//!
//! This crate implements the admission gate that protects sensitive and
//! costly operations (login, license claiming, checkout, uploads, content
//! mutation) by bounding how many requests a client identity may issue
//! within a sliding time window. Counters live in-process by default and
//! move to a Redis-compatible service when one is configured, with the
//! same externally-observable semantics either way.

pub mod config;
pub mod error;
pub mod http;
pub mod ratelimit;
