//! core
//!
//! Shared building blocks for obs-origin.
//!
//! # Modules
//!
//! - [`cache`] - Lazily populated read-through lookup tables
//! - [`config`] - Client configuration schema and loading

pub mod cache;
pub mod config;
