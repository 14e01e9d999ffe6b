//! obs-origin - Origin resolution for maintained Open Build Service projects
//!
//! Packages of a maintained project are usually inherited or submitted from
//! other projects. This crate determines, per package, the project it
//! actually originates from, driven by the `OSRT:OriginConfig` attribute of
//! the maintained project.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to the resolver)
//! - [`origin`] - Origin configuration, candidate expansion and resolution
//! - [`service`] - Abstraction for the build service API (OBS over HTTP/XML)
//! - [`core`] - Read-through caches and client configuration
//!
//! # Guarantees
//!
//! 1. Resolution is deterministic for unchanged build service data
//! 2. Configurations, expansions, devel projects and package listings are
//!    fetched at most once per resolver
//! 3. "No origin" is a result, never an error
//! 4. Configuration and transport errors are propagated, never defaulted

pub mod cli;
pub mod core;
pub mod origin;
pub mod service;
