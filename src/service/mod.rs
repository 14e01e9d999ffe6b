//! service
//!
//! Access to the build service the origin resolver reads from.
//!
//! # Architecture
//!
//! The `BuildService` trait defines the three kinds of remote reads the
//! resolver needs: attribute values, searches, and source listings.
//! Resolver code only ever sees `dyn BuildService`.
//!
//! # Modules
//!
//! - `traits`: Core `BuildService` trait, typed queries and records
//! - [`obs`]: HTTP/XML implementation for Open Build Service instances
//! - [`xml`]: Decoding of the API's XML documents
//! - [`mock`]: Mock implementation for deterministic testing

pub mod mock;
pub mod obs;
mod traits;
pub mod xml;

pub use traits::*;
