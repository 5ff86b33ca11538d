//! Cartwheel Core - Shared types library.
//!
//! This crate provides the common types used across Cartwheel components:
//! - `engine` - the cart recomputation pipeline
//! - host applications embedding the engine
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no
//! catalog lookups. This keeps it lightweight and allows it to be used
//! anywhere, including hosts that only need to talk about cart identifiers
//! without pulling in the engine.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and country codes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
