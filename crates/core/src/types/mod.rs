//! Core types for Cartwheel.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod country;
pub mod id;

pub use country::CountryCode;
pub use id::*;
