//! # Integration tests
//!
//! Integration tests completely external from the crate. All code written in this module could be
//! written by an external user of the crate.

/// Solving small models with a brute force integration.
mod enumeration;
/// Building, inspecting and validating models.
mod model;
