//! Domain types shared across the portal crates.
//!
//! Pure types with no framework dependencies.

pub mod homework;
pub mod role;
