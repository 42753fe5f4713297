//! Ambient building blocks shared by portal binaries: configuration loading,
//! tracing setup, HTTP middleware, and serialization helpers.

pub mod config;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
