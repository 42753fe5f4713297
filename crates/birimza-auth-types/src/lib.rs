//! Auth types shared by the portal service and its tests.
//!
//! Provides JWT issuance/validation, the session cookie builders, and the
//! per-request `Identity` extractor.

pub mod cookie;
pub mod identity;
pub mod token;
