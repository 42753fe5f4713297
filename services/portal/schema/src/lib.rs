//! sea-orm entities for the portal database.

pub mod homeworks;
pub mod otp_codes;
pub mod outbox_events;
pub mod parents;
pub mod staff_users;
pub mod students;
