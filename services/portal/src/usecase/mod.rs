pub mod dashboard;
pub mod homework;
pub mod login;
pub mod otp;
pub mod outbox;
pub mod registration;
pub mod staff;
pub mod student;
