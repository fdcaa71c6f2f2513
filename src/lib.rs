//! Email onboarding — decide-next-screen, wait-for-ack, cancel-listener coordination.

pub mod config;
pub mod error;
pub mod onboarding;
