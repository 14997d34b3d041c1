//! SMS delivery implementations
//!
//! Real SMS gateways live outside this workspace; anything implementing
//! [`SmsSender`](sv_core::services::SmsSender) can be handed to
//! [`build_context_with`](crate::services::build_context_with).

pub mod logging_sender;

pub use logging_sender::LoggingSender;
