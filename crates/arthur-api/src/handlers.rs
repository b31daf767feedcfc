//! API request handlers.

pub mod generations;
pub mod health;
pub mod webhooks;

pub use health::{health, ready};
