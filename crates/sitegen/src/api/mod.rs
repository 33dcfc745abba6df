//! API interaction helpers shared by the generation pipeline.
//!
//! - [`retry`]: attempt bounds and exponential backoff schedule used by
//!   [`SiteGenerator`](crate::site::SiteGenerator).

pub mod retry;

pub use retry::RetryConfig;
