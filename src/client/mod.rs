//! Composable wrappers around external service clients.
//!
//! Both wrappers implement the same service traits as the client they wrap,
//! so they stack: `FaultTranslatingClient::new(RateLimitedClient::new(api, limiter))`.

mod fault;
mod rate_limit;

pub use fault::{safe_call, FaultTranslatingClient};
pub use rate_limit::{FixedWindowLimiter, RateLimitedClient};
