//! Product analytics glue (OpenPanel).
//!
//! Both the server and client variants degrade to no-ops when credentials are
//! absent, so the application starts and runs without the integration
//! configured. Outside production, events are written to the local log
//! instead of being transmitted.

pub mod catalog;
pub mod client;
pub mod server;

mod openpanel;

pub use catalog::LogEvent;
pub use openpanel::AnalyticsError;
