pub mod arming;
pub mod builder;
pub mod config;
pub mod disclosure;
pub mod error;
pub mod gateway;
pub mod metrics;
pub mod tap;

#[cfg(test)]
mod testing;

pub use arming::{ShareStatus, parse_fields};
pub use builder::GatewayBuilder;
pub use config::ShareConfig;
pub use disclosure::Disclosure;
pub use error::GatewayError;
pub use gateway::ShareGateway;
pub use metrics::{MetricsSnapshot, ShareMetrics};
pub use tap::{ShareVerdict, TapDecision, band_gate, share_verdict};
