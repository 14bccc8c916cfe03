mod broker;
mod builder;
mod error;
mod metrics;
mod registry;

pub use broker::Broker;
pub use builder::BrokerBuilder;
pub use error::BrokerError;
pub use metrics::{BrokerMetrics, MetricsSnapshot};
pub use registry::{SessionGuard, SessionRegistry};
