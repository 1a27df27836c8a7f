pub mod collector;
pub mod collectors;
pub mod registry;
pub mod types;

pub use collector::{Collector, MetricSource};
pub use collectors::{event::BackupEventSource, stats::BackupStatsSource};
pub use registry::MetricsRegistry;
pub use types::{
    CollectedMetric, Datastore, MetricSample, MetricType, Payload, Specification,
    SpecificationTable,
};

