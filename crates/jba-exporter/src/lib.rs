pub mod handlers;
pub mod metrics;
pub mod router;
pub mod source;

pub use metrics::{Collector, MetricsRegistry};
pub use router::{ExporterState, exporter_router};
