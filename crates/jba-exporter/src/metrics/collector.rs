use std::sync::Mutex;

use jba_common::error::{ExporterError, Result};
use tracing::debug;

use crate::metrics::types::{
    CollectedMetric, Datastore, MetricSample, MetricType, Payload, Specification,
    SpecificationTable,
};

/// Produces fresh payloads for a fixed set of metric families.
pub trait MetricSource: Send + Sync {
    fn specifications(&self) -> Vec<Specification>;
    fn fetch(&self) -> Result<Vec<Payload>>;
}

/// Runs one source per scrape and folds counter families into its datastore.
pub struct Collector {
    source: Box<dyn MetricSource>,
    table: SpecificationTable,
    datastore: Mutex<Datastore>,
}

impl Collector {
    pub fn new(source: impl MetricSource + 'static) -> Result<Self> {
        let table = SpecificationTable::new(source.specifications())?;
        Ok(Self {
            source: Box::new(source),
            table,
            datastore: Mutex::new(Datastore::new()),
        })
    }

    pub fn specifications(&self) -> &[Specification] {
        self.table.specifications()
    }

    pub fn fetch(&self) -> Result<Vec<Payload>> {
        self.source.fetch()
    }

    /// Gauges pass through unchanged; counters add the value previously
    /// exposed for the same series.
    pub fn process(&self, payloads: Vec<Payload>, datastore: &Datastore) -> Result<Vec<Payload>> {
        payloads
            .into_iter()
            .map(|mut payload| {
                let specification = self.table.resolve(&payload)?;
                if specification.metric_type == MetricType::Counter {
                    let previous = datastore
                        .get(&payload.name, &payload.labels)
                        .unwrap_or(0.0);
                    payload.value += previous;
                }
                Ok(payload)
            })
            .collect()
    }

    /// One full `fetch → process → store` transition. The datastore lock is
    /// held throughout so concurrent scrapes never apply the same delta
    /// twice; on error the datastore is left as it was.
    pub fn collect(&self) -> Result<Vec<CollectedMetric>> {
        let mut datastore = self.datastore.lock().map_err(|_| {
            ExporterError::InternalError("failed to acquire collector datastore lock".to_string())
        })?;

        let fetched = self.fetch()?;
        let processed = self.process(fetched, &datastore)?;
        datastore.store(&processed);
        drop(datastore);

        Ok(self.group(processed))
    }

    /// Snapshot of the values exposed by the most recent successful scrape.
    pub fn datastore(&self) -> Result<Datastore> {
        self.datastore
            .lock()
            .map(|datastore| datastore.clone())
            .map_err(|_| {
                ExporterError::InternalError(
                    "failed to acquire collector datastore lock".to_string(),
                )
            })
    }

    fn group(&self, payloads: Vec<Payload>) -> Vec<CollectedMetric> {
        self.table
            .specifications()
            .iter()
            .map(|specification| {
                let samples = payloads
                    .iter()
                    .filter(|payload| payload.name == specification.name)
                    .map(|payload| MetricSample {
                        labels: materialize_labels(specification, &payload.labels),
                        value: payload.value,
                    })
                    .collect::<Vec<_>>();

                debug!(
                    metric = %specification.name,
                    samples = samples.len(),
                    "collected metric family"
                );

                CollectedMetric {
                    specification: specification.clone(),
                    samples,
                }
            })
            .collect()
    }
}

fn materialize_labels(specification: &Specification, values: &[String]) -> Vec<(String, String)> {
    specification
        .labels
        .iter()
        .zip(values.iter())
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
    };

    use super::*;

    /// Replays scripted fetch results, one per scrape.
    struct ScriptedSource {
        specifications: Vec<Specification>,
        fetches: Mutex<VecDeque<Result<Vec<Payload>>>>,
    }

    impl ScriptedSource {
        fn new(specifications: Vec<Specification>, fetches: Vec<Result<Vec<Payload>>>) -> Self {
            Self {
                specifications,
                fetches: Mutex::new(fetches.into()),
            }
        }
    }

    impl MetricSource for ScriptedSource {
        fn specifications(&self) -> Vec<Specification> {
            self.specifications.clone()
        }

        fn fetch(&self) -> Result<Vec<Payload>> {
            self.fetches
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    fn mixed_specifications() -> Vec<Specification> {
        vec![
            Specification::gauge("g", "a gauge", &["kind"]),
            Specification::counter("c_total", "a counter", &["kind"]),
        ]
    }

    #[test]
    fn process_dispatches_on_metric_type() {
        let collector = Collector::new(ScriptedSource::new(mixed_specifications(), vec![])).unwrap();
        let mut datastore = Datastore::new();
        datastore.store(&[
            Payload::new("g", labels(&["x"]), 10.0),
            Payload::new("c_total", labels(&["x"]), 10.0),
        ]);

        let processed = collector
            .process(
                vec![
                    Payload::new("g", labels(&["x"]), 3.0),
                    Payload::new("c_total", labels(&["x"]), 3.0),
                    Payload::new("c_total", labels(&["y"]), 3.0),
                ],
                &datastore,
            )
            .unwrap();

        let values: Vec<_> = processed.iter().map(|payload| payload.value).collect();
        assert_eq!(values, [3.0, 13.0, 3.0]);
    }

    #[test]
    fn gauge_processing_has_no_memory() {
        let collector = Collector::new(ScriptedSource::new(mixed_specifications(), vec![])).unwrap();
        let datastore = Datastore::new();
        let fetched = vec![Payload::new("g", labels(&["x"]), 7.5)];

        let first = collector.process(fetched.clone(), &datastore).unwrap();
        let second = collector.process(fetched, &datastore).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn counters_accumulate_across_scrapes() {
        let deltas = [2.0, 0.0, 3.0, 1.5];
        let fetches = deltas
            .iter()
            .map(|delta| Ok(vec![Payload::new("c_total", vec![], *delta)]))
            .collect();
        let collector = Collector::new(ScriptedSource::new(
            vec![Specification::counter("c_total", "a counter", &[])],
            fetches,
        ))
        .unwrap();

        let mut expected = 0.0;
        for delta in deltas {
            expected += delta;
            let families = collector.collect().unwrap();
            assert_eq!(families[0].samples[0].value, expected);
        }
        assert_eq!(collector.datastore().unwrap().get("c_total", &[]), Some(7.5));
    }

    #[test]
    fn failed_fetch_leaves_datastore_untouched() {
        let collector = Collector::new(ScriptedSource::new(
            vec![Specification::counter("c_total", "a counter", &[])],
            vec![
                Ok(vec![Payload::new("c_total", vec![], 4.0)]),
                Err(ExporterError::InternalError("boom".to_string())),
                Ok(vec![Payload::new("c_total", vec![], 1.0)]),
            ],
        ))
        .unwrap();

        collector.collect().unwrap();
        assert!(collector.collect().is_err());
        assert_eq!(collector.datastore().unwrap().get("c_total", &[]), Some(4.0));

        let families = collector.collect().unwrap();
        assert_eq!(families[0].samples[0].value, 5.0);
    }

    #[test]
    fn invalid_payload_fails_without_storing() {
        let collector = Collector::new(ScriptedSource::new(
            mixed_specifications(),
            vec![Ok(vec![
                Payload::new("c_total", labels(&["x"]), 1.0),
                Payload::new("g", labels(&["x", "extra"]), 1.0),
            ])],
        ))
        .unwrap();

        assert!(matches!(
            collector.collect(),
            Err(ExporterError::InvalidPayload(_))
        ));
        assert!(collector.datastore().unwrap().is_empty());
    }

    #[test]
    fn families_follow_specification_order_and_label_positions() {
        let collector = Collector::new(ScriptedSource::new(
            vec![
                Specification::gauge("second", "b", &["a", "b"]),
                Specification::gauge("first", "a", &[]),
            ],
            vec![Ok(vec![
                Payload::new("first", vec![], 1.0),
                Payload::new("second", labels(&["va", "vb"]), 2.0),
            ])],
        ))
        .unwrap();

        let families = collector.collect().unwrap();
        assert_eq!(families[0].specification.name, "second");
        assert_eq!(
            families[0].samples[0].labels,
            vec![
                ("a".to_string(), "va".to_string()),
                ("b".to_string(), "vb".to_string()),
            ]
        );
        assert_eq!(families[1].specification.name, "first");
    }

    #[test]
    fn concurrent_scrapes_apply_each_delta_once() {
        let scrapes = 16;
        let fetches = (0..scrapes)
            .map(|_| Ok(vec![Payload::new("c_total", vec![], 1.0)]))
            .collect();
        let collector = Arc::new(
            Collector::new(ScriptedSource::new(
                vec![Specification::counter("c_total", "a counter", &[])],
                fetches,
            ))
            .unwrap(),
        );

        let handles: Vec<_> = (0..scrapes)
            .map(|_| {
                let collector = Arc::clone(&collector);
                std::thread::spawn(move || collector.collect().unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(
            collector.datastore().unwrap().get("c_total", &[]),
            Some(scrapes as f64)
        );
    }
}
