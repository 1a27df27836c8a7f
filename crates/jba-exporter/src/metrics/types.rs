use std::collections::HashMap;

use jba_common::error::{ExporterError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Gauge,
}

impl MetricType {
    pub fn as_prometheus_type(&self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
        }
    }
}

/// Static declaration of one metric family.
#[derive(Debug, Clone, PartialEq)]
pub struct Specification {
    pub name: String,
    pub documentation: String,
    pub labels: Vec<String>,
    pub metric_type: MetricType,
}

impl Specification {
    pub fn new(name: &str, documentation: &str, labels: &[&str], metric_type: MetricType) -> Self {
        Self {
            name: name.to_string(),
            documentation: documentation.to_string(),
            labels: labels.iter().map(|label| (*label).to_string()).collect(),
            metric_type,
        }
    }

    pub fn counter(name: &str, documentation: &str, labels: &[&str]) -> Self {
        Self::new(name, documentation, labels, MetricType::Counter)
    }

    pub fn gauge(name: &str, documentation: &str, labels: &[&str]) -> Self {
        Self::new(name, documentation, labels, MetricType::Gauge)
    }
}

/// One sample produced by a source during a single scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub name: String,
    pub labels: Vec<String>,
    pub value: f64,
}

impl Payload {
    pub fn new(name: &str, labels: Vec<String>, value: f64) -> Self {
        Self {
            name: name.to_string(),
            labels,
            value,
        }
    }

    pub fn series_key(&self) -> SeriesKey {
        (self.name.clone(), self.labels.clone())
    }
}

/// Metric name plus ordered label values.
pub type SeriesKey = (String, Vec<String>);

/// Last exposed value per series, owned by exactly one collector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Datastore {
    values: HashMap<SeriesKey, f64>,
}

impl Datastore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str, labels: &[String]) -> Option<f64> {
        // Tuple keys cannot be borrowed as (&str, &[String]), so build the owned key.
        self.values
            .get(&(name.to_string(), labels.to_vec()))
            .copied()
    }

    pub fn store(&mut self, payloads: &[Payload]) {
        for payload in payloads {
            self.values.insert(payload.series_key(), payload.value);
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Immutable name → specification lookup for one collector.
#[derive(Debug, Clone)]
pub struct SpecificationTable {
    specifications: Vec<Specification>,
}

impl SpecificationTable {
    pub fn new(specifications: Vec<Specification>) -> Result<Self> {
        for (index, specification) in specifications.iter().enumerate() {
            if specifications[..index]
                .iter()
                .any(|earlier| earlier.name == specification.name)
            {
                return Err(ExporterError::DuplicateMetric(specification.name.clone()));
            }
        }

        Ok(Self { specifications })
    }

    pub fn get(&self, name: &str) -> Option<&Specification> {
        self.specifications
            .iter()
            .find(|specification| specification.name == name)
    }

    pub fn specifications(&self) -> &[Specification] {
        &self.specifications
    }

    /// Looks up the specification for `payload` and checks its label arity.
    pub fn resolve(&self, payload: &Payload) -> Result<&Specification> {
        let specification = self.get(&payload.name).ok_or_else(|| {
            ExporterError::InvalidPayload(format!("no specification for metric {}", payload.name))
        })?;

        if specification.labels.len() != payload.labels.len() {
            return Err(ExporterError::InvalidPayload(format!(
                "metric {} expects {} label values, got {}",
                payload.name,
                specification.labels.len(),
                payload.labels.len()
            )));
        }

        Ok(specification)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub labels: Vec<(String, String)>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectedMetric {
    pub specification: Specification,
    pub samples: Vec<MetricSample>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_specification_names_are_rejected() {
        let err = SpecificationTable::new(vec![
            Specification::gauge("a", "first", &[]),
            Specification::counter("a", "second", &[]),
        ])
        .unwrap_err();

        assert!(matches!(err, ExporterError::DuplicateMetric(name) if name == "a"));
    }

    #[test]
    fn resolve_checks_name_and_label_count() {
        let table =
            SpecificationTable::new(vec![Specification::gauge("g", "gauge", &["x", "y"])]).unwrap();

        let ok = Payload::new("g", vec!["1".to_string(), "2".to_string()], 1.0);
        assert_eq!(table.resolve(&ok).unwrap().name, "g");

        let unknown = Payload::new("h", vec![], 1.0);
        assert!(matches!(
            table.resolve(&unknown),
            Err(ExporterError::InvalidPayload(_))
        ));

        let short = Payload::new("g", vec!["1".to_string()], 1.0);
        assert!(matches!(
            table.resolve(&short),
            Err(ExporterError::InvalidPayload(_))
        ));
    }

    #[test]
    fn datastore_is_keyed_by_name_and_label_values() {
        let mut datastore = Datastore::new();
        datastore.store(&[
            Payload::new("m", vec!["a".to_string()], 1.0),
            Payload::new("m", vec!["b".to_string()], 2.0),
        ]);

        assert_eq!(datastore.len(), 2);
        assert_eq!(datastore.get("m", &["a".to_string()]), Some(1.0));
        assert_eq!(datastore.get("m", &["b".to_string()]), Some(2.0));
        assert_eq!(datastore.get("m", &[]), None);

        datastore.store(&[Payload::new("m", vec!["a".to_string()], 5.0)]);
        assert_eq!(datastore.get("m", &["a".to_string()]), Some(5.0));
        assert_eq!(datastore.len(), 2);
    }
}
