use std::sync::{Arc, RwLock};

use jba_common::error::{ExporterError, Result};

use crate::metrics::{
    collector::Collector,
    types::{CollectedMetric, MetricSample, MetricType, Specification},
};

pub struct MetricsRegistry {
    collectors: RwLock<Vec<Arc<Collector>>>,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            collectors: RwLock::new(Vec::new()),
        }
    }

    /// Registers a collector whose family names do not clash with any
    /// already registered family.
    pub fn register(&self, collector: Collector) -> Result<Arc<Collector>> {
        let mut collectors = self.collectors.write().map_err(|_| {
            ExporterError::InternalError("failed to acquire metrics registry lock".to_string())
        })?;

        for specification in collector.specifications() {
            let taken = collectors.iter().any(|registered| {
                registered
                    .specifications()
                    .iter()
                    .any(|existing| existing.name == specification.name)
            });
            if taken {
                return Err(ExporterError::DuplicateMetric(specification.name.clone()));
            }
        }

        let collector = Arc::new(collector);
        collectors.push(Arc::clone(&collector));
        Ok(collector)
    }

    /// Runs every collector once. Any failure fails the whole scrape.
    pub fn collect_all(&self) -> Result<Vec<CollectedMetric>> {
        let collectors = self.collectors.read().map_err(|_| {
            ExporterError::InternalError("failed to acquire metrics registry lock".to_string())
        })?;

        let mut collected = Vec::new();
        for collector in collectors.iter() {
            collected.extend(collector.collect()?);
        }

        collected.sort_by(|left, right| left.specification.name.cmp(&right.specification.name));
        Ok(collected)
    }

    pub fn render_prometheus(&self) -> Result<String> {
        Ok(render_metrics(&self.collect_all()?))
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_metrics(metrics: &[CollectedMetric]) -> String {
    let mut output = String::new();

    for metric in metrics {
        let name = &metric.specification.name;
        let family = family_name(&metric.specification);

        output.push_str("# HELP ");
        output.push_str(family);
        output.push(' ');
        output.push_str(&escape_help(&metric.specification.documentation));
        output.push('\n');

        output.push_str("# TYPE ");
        output.push_str(family);
        output.push(' ');
        output.push_str(metric.specification.metric_type.as_prometheus_type());
        output.push('\n');

        for MetricSample { labels, value } in &metric.samples {
            output.push_str(&render_sample_line(name, labels, *value));
        }
    }

    output
}

/// Counter families are announced without `_total`; samples keep the full name.
fn family_name(specification: &Specification) -> &str {
    match specification.metric_type {
        MetricType::Counter => specification
            .name
            .strip_suffix("_total")
            .unwrap_or(&specification.name),
        MetricType::Gauge => &specification.name,
    }
}

fn render_sample_line(name: &str, labels: &[(String, String)], value: f64) -> String {
    let mut rendered = String::new();
    rendered.push_str(name);

    if !labels.is_empty() {
        rendered.push('{');
        for (index, (key, value)) in labels.iter().enumerate() {
            if index > 0 {
                rendered.push(',');
            }
            rendered.push_str(key);
            rendered.push_str("=\"");
            rendered.push_str(&escape_label_value(value));
            rendered.push('"');
        }
        rendered.push('}');
    }

    rendered.push(' ');
    rendered.push_str(&format_metric_value(value));
    rendered.push('\n');
    rendered
}

fn format_metric_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

fn escape_help(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('"', "\\\"")
}
