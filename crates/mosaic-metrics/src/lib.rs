//! Metrics infrastructure for the Landsat mosaic index.
//!
//! This crate describes all metrics emitted while building the path-row index
//! and while updating mosaics. It re-exports the `metrics` crate for
//! convenience and defines every metric as a structured [`Metric`] constant to
//! avoid typos and carry metadata.
//!
//! Without an installed recorder every call is a no-op.
//!
//! # Example
//!
//! ```rust
//! use mosaic_metrics::{metric_defs, describe_metrics};
//!
//! describe_metrics();
//!
//! metrics::counter!(metric_defs::SCENES_SKIPPED.name, "reason" => "cloudy").increment(1);
//! ```
//!
//! # Metric Type
//!
//! ```rust
//! use mosaic_metrics::{Metric, MetricKind};
//! use metrics::Unit;
//!
//! const MY_COUNTER: Metric = Metric::counter("my.counter")
//!     .with_description("A counter metric")
//!     .with_unit(Unit::Count)
//!     .with_labels(&["table"]);
//!
//! MY_COUNTER.describe();
//! metrics::counter!(MY_COUNTER.name).increment(1);
//! ```

pub use metrics;

use metrics::{describe_counter, describe_histogram, Unit};

/// The kind of metric (counter or histogram).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// A monotonically increasing counter.
    Counter,
    /// A histogram for recording distributions.
    Histogram,
}

impl MetricKind {
    /// Returns the kind as a lowercase string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Histogram => "histogram",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric declaration with its metadata.
///
/// Use the const constructors to declare metrics at compile time.
///
/// ```rust
/// use mosaic_metrics::{Metric, MetricKind};
/// use metrics::Unit;
///
/// const WRITES: Metric = Metric::counter("mosaic.quadkeys.written")
///     .with_description("Quadkey entries written")
///     .with_unit(Unit::Count)
///     .with_labels(&["table"]);
///
/// assert_eq!(WRITES.name, "mosaic.quadkeys.written");
/// assert_eq!(WRITES.kind, MetricKind::Counter);
/// ```
#[derive(Debug, Clone)]
pub struct Metric {
    /// The metric name (e.g., "mosaic.scenes.received").
    pub name: &'static str,
    /// The kind of metric (counter, histogram).
    pub kind: MetricKind,
    /// Human-readable description of the metric.
    pub description: &'static str,
    /// The unit of measurement (optional).
    pub unit: Option<Unit>,
    /// Expected label keys for this metric.
    pub labels: &'static [&'static str],
}

impl Metric {
    const fn new(name: &'static str, kind: MetricKind) -> Self {
        Self {
            name,
            kind,
            description: "",
            unit: None,
            labels: &[],
        }
    }

    /// Creates a new counter metric with the given name.
    pub const fn counter(name: &'static str) -> Self {
        Self::new(name, MetricKind::Counter)
    }

    /// Creates a new histogram metric with the given name.
    pub const fn histogram(name: &'static str) -> Self {
        Self::new(name, MetricKind::Histogram)
    }

    /// Sets the description for the metric.
    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the unit for the metric.
    pub const fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Sets the expected label keys for the metric.
    pub const fn with_labels(mut self, labels: &'static [&'static str]) -> Self {
        self.labels = labels;
        self
    }

    /// Registers this metric's description with the metrics recorder.
    ///
    /// This should be called once at startup for each metric.
    pub fn describe(&self) {
        match (self.kind, self.unit) {
            (MetricKind::Counter, Some(unit)) => {
                describe_counter!(self.name, unit, self.description);
            }
            (MetricKind::Counter, None) => {
                describe_counter!(self.name, self.description);
            }
            (MetricKind::Histogram, Some(unit)) => {
                describe_histogram!(self.name, unit, self.description);
            }
            (MetricKind::Histogram, None) => {
                describe_histogram!(self.name, self.description);
            }
        }
    }
}

/// All metric definitions.
pub mod metric_defs {
    use super::{Metric, Unit};

    // ========================================================================
    // Updater
    // ========================================================================

    /// Scene identifiers found in notifications.
    pub const SCENES_RECEIVED: Metric = Metric::counter("mosaic.scenes.received")
        .with_description("Scene identifiers found in notifications")
        .with_unit(Unit::Count);

    /// Scenes written to at least one mosaic table.
    pub const SCENES_ACCEPTED: Metric = Metric::counter("mosaic.scenes.accepted")
        .with_description("Scenes written to at least one mosaic table")
        .with_unit(Unit::Count);

    /// Scenes not written to any table.
    ///
    /// Labels: reason (`invalid_id`, `category`, `metadata`, `cloudy`, `no_coverage`)
    pub const SCENES_SKIPPED: Metric = Metric::counter("mosaic.scenes.skipped")
        .with_description("Scenes not written to any mosaic table")
        .with_unit(Unit::Count)
        .with_labels(&["reason"]);

    /// Cloud cover of scenes whose metadata was resolved.
    pub const SCENE_CLOUD_COVER: Metric = Metric::histogram("mosaic.scenes.cloud_cover")
        .with_description("Cloud cover of resolved scenes")
        .with_unit(Unit::Percent);

    /// Quadkey entries written.
    ///
    /// Labels: table
    pub const QUADKEYS_WRITTEN: Metric = Metric::counter("mosaic.quadkeys.written")
        .with_description("Quadkey mosaic entries written")
        .with_unit(Unit::Count)
        .with_labels(&["table"]);

    // ========================================================================
    // Index builder
    // ========================================================================

    /// Number of quadkeys covering each path-row.
    pub const INDEX_QUADKEYS: Metric = Metric::histogram("mosaic.index.quadkeys")
        .with_description("Quadkeys covering each path-row footprint")
        .with_unit(Unit::Count);

    /// All metrics, for bulk description.
    pub const ALL: &[&Metric] = &[
        &SCENES_RECEIVED,
        &SCENES_ACCEPTED,
        &SCENES_SKIPPED,
        &SCENE_CLOUD_COVER,
        &QUADKEYS_WRITTEN,
        &INDEX_QUADKEYS,
    ];
}

/// Register descriptions for all metrics with the installed recorder.
pub fn describe_metrics() {
    for metric in metric_defs::ALL {
        metric.describe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_defs() {
        assert_eq!(metric_defs::SCENES_SKIPPED.name, "mosaic.scenes.skipped");
        assert_eq!(metric_defs::SCENES_SKIPPED.labels, &["reason"]);
        assert_eq!(metric_defs::SCENE_CLOUD_COVER.kind, MetricKind::Histogram);
        assert_eq!(metric_defs::SCENE_CLOUD_COVER.unit, Some(Unit::Percent));
        assert_eq!(metric_defs::QUADKEYS_WRITTEN.labels, &["table"]);
    }

    #[test]
    fn test_all_metrics_unique() {
        let mut names: Vec<_> = metric_defs::ALL.iter().map(|m| m.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), metric_defs::ALL.len());
        assert!(names.iter().all(|n| n.starts_with("mosaic.")));
    }

    #[test]
    fn test_metric_minimal() {
        const MINIMAL: Metric = Metric::counter("minimal");

        assert_eq!(MINIMAL.name, "minimal");
        assert_eq!(MINIMAL.kind, MetricKind::Counter);
        assert_eq!(MINIMAL.description, "");
        assert_eq!(MINIMAL.unit, None);
        assert_eq!(MINIMAL.labels, &[] as &[&str]);
    }

    #[test]
    fn test_describe_without_recorder() {
        describe_metrics();
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(MetricKind::Histogram.to_string(), "histogram");
        assert_eq!(MetricKind::Counter.to_string(), "counter");
    }
}
