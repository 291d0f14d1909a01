//! Gauge registry backed by a dedicated Prometheus recorder.
//!
//! Each [`GaugeRegistry`] owns its own `PrometheusRecorder` instead of
//! installing a global one, so several registries (one per test, for example)
//! can coexist in a process.

use metrics::{Key, KeyName, Label, Level, Metadata, Recorder, SharedString};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use metrics_util::MetricKindMask;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

fn metadata() -> Metadata<'static> {
    Metadata::new(module_path!(), Level::INFO, Some(module_path!()))
}

/// Process-wide set of named gauges and gauge vectors.
///
/// Series are registered once at startup; the returned handles are cheap to
/// clone and safe to write from one task while the exposition endpoint renders
/// concurrently.
#[derive(Clone)]
pub struct GaugeRegistry {
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
}

impl GaugeRegistry {
    pub fn new() -> Self {
        Self::from_builder(PrometheusBuilder::new())
    }

    /// Registry whose exposition drops gauges not written for `idle_timeout`.
    ///
    /// Handles stay usable: the next write brings the series back.
    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self::from_builder(
            PrometheusBuilder::new().idle_timeout(MetricKindMask::GAUGE, Some(idle_timeout)),
        )
    }

    fn from_builder(builder: PrometheusBuilder) -> Self {
        let recorder = builder.build_recorder();
        let handle = recorder.handle();
        Self {
            recorder: Arc::new(recorder),
            handle,
        }
    }

    /// Register a scalar gauge.
    pub fn gauge(&self, name: &'static str, help: &'static str) -> Gauge {
        self.recorder
            .describe_gauge(KeyName::from(name), None, SharedString::from(help));

        let gauge = Gauge {
            recorder: Arc::clone(&self.recorder),
            key: Key::from_name(name),
            value: Arc::new(AtomicU64::new(0f64.to_bits())),
        };
        gauge.set(0.0);
        gauge
    }

    /// Register a gauge vector with a fixed, ordered set of label names.
    pub fn gauge_vec<const N: usize>(
        &self,
        name: &'static str,
        help: &'static str,
        label_names: [&'static str; N],
    ) -> GaugeVec<N> {
        self.recorder
            .describe_gauge(KeyName::from(name), None, SharedString::from(help));

        GaugeVec {
            name,
            label_names,
            recorder: Arc::clone(&self.recorder),
            series: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Render every registered series in Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl Default for GaugeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Write through the recorder, re-registering the key if it went idle.
fn write(recorder: &PrometheusRecorder, key: &Key, value: f64) {
    recorder.register_gauge(key, &metadata()).set(value);
}

/// A scalar gauge.
#[derive(Clone)]
pub struct Gauge {
    recorder: Arc<PrometheusRecorder>,
    key: Key,
    value: Arc<AtomicU64>,
}

impl Gauge {
    pub fn set(&self, value: f64) {
        write(&self.recorder, &self.key, value);
        self.value.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Last value written through this handle.
    pub fn value(&self) -> f64 {
        f64::from_bits(self.value.load(Ordering::Relaxed))
    }
}

struct Series {
    key: Key,
    value: f64,
}

/// A family of gauges distinguished by `N` label values.
///
/// Publishing is full-replace: [`GaugeVec::replace`] zeroes every label
/// combination written by the previous publish that is missing from the new
/// one. A combination already at zero and still missing is forgotten.
#[derive(Clone)]
pub struct GaugeVec<const N: usize> {
    name: &'static str,
    label_names: [&'static str; N],
    recorder: Arc<PrometheusRecorder>,
    series: Arc<Mutex<HashMap<[String; N], Series>>>,
}

impl<const N: usize> GaugeVec<N> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn label_names(&self) -> &[&'static str; N] {
        &self.label_names
    }

    /// Replace the whole family with `observations`.
    ///
    /// Duplicate label combinations are summed. Returns the number of distinct
    /// combinations that carry a value after the publish.
    pub fn replace<I>(&self, observations: I) -> usize
    where
        I: IntoIterator<Item = ([String; N], f64)>,
    {
        let mut fresh: HashMap<[String; N], f64> = HashMap::new();
        for (labels, value) in observations {
            *fresh.entry(labels).or_insert(0.0) += value;
        }
        let published = fresh.len();

        let mut series = self
            .series
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let before = series.len();
        series.retain(|labels, entry| fresh.contains_key(labels) || entry.value != 0.0);
        let forgotten = before - series.len();

        let mut zeroed = 0usize;
        for (labels, entry) in series.iter_mut() {
            if !fresh.contains_key(labels) {
                write(&self.recorder, &entry.key, 0.0);
                entry.value = 0.0;
                zeroed += 1;
            }
        }

        for (labels, value) in fresh {
            let entry = series.entry(labels).or_insert_with_key(|labels| Series {
                key: self.key(labels),
                value: 0.0,
            });
            write(&self.recorder, &entry.key, value);
            entry.value = value;
        }

        debug!(
            metric = self.name,
            published = published,
            zeroed = zeroed,
            forgotten = forgotten,
            "Replaced gauge vector"
        );
        published
    }

    /// Replace the family with occurrence counts, each observation weighing 1.
    pub fn replace_counts<I>(&self, observations: I) -> usize
    where
        I: IntoIterator<Item = [String; N]>,
    {
        self.replace(observations.into_iter().map(|labels| (labels, 1.0)))
    }

    /// Zero every series in the family.
    pub fn reset(&self) {
        self.replace(std::iter::empty());
    }

    /// Current value of one label combination, `None` if it is not tracked.
    pub fn value(&self, labels: &[&str; N]) -> Option<f64> {
        let key: [String; N] = labels.map(str::to_string);
        self.series
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
            .map(|entry| entry.value)
    }

    /// Number of label combinations currently holding a non-zero value.
    pub fn active_len(&self) -> usize {
        self.series
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .filter(|entry| entry.value != 0.0)
            .count()
    }

    /// Number of label combinations still tracked, zeroed ones included.
    pub fn tracked_len(&self) -> usize {
        self.series
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    fn key(&self, labels: &[String; N]) -> Key {
        let labels: Vec<Label> = self
            .label_names
            .iter()
            .zip(labels.iter())
            .map(|(name, value)| Label::new(*name, value.clone()))
            .collect();
        Key::from_parts(self.name, labels)
    }
}
