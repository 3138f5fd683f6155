use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::logging::{log, obj, v_str, Domain, Level};
use crate::storage::HistoryStore;

#[derive(Clone)]
pub struct Config {
    pub endpoint: String,
    pub poll_secs: u64,
    pub history_cap: usize,
    pub recent_rows: usize,
    pub history_path: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            endpoint: std::env::var("ENDPOINT")
                .unwrap_or_else(|_| "https://iot.brunoparente22.workers.dev/api/data".to_string()),
            poll_secs: std::env::var("POLL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(15),
            history_cap: std::env::var("HISTORY_CAP").ok().and_then(|v| v.parse().ok()).unwrap_or(100),
            recent_rows: std::env::var("RECENT_ROWS").ok().and_then(|v| v.parse().ok()).unwrap_or(10),
            history_path: std::env::var("HISTORY_PATH")
                .unwrap_or_else(|_| "./envwatch_history.json".to_string()),
        }
    }

    pub fn endpoint_url(&self) -> anyhow::Result<Url> {
        Ok(Url::parse(&self.endpoint)?)
    }
}

/// One observation from the sensor endpoint. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    pub smoke: f64,
}

/// The latest value triple, kept apart from history so consumers read "now"
/// without touching the buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub temperature: f64,
    pub humidity: f64,
    pub smoke: f64,
    pub observed_at: DateTime<Utc>,
}

impl Reading {
    /// Placeholder shown before the first fetch lands.
    pub fn placeholder() -> Self {
        Self {
            temperature: 19.5,
            humidity: 85.0,
            smoke: 0.0,
            observed_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

impl Default for Reading {
    fn default() -> Self {
        Self::placeholder()
    }
}

impl From<&Sample> for Reading {
    fn from(sample: &Sample) -> Self {
        Self {
            temperature: sample.temperature,
            humidity: sample.humidity,
            smoke: sample.smoke,
            observed_at: sample.timestamp,
        }
    }
}

/// Capacity-bounded FIFO of samples, insertion order = chronological order.
/// Pure data structure; persistence lives in [`SampleStore`].
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    samples: VecDeque<Sample>,
    cap: usize,
}

impl HistoryBuffer {
    pub fn new(cap: usize) -> Self {
        Self { samples: VecDeque::with_capacity(cap), cap }
    }

    /// Rebuild from a persisted snapshot, keeping only the newest `cap` entries.
    pub fn from_samples(cap: usize, samples: Vec<Sample>) -> Self {
        let mut buffer = Self::new(cap);
        for sample in samples {
            buffer.push(sample);
        }
        buffer
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.cap {
            self.samples.pop_front();
        }
    }

    /// Last `n` entries (or fewer), oldest first.
    pub fn recent(&self, n: usize) -> Vec<Sample> {
        let skip = self.samples.len().saturating_sub(n);
        self.samples.iter().skip(skip).copied().collect()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// History buffer plus current reading, wired to an injected persistence
/// capability. The poll loop is the only writer; everyone else reads.
pub struct SampleStore {
    buffer: HistoryBuffer,
    current: Reading,
    persistence: Box<dyn HistoryStore>,
}

impl SampleStore {
    /// Restore from the persistence capability. Absent or corrupt persisted
    /// data degrades to an empty buffer, never an error.
    pub fn restore(cap: usize, persistence: Box<dyn HistoryStore>) -> Self {
        let buffer = HistoryBuffer::from_samples(cap, persistence.load());
        let current = buffer.latest().map(Reading::from).unwrap_or_default();
        Self { buffer, current, persistence }
    }

    /// Append at the end, evicting the oldest entries past capacity, then
    /// persist the full buffer. A persistence failure is logged and does not
    /// undo the in-memory update.
    pub fn append(&mut self, sample: Sample) {
        self.buffer.push(sample);
        self.current = Reading::from(&sample);
        if let Err(err) = self.persistence.persist(&self.buffer.snapshot()) {
            log(
                Level::Warn,
                Domain::Store,
                "persist_failed",
                obj(&[("error", v_str(&err.to_string()))]),
            );
        }
    }

    pub fn current(&self) -> Reading {
        self.current
    }

    pub fn recent(&self, n: usize) -> Vec<Sample> {
        self.buffer.recent(n)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::NullHistoryStore;

    fn sample(temperature: f64) -> Sample {
        Sample { timestamp: Utc::now(), temperature, humidity: 50.0, smoke: 0.0 }
    }

    #[test]
    fn test_buffer_evicts_oldest_at_cap() {
        let mut buffer = HistoryBuffer::new(3);
        for t in 0..5 {
            buffer.push(sample(t as f64));
        }
        assert_eq!(buffer.len(), 3);
        let kept: Vec<f64> = buffer.snapshot().iter().map(|s| s.temperature).collect();
        assert_eq!(kept, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_recent_preserves_order_and_caps_at_len() {
        let mut buffer = HistoryBuffer::new(10);
        for t in 0..4 {
            buffer.push(sample(t as f64));
        }
        let last_two: Vec<f64> = buffer.recent(2).iter().map(|s| s.temperature).collect();
        assert_eq!(last_two, vec![2.0, 3.0]);
        assert_eq!(buffer.recent(100).len(), 4);
    }

    #[test]
    fn test_from_samples_truncates_oldest() {
        let samples: Vec<Sample> = (0..7).map(|t| sample(t as f64)).collect();
        let buffer = HistoryBuffer::from_samples(5, samples);
        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.recent(1)[0].temperature, 6.0);
    }

    #[test]
    fn test_empty_store_serves_placeholder() {
        let store = SampleStore::restore(100, Box::new(NullHistoryStore));
        assert_eq!(store.current(), Reading::placeholder());
        assert!(store.recent(10).is_empty());
    }

    #[test]
    fn test_append_updates_current() {
        let mut store = SampleStore::restore(100, Box::new(NullHistoryStore));
        let s = sample(22.5);
        store.append(s);
        assert_eq!(store.current(), Reading::from(&s));
        assert_eq!(store.len(), 1);
    }
}
