use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;

use crate::sensor::{FetchError, SensorSource};
use crate::state::Sample;

/// Random-walk source for running the dashboard with no device online.
/// Variations are smooth and bounded to plausible indoor ranges.
pub struct SimulatedSource {
    walk: Mutex<Walk>,
}

struct Walk {
    temperature: f64,
    humidity: f64,
}

impl SimulatedSource {
    pub fn new() -> Self {
        Self { walk: Mutex::new(Walk { temperature: 19.5, humidity: 85.0 }) }
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SensorSource for SimulatedSource {
    async fn sample(&self) -> Result<Sample, FetchError> {
        let mut walk = self.walk.lock().unwrap();
        let mut rng = rand::thread_rng();

        walk.temperature = (walk.temperature + rng.gen_range(-2.0..=2.0)).clamp(10.0, 40.0);
        walk.humidity = (walk.humidity + rng.gen_range(-10.0..=10.0)).clamp(20.0, 90.0);

        Ok(Sample {
            timestamp: Utc::now(),
            temperature: (walk.temperature * 10.0).round() / 10.0,
            humidity: walk.humidity.floor(),
            smoke: rng.gen_range(0.0..100.0).floor(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulated_values_stay_in_range() {
        let source = SimulatedSource::new();
        for _ in 0..50 {
            let sample = source.sample().await.unwrap();
            assert!((10.0..=40.0).contains(&sample.temperature));
            assert!((20.0..=90.0).contains(&sample.humidity));
            assert!((0.0..100.0).contains(&sample.smoke));
        }
    }
}
