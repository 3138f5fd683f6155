//! Print the persisted history file as a table with per-channel aggregates.

use anyhow::Result;

use envwatch::state::{Config, Sample};
use envwatch::status::Condition;
use envwatch::storage::{HistoryStore, JsonHistoryStore};

fn main() -> Result<()> {
    let cfg = Config::from_env();
    let samples = JsonHistoryStore::new(&cfg.history_path).load();

    if samples.is_empty() {
        println!("no history at {}", cfg.history_path);
        return Ok(());
    }

    println!("{:<25} {:>8} {:>8} {:>8}  {}", "timestamp", "temp", "hum", "smoke", "status");
    for sample in &samples {
        println!(
            "{:<25} {:>7.1}C {:>7.0}% {:>5.0}ppm  {}",
            sample.timestamp.to_rfc3339(),
            sample.temperature,
            sample.humidity,
            sample.smoke,
            Condition::of(sample).label(),
        );
    }

    let stats = |pick: fn(&Sample) -> f64, unit: &str, name: &str| {
        let min = samples.iter().map(pick).fold(f64::INFINITY, f64::min);
        let max = samples.iter().map(pick).fold(f64::NEG_INFINITY, f64::max);
        let last = samples.iter().map(pick).last().unwrap_or(0.0);
        println!("{name}: min={min:.1}{unit} max={max:.1}{unit} last={last:.1}{unit}");
    };

    println!("\n{} samples", samples.len());
    stats(|s| s.temperature, "C", "temperature");
    stats(|s| s.humidity, "%", "humidity");
    stats(|s| s.smoke, "ppm", "smoke");
    Ok(())
}
