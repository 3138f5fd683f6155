use chrono::Local;

use crate::sensor::FetchError;
use crate::state::{Reading, Sample};
use crate::status::{Condition, HumidityBand, SmokeBand, TempBand};

/// Render surface the poll loop notifies once per cycle. Implementations own
/// the display; the loop never reaches into one directly.
pub trait View: Send {
    fn show_current(&mut self, reading: Reading);
    fn show_history(&mut self, samples: &[Sample]);
    fn show_error(&mut self, err: &FetchError);
}

/// Value cards and the recent-history table, on stdout.
pub struct ConsoleView;

impl View for ConsoleView {
    fn show_current(&mut self, reading: Reading) {
        println!(
            "\n== {} ==  {:.1} °C [{}]  {:.0} % [{}]  {:.0} ppm [{}]",
            reading.observed_at.with_timezone(&Local).format("%H:%M:%S"),
            reading.temperature,
            TempBand::of(reading.temperature).label(),
            reading.humidity,
            HumidityBand::of(reading.humidity).label(),
            reading.smoke,
            SmokeBand::of(reading.smoke).label(),
        );
    }

    fn show_history(&mut self, samples: &[Sample]) {
        if samples.is_empty() {
            return;
        }
        println!("{:<10} {:>8} {:>8} {:>8}  {}", "time", "temp", "hum", "smoke", "status");
        for sample in samples {
            println!(
                "{:<10} {:>7.1}C {:>7.0}% {:>5.0}ppm  {}",
                sample.timestamp.with_timezone(&Local).format("%H:%M:%S"),
                sample.temperature,
                sample.humidity,
                sample.smoke,
                Condition::of(sample).label(),
            );
        }
    }

    fn show_error(&mut self, err: &FetchError) {
        eprintln!("[envwatch] fetch failed, keeping last readings: {err}");
    }
}

/// Discards everything. For headless runs and tests.
pub struct NullView;

impl View for NullView {
    fn show_current(&mut self, _reading: Reading) {}
    fn show_history(&mut self, _samples: &[Sample]) {}
    fn show_error(&mut self, _err: &FetchError) {}
}
