//! Threshold bands for the three channels, and the per-sample overall
//! condition shown in the history table.

use crate::state::Sample;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempBand {
    Cold,
    Normal,
    Warm,
    Hot,
}

impl TempBand {
    pub fn of(celsius: f64) -> Self {
        if celsius < 18.0 {
            TempBand::Cold
        } else if celsius <= 25.0 {
            TempBand::Normal
        } else if celsius <= 30.0 {
            TempBand::Warm
        } else {
            TempBand::Hot
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TempBand::Cold => "cold",
            TempBand::Normal => "normal",
            TempBand::Warm => "warm",
            TempBand::Hot => "hot",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumidityBand {
    Low,
    Normal,
    High,
}

impl HumidityBand {
    pub fn of(percent: f64) -> Self {
        if percent < 40.0 {
            HumidityBand::Low
        } else if percent <= 70.0 {
            HumidityBand::Normal
        } else {
            HumidityBand::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HumidityBand::Low => "low",
            HumidityBand::Normal => "normal",
            HumidityBand::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmokeBand {
    Clear,
    Moderate,
    High,
}

impl SmokeBand {
    pub fn of(ppm: f64) -> Self {
        if ppm > 50.0 {
            SmokeBand::High
        } else if ppm > 20.0 {
            SmokeBand::Moderate
        } else {
            SmokeBand::Clear
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SmokeBand::Clear => "clear",
            SmokeBand::Moderate => "moderate",
            SmokeBand::High => "high",
        }
    }
}

/// Overall condition of one sample, worst channel wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Normal,
    Warning,
    Critical,
}

impl Condition {
    pub fn of(sample: &Sample) -> Self {
        if sample.temperature > 30.0 || sample.temperature < 18.0 || sample.smoke > 50.0 {
            Condition::Critical
        } else if sample.temperature > 28.0 || sample.humidity > 70.0 || sample.smoke > 20.0 {
            Condition::Warning
        } else {
            Condition::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Condition::Normal => "normal",
            Condition::Warning => "warning",
            Condition::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone)]
pub enum AlertEvent {
    SmokeHigh { ppm: f64 },
    TemperatureOutOfRange { celsius: f64 },
    HumidityOutOfRange { percent: f64 },
}

/// Threshold crossings worth a log line, independent of the display bands.
pub fn scan(sample: &Sample) -> Vec<AlertEvent> {
    let mut out = Vec::new();
    if sample.smoke > 50.0 {
        out.push(AlertEvent::SmokeHigh { ppm: sample.smoke });
    }
    if sample.temperature > 30.0 || sample.temperature < 18.0 {
        out.push(AlertEvent::TemperatureOutOfRange { celsius: sample.temperature });
    }
    if sample.humidity > 70.0 || sample.humidity < 40.0 {
        out.push(AlertEvent::HumidityOutOfRange { percent: sample.humidity });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample(temperature: f64, humidity: f64, smoke: f64) -> Sample {
        Sample { timestamp: Utc::now(), temperature, humidity, smoke }
    }

    #[test]
    fn test_temperature_band_edges() {
        assert_eq!(TempBand::of(17.9), TempBand::Cold);
        assert_eq!(TempBand::of(18.0), TempBand::Normal);
        assert_eq!(TempBand::of(25.0), TempBand::Normal);
        assert_eq!(TempBand::of(25.1), TempBand::Warm);
        assert_eq!(TempBand::of(30.0), TempBand::Warm);
        assert_eq!(TempBand::of(30.1), TempBand::Hot);
    }

    #[test]
    fn test_humidity_band_edges() {
        assert_eq!(HumidityBand::of(39.9), HumidityBand::Low);
        assert_eq!(HumidityBand::of(40.0), HumidityBand::Normal);
        assert_eq!(HumidityBand::of(70.0), HumidityBand::Normal);
        assert_eq!(HumidityBand::of(70.1), HumidityBand::High);
    }

    #[test]
    fn test_smoke_band_edges() {
        assert_eq!(SmokeBand::of(20.0), SmokeBand::Clear);
        assert_eq!(SmokeBand::of(20.1), SmokeBand::Moderate);
        assert_eq!(SmokeBand::of(50.0), SmokeBand::Moderate);
        assert_eq!(SmokeBand::of(50.1), SmokeBand::High);
    }

    #[test]
    fn test_condition_worst_channel_wins() {
        assert_eq!(Condition::of(&sample(22.0, 50.0, 0.0)), Condition::Normal);
        assert_eq!(Condition::of(&sample(29.0, 50.0, 0.0)), Condition::Warning);
        assert_eq!(Condition::of(&sample(22.0, 75.0, 0.0)), Condition::Warning);
        assert_eq!(Condition::of(&sample(22.0, 50.0, 30.0)), Condition::Warning);
        assert_eq!(Condition::of(&sample(31.0, 50.0, 0.0)), Condition::Critical);
        assert_eq!(Condition::of(&sample(15.0, 50.0, 0.0)), Condition::Critical);
        assert_eq!(Condition::of(&sample(22.0, 50.0, 60.0)), Condition::Critical);
    }

    #[test]
    fn test_scan_emits_one_event_per_breach() {
        assert!(scan(&sample(22.0, 50.0, 0.0)).is_empty());
        let events = scan(&sample(31.0, 80.0, 60.0));
        assert_eq!(events.len(), 3);
    }
}
