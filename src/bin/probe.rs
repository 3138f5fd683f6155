//! One fetch against the configured source, printed and classified.
//! Exits non-zero when the fetch fails, so it doubles as a health check.

use anyhow::Result;

use envwatch::sensor::SourceKind;
use envwatch::state::Config;
use envwatch::status::{Condition, HumidityBand, SmokeBand, TempBand};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let source = SourceKind::from_env().build(cfg)?;
    let sample = source.sample().await?;

    println!(
        "{}  temperature={:.1}C [{}]  humidity={:.0}% [{}]  smoke={:.0}ppm [{}]  condition={}",
        sample.timestamp.to_rfc3339(),
        sample.temperature,
        TempBand::of(sample.temperature).label(),
        sample.humidity,
        HumidityBand::of(sample.humidity).label(),
        sample.smoke,
        SmokeBand::of(sample.smoke).label(),
        Condition::of(&sample).label(),
    );
    Ok(())
}
