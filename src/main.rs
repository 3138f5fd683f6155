use anyhow::Result;
use serde_json::json;
use tokio::time::Duration;

use envwatch::logging::{log, obj, v_str, Domain, Level};
use envwatch::poller::Poller;
use envwatch::render::ConsoleView;
use envwatch::sensor::SourceKind;
use envwatch::state::{Config, SampleStore};
use envwatch::storage::JsonHistoryStore;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let kind = SourceKind::from_env();
    let source = kind.build(cfg.clone())?;
    let store = SampleStore::restore(
        cfg.history_cap,
        Box::new(JsonHistoryStore::new(&cfg.history_path)),
    );

    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("endpoint", v_str(&cfg.endpoint)),
            ("source", v_str(&format!("{kind:?}"))),
            ("poll_secs", json!(cfg.poll_secs)),
            ("history_cap", json!(cfg.history_cap)),
            ("restored_samples", json!(store.len())),
        ]),
    );

    let mut poller = Poller::new(source, store, Box::new(ConsoleView), cfg.recent_rows);
    poller.start(Duration::from_secs(cfg.poll_secs)).await;

    tokio::signal::ctrl_c().await?;
    poller.stop();

    log(
        Level::Info,
        Domain::System,
        "shutdown",
        obj(&[("history_len", json!(poller.history_len()))]),
    );
    Ok(())
}
