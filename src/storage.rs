use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;

use crate::logging::{log, obj, v_str, Domain, Level};
use crate::state::Sample;

/// Persistence seam for the sample history: one durable slot holding the full
/// buffer, most-recent last. Injected into the store so the buffer logic
/// stays testable without any filesystem.
pub trait HistoryStore: Send {
    /// Read the persisted buffer. Missing or unreadable data yields an empty
    /// vec; corruption degrades to "no history", never an error.
    fn load(&self) -> Vec<Sample>;

    fn persist(&mut self, samples: &[Sample]) -> Result<()>;
}

/// JSON-array file store. Writes go to a sibling temp file first and rename
/// into place, so a crash mid-write never leaves a torn slot.
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HistoryStore for JsonHistoryStore {
    fn load(&self) -> Vec<Sample> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(samples) => samples,
            Err(err) => {
                log(
                    Level::Warn,
                    Domain::Store,
                    "history_corrupt",
                    obj(&[
                        ("path", v_str(&self.path.display().to_string())),
                        ("error", v_str(&err.to_string())),
                    ]),
                );
                Vec::new()
            }
        }
    }

    fn persist(&mut self, samples: &[Sample]) -> Result<()> {
        let body = serde_json::to_string(samples)?;
        let tmp = self.path.with_extension("tmp");
        let mut file = fs::File::create(&tmp)?;
        file.write_all(body.as_bytes())?;
        file.flush()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Keeps nothing. For tests and ephemeral runs.
pub struct NullHistoryStore;

impl HistoryStore for NullHistoryStore {
    fn load(&self) -> Vec<Sample> {
        Vec::new()
    }

    fn persist(&mut self, _samples: &[Sample]) -> Result<()> {
        Ok(())
    }
}
