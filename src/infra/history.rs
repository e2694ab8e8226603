// ============================================================
// Layer 6 - History Writer
// ============================================================
// Persists the per-epoch training history as a JSON list under
// the results directory, written once after the training loop
// exits (whether it completed or stopped early).

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::domain::history::EpochRecord;

pub struct HistoryWriter {
    dir: PathBuf,
}

impl HistoryWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write the full history to `<dir>/<name>` as pretty JSON.
    pub fn write(&self, name: &str, history: &[EpochRecord]) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(history)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write history to '{}'", path.display()))?;

        tracing::info!("Wrote {} epoch records to '{}'", history.len(), path.display());
        Ok(path)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn record(epoch: usize) -> EpochRecord {
        EpochRecord {
            epoch,
            train_loss: 2.5,
            val_loss:   2.4,
            val_ndcg:   0.12,
            val_recall: 0.25,
            lr:         1e-3,
        }
    }

    #[test]
    fn test_history_serialises_as_json_list() {
        let json = serde_json::to_string(&[record(1), record(2)]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        let list = parsed.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["epoch"], 1);
        assert_eq!(list[1]["epoch"], 2);
        for field in ["train_loss", "val_loss", "val_ndcg", "val_recall", "lr"] {
            assert!(list[0][field].is_number(), "missing field {field}");
        }
    }

    #[test]
    fn test_write_then_read_back() {
        let dir = std::env::temp_dir().join(format!("seqrec-history-{}", std::process::id()));
        let writer = HistoryWriter::new(&dir);

        let path = writer.write("run.json", &[record(1), record(2), record(3)]).unwrap();

        let json = fs::read_to_string(&path).unwrap();
        let parsed: Vec<EpochRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[2].epoch, 3);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_history_is_an_empty_list() {
        let json = serde_json::to_string::<[EpochRecord]>(&[]).unwrap();
        assert_eq!(json, "[]");
    }
}
