// ============================================================
// Layer 6 - Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder
// (MessagePack + gzip, type-safe on load).
//
// Unlike per-epoch checkpoint schemes there is a single named
// slot per run: the weights of the best-validation model so far.
// A new best overwrites the previous file in place.
//
// File layout:
//   models/
//     <model_name>.mpk.gz   <- best weights so far (recorder adds
//                              the extension)
//     train_config.json     <- run configuration, needed to
//                              rebuild the architecture on load
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::Bert4Rec;

/// Manages the best-model slot and the run configuration file.
pub struct CheckpointManager {
    /// Directory holding the checkpoint and config
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Persist the current parameters into the named slot,
    /// overwriting whatever was there. A failed write propagates;
    /// the epoch must not be reported as checkpointed.
    pub fn save_model<B: AutodiffBackend>(
        &self,
        model: &Bert4Rec<B>,
        name:  &str,
    ) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let path = self.dir.join(name);

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", path.display())
            })?;

        tracing::debug!("Saved checkpoint '{}'", path.display());
        Ok(())
    }

    /// Restore weights from the named slot into a freshly built
    /// model of the same architecture.
    pub fn load_model<B: Backend>(
        &self,
        model:  Bert4Rec<B>,
        name:   &str,
        device: &B::Device,
    ) -> Result<Bert4Rec<B>> {
        let path = self.dir.join(name);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display()
                )
            })?;

        Ok(model.load_record(record))
    }

    /// Save the run configuration so evaluation can rebuild the
    /// exact model architecture later.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' before 'evaluate'.",
                    path.display()
                )
            })?;

        Ok(serde_json::from_str(&json)?)
    }
}
