// ============================================================
// Layer 2 - TrainUseCase
// ============================================================
// Orchestrates one training run in order:
//
//   Step 1: Validate the configuration   (fail fast)
//   Step 2: Load the sequence splits     (Layer 4 - data)
//   Step 3: Save config for evaluation   (Layer 6 - infra)
//   Step 4: Run the training loop        (Layer 5 - ml)
//
// The loop itself owns checkpointing and history persistence.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::data::loader::PickleLoader;
use crate::domain::error::ConfigError;
use crate::domain::history::EpochRecord;
use crate::domain::traits::SequenceSource;
use crate::infra::{checkpoint::CheckpointManager, history::HistoryWriter};
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// All knobs for a training run. Serialisable so the run config can
// be saved next to the checkpoint and reloaded for evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:    String,
    pub models_dir:  String,
    pub results_dir: String,
    pub model_name:  String,
    pub result_name: String,
    pub seq_len:     usize,
    pub batch_size:  usize,
    pub epochs:      usize,
    pub patience:    usize,
    pub lr:          f64,
    pub mask_prob:   f64,
    pub seed:        u64,
    pub d_model:     usize,
    pub num_heads:   usize,
    pub num_layers:  usize,
    pub d_ff:        usize,
    pub dropout:     f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:    "data/processed".to_string(),
            models_dir:  "models".to_string(),
            results_dir: "results".to_string(),
            model_name:  "bert4rec".to_string(),
            result_name: "history.json".to_string(),
            seq_len:     50,
            batch_size:  128,
            epochs:      50,
            patience:    5,
            lr:          1e-3,
            mask_prob:   0.15,
            seed:        42,
            d_model:     128,
            num_heads:   2,
            num_layers:  2,
            d_ff:        512,
            dropout:     0.2,
        }
    }
}

impl TrainConfig {
    /// Reject values that would produce silently wrong batches or
    /// a degenerate run. Called before any data is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.mask_prob) {
            return Err(ConfigError::invalid(
                "mask_prob",
                format!("must be within [0, 1], got {}", self.mask_prob),
            ));
        }
        if self.seq_len == 0 {
            return Err(ConfigError::invalid("seq_len", "must be positive"));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::invalid("batch_size", "must be positive"));
        }
        if self.epochs == 0 {
            return Err(ConfigError::invalid("epochs", "must be positive"));
        }
        if self.patience == 0 {
            return Err(ConfigError::invalid("patience", "must be positive"));
        }
        if !self.lr.is_finite() || self.lr <= 0.0 {
            return Err(ConfigError::invalid(
                "lr",
                format!("must be a positive finite number, got {}", self.lr),
            ));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(ConfigError::invalid(
                "dropout",
                format!("must be within [0, 1), got {}", self.dropout),
            ));
        }
        if self.num_heads == 0 || self.d_model % self.num_heads != 0 {
            return Err(ConfigError::invalid(
                "num_heads",
                format!("d_model {} must be divisible by num_heads {}",
                    self.d_model, self.num_heads),
            ));
        }
        if self.num_layers == 0 {
            return Err(ConfigError::invalid("num_layers", "must be positive"));
        }
        Ok(())
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end.
    pub fn execute(&self) -> Result<Vec<EpochRecord>> {
        let cfg = &self.config;

        // ── Step 1: Fail fast on bad configuration ────────────────────────────
        cfg.validate()?;

        // ── Step 2: Load sequence splits and vocabulary size ──────────────────
        tracing::info!("Loading sequence splits from '{}'", cfg.data_dir);
        let loader = PickleLoader::new(&cfg.data_dir);
        let data   = loader.load()?;

        // ── Step 3: Save config so `evaluate` can rebuild the model ───────────
        let ckpt_manager = CheckpointManager::new(&cfg.models_dir);
        ckpt_manager.save_config(cfg)?;

        // ── Step 4: Run the training loop ─────────────────────────────────────
        let history_writer = HistoryWriter::new(&cfg.results_dir);
        run_training(cfg, data, ckpt_manager, history_writer)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn test_mask_prob_bounds() {
        let mut cfg = TrainConfig::default();
        cfg.mask_prob = 1.0;
        assert!(cfg.validate().is_ok());
        cfg.mask_prob = 0.0;
        assert!(cfg.validate().is_ok());
        cfg.mask_prob = 1.01;
        assert!(cfg.validate().is_err());
        cfg.mask_prob = -0.1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_sized_knobs_rejected() {
        for field in 0..4 {
            let mut cfg = TrainConfig::default();
            match field {
                0 => cfg.seq_len = 0,
                1 => cfg.batch_size = 0,
                2 => cfg.epochs = 0,
                _ => cfg.patience = 0,
            }
            assert!(cfg.validate().is_err());
        }
    }

    #[test]
    fn test_bad_learning_rate_rejected() {
        let mut cfg = TrainConfig::default();
        cfg.lr = 0.0;
        assert!(cfg.validate().is_err());
        cfg.lr = f64::NAN;
        assert!(cfg.validate().is_err());
        cfg.lr = f64::INFINITY;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_heads_must_divide_d_model() {
        let mut cfg = TrainConfig::default();
        cfg.d_model   = 100;
        cfg.num_heads = 3;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let cfg  = TrainConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: TrainConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.seq_len, cfg.seq_len);
        assert_eq!(back.model_name, cfg.model_name);
        assert_eq!(back.seed, cfg.seed);
    }
}
