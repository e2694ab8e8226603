// ============================================================
// Layer 2 - EvalUseCase
// ============================================================
// Loads the best checkpoint from a finished run and measures its
// ranking quality on the held-out test split. Dropout is disabled
// so the pass is deterministic.

use anyhow::Result;

use crate::data::loader::PickleLoader;
use crate::domain::traits::SequenceSource;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::evaluator::{evaluate_ranking, RankingMetrics};
use crate::ml::model::Bert4RecConfig;

type EvalBackend = burn::backend::Wgpu;

pub struct EvalUseCase {
    data_dir:   String,
    models_dir: String,
    cutoff:     usize,
}

impl EvalUseCase {
    pub fn new(
        data_dir:   impl Into<String>,
        models_dir: impl Into<String>,
        cutoff:     usize,
    ) -> Self {
        Self {
            data_dir:   data_dir.into(),
            models_dir: models_dir.into(),
            cutoff,
        }
    }

    pub fn execute(&self) -> Result<RankingMetrics> {
        let loader = PickleLoader::new(&self.data_dir);
        let data   = loader.load()?;

        let ckpt_manager = CheckpointManager::new(&self.models_dir);
        let cfg = ckpt_manager.load_config()?;

        let device = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Evaluating on device: {:?}", device);

        // Rebuild the trained architecture with dropout off.
        let model_cfg = Bert4RecConfig::new(
            data.num_items, cfg.seq_len, cfg.d_model,
            cfg.num_heads, cfg.num_layers, cfg.d_ff, 0.0,
        );
        let model = model_cfg.init::<EvalBackend>(&device);
        let model = ckpt_manager.load_model(model, &cfg.model_name, &device)?;
        tracing::info!("Model loaded from checkpoint '{}'", cfg.model_name);

        evaluate_ranking(
            &model, &data.test, data.num_items,
            &[self.cutoff], cfg.seq_len, cfg.batch_size, &device,
        )
    }
}
