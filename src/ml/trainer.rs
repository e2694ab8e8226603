// ============================================================
// Layer 5 - Training Loop
// ============================================================
// Full train + validation loop over masked sequence batches.
//
// Key Burn 0.20 insight:
//   - Training uses MyBackend (Autodiff<Wgpu>) for gradients
//   - model.valid() returns the model on MyInnerBackend (Wgpu),
//     which is what both evaluation passes run on
//
// Per epoch: shuffle an owned copy of the training split, walk it
// in contiguous batches (mask -> forward -> loss -> backward ->
// Adam step), then compute validation loss and ranking metrics,
// advance the plateau scheduler on NDCG@10, and decide between
// checkpointing and early stopping.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam,
//            Sun et al. (2019) BERT4Rec

use anyhow::Result;
use burn::{
    module::AutodiffModule,
    nn::loss::CrossEntropyLossConfig,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::SeqBatcher, masker::mask_items};
use crate::domain::{history::EpochRecord, sequence::SequenceData};
use crate::infra::{checkpoint::CheckpointManager, history::HistoryWriter};
use crate::ml::{
    evaluator::{evaluate_ranking, evaluate_val_loss},
    model::{Bert4Rec, Bert4RecConfig},
    scheduler::PlateauScheduler,
};

type MyBackend      = burn::backend::Autodiff<burn::backend::Wgpu>;
type MyInnerBackend = burn::backend::Wgpu;

/// Ranking cutoff monitored for checkpointing and early stopping.
const RANKING_CUTOFF: usize = 10;

/// An epoch only counts as an improvement when its NDCG@10 beats
/// the best seen so far by more than this margin. Ties and
/// sub-tolerance gains increment the stall counter instead.
const IMPROVEMENT_TOLERANCE: f64 = 1e-4;

pub fn run_training(
    cfg:            &TrainConfig,
    data:           SequenceData,
    ckpt_manager:   CheckpointManager,
    history_writer: HistoryWriter,
) -> Result<Vec<EpochRecord>> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Training on device: {:?}", device);
    train_loop(cfg, data, ckpt_manager, history_writer, device)
}

fn train_loop(
    cfg:            &TrainConfig,
    data:           SequenceData,
    ckpt_manager:   CheckpointManager,
    history_writer: HistoryWriter,
    device:         burn::backend::wgpu::WgpuDevice,
) -> Result<Vec<EpochRecord>> {
    let num_items = data.num_items;

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = Bert4RecConfig::new(
        num_items, cfg.seq_len, cfg.d_model,
        cfg.num_heads, cfg.num_layers, cfg.d_ff, cfg.dropout,
    );
    let mut model = model_cfg.init::<MyBackend>(&device);

    println!("Training model with the following configuration:");
    println!("  Embedding Dim  : {}", model_cfg.d_model);
    println!("  Num Layers     : {}", model_cfg.num_layers);
    println!("  Num Heads      : {}", model_cfg.num_heads);
    println!("  Dropout        : {}", model_cfg.dropout);
    println!("  Masking Prob   : {}", cfg.mask_prob);
    println!("  Learning Rate  : {}", cfg.lr);
    println!("  Batch Size     : {}", cfg.batch_size);
    println!("  Epochs         : {}", cfg.epochs);
    println!("  Patience       : {}", cfg.patience);
    println!("  Seq Length     : {}", cfg.seq_len);

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let optim_cfg = AdamConfig::new().with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    // Cross-entropy over the full vocabulary; label 0 marks
    // positions outside the loss.
    let ce = CrossEntropyLossConfig::new()
        .with_pad_tokens(Some(vec![0]))
        .init(&device);

    let mut scheduler = PlateauScheduler::new(cfg.lr);

    // One generator drives shuffling and masking for the whole
    // run, seeded once for reproducibility.
    let mut rng = StdRng::seed_from_u64(cfg.seed);

    let batcher = SeqBatcher::<MyBackend>::new(device.clone());

    // The loop owns a mutable copy of the training split so the
    // loaded data stays untouched.
    let mut train_seqs = data.train.clone();
    let train_count = train_seqs.len();

    let mut history = Vec::new();
    let mut tracker = ImprovementTracker::new(cfg.patience, IMPROVEMENT_TOLERANCE);
    let mut current_lr = cfg.lr;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        // Re-randomise batch composition every epoch.
        train_seqs.shuffle(&mut rng);

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;

        for chunk in train_seqs.chunks(cfg.batch_size) {
            let masked = mask_items(chunk, num_items, cfg.mask_prob, cfg.seq_len, &mut rng);
            let batch  = batcher.batch(&masked);

            let logits = model.forward(batch.inputs, batch.pad_mask);
            let [bs, sl, vocab] = logits.dims();
            let loss = ce.forward(
                logits.reshape([bs * sl, vocab]),
                batch.labels.reshape([bs * sl]),
            );

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_loss_sum += loss_val;

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(current_lr, model, grads);

            tracing::debug!("batch loss={:.4} lr={}", loss_val, current_lr);
        }

        // Normalised by sequence count, not batch count.
        let train_loss = train_loss_sum / train_count as f64;

        // ── Validation phase ──────────────────────────────────────────────────
        // Dropout disabled, no gradient tracking.
        let model_valid: Bert4Rec<MyInnerBackend> = model.valid();

        let val_loss = evaluate_val_loss(
            &model_valid, &data.val, num_items,
            cfg.mask_prob, cfg.seq_len, cfg.batch_size,
            &device, &mut rng,
        );

        let val_metrics = evaluate_ranking(
            &model_valid, &data.val, num_items,
            &[RANKING_CUTOFF], cfg.seq_len, cfg.batch_size, &device,
        )?;
        let val_ndcg   = val_metrics.ndcg.get(&RANKING_CUTOFF).copied().unwrap_or(0.0);
        let val_recall = val_metrics.recall.get(&RANKING_CUTOFF).copied().unwrap_or(0.0);

        // The lr recorded for this epoch is the one the last batch
        // trained with; the scheduler only affects the next epoch.
        let epoch_lr = current_lr;
        current_lr = scheduler.step(val_ndcg);

        history.push(EpochRecord {
            epoch,
            train_loss,
            val_loss,
            val_ndcg,
            val_recall,
            lr: epoch_lr,
        });

        println!(
            "\nEpoch {} Summary | Train Loss: {:.4} | Val Loss: {:.4} | \
             NDCG@10: {:.4} | Recall@10: {:.4}\n",
            epoch, train_loss, val_loss, val_ndcg, val_recall,
        );

        // ── Checkpoint / early-stop decision ──────────────────────────────────
        match tracker.observe(val_ndcg) {
            Verdict::Improved => {
                ckpt_manager.save_model(&model, &cfg.model_name)?;
                tracing::info!("New best NDCG@10 {:.4}; checkpoint saved", val_ndcg);
            }
            Verdict::Stalled => {
                tracing::info!(
                    "No improvement ({}/{} stalled epochs)",
                    tracker.stalls(),
                    cfg.patience,
                );
            }
            Verdict::OutOfPatience => {
                println!("Early stopping triggered by NDCG@10.");
                break;
            }
        }
    }

    history_writer.write(&cfg.result_name, &history)?;

    Ok(history)
}

// ─── Improvement Tracking ─────────────────────────────────────────────────────
/// Outcome of observing one epoch's monitored metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Strict improvement beyond the tolerance: new best, counter reset.
    Improved,
    /// No improvement, but patience is not yet exhausted.
    Stalled,
    /// The stall counter reached the patience threshold.
    OutOfPatience,
}

/// Tracks the best monitored metric and the consecutive
/// non-improving epochs since it was set.
pub struct ImprovementTracker {
    best:      f64,
    tolerance: f64,
    patience:  usize,
    stalls:    usize,
}

impl ImprovementTracker {
    pub fn new(patience: usize, tolerance: f64) -> Self {
        Self { best: 0.0, tolerance, patience, stalls: 0 }
    }

    pub fn observe(&mut self, metric: f64) -> Verdict {
        if metric > self.best + self.tolerance {
            self.best   = metric;
            self.stalls = 0;
            Verdict::Improved
        } else {
            self.stalls += 1;
            if self.stalls >= self.patience {
                Verdict::OutOfPatience
            } else {
                Verdict::Stalled
            }
        }
    }

    pub fn best(&self) -> f64 {
        self.best
    }

    pub fn stalls(&self) -> usize {
        self.stalls
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_improvement_updates_best() {
        let mut t = ImprovementTracker::new(3, 1e-4);
        assert_eq!(t.observe(0.10), Verdict::Improved);
        assert_eq!(t.observe(0.20), Verdict::Improved);
        assert!((t.best() - 0.20).abs() < 1e-12);
    }

    #[test]
    fn test_tie_does_not_count_as_improvement() {
        let mut t = ImprovementTracker::new(3, 1e-4);
        t.observe(0.10);
        assert_eq!(t.observe(0.10), Verdict::Stalled);
        assert_eq!(t.stalls(), 1);
    }

    #[test]
    fn test_sub_tolerance_gain_is_a_stall() {
        let mut t = ImprovementTracker::new(3, 1e-4);
        t.observe(0.10);
        // 5e-5 above best: within the tolerance margin.
        assert_eq!(t.observe(0.10005), Verdict::Stalled);
        assert!((t.best() - 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_stops_exactly_at_patience() {
        let mut t = ImprovementTracker::new(3, 1e-4);
        t.observe(0.50);
        assert_eq!(t.observe(0.10), Verdict::Stalled);
        assert_eq!(t.observe(0.10), Verdict::Stalled);
        assert_eq!(t.observe(0.10), Verdict::OutOfPatience);
    }

    #[test]
    fn test_improvement_resets_stall_counter() {
        let mut t = ImprovementTracker::new(2, 1e-4);
        t.observe(0.10);
        t.observe(0.05);
        assert_eq!(t.observe(0.30), Verdict::Improved);
        assert_eq!(t.stalls(), 0);
        assert_eq!(t.observe(0.10), Verdict::Stalled);
    }

    #[test]
    fn test_patience_one_stops_on_first_stall() {
        let mut t = ImprovementTracker::new(1, 1e-4);
        t.observe(0.40);
        assert_eq!(t.observe(0.39), Verdict::OutOfPatience);
    }

    #[test]
    fn test_first_observation_of_zero_is_a_stall() {
        // best starts at 0.0, so a 0.0 metric is not an improvement.
        let mut t = ImprovementTracker::new(2, 1e-4);
        assert_eq!(t.observe(0.0), Verdict::Stalled);
    }
}
