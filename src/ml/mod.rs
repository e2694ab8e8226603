// ============================================================
// Layer 5 - ML / Model Layer (Burn)
// ============================================================
// All Burn framework specific code lives in this layer.
//
//   model.rs     - the bidirectional transformer encoder that
//                  reconstructs masked items over the full
//                  vocabulary
//
//   trainer.rs   - the epoch loop: shuffling, masked batches,
//                  forward/backward, Adam steps, plateau LR
//                  scheduling, checkpointing, early stopping
//
//   evaluator.rs - read-only passes: masked validation loss and
//                  leave-one-out ranking metrics (NDCG/Recall)
//
//   scheduler.rs - reduce-on-plateau learning rate policy in
//                  maximize mode
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Vaswani et al. (2017) Attention Is All You Need
//            Sun et al. (2019) BERT4Rec

/// Masked-sequence transformer model architecture
pub mod model;

/// Full training loop with validation, checkpointing, early stop
pub mod trainer;

/// Validation loss and ranking-quality evaluation
pub mod evaluator;

/// Reduce-on-plateau learning rate scheduler
pub mod scheduler;
