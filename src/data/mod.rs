// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Everything from pickled sequence files to GPU-ready batches.
//
// The pipeline flows in this order:
//
//   train_seqs.pkl / val_seqs.pkl / test_seqs.pkl
//       │
//       ▼
//   PickleLoader  -> reads splits, derives vocabulary size
//       │
//       ▼
//   masker        -> pads to seq_len, masks items, emits labels
//       │
//       ▼
//   SeqBatcher    -> stacks masked rows into tensor batches
//       │
//       ▼
//   training loop -> forward / backward per batch
//
// Each module is responsible for exactly one step.

/// Reads the pickled sequence splits from a directory
pub mod loader;

/// Pads sequences and applies random item masking
pub mod masker;

/// Converts masked batches into Burn tensors
pub mod batcher;
