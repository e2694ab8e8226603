// ============================================================
// Layer 3 - Training History Record
// ============================================================

use serde::{Deserialize, Serialize};

/// One row of the training history, appended after every epoch.
///
/// Loss fields are normalised by the number of sequences in the
/// split, not by the number of batches. Downstream comparisons
/// depend on that exact denominator, so it must not be changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochRecord {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Sum of per-batch training losses / number of training sequences
    pub train_loss: f64,

    /// Sum of per-batch validation losses / number of validation sequences
    pub val_loss: f64,

    /// NDCG at cutoff 10 on the validation split
    pub val_ndcg: f64,

    /// Recall at cutoff 10 on the validation split
    pub val_recall: f64,

    /// Learning rate in effect during the last training batch
    pub lr: f64,
}
