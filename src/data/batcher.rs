// ============================================================
// Layer 4 - Sequence Batcher
// ============================================================
// Converts a MaskedBatch (plain Vec matrices) into GPU-ready
// tensors. Rows are already rectangular, so batching is a
// flatten-then-reshape:
//
//   [r1_p1, ..., r1_pS, r2_p1, ..., rN_pS]  ->  [N, S]
//
// The attention padding mask is derived here from the masked
// inputs: a position counts as padding exactly when its masked
// value is 0.

use burn::prelude::*;

use crate::domain::sequence::MaskedBatch;

// ─── SeqBatch ─────────────────────────────────────────────────────────────────
/// One masked mini-batch ready for the model forward pass.
/// All tensors have batch_size as their first dimension.
#[derive(Debug, Clone)]
pub struct SeqBatch<B: Backend> {
    /// Masked item ids, shape [batch_size, seq_len]
    pub inputs: Tensor<B, 2, Int>,

    /// Reconstruction targets, shape [batch_size, seq_len].
    /// 0 marks positions the loss must ignore.
    pub labels: Tensor<B, 2, Int>,

    /// true where the input is padding (id 0), shape [batch_size, seq_len].
    /// Consumed by self-attention to exclude padded positions.
    pub pad_mask: Tensor<B, 2, Bool>,
}

// ─── SeqBatcher ───────────────────────────────────────────────────────────────
/// Holds the target device so tensors land on the right GPU/CPU.
#[derive(Clone, Debug)]
pub struct SeqBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SeqBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    /// Stack a masked batch into [batch_size, seq_len] tensors.
    pub fn batch(&self, masked: &MaskedBatch) -> SeqBatch<B> {
        let (inputs, pad_mask) = self.batch_inputs(&masked.inputs);

        let batch_size = masked.len();
        let seq_len    = masked.labels[0].len();

        let label_flat: Vec<i32> = masked
            .labels
            .iter()
            .flat_map(|row| row.iter().map(|&x| x as i32))
            .collect();

        let labels = Tensor::<B, 1, Int>::from_ints(label_flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);

        SeqBatch { inputs, labels, pad_mask }
    }

    /// Stack input rows alone, without labels. Used by the ranking
    /// evaluator, whose probe rows have no reconstruction targets.
    pub fn batch_inputs(&self, rows: &[Vec<u32>]) -> (Tensor<B, 2, Int>, Tensor<B, 2, Bool>) {
        let batch_size = rows.len();
        // Rows are rectangular by construction in the masker.
        let seq_len = rows[0].len();

        let input_flat: Vec<i32> = rows
            .iter()
            .flat_map(|row| row.iter().map(|&x| x as i32))
            .collect();

        let inputs = Tensor::<B, 1, Int>::from_ints(input_flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);

        let pad_mask = inputs.clone().equal_elem(0);

        (inputs, pad_mask)
    }
}
