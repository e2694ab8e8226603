// ============================================================
// Layer 5 - Evaluation
// ============================================================
// Two read-only passes over a dataset split:
//
//   evaluate_val_loss  - masked cross-entropy loss, same masking
//                        protocol as training, no gradients
//   evaluate_ranking   - leave-one-out ranking quality
//                        (NDCG@k and Recall@k)
//
// Both run on a non-autodiff backend; callers pass the result of
// model.valid().
//
// Loss normalisation: the returned value is the sum of per-batch
// losses divided by the number of sequences in the split, not by
// the number of batches. This denominator is load-bearing for
// comparability with previously recorded runs.

use anyhow::{anyhow, Result};
use std::collections::{BTreeMap, HashSet};

use burn::{nn::loss::CrossEntropyLossConfig, prelude::*};
use rand::Rng;

use crate::data::batcher::SeqBatcher;
use crate::data::masker::{mask_items, pad_sequence};
use crate::domain::sequence::{mask_id, ItemSeq};
use crate::ml::model::Bert4Rec;

/// Average masked-reconstruction loss over a split.
///
/// Partitions the split into contiguous fixed-size batches (the
/// final batch may be short), masks each batch with the shared
/// generator, and accumulates the per-batch loss with label 0
/// ignored.
#[allow(clippy::too_many_arguments)]
pub fn evaluate_val_loss<B: Backend>(
    model:      &Bert4Rec<B>,
    dataset:    &[ItemSeq],
    num_items:  usize,
    mask_prob:  f64,
    seq_len:    usize,
    batch_size: usize,
    device:     &B::Device,
    rng:        &mut impl Rng,
) -> f64 {
    if dataset.is_empty() {
        return 0.0;
    }

    let batcher = SeqBatcher::<B>::new(device.clone());
    let ce = CrossEntropyLossConfig::new()
        .with_pad_tokens(Some(vec![0]))
        .init(device);

    let mut total_loss = 0.0f64;

    for chunk in dataset.chunks(batch_size) {
        let masked = mask_items(chunk, num_items, mask_prob, seq_len, rng);
        let batch  = batcher.batch(&masked);

        let logits = model.forward(batch.inputs, batch.pad_mask);
        let [bs, sl, vocab] = logits.dims();

        let loss = ce.forward(
            logits.reshape([bs * sl, vocab]),
            batch.labels.reshape([bs * sl]),
        );
        total_loss += loss.into_scalar().elem::<f64>();
    }

    total_loss / dataset.len() as f64
}

/// Ranking quality at each cutoff, keyed by cutoff.
#[derive(Debug, Clone)]
pub struct RankingMetrics {
    pub ndcg:   BTreeMap<usize, f64>,
    pub recall: BTreeMap<usize, f64>,
}

/// Leave-one-out ranking evaluation.
///
/// For every sequence with at least two items, the final item is
/// held out and the model scores it from the prefix: the probe row
/// is the prefix with the mask token appended, padded to seq_len,
/// so the prediction is read at the rightmost position. Items
/// already in the prefix, the padding id, and the mask id are
/// excluded from the candidate set. Recall@k is the hit rate at
/// cutoff k; NDCG@k credits a hit at rank r with 1/log2(r + 1).
pub fn evaluate_ranking<B: Backend>(
    model:      &Bert4Rec<B>,
    dataset:    &[ItemSeq],
    num_items:  usize,
    cutoffs:    &[usize],
    seq_len:    usize,
    batch_size: usize,
    device:     &B::Device,
) -> Result<RankingMetrics> {
    let mask = mask_id(num_items);

    // Sequences with fewer than two items have nothing to hold out.
    let eligible: Vec<&ItemSeq> = dataset.iter().filter(|s| s.len() >= 2).collect();

    let mut gain_sums = vec![0.0f64; cutoffs.len()];
    let mut hit_sums  = vec![0.0f64; cutoffs.len()];

    let batcher = SeqBatcher::<B>::new(device.clone());

    for chunk in eligible.chunks(batch_size) {
        let rows: Vec<Vec<u32>> = chunk
            .iter()
            .map(|seq| {
                let mut probe = seq[..seq.len() - 1].to_vec();
                probe.push(mask);
                pad_sequence(&probe, seq_len)
            })
            .collect();

        let (inputs, pad_mask) = batcher.batch_inputs(&rows);
        let logits = model.forward(inputs, pad_mask);
        let [bs, sl, vocab] = logits.dims();

        // Scores at the rightmost (masked) position, one row per sequence.
        let scores: Vec<f32> = logits
            .slice([0..bs, (sl - 1)..sl, 0..vocab])
            .reshape([bs, vocab])
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow!("Cannot read logits back from device: {e:?}"))?;

        for (row, seq) in chunk.iter().enumerate() {
            let row_scores = &scores[row * vocab..(row + 1) * vocab];
            let target     = seq[seq.len() - 1] as usize;
            let prefix: HashSet<u32> = seq[..seq.len() - 1].iter().copied().collect();

            let target_score = row_scores[target];

            // Rank among unseen real items; ties count against the target.
            let mut rank = 1usize;
            for item in 1..=num_items {
                if item == target || prefix.contains(&(item as u32)) {
                    continue;
                }
                if row_scores[item] >= target_score {
                    rank += 1;
                }
            }

            for (i, &k) in cutoffs.iter().enumerate() {
                if rank <= k {
                    hit_sums[i]  += 1.0;
                    gain_sums[i] += 1.0 / ((rank + 1) as f64).log2();
                }
            }
        }
    }

    let evaluated = eligible.len().max(1) as f64;
    let ndcg: BTreeMap<usize, f64> = cutoffs
        .iter()
        .zip(&gain_sums)
        .map(|(&k, &g)| (k, g / evaluated))
        .collect();
    let recall: BTreeMap<usize, f64> = cutoffs
        .iter()
        .zip(&hit_sums)
        .map(|(&k, &h)| (k, h / evaluated))
        .collect();

    Ok(RankingMetrics { ndcg, recall })
}
