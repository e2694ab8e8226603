// ============================================================
// Layer 4 - Sequence Masker
// ============================================================
// Converts raw variable-length item sequences into fixed-length
// rows with randomly masked positions, in the cloze style: the
// model must reconstruct each masked item from its surrounding
// context.
//
// Padding keeps the most recent items. A sequence longer than
// seq_len is truncated from the left; a shorter one is prepended
// with zeros, so the latest interaction always sits in the
// rightmost position.
//
// Reference: Sun et al. (2019) BERT4Rec, §3.3 (cloze task)

use rand::Rng;

use crate::domain::sequence::{mask_id, ItemSeq, MaskedBatch, PAD_ID};

/// Pad or truncate `seq` to exactly `seq_len` entries.
///
/// Truncation keeps the suffix (the most recent interactions);
/// padding prepends the 0 sentinel.
pub fn pad_sequence(seq: &[u32], seq_len: usize) -> Vec<u32> {
    if seq.len() >= seq_len {
        seq[seq.len() - seq_len..].to_vec()
    } else {
        let mut padded = vec![PAD_ID; seq_len - seq.len()];
        padded.extend_from_slice(seq);
        padded
    }
}

/// Pad a mini-batch of sequences and mask each non-padding
/// position independently with probability `mask_prob`.
///
/// A masked position holds MASK_ID (= num_items + 1) in the input
/// row and the original item in the label row. Every other
/// position keeps its padded value and gets label 0, which the
/// loss treats as "ignore". Padding positions are never masked.
///
/// A fully-padded row (empty input sequence) produces all-zero
/// labels and therefore contributes nothing to the loss. That is
/// expected, not an error.
pub fn mask_items(
    seqs:      &[ItemSeq],
    num_items: usize,
    mask_prob: f64,
    seq_len:   usize,
    rng:       &mut impl Rng,
) -> MaskedBatch {
    let mask = mask_id(num_items);

    let mut inputs = Vec::with_capacity(seqs.len());
    let mut labels = Vec::with_capacity(seqs.len());

    for seq in seqs {
        let padded = pad_sequence(seq, seq_len);

        let mut masked = Vec::with_capacity(seq_len);
        let mut label  = Vec::with_capacity(seq_len);

        for &item in &padded {
            if item != PAD_ID && rng.gen::<f64>() < mask_prob {
                masked.push(mask);
                label.push(item);
            } else {
                masked.push(item);
                label.push(PAD_ID);
            }
        }

        inputs.push(masked);
        labels.push(label);
    }

    MaskedBatch { inputs, labels }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_pad_short_sequence_prepends_zeros() {
        assert_eq!(pad_sequence(&[1, 2, 3], 5), vec![0, 0, 1, 2, 3]);
    }

    #[test]
    fn test_pad_exact_length_is_identity() {
        assert_eq!(pad_sequence(&[1, 2, 3, 4, 5], 5), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_pad_long_sequence_keeps_suffix() {
        assert_eq!(pad_sequence(&[1, 2, 3, 4, 5, 6, 7], 5), vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_pad_empty_sequence_is_all_zeros() {
        assert_eq!(pad_sequence(&[], 4), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_mask_prob_zero_masks_nothing() {
        let seqs = vec![vec![1, 2, 3], vec![4, 5]];
        let batch = mask_items(&seqs, 6, 0.0, 5, &mut rng());

        assert_eq!(batch.inputs[0], vec![0, 0, 1, 2, 3]);
        assert_eq!(batch.inputs[1], vec![0, 0, 0, 4, 5]);
        for label_row in &batch.labels {
            assert!(label_row.iter().all(|&l| l == 0));
        }
    }

    #[test]
    fn test_mask_prob_one_masks_every_item() {
        // The end-to-end scenario: three sequences, seq_len 5,
        // num_items 6, so MASK_ID is 7.
        let seqs = vec![vec![1, 2, 3], vec![4, 5], vec![6]];
        let batch = mask_items(&seqs, 6, 1.0, 5, &mut rng());

        assert_eq!(batch.inputs[0], vec![0, 0, 7, 7, 7]);
        assert_eq!(batch.inputs[1], vec![0, 0, 0, 7, 7]);
        assert_eq!(batch.inputs[2], vec![0, 0, 0, 0, 7]);

        assert_eq!(batch.labels[0], vec![0, 0, 1, 2, 3]);
        assert_eq!(batch.labels[1], vec![0, 0, 0, 4, 5]);
        assert_eq!(batch.labels[2], vec![0, 0, 0, 0, 6]);
    }

    #[test]
    fn test_masked_positions_and_labels_correspond() {
        // For every position: either the input is MASK_ID and the
        // label is the original item, or the label is 0 and the
        // input is the padded value.
        let seqs: Vec<Vec<u32>> = (0..20)
            .map(|i| (1..=(i % 7 + 1)).map(|x| x as u32).collect())
            .collect();
        let num_items = 7;
        let mask = mask_id(num_items);
        let batch = mask_items(&seqs, num_items, 0.5, 6, &mut rng());

        for (row, (input_row, label_row)) in
            batch.inputs.iter().zip(&batch.labels).enumerate()
        {
            let padded = pad_sequence(&seqs[row], 6);
            for pos in 0..6 {
                if input_row[pos] == mask {
                    assert_eq!(label_row[pos], padded[pos]);
                    assert_ne!(label_row[pos], 0);
                } else {
                    assert_eq!(input_row[pos], padded[pos]);
                    assert_eq!(label_row[pos], 0);
                }
            }
        }
    }

    #[test]
    fn test_padding_is_never_masked() {
        let seqs = vec![vec![3u32]];
        let batch = mask_items(&seqs, 3, 1.0, 4, &mut rng());

        // The three padding positions stay 0 in both matrices.
        assert_eq!(&batch.inputs[0][..3], &[0, 0, 0]);
        assert_eq!(&batch.labels[0][..3], &[0, 0, 0]);
    }

    #[test]
    fn test_empty_sequence_yields_noop_row() {
        let seqs = vec![vec![]];
        let batch = mask_items(&seqs, 10, 1.0, 3, &mut rng());
        assert_eq!(batch.inputs[0], vec![0, 0, 0]);
        assert_eq!(batch.labels[0], vec![0, 0, 0]);
    }

    #[test]
    fn test_output_is_rectangular() {
        let seqs = vec![vec![1, 2], vec![1, 2, 3, 4, 5, 6, 7, 8], vec![]];
        let batch = mask_items(&seqs, 8, 0.3, 5, &mut rng());
        assert_eq!(batch.len(), 3);
        assert!(batch.inputs.iter().all(|r| r.len() == 5));
        assert!(batch.labels.iter().all(|r| r.len() == 5));
    }

    #[test]
    fn test_mask_id_value() {
        assert_eq!(mask_id(6), 7);
        assert_eq!(mask_id(1), 2);
    }

    #[test]
    fn test_same_seed_same_masking() {
        let seqs: Vec<Vec<u32>> = vec![vec![1, 2, 3, 4], vec![5, 6]];
        let a = mask_items(&seqs, 6, 0.4, 6, &mut rng());
        let b = mask_items(&seqs, 6, 0.4, 6, &mut rng());
        assert_eq!(a, b);
    }
}
