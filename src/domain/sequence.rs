// ============================================================
// Layer 3 - Sequence Domain Types
// ============================================================
// An item sequence is one user's interaction history: an ordered
// list of positive item ids, most recent last. Item id 0 is the
// padding sentinel and never appears inside a stored sequence.
//
// Reference: Sun et al. (2019) BERT4Rec

/// One user's interaction history. Immutable once loaded.
pub type ItemSeq = Vec<u32>;

/// The padding sentinel. Positions holding this id carry no item
/// and are ignored by both attention and the loss.
pub const PAD_ID: u32 = 0;

/// The synthetic mask token id for a vocabulary of `num_items` real
/// items. Real ids occupy 1..=num_items and 0 is padding, so
/// `num_items + 1` is the first id guaranteed not to collide.
pub fn mask_id(num_items: usize) -> u32 {
    num_items as u32 + 1
}

/// The three sequence splits plus the vocabulary size derived from
/// their union.
#[derive(Debug, Clone)]
pub struct SequenceData {
    pub train:     Vec<ItemSeq>,
    pub val:       Vec<ItemSeq>,
    pub test:      Vec<ItemSeq>,
    /// Highest item id across all splits, excluding the padding 0.
    pub num_items: usize,
}

/// A mini-batch after padding and masking, still as plain data.
///
/// Both matrices are rectangular [batch_size, seq_len]. For every
/// position exactly one of the following holds:
///   - inputs[pos] == MASK_ID and labels[pos] is the original item,
///   - inputs[pos] is the padded value and labels[pos] == 0.
/// Label 0 marks positions the loss must ignore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedBatch {
    pub inputs: Vec<Vec<u32>>,
    pub labels: Vec<Vec<u32>>,
}

impl MaskedBatch {
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}
