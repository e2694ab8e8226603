// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The application layer programs against these traits so the
// concrete storage format can be swapped without touching the
// training pipeline.

use anyhow::Result;
use crate::domain::sequence::SequenceData;

// ─── SequenceSource ───────────────────────────────────────────────────────────
/// Any component that can produce the three sequence splits and
/// the derived vocabulary size.
///
/// Implementations:
///   - PickleLoader  -> reads pickled splits from a directory
pub trait SequenceSource {
    /// Load train/val/test splits and derive `num_items`.
    fn load(&self) -> Result<SequenceData>;
}
