// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Cross-cutting persistence concerns:
//
//   checkpoint.rs - best-model slot under models/ plus the run
//                   configuration needed to rebuild it
//
//   history.rs    - per-epoch history JSON under results/
//
// Keeping these out of the ML layer means the training loop
// depends on what gets saved, not on how.

/// Best-model checkpoint saving and loading
pub mod checkpoint;

/// Training history persistence
pub mod history;
