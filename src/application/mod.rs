// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal each:
// training a model, or evaluating a trained one. No ML math and
// no printing here; only workflow coordination.

// The training workflow
pub mod train_use_case;

// The test-split evaluation workflow
pub mod eval_use_case;
