// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `evaluate`, and all
// their configurable flags. clap's derive macros generate the
// help text, error messages, and type conversions.

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the masked-sequence recommender on interaction histories
    Train(TrainArgs),

    /// Rank the held-out test items with a trained checkpoint
    Evaluate(EvaluateArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory containing train_seqs.pkl, val_seqs.pkl, test_seqs.pkl
    #[arg(long, default_value = "data/processed")]
    pub data_dir: String,

    /// Directory for the best-model checkpoint
    #[arg(long, default_value = "models")]
    pub models_dir: String,

    /// Directory for the training history JSON
    #[arg(long, default_value = "results")]
    pub results_dir: String,

    /// Name of the checkpoint slot (overwritten on every new best)
    #[arg(long, default_value = "bert4rec")]
    pub model_name: String,

    /// File name of the per-epoch history written under the results directory
    #[arg(long, default_value = "history.json")]
    pub result_name: String,

    /// Fixed length every sequence is padded or truncated to
    #[arg(long, default_value_t = 50)]
    pub seq_len: usize,

    /// Number of sequences per training batch
    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    /// Maximum number of full passes over the training split
    #[arg(long, default_value_t = 50)]
    pub epochs: usize,

    /// Consecutive non-improving epochs tolerated before early stop
    #[arg(long, default_value_t = 5)]
    pub patience: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Probability of masking each non-padding position
    #[arg(long, default_value_t = 0.15)]
    pub mask_prob: f64,

    /// Seed for the run's random generator (shuffling and masking)
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Hidden dimension of the transformer
    #[arg(long, default_value_t = 128)]
    pub d_model: usize,

    /// Number of attention heads (d_model must be divisible by this)
    #[arg(long, default_value_t = 2)]
    pub num_heads: usize,

    /// Number of stacked encoder layers
    #[arg(long, default_value_t = 2)]
    pub num_layers: usize,

    /// Inner dimension of the feed-forward network
    #[arg(long, default_value_t = 512)]
    pub d_ff: usize,

    /// Dropout probability during training
    #[arg(long, default_value_t = 0.2)]
    pub dropout: f64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:    a.data_dir,
            models_dir:  a.models_dir,
            results_dir: a.results_dir,
            model_name:  a.model_name,
            result_name: a.result_name,
            seq_len:     a.seq_len,
            batch_size:  a.batch_size,
            epochs:      a.epochs,
            patience:    a.patience,
            lr:          a.lr,
            mask_prob:   a.mask_prob,
            seed:        a.seed,
            d_model:     a.d_model,
            num_heads:   a.num_heads,
            num_layers:  a.num_layers,
            d_ff:        a.d_ff,
            dropout:     a.dropout,
        }
    }
}

/// All arguments for the `evaluate` command
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Directory with the sequence splits (same as used during training)
    #[arg(long, default_value = "data/processed")]
    pub data_dir: String,

    /// Directory where the checkpoint and config were saved
    #[arg(long, default_value = "models")]
    pub models_dir: String,

    /// Ranking cutoff for NDCG@k and Recall@k
    #[arg(long, default_value_t = 10)]
    pub k: usize,
}
