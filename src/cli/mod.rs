// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction; parses arguments with
// clap and delegates the work to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`    - trains on the pickled sequence splits
//   2. `evaluate` - ranks the test split with a trained checkpoint

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, TrainArgs};

/// The main CLI struct; clap generates the argument parsing from
/// the derive annotations.
#[derive(Parser, Debug)]
#[command(
    name = "seqrec",
    version = "0.1.0",
    about = "Train a masked-item transformer recommender on interaction sequences."
)]
pub struct Cli {
    /// The subcommand to run (train or evaluate)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use
    /// case. The CLI layer only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => Self::run_train(args),
            Commands::Evaluate(args) => Self::run_evaluate(args),
        }
    }

    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Starting training on sequences in: {}", args.data_dir);

        let use_case = TrainUseCase::new(args.into());
        let history  = use_case.execute()?;

        println!(
            "Training finished after {} epoch(s). Checkpoint and history saved.",
            history.len(),
        );
        Ok(())
    }

    fn run_evaluate(args: EvaluateArgs) -> Result<()> {
        use crate::application::eval_use_case::EvalUseCase;

        let k        = args.k;
        let use_case = EvalUseCase::new(args.data_dir, args.models_dir, k);
        let metrics  = use_case.execute()?;

        println!("\nTest-split ranking quality:");
        println!("  NDCG@{}   : {:.4}", k, metrics.ndcg.get(&k).copied().unwrap_or(0.0));
        println!("  Recall@{} : {:.4}", k, metrics.recall.get(&k).copied().unwrap_or(0.0));
        Ok(())
    }
}
