use clap::{ArgEnum, Parser};
use log::LevelFilter;
use mcts::config::{BRANCHING_FACTOR, DEPTH, ROLLOUTS_PER_MOVE, VIRTUAL_LOSS, WORKERS};

/// Play Nim against itself using one shared search tree per game
#[derive(Parser)]
pub struct Args {
    /// Number of stones on the starting pile
    #[clap(long, default_value_t = 21)]
    pub stones: u8,
    /// Most stones that can be taken in one turn
    #[clap(long, default_value_t = 3)]
    pub max_take: u8,
    /// Rollouts per move
    #[clap(short, long, default_value_t = ROLLOUTS_PER_MOVE)]
    pub rollouts: usize,
    /// Search threads sharing the tree
    #[clap(short, long, default_value_t = WORKERS)]
    pub workers: usize,
    /// Virtual loss applied while a rollout is in flight
    #[clap(long, default_value_t = VIRTUAL_LOSS)]
    pub virtual_loss: u32,
    /// Most edges a node may have
    #[clap(long, default_value_t = BRANCHING_FACTOR)]
    pub branching_factor: usize,
    /// Search horizon in plies
    #[clap(long, default_value_t = DEPTH)]
    pub depth: usize,
    /// Number of games to play
    #[clap(short, long, default_value_t = 1)]
    pub games: usize,
    /// How leaves are evaluated
    #[clap(short, long, arg_enum, default_value = "rollout")]
    pub evaluator: EvaluatorKind,
    /// Seed for move sampling and root noise
    #[clap(long)]
    pub seed: Option<u64>,
    /// Log level (off, error, warn, info, debug, trace)
    #[clap(long, default_value = "info")]
    pub log_level: LevelFilter,
    /// Write the log to this file instead of stderr
    #[clap(long)]
    pub log_file: Option<String>,
}

impl Args {
    /// Reject settings under which no move could ever be searched.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_take == 0 {
            return Err("max-take must be at least 1".to_string());
        }
        if self.branching_factor == 0 {
            return Err("branching-factor must be at least 1".to_string());
        }
        Ok(())
    }
}

#[derive(ArgEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvaluatorKind {
    /// Flat priors, neutral value
    Uniform,
    /// Flat priors, value from a random playout
    Rollout,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Args;

    #[test]
    fn defaults_are_valid() {
        assert!(Args::parse_from(["self-play"]).validate().is_ok());
    }

    #[test]
    fn zero_branching_factor_is_rejected() {
        let args = Args::parse_from(["self-play", "--branching-factor", "0"]);
        assert!(args.validate().unwrap_err().contains("branching-factor"));
    }

    #[test]
    fn zero_max_take_is_rejected() {
        let args = Args::parse_from(["self-play", "--max-take", "0"]);
        assert!(args.validate().unwrap_err().contains("max-take"));
    }
}
