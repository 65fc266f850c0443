use std::error::Error;

use clap::Parser;
use cli::{Args, EvaluatorKind};
use log::{error, info};
use mcts::{Evaluator, RandomRollout, SearchConfig, TreeConfig, Uniform};
use mimalloc::MiMalloc;
use nim::Nim;
use rand::{rngs::StdRng, SeedableRng};
use self_play::self_play;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod cli;
mod nim;
mod self_play;

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    match &args.log_file {
        Some(path) => simple_logging::log_to_file(path, args.log_level)?,
        None => simple_logging::log_to_stderr(args.log_level),
    }
    args.validate()?;

    match args.evaluator {
        EvaluatorKind::Uniform => run(&args, &Uniform),
        EvaluatorKind::Rollout => run(&args, &RandomRollout::default()),
    }
    Ok(())
}

fn run<V: Evaluator<Nim> + Sync>(args: &Args, evaluator: &V) {
    let nim = Nim {
        max_take: args.max_take,
    };
    let tree_config = TreeConfig::new(args.depth, args.branching_factor, args.virtual_loss);
    let config = SearchConfig {
        rollouts: args.rollouts,
        workers: args.workers,
        ..Default::default()
    };
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut first_player_wins = 0;
    for game in 1..=args.games {
        info!("starting game {game}/{}", args.games);
        match self_play(&nim, args.stones, tree_config, &config, evaluator, &mut rng) {
            Ok(examples) => {
                let optimal = examples
                    .iter()
                    .filter(|ex| {
                        nim.winning_take(ex.pile).map_or(true, |take| {
                            ex.policy.iter().max_by_key(|(_, n)| *n).map(|(t, _)| *t) == Some(take)
                        })
                    })
                    .count();
                if examples.first().map_or(false, |ex| ex.result > 0.0) {
                    first_player_wins += 1;
                }
                info!(
                    "game {game} finished after {} plies, {optimal} positions searched to the winning take",
                    examples.len()
                );
            }
            Err(e) => error!("game {game} failed: {e}"),
        }
    }
    info!("first player won {first_player_wins}/{} games", args.games);
}
