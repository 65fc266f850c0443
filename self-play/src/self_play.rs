use log::{debug, info};
use mcts::{Environment, Evaluator, Puct, Search, SearchConfig, Tree, TreeConfig, TreeError, TreeResult};
use rand::Rng;

use crate::nim::Nim;

/// One position of a finished game, ready to be used as a training target.
#[derive(Clone, Debug, PartialEq)]
pub struct Example {
    pub pile: u8,
    /// Visit counts per take after searching this position.
    pub policy: Vec<(u8, u32)>,
    /// Outcome for the player to move: 1 for a win, -1 for a loss.
    pub result: f32,
}

/// Play one game against itself, reusing the tree between moves.
pub fn self_play<V, R>(
    nim: &Nim,
    stones: u8,
    tree_config: TreeConfig,
    config: &SearchConfig,
    evaluator: &V,
    rng: &mut R,
) -> TreeResult<Vec<Example>>
where
    V: Evaluator<Nim> + Sync,
    R: Rng,
{
    let tree = Tree::new(tree_config);
    let puct = Puct {
        base: config.exploration_base,
        init: config.exploration_init,
    };
    let search = Search::new(&tree, nim, evaluator, &puct);

    let mut pile = stones;
    let mut history = Vec::new();
    while nim.terminal_value(&pile).is_none() {
        search.prepare_root(&pile)?;
        tree.apply_dirichlet(&pile, config.dirichlet_alpha, config.noise_ratio, rng)?;
        let completed = search.run(&pile, config.rollouts, config.workers);

        let exploitation = history.len() >= config.temperature_plies;
        let take = tree
            .pick_action(&pile, exploitation, rng)
            .ok_or(TreeError::UnknownAction)?;
        debug!("\n{}", visit_table(&tree, pile));
        info!(
            "ply {}: {pile} stones, took {take} ({completed} rollouts{})",
            history.len(),
            if nim.winning_take(pile) == Some(take) { ", winning" } else { "" }
        );

        history.push((pile, tree.improved_policy(&pile).unwrap_or_default()));
        pile -= take;
    }

    // Whoever made the last move took the last stone.
    let plies = history.len();
    Ok(history
        .into_iter()
        .enumerate()
        .map(|(ply, (pile, policy))| Example {
            pile,
            policy,
            result: if (plies - 1 - ply) % 2 == 0 { 1.0 } else { -1.0 },
        })
        .collect())
}

fn visit_table(tree: &Tree<u8, u8>, pile: u8) -> String {
    format!("take   visited    value   policy\n{}", {
        let mut edges = tree.edges(&pile).unwrap_or_default();
        edges.sort_by_key(|(_, edge)| edge.n);
        edges.reverse();
        edges
            .iter()
            .map(|(take, edge)| format!("{: <4} {: >9} {: >8.4} {: >8.4}\n", take, edge.n, edge.q, edge.p))
            .collect::<String>()
    })
}
