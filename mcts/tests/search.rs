use mcts::{Environment, Puct, RandomRollout, Search, Tree, TreeConfig, TreeError, TreeResult, Uniform};

/// Take one to three stones, whoever takes the last stone wins.
struct Nim;

impl Environment for Nim {
    type Action = u8;
    type State = u8;

    fn legal_actions(&self, pile: &u8) -> Vec<u8> {
        (1..=3).filter(|take| take <= pile).collect()
    }

    fn step(&self, pile: &u8, take: &u8) -> u8 {
        pile - take
    }

    fn terminal_value(&self, pile: &u8) -> Option<f32> {
        // The opponent took the last stone.
        (*pile == 0).then_some(-1.0)
    }
}

fn assert_reconciled(tree: &Tree<u8, u8>) {
    for state in tree.states() {
        let node = tree.node(&state).unwrap();
        assert_eq!(node.sum_n, node.edges.iter().map(|(_, e)| e.n).sum::<u32>());
        for (_, edge) in node.edges {
            // Values are in [-1, 1], so leftover virtual loss would push w below -n.
            assert!(edge.w.abs() <= edge.n as f32 + 1e-3);
        }
    }
}

#[test]
fn finds_the_winning_move() {
    let tree = Tree::new(TreeConfig::default().branching_factor(3));
    let (evaluator, puct) = (RandomRollout::default(), Puct::default());
    let search = Search::new(&tree, &Nim, &evaluator, &puct);

    search.prepare_root(&5).unwrap();
    let completed = search.run(&5, 3_000, 4);
    assert_eq!(completed, 3_000);

    // Leaving four stones is the only winning move.
    let best = tree.pick_action(&5, true, &mut rand::thread_rng());
    assert_eq!(best, Some(1));
    assert_eq!(tree.sum_n(&5), Some(3_000));
    assert_reconciled(&tree);
}

#[test]
fn single_rollout_expands_then_descends() -> TreeResult<()> {
    let tree = Tree::default();
    let puct = Puct::default();
    let search = Search::new(&tree, &Nim, &Uniform, &puct);

    assert_eq!(search.rollout(&2)?, 0.0);
    assert!(tree.contains(&2));
    assert_eq!(tree.sum_n(&2), Some(0));

    search.rollout(&2)?;
    assert_eq!(tree.sum_n(&2), Some(1));
    let edges = tree.edges(&2).unwrap();
    assert_eq!(edges.iter().map(|(_, e)| e.n).sum::<u32>(), 1);
    Ok(())
}

#[test]
fn terminal_root_is_never_expanded() -> TreeResult<()> {
    let tree = Tree::default();
    let puct = Puct::default();
    let search = Search::new(&tree, &Nim, &Uniform, &puct);
    search.prepare_root(&0)?;
    assert_eq!(search.rollout(&0)?, -1.0);
    assert!(tree.is_empty());
    Ok(())
}

#[test]
fn depth_limits_growth() {
    let tree = Tree::new(TreeConfig::default().depth(1));
    let puct = Puct::default();
    let search = Search::new(&tree, &Nim, &Uniform, &puct);
    search.prepare_root(&20).unwrap();
    search.run(&20, 200, 2);

    // Only the root and its children can ever be expanded.
    assert!(tree.states().iter().all(|pile| *pile >= 17));
    assert_reconciled(&tree);
}

#[test]
fn actions_are_truncated_to_the_branching_factor() {
    let tree = Tree::new(TreeConfig::default().branching_factor(2));
    let puct = Puct::default();
    let search = Search::new(&tree, &Nim, &Uniform, &puct);
    search.prepare_root(&10).unwrap();
    assert_eq!(tree.edges(&10).unwrap().len(), 2);

    let too_small: Tree<u8, u8> = Tree::new(TreeConfig::default().branching_factor(2));
    assert_eq!(
        too_small.expand(&10, &[1.0; 3], &[1, 2, 3]),
        Err(TreeError::CapacityExceeded {
            actions: 3,
            branching_factor: 2
        })
    );
}
