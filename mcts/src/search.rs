use std::{
    hash::Hash,
    sync::atomic::{AtomicUsize, Ordering},
    thread,
};

use log::{debug, warn};
use rand::{seq::SliceRandom, thread_rng};

use crate::{
    error::{TreeError, TreeResult},
    exploration::SelectionPolicy,
    path::Backup,
    tree::Tree,
};

/// The game or environment being searched.
pub trait Environment {
    type State: Eq + Hash + Clone;
    type Action: Eq + Clone;

    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    fn step(&self, state: &Self::State, action: &Self::Action) -> Self::State;

    /// The final value for the player to move, or `None` while the game is ongoing.
    fn terminal_value(&self, state: &Self::State) -> Option<f32>;
}

/// Produces prior scores aligned with `actions` and a value
/// for the player to move in `state`.
pub trait Evaluator<E: Environment> {
    fn evaluate(&self, env: &E, state: &E::State, actions: &[E::Action]) -> (Vec<f32>, f32);
}

/// Flat priors and a neutral value.
#[derive(Clone, Copy, Debug, Default)]
pub struct Uniform;

impl<E: Environment> Evaluator<E> for Uniform {
    fn evaluate(&self, _env: &E, _state: &E::State, actions: &[E::Action]) -> (Vec<f32>, f32) {
        (vec![1.0; actions.len()], 0.0)
    }
}

/// Flat priors, value from one random playout.
#[derive(Clone, Copy, Debug)]
pub struct RandomRollout {
    pub max_plies: usize,
}

impl Default for RandomRollout {
    fn default() -> Self {
        RandomRollout { max_plies: 1_000 }
    }
}

impl<E: Environment> Evaluator<E> for RandomRollout {
    fn evaluate(&self, env: &E, state: &E::State, actions: &[E::Action]) -> (Vec<f32>, f32) {
        let mut rng = thread_rng();
        let mut state = state.clone();
        let mut value = 0.0;
        for ply in 0..self.max_plies {
            if let Some(terminal) = env.terminal_value(&state) {
                // Negate for every ply because we are switching the perspective.
                value = if ply % 2 == 0 { terminal } else { -terminal };
                break;
            }
            match env.legal_actions(&state).choose(&mut rng) {
                Some(action) => state = env.step(&state, action),
                None => break,
            }
        }
        (vec![1.0; actions.len()], value)
    }
}

/// Drives traversals against a shared tree.
pub struct Search<'t, E: Environment, V, P> {
    tree: &'t Tree<E::State, E::Action>,
    env: &'t E,
    evaluator: &'t V,
    policy: &'t P,
}

impl<'t, E, V, P> Search<'t, E, V, P>
where
    E: Environment,
    V: Evaluator<E>,
    P: SelectionPolicy<E::Action>,
{
    pub fn new(tree: &'t Tree<E::State, E::Action>, env: &'t E, evaluator: &'t V, policy: &'t P) -> Self {
        Search {
            tree,
            env,
            evaluator,
            policy,
        }
    }

    /// Make sure `root` is expanded so noise can be applied before searching.
    pub fn prepare_root(&self, root: &E::State) -> TreeResult<()> {
        if self.tree.contains(root) || self.env.terminal_value(root).is_some() {
            return Ok(());
        }
        self.expand(root).map(|_| ())
    }

    /// One traversal from `root` down to a leaf and back.
    /// Returns the leaf value from the perspective of the player to move at the leaf.
    pub fn rollout(&self, root: &E::State) -> TreeResult<f32> {
        let depth = self.tree.config().depth;
        let mut path = self.tree.path();
        let mut state = root.clone();

        let value = loop {
            if let Some(value) = self.env.terminal_value(&state) {
                break value;
            }
            let node = match self.tree.node(&state) {
                Some(node) if path.len() < depth => node,
                // The horizon has been reached - evaluate without growing the tree.
                Some(_) => break self.leaf_value(&state),
                None => break self.expand(&state)?,
            };
            let action = match self.policy.select(&node.edges, node.sum_n) {
                Some(action) => action,
                None => break self.leaf_value(&state),
            };
            path.simulate(state.clone(), action.clone())?;
            state = self.env.step(&state, &action);
        };

        path.backpropagate(value, Backup::ZeroSum)?;
        Ok(value)
    }

    fn leaf_value(&self, state: &E::State) -> f32 {
        self.evaluator.evaluate(self.env, state, &[]).1
    }

    fn expand(&self, state: &E::State) -> TreeResult<f32> {
        let mut actions = self.env.legal_actions(state);
        actions.truncate(self.tree.config().branching_factor);
        let (policy, value) = self.evaluator.evaluate(self.env, state, &actions);
        match self.tree.expand(state, &policy, &actions) {
            // Another worker got here first, its edges are just as good.
            Ok(()) | Err(TreeError::AlreadyExpanded) => Ok(value),
            Err(e) => Err(e),
        }
    }

    /// Run `rollouts` traversals from `root` spread over `workers` threads.
    /// Returns how many of them completed.
    pub fn run(&self, root: &E::State, rollouts: usize, workers: usize) -> usize
    where
        E: Sync,
        E::State: Send + Sync,
        E::Action: Send + Sync,
        V: Sync,
        P: Sync,
    {
        let started = AtomicUsize::new(0);
        let completed = AtomicUsize::new(0);
        thread::scope(|s| {
            for _ in 0..workers.max(1) {
                s.spawn(|| {
                    while started.fetch_add(1, Ordering::Relaxed) < rollouts {
                        match self.rollout(root) {
                            Ok(_) => {
                                completed.fetch_add(1, Ordering::Relaxed);
                            }
                            Err(e) => warn!("rollout failed: {e}"),
                        }
                    }
                });
            }
        });
        let completed = completed.into_inner();
        debug!("{completed}/{rollouts} rollouts completed");
        completed
    }
}
