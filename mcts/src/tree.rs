use std::{
    hash::Hash,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use log::{debug, error, warn};
use parking_lot::Mutex;
use rand::{seq::SliceRandom, Rng};
use rand_distr::{Dirichlet, Distribution, WeightedIndex};

use crate::{
    config::{TreeConfig, NEUTRAL_VALUE, PRIOR_EPSILON},
    edge::{Edge, EdgeStats},
    error::{TreeError, TreeResult},
    node::{Node, NodeStats},
    path::Path,
    registry::Registry,
};

/// Per-state slot: the node behind its own lock, plus a flag that
/// can be read without taking that lock.
struct Slot<A> {
    expanded: AtomicBool,
    node: Mutex<Node<A>>,
}

impl<A> Default for Slot<A> {
    fn default() -> Self {
        Slot {
            expanded: AtomicBool::new(false),
            node: Mutex::new(Node::default()),
        }
    }
}

impl<A> Slot<A> {
    fn is_expanded(&self) -> bool {
        self.expanded.load(Ordering::Acquire)
    }
}

/// Search tree shared by all workers of one search session.
///
/// Every operation locks at most one state at a time.
/// Statistics updates on different states never wait on each other.
pub struct Tree<S, A> {
    config: TreeConfig,
    nodes: Registry<S, Slot<A>>,
}

impl<S: Eq + Hash + Clone, A: Eq + Clone> Default for Tree<S, A> {
    fn default() -> Self {
        Tree::new(TreeConfig::default())
    }
}

impl<S: Eq + Hash + Clone, A: Eq + Clone> Tree<S, A> {
    pub fn new(config: TreeConfig) -> Self {
        Tree {
            config,
            nodes: Registry::default(),
        }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Add a node for `state` with one edge per action.
    /// Raw prior scores are normalized to sum to one.
    ///
    /// Nothing is created if the call is rejected.
    pub fn expand(&self, state: &S, policy: &[f32], actions: &[A]) -> TreeResult<()> {
        let edges = self.new_edges(policy, actions).map_err(|e| {
            warn!("rejected expand: {e}");
            e
        })?;

        let slot = self.nodes.get_or_insert_with(state, Slot::default);
        let mut node = slot.node.lock();
        if slot.is_expanded() {
            return Err(TreeError::AlreadyExpanded);
        }
        debug!("expanding state with {} edges", edges.len());
        *node = Node::new(edges);
        slot.expanded.store(true, Ordering::Release);
        Ok(())
    }

    fn new_edges(&self, policy: &[f32], actions: &[A]) -> TreeResult<Box<[(A, Edge)]>> {
        if policy.len() > self.config.branching_factor {
            return Err(TreeError::CapacityExceeded {
                actions: policy.len(),
                branching_factor: self.config.branching_factor,
            });
        }
        if policy.len() != actions.len() {
            return Err(TreeError::LengthMismatch {
                policy: policy.len(),
                actions: actions.len(),
            });
        }
        if policy.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(TreeError::InvalidPrior);
        }
        if actions
            .iter()
            .enumerate()
            .any(|(i, a)| actions[..i].contains(a))
        {
            return Err(TreeError::DuplicateAction);
        }

        let normalizing_factor = policy.iter().sum::<f32>() + PRIOR_EPSILON;
        Ok(actions
            .iter()
            .zip(policy)
            .map(|(action, p)| (action.clone(), Edge::new(p / normalizing_factor)))
            .collect())
    }

    fn expanded(&self, state: &S) -> TreeResult<Arc<Slot<A>>> {
        self.nodes
            .get(state)
            .filter(|slot| slot.is_expanded())
            .ok_or(TreeError::UnknownState)
    }

    /// Apply virtual loss to the edge about to be traversed.
    pub fn simulate(&self, state: &S, action: &A) -> TreeResult<()> {
        let virtual_loss = self.config.virtual_loss;
        let slot = self.expanded(state)?;
        let result = slot.node.lock().simulate(action, virtual_loss);
        result.map_err(report)
    }

    /// Replace the virtual loss of an earlier [`simulate`](Tree::simulate)
    /// with one real visit worth `value`.
    pub fn backpropagate(&self, state: &S, action: &A, value: f32) -> TreeResult<()> {
        let virtual_loss = self.config.virtual_loss;
        let slot = self.expanded(state)?;
        let result = slot.node.lock().backpropagate(action, virtual_loss, value);
        result.map_err(report)
    }

    /// Reconcile a traversal that will never be evaluated.
    /// Every pair gets a backpropagation with a neutral value, deepest first.
    ///
    /// All pairs are attempted; the first error is returned.
    pub fn abandon(&self, path: &[(S, A)]) -> TreeResult<()> {
        debug!("abandoning traversal of length {}", path.len());
        path.iter()
            .rev()
            .map(|(state, action)| self.backpropagate(state, action, NEUTRAL_VALUE))
            .fold(Ok(()), |acc, r| acc.and(r))
    }

    pub fn path(&self) -> Path<'_, S, A> {
        Path::new(self)
    }

    pub fn contains(&self, state: &S) -> bool {
        self.nodes.get(state).map_or(false, |slot| slot.is_expanded())
    }

    pub fn edges(&self, state: &S) -> Option<Vec<(A, EdgeStats)>> {
        let slot = self.expanded(state).ok()?;
        let edges = slot.node.lock().edge_stats();
        Some(edges)
    }

    pub fn edge(&self, state: &S, action: &A) -> Option<EdgeStats> {
        let slot = self.expanded(state).ok()?;
        let stats = slot.node.lock().edge(action).map(Edge::stats);
        stats
    }

    pub fn node(&self, state: &S) -> Option<NodeStats<A>> {
        let slot = self.expanded(state).ok()?;
        let stats = slot.node.lock().stats();
        Some(stats)
    }

    pub fn sum_n(&self, state: &S) -> Option<u32> {
        let slot = self.expanded(state).ok()?;
        let sum_n = slot.node.lock().sum_n();
        Some(sum_n)
    }

    /// Snapshot of all expanded states.
    pub fn states(&self) -> Vec<S> {
        self.nodes.keys_where(Slot::is_expanded)
    }

    pub fn len(&self) -> usize {
        self.nodes.count_where(Slot::is_expanded)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every node, e.g. between independent episodes.
    pub fn reset(&mut self) {
        self.nodes.clear();
    }

    /// Mix Dirichlet noise into the priors of one node.
    pub fn apply_dirichlet<R: Rng + ?Sized>(
        &self,
        state: &S,
        alpha: f32,
        ratio: f32,
        rng: &mut R,
    ) -> TreeResult<()> {
        if !(alpha.is_finite() && alpha > 0.0) || !(0.0..=1.0).contains(&ratio) {
            return Err(TreeError::InvalidNoise);
        }
        let slot = self.expanded(state)?;
        let mut node = slot.node.lock();
        if node.edge_count() < 2 {
            return Ok(());
        }
        let dirichlet = Dirichlet::new(&vec![alpha; node.edge_count()]).map_err(|_| TreeError::InvalidNoise)?;
        let samples: Vec<f32> = dirichlet.sample(rng);
        for (edge, noise) in node.edges_mut().zip(samples) {
            edge.set_policy(noise * ratio + edge.policy() * (1. - ratio));
        }
        Ok(())
    }

    /// Visit counts per action. After many rollouts these are a
    /// better policy estimate than the priors (not normalized).
    pub fn improved_policy(&self, state: &S) -> Option<Vec<(A, u32)>> {
        let edges = self.edges(state)?;
        Some(edges.into_iter().map(|(action, edge)| (action, edge.n)).collect())
    }

    /// Select an action to play from `state`.
    /// When exploitation is true, it will return the action with the most visits.
    /// Otherwise it samples an action weighted by the number of visits.
    pub fn pick_action<R: Rng + ?Sized>(&self, state: &S, exploitation: bool, rng: &mut R) -> Option<A> {
        let improved_policy = self.improved_policy(state)?;
        if exploitation {
            return improved_policy
                .into_iter()
                .max_by_key(|(_, visits)| *visits)
                .map(|(action, _)| action);
        }

        let (mut actions, weights): (Vec<_>, Vec<_>) = improved_policy.into_iter().unzip();
        match WeightedIndex::new(&weights) {
            Ok(distr) => Some(actions.swap_remove(distr.sample(rng))),
            // nothing has been visited yet
            Err(_) => actions.choose(rng).cloned(),
        }
    }
}

fn report(error: TreeError) -> TreeError {
    if let TreeError::InvariantViolation(what) = error {
        error!("{what}");
    }
    error
}
