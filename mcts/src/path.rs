use std::{hash::Hash, mem::take};

use log::warn;

use crate::{error::TreeResult, tree::Tree};

/// How a leaf value is credited to the edges of a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backup {
    /// Every edge receives the same value.
    Shared,
    /// Two-player zero-sum: the value is from the perspective of the player
    /// to move at the leaf, so the deepest edge receives its negation and
    /// the sign alternates on the way up.
    ZeroSum,
}

/// The (state, action) pairs one worker has traversed so far.
///
/// Dropping a path that was never backpropagated abandons it,
/// so an early return does not leave virtual loss in the tree.
#[must_use = "dropping a path abandons the traversal"]
pub struct Path<'t, S: Eq + Hash + Clone, A: Eq + Clone> {
    tree: &'t Tree<S, A>,
    pairs: Vec<(S, A)>,
}

impl<'t, S: Eq + Hash + Clone, A: Eq + Clone> Path<'t, S, A> {
    pub(crate) fn new(tree: &'t Tree<S, A>) -> Self {
        Path {
            tree,
            pairs: Vec::new(),
        }
    }

    /// Apply virtual loss to `(state, action)` and remember it.
    pub fn simulate(&mut self, state: S, action: A) -> TreeResult<()> {
        self.tree.simulate(&state, &action)?;
        self.pairs.push((state, action));
        Ok(())
    }

    /// Reconcile every recorded pair with the real outcome, deepest first.
    pub fn backpropagate(mut self, value: f32, backup: Backup) -> TreeResult<()> {
        let pairs = take(&mut self.pairs);
        let mut value = match backup {
            Backup::Shared => value,
            Backup::ZeroSum => -value,
        };
        let mut result = Ok(());
        for (state, action) in pairs.iter().rev() {
            result = result.and(self.tree.backpropagate(state, action, value));
            if backup == Backup::ZeroSum {
                value = -value;
            }
        }
        result
    }

    /// Give up on the traversal, removing its virtual loss.
    pub fn abandon(mut self) -> TreeResult<()> {
        let pairs = take(&mut self.pairs);
        self.tree.abandon(&pairs)
    }

    pub fn pairs(&self) -> &[(S, A)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<S: Eq + Hash + Clone, A: Eq + Clone> Drop for Path<'_, S, A> {
    fn drop(&mut self) {
        if self.pairs.is_empty() {
            return;
        }
        if let Err(e) = self.tree.abandon(&self.pairs) {
            warn!("could not abandon unfinished path: {e}");
        }
    }
}
