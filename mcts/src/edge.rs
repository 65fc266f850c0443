use crate::error::{TreeError, TreeResult};

/// Statistics for one (state, action) pair.
///
/// Real visits and values are kept apart from the virtual loss of
/// traversals still in flight, so reconciling one never rounds the other.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Edge {
    visits: u32, // real part of N(s_t, a)
    value: f32,  // real part of W(s_t, a)
    virtual_visits: u32,
    virtual_loss: u32,
    q_value: f32, // Q(s_t, a)
    policy: f32,  // P(s_t, a)
}

/// Read-only copy of an edge handed out by the tree.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeStats {
    pub n: u32,
    pub w: f32,
    pub q: f32,
    pub p: f32,
}

impl Edge {
    pub fn new(policy: f32) -> Self {
        Edge {
            policy,
            ..Default::default()
        }
    }

    pub fn policy(&self) -> f32 {
        self.policy
    }

    pub fn set_policy(&mut self, policy: f32) {
        self.policy = policy;
    }

    /// N(s, a) including virtual visits.
    pub fn n(&self) -> u32 {
        self.visits.saturating_add(self.virtual_loss)
    }

    /// W(s, a) including virtual loss.
    pub fn w(&self) -> f32 {
        self.value - self.virtual_loss as f32
    }

    /// Start a traversal through this edge.
    pub fn add_virtual_loss(&mut self, virtual_loss: u32) -> TreeResult<()> {
        let virtual_visits = self.virtual_visits.checked_add(1);
        let loss = self.virtual_loss.checked_add(virtual_loss);
        match (virtual_visits, loss) {
            (Some(virtual_visits), Some(loss)) if self.visits.checked_add(loss).is_some() => {
                self.virtual_visits = virtual_visits;
                self.virtual_loss = loss;
                self.recompute();
                Ok(())
            }
            _ => Err(TreeError::InvariantViolation("edge visit count out of range")),
        }
    }

    /// Finish a traversal started by [`add_virtual_loss`](Edge::add_virtual_loss).
    /// Nothing is written if no traversal is in flight.
    pub fn backpropagate(&mut self, virtual_loss: u32, value: f32) -> TreeResult<()> {
        if self.virtual_visits == 0 {
            return Err(TreeError::InvariantViolation(
                "backpropagate without a matching simulate",
            ));
        }
        let loss = self
            .virtual_loss
            .checked_sub(virtual_loss)
            .ok_or(TreeError::InvariantViolation("virtual loss changed while in flight"))?;
        let visits = self
            .visits
            .checked_add(1)
            .ok_or(TreeError::InvariantViolation("edge visit count out of range"))?;
        self.virtual_visits -= 1;
        self.virtual_loss = loss;
        self.visits = visits;
        self.value += value;
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        // Q(s, a) = W(s, a) / N(s, a), zero for an unvisited edge
        let n = self.n();
        self.q_value = if n == 0 { 0.0 } else { self.w() / n as f32 };
    }

    pub fn stats(&self) -> EdgeStats {
        EdgeStats {
            n: self.n(),
            w: self.w(),
            q: self.q_value,
            p: self.policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Edge;
    use crate::TreeError;

    #[test]
    fn q_follows_value_over_visits() {
        let mut edge = Edge::new(0.5);
        edge.add_virtual_loss(2).unwrap();
        assert_eq!(edge.stats().q, -1.0);
        edge.backpropagate(2, 1.0).unwrap();
        let stats = edge.stats();
        assert_eq!((stats.n, stats.w, stats.q), (1, 1.0, 1.0));
    }

    #[test]
    fn zero_virtual_loss_means_zero_q() {
        let mut edge = Edge::new(1.0);
        edge.add_virtual_loss(0).unwrap();
        assert_eq!(edge.stats().q, 0.0);
        assert_eq!(edge.stats().n, 0);
    }

    #[test]
    fn fractional_values_are_kept_exactly() {
        let mut edge = Edge::new(1.0);
        edge.add_virtual_loss(1).unwrap();
        edge.backpropagate(1, 0.3).unwrap();
        assert_eq!(edge.stats().w, 0.3);

        edge.add_virtual_loss(1).unwrap();
        edge.backpropagate(1, 0.6).unwrap();
        assert_eq!(edge.stats().w, 0.3 + 0.6);
        assert_eq!(edge.stats().q, (0.3 + 0.6) / 2.0);
    }

    #[test]
    fn unmatched_backpropagate_is_rejected() {
        let mut edge = Edge::new(1.0);
        assert!(matches!(
            edge.backpropagate(1, 1.0),
            Err(TreeError::InvariantViolation(_))
        ));
        assert_eq!(edge, Edge::new(1.0));
    }
}
