use crate::{
    edge::{Edge, EdgeStats},
    error::{TreeError, TreeResult},
};

/// All edges leaving one state.
#[derive(Clone, Debug)]
pub struct Node<A> {
    visits: u32, // real part of N(s_t)
    virtual_loss: u32,
    edges: Box<[(A, Edge)]>,
}

/// Read-only copy of a node handed out by the tree.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStats<A> {
    pub sum_n: u32,
    pub edges: Vec<(A, EdgeStats)>,
}

impl<A> Default for Node<A> {
    fn default() -> Self {
        Node {
            visits: 0,
            virtual_loss: 0,
            edges: Box::new([]),
        }
    }
}

impl<A: Eq + Clone> Node<A> {
    pub fn new(edges: Box<[(A, Edge)]>) -> Self {
        Node {
            edges,
            ..Default::default()
        }
    }

    /// N(s_t) including virtual visits.
    pub fn sum_n(&self) -> u32 {
        self.visits.saturating_add(self.virtual_loss)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge(&self, action: &A) -> Option<&Edge> {
        self.edges.iter().find(|(a, _)| a == action).map(|(_, edge)| edge)
    }

    pub fn edges_mut(&mut self) -> impl Iterator<Item = &mut Edge> {
        self.edges.iter_mut().map(|(_, edge)| edge)
    }

    fn edge_mut(&mut self, action: &A) -> TreeResult<&mut Edge> {
        self.edges
            .iter_mut()
            .find(|(a, _)| a == action)
            .map(|(_, edge)| edge)
            .ok_or(TreeError::UnknownAction)
    }

    /// Apply virtual loss to one edge and to the node total.
    /// Nothing is written if either would leave the range of a visit count.
    pub fn simulate(&mut self, action: &A, virtual_loss: u32) -> TreeResult<()> {
        let loss = self
            .virtual_loss
            .checked_add(virtual_loss)
            .filter(|loss| self.visits.checked_add(*loss).is_some())
            .ok_or(TreeError::InvariantViolation("node visit count out of range"))?;
        self.edge_mut(action)?.add_virtual_loss(virtual_loss)?;
        self.virtual_loss = loss;
        Ok(())
    }

    /// Turn the virtual loss of one traversal through `action` into a real visit.
    /// The edge refuses if it has no traversal in flight, in which case nothing is written.
    pub fn backpropagate(&mut self, action: &A, virtual_loss: u32, value: f32) -> TreeResult<()> {
        let loss = self
            .virtual_loss
            .checked_sub(virtual_loss)
            .ok_or(TreeError::InvariantViolation("node virtual loss out of range"))?;
        let visits = self
            .visits
            .checked_add(1)
            .ok_or(TreeError::InvariantViolation("node visit count out of range"))?;
        self.edge_mut(action)?.backpropagate(virtual_loss, value)?;
        self.virtual_loss = loss;
        self.visits = visits;
        Ok(())
    }

    pub fn edge_stats(&self) -> Vec<(A, EdgeStats)> {
        self.edges
            .iter()
            .map(|(action, edge)| (action.clone(), edge.stats()))
            .collect()
    }

    pub fn stats(&self) -> NodeStats<A> {
        NodeStats {
            sum_n: self.sum_n(),
            edges: self.edge_stats(),
        }
    }
}
