use crate::{
    config::{EXPLORATION_BASE, EXPLORATION_INIT},
    edge::EdgeStats,
};

/// Turns the statistics of a node into the next action to traverse.
pub trait SelectionPolicy<A> {
    fn select(&self, edges: &[(A, EdgeStats)], sum_n: u32) -> Option<A>;
}

/// PUCT as used by AlphaZero, with a visit-dependent exploration rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Puct {
    pub base: f32,
    pub init: f32,
}

impl Default for Puct {
    fn default() -> Self {
        Puct {
            base: EXPLORATION_BASE,
            init: EXPLORATION_INIT,
        }
    }
}

impl Puct {
    /// ```latex
    /// c_{puct}(s) = \log \frac{\sum_a N(s, a) + c_{puct\_base} + 1}{c_{puct\_base}} + c_{puct\_init}
    /// ```
    fn exploration_rate(&self, sum_of_action_visits: f32) -> f32 {
        ((1.0 + sum_of_action_visits + self.base) / self.base).ln() + self.init
    }

    /// Q(s_t, a) + U(s_t, a)
    pub fn upper_confidence_bound(&self, edge: &EdgeStats, sum_of_action_visits: f32) -> f32 {
        // U(s, a) = C(s) * P(s, a) * sqrt(N(s)) / (1 + N(s, a))
        edge.q
            + self.exploration_rate(sum_of_action_visits) * edge.p * sum_of_action_visits.sqrt()
                / (1.0 + edge.n as f32)
    }
}

impl<A: Clone> SelectionPolicy<A> for Puct {
    fn select(&self, edges: &[(A, EdgeStats)], sum_n: u32) -> Option<A> {
        let sum_n = sum_n as f32;
        edges
            .iter()
            .map(|(action, edge)| (self.upper_confidence_bound(edge, sum_n), action))
            .max_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, action)| action.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::{Puct, SelectionPolicy};
    use crate::edge::EdgeStats;

    fn stats(n: u32, w: f32, p: f32) -> EdgeStats {
        EdgeStats {
            n,
            w,
            q: if n == 0 { 0.0 } else { w / n as f32 },
            p,
        }
    }

    #[test]
    fn prior_decides_before_visits() {
        let edges = [('a', stats(0, 0.0, 0.2)), ('b', stats(0, 0.0, 0.8))];
        assert_eq!(Puct::default().select(&edges, 1), Some('b'));
    }

    #[test]
    fn virtual_loss_steers_away() {
        // 'a' carries one in-flight visit with virtual loss.
        let edges = [('a', stats(1, -1.0, 0.5)), ('b', stats(0, 0.0, 0.5))];
        assert_eq!(Puct::default().select(&edges, 1), Some('b'));
    }

    #[test]
    fn nan_does_not_panic() {
        let edges = [('a', stats(0, 0.0, f32::NAN)), ('b', stats(0, 0.0, 0.5))];
        assert!(Puct::default().select(&edges, 4).is_some());
    }

    #[test]
    fn empty_node_selects_nothing() {
        let edges: [(char, _); 0] = [];
        assert_eq!(Puct::default().select(&edges, 0), None);
    }
}
