use mcts::Environment;

/// Players alternate taking stones from one pile.
/// Whoever takes the last stone wins.
#[derive(Clone, Copy, Debug)]
pub struct Nim {
    pub max_take: u8,
}

impl Environment for Nim {
    type Action = u8;
    type State = u8;

    fn legal_actions(&self, pile: &u8) -> Vec<u8> {
        (1..=self.max_take).filter(|take| take <= pile).collect()
    }

    fn step(&self, pile: &u8, take: &u8) -> u8 {
        pile.saturating_sub(*take)
    }

    fn terminal_value(&self, pile: &u8) -> Option<f32> {
        // The opponent took the last stone.
        (*pile == 0).then_some(-1.0)
    }
}

impl Nim {
    /// The move that leaves a multiple of `max_take + 1`, if there is one.
    pub fn winning_take(&self, pile: u8) -> Option<u8> {
        let take = u16::from(pile) % (u16::from(self.max_take) + 1);
        (take != 0).then_some(take as u8)
    }
}

#[cfg(test)]
mod tests {
    use mcts::Environment;

    use super::Nim;

    #[test]
    fn cannot_take_more_than_the_pile() {
        let nim = Nim { max_take: 3 };
        assert_eq!(nim.legal_actions(&2), vec![1, 2]);
        assert_eq!(nim.legal_actions(&9), vec![1, 2, 3]);
        assert!(nim.legal_actions(&0).is_empty());
    }

    #[test]
    fn empty_pile_is_a_loss() {
        let nim = Nim { max_take: 3 };
        assert_eq!(nim.terminal_value(&0), Some(-1.0));
        assert_eq!(nim.terminal_value(&1), None);
    }

    #[test]
    fn winning_take() {
        let nim = Nim { max_take: 3 };
        assert_eq!(nim.winning_take(5), Some(1));
        assert_eq!(nim.winning_take(7), Some(3));
        assert_eq!(nim.winning_take(8), None);
    }
}
