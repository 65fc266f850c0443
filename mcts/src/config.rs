// tree
pub const DEPTH: usize = 64;
pub const BRANCHING_FACTOR: usize = 256;
pub const VIRTUAL_LOSS: u32 = 1;
pub const PRIOR_EPSILON: f32 = 1e-8;
pub const NEUTRAL_VALUE: f32 = 0.0;

// search
pub const EXPLORATION_BASE: f32 = 500.0;
pub const EXPLORATION_INIT: f32 = 4.0;
pub const ROLLOUTS_PER_MOVE: usize = 800;
pub const WORKERS: usize = 4;

// self-play
pub const TEMPERATURE_PLIES: usize = 10;
pub const DIRICHLET_NOISE: f32 = 0.3;
pub const NOISE_RATIO: f32 = 0.25;

/// Construction-time settings of a [`Tree`](crate::Tree).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeConfig {
    /// Search horizon. Advisory: the driving loop enforces it, not the tree.
    pub depth: usize,
    /// Hard cap on the number of edges of a node, enforced by `expand`.
    pub branching_factor: usize,
    /// Visits added and value removed per edge while a traversal is in flight.
    pub virtual_loss: u32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            depth: DEPTH,
            branching_factor: BRANCHING_FACTOR,
            virtual_loss: VIRTUAL_LOSS,
        }
    }
}

impl TreeConfig {
    pub fn new(depth: usize, branching_factor: usize, virtual_loss: u32) -> Self {
        TreeConfig {
            depth,
            branching_factor,
            virtual_loss,
        }
    }

    #[must_use]
    pub fn depth(self, depth: usize) -> Self {
        TreeConfig { depth, ..self }
    }

    #[must_use]
    pub fn branching_factor(self, branching_factor: usize) -> Self {
        TreeConfig {
            branching_factor,
            ..self
        }
    }

    #[must_use]
    pub fn virtual_loss(self, virtual_loss: u32) -> Self {
        TreeConfig { virtual_loss, ..self }
    }
}

/// Knobs of the reference driver and the self-play loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchConfig {
    pub rollouts: usize,
    pub workers: usize,
    pub exploration_base: f32,
    pub exploration_init: f32,
    pub dirichlet_alpha: f32,
    pub noise_ratio: f32,
    pub temperature_plies: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            rollouts: ROLLOUTS_PER_MOVE,
            workers: WORKERS,
            exploration_base: EXPLORATION_BASE,
            exploration_init: EXPLORATION_INIT,
            dirichlet_alpha: DIRICHLET_NOISE,
            noise_ratio: NOISE_RATIO,
            temperature_plies: TEMPERATURE_PLIES,
        }
    }
}
