use std::{error::Error, fmt::Display};

pub type TreeResult<T> = Result<T, TreeError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TreeError {
    CapacityExceeded { actions: usize, branching_factor: usize },
    LengthMismatch { policy: usize, actions: usize },
    DuplicateAction,
    InvalidPrior,
    InvalidNoise,
    AlreadyExpanded,
    UnknownState,
    UnknownAction,
    InvariantViolation(&'static str),
}

impl Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use TreeError::*;
        match self {
            CapacityExceeded {
                actions,
                branching_factor,
            } => write!(
                f,
                "number of edges attached to the node exceeds the branching factor of the tree: {actions} > {branching_factor}"
            ),
            LengthMismatch { policy, actions } => write!(
                f,
                "policy and actions must have the same length (policy: {policy}, actions: {actions})"
            ),
            InvariantViolation(what) => write!(f, "tree invariant violated: {what}"),
            _ => write!(f, "{}", match self {
                DuplicateAction => "the same action was given twice for one state",
                InvalidPrior => "prior scores must be finite and non-negative",
                InvalidNoise => "dirichlet alpha must be finite and positive, and the noise ratio within [0, 1]",
                AlreadyExpanded => "state has already been expanded",
                UnknownState => "state has not been expanded",
                UnknownAction => "action is not an edge of this state",
                _ => unreachable!(),
            }),
        }
    }
}

impl Error for TreeError {}
