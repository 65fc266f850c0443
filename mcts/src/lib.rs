//! Shared Monte Carlo search tree for parallel AlphaZero-style self-play.
//!
//! Workers descend with [`Tree::simulate`], which applies virtual loss to the
//! edge taken, evaluate the leaf outside of any lock, [`Tree::expand`] it, and
//! walk back up with [`Tree::backpropagate`]. Each state has its own lock, so
//! workers on different parts of the tree never wait on each other.

pub mod config;
mod edge;
mod error;
mod exploration;
mod node;
mod path;
mod registry;
mod search;
mod tree;

pub use config::{SearchConfig, TreeConfig};
pub use edge::EdgeStats;
pub use error::{TreeError, TreeResult};
pub use exploration::{Puct, SelectionPolicy};
pub use node::NodeStats;
pub use path::{Backup, Path};
pub use search::{Environment, Evaluator, RandomRollout, Search, Uniform};
pub use tree::Tree;
