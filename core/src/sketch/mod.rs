pub mod types;
pub mod solver;

pub use solver::{ConstraintSolver, RelaxationSolver};
pub use types::*;
