mod assignment;
pub use assignment::{Assignment, Sequences};

mod evaluator;
pub use evaluator::{Evaluator, Update};

mod vectorized;
pub use vectorized::{Sweep, VectorizedEvaluator};

mod collapse;
pub use collapse::collapse;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to recompute \"{0}\"")]
    Recomputation(String),
    #[error("Cannot compute \"{node}\": input \"{input}\" has no value")]
    MissingInput { node: String, input: String },
    #[error("Cannot compute \"{node}\": input \"{input}\" should be {expected}, got {found}")]
    IllTyped {
        node: String,
        input: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("Cannot compute \"{node}\": input sequences have different lengths {lengths:?}")]
    LengthMismatch { node: String, lengths: Vec<usize> },
    #[error("Assignment has {found} nodes, but graph has {expected}")]
    ForeignAssignment { expected: usize, found: usize },
    #[error("Cannot collapse a graph with no nodes")]
    EmptyGraph,
}
