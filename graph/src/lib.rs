mod id;
pub use id::{FuncId, VarId};

mod value;
pub use value::{Kind, Value, CONFUSION_KEYS};

mod function;
pub use function::{Args, Callable, FunctionNode, Param};

mod graph;
pub use graph::{Graph, GraphBuilder, Signature};

pub mod config;
pub use config::{validate, validate_all, Config, InputKind, Range};

mod error;
pub use error::{AggregatedErrors, Errors};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Graph contains a cycle through: {}", .0.join(", "))]
    CyclicGraph(Vec<String>),
    #[error("Function \"{func}\" takes \"{param}\", which no function produces and is not a known root")]
    UnresolvedParameter { func: String, param: String },
    #[error("Function \"{0}\" is defined more than once")]
    DuplicateFunction(String),
    #[error("Function \"{func}\" declares param \"{param}\" more than once")]
    DuplicateParam { func: String, param: String },
    #[error("Node \"{node}\" is produced by both \"{first}\" and \"{second}\"")]
    DuplicateProducer {
        node: String,
        first: String,
        second: String,
    },
    #[error("Graph has {0} names; at most {} are supported", id::MAX_IDS)]
    TooManyNodes(usize),
    #[error("No node named \"{0}\" in graph")]
    UnknownNode(String),
    #[error("Function \"{func}\" has no argument \"{param}\"")]
    ArgNotFound { func: String, param: String },
    #[error("Argument \"{param}\" of \"{func}\" should be {expected}, got {found}")]
    ArgType {
        func: String,
        param: String,
        expected: &'static str,
        found: &'static str,
    },
}
