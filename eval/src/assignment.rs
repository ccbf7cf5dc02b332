use anyhow::Result;

use graph::{Graph, Value, VarId};
use util::IdVec;

/// Current value of every node in one graph. Nodes without a value yet hold `None`.
/// One assignment belongs to one session; edits to it must be serialized by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment<T = Value> {
    values: IdVec<VarId, Option<T>>,
}

/// Assignment used in vectorized mode: every node holds a sequence.
pub type Sequences = Assignment<Vec<Value>>;

impl<T: Clone> Assignment<T> {
    /// An assignment for `graph` with no values set.
    pub fn empty(graph: &Graph) -> Self {
        Self {
            values: IdVec::fill(None, graph.len()),
        }
    }
}

impl<T> Assignment<T> {
    /// Number of nodes this assignment covers (set or not).
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True if every node has a value.
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(Option::is_some)
    }

    #[inline]
    pub fn get(&self, var: VarId) -> Option<&T> {
        self.values[var].as_ref()
    }

    /// Set the value of `var`, returning the previous one.
    #[inline]
    pub fn set(&mut self, var: VarId, value: T) -> Option<T> {
        self.values.replace(var, Some(value))
    }

    #[inline]
    pub fn clear(&mut self, var: VarId) -> Option<T> {
        self.values.replace(var, None)
    }

    /// Value of the node named `name`; fails if the graph has no such node.
    pub fn get_by_name(&self, graph: &Graph, name: &str) -> Result<Option<&T>> {
        Ok(self.get(graph.var_id(name)?))
    }

    /// Iterate through (node name, value) pairs in discovery order.
    pub fn named<'a>(&'a self, graph: &'a Graph) -> impl Iterator<Item = (&'a str, Option<&'a T>)> {
        self.values
            .iter_ids()
            .map(|(id, v)| (graph.name(id), v.as_ref()))
    }
}
