use anyhow::Result;
use colored::Colorize;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use intern::{FindStr, GetStr, InternStr, PackedInterner, TypedInterner};
use util::{HashSet, IdVec};

use crate::id::MAX_IDS;
use crate::{Error, FuncId, FunctionNode, Kind, Param, Value, VarId};

const QUEUE_CAPACITY: usize = 16;

type Names<K> = TypedInterner<K, PackedInterner<usize>>;

/// Default and kind of a variable, merged from every function that takes it as a param.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Signature {
    pub default: Option<Value>,
    pub kind: Option<Kind>,
}

impl Signature {
    // first declared default and first declared kind win.
    fn merge(&mut self, param: &Param, func: &str) {
        match (&self.default, &param.default) {
            (None, Some(d)) => self.default = Some(d.clone()),
            (Some(old), Some(new)) if old != new => log::warn!(
                "{} declares default {} for {}, keeping earlier default {}",
                func.cyan(),
                new,
                param.name.cyan(),
                old,
            ),
            _ => (),
        }
        if self.kind.is_none() {
            self.kind = param.kind;
        }
    }

    /// Declared default, else the kind's fallback, else 0.0.
    pub fn initial_value(&self) -> Value {
        match (&self.default, self.kind) {
            (Some(d), _) => d.clone(),
            (None, Some(kind)) => kind.fallback(),
            (None, None) => Value::Float(0.0),
        }
    }
}

/// Collects functions, then checks and links them into a `Graph`.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    functions: Vec<FunctionNode>,
    closed_roots: Option<HashSet<String>>,
}

impl GraphBuilder {
    pub fn function(mut self, f: FunctionNode) -> Self {
        self.functions.push(f);
        self
    }

    pub fn functions(mut self, fs: impl IntoIterator<Item = FunctionNode>) -> Self {
        self.functions.extend(fs);
        self
    }

    /// Only allow these names as roots: any param that is neither produced by
    /// a function nor listed here fails the build with `UnresolvedParameter`.
    pub fn closed_roots<S: Into<String>>(mut self, roots: impl IntoIterator<Item = S>) -> Self {
        self.closed_roots = Some(roots.into_iter().map(Into::into).collect());
        self
    }

    pub fn build(self) -> Result<Graph> {
        let n = self.functions.len();
        // upper bound on distinct var names: every param plus every output.
        let names = n + self.functions.iter().map(|f| f.params().len()).sum::<usize>();
        if names > MAX_IDS {
            return Err(Error::TooManyNodes(names).into());
        }
        let mut vars: Names<VarId> =
            TypedInterner::new(PackedInterner::with_capacity_and_avg_len(n * 3, 12));
        let mut func_names: Names<FuncId> =
            TypedInterner::new(PackedInterner::with_capacity_and_avg_len(n, 12));
        let mut funcs: IdVec<FuncId, FunctionNode> = IdVec::with_capacity(n);
        let mut inputs: IdVec<FuncId, Vec<VarId>> = IdVec::with_capacity(n);
        let mut outputs: IdVec<FuncId, VarId> = IdVec::with_capacity(n);

        for f in self.functions {
            if func_names.find(f.name()).is_some() {
                return Err(Error::DuplicateFunction(f.name().to_owned()).into());
            }
            func_names.intern(f.name());

            // params are interned before the output, so discovery order follows data flow.
            let mut params = Vec::with_capacity(f.params().len());
            for param in f.params() {
                let id = vars.intern(&param.name);
                if params.contains(&id) {
                    return Err(Error::DuplicateParam {
                        func: f.name().to_owned(),
                        param: param.name.clone(),
                    }
                    .into());
                }
                params.push(id);
            }
            let out = vars.intern(f.output_name());
            if params.contains(&out) {
                return Err(Error::CyclicGraph(vec![f.output_name().to_owned()]).into());
            }
            inputs.push(params);
            outputs.push(out);
            funcs.push(f);
        }

        let num_vars = vars.len();
        let mut producers: IdVec<VarId, Option<FuncId>> = IdVec::fill(None, num_vars);
        for (func, out) in outputs.iter_ids() {
            if let Some(first) = producers.replace(*out, Some(func)) {
                return Err(Error::DuplicateProducer {
                    node: vars.get(*out).to_owned(),
                    first: funcs[first].name().to_owned(),
                    second: funcs[func].name().to_owned(),
                }
                .into());
            }
        }

        let mut consumers: IdVec<VarId, Vec<FuncId>> = IdVec::fill(Vec::new(), num_vars);
        let mut sigs: IdVec<VarId, Signature> = IdVec::fill(Signature::default(), num_vars);
        for (func, params) in inputs.iter_ids() {
            let f = &funcs[func];
            for (var, param) in params.iter().zip(f.params()) {
                consumers[*var].push(func);
                sigs[*var].merge(param, f.name());
            }
        }

        let roots: Vec<VarId> = producers
            .iter_ids()
            .filter(|(_, p)| p.is_none())
            .map(|(id, _)| id)
            .collect();

        if let Some(allowed) = &self.closed_roots {
            for root in &roots {
                let name = vars.get(*root);
                if !allowed.contains(name) {
                    let func = consumers[*root]
                        .first()
                        .map(|f| funcs[*f].name().to_owned())
                        .unwrap_or_default();
                    return Err(Error::UnresolvedParameter {
                        func,
                        param: name.to_owned(),
                    }
                    .into());
                }
            }
        }

        let leaves: Vec<VarId> = consumers
            .iter_ids()
            .filter(|(_, c)| c.is_empty())
            .map(|(id, _)| id)
            .collect();

        let mut graph = Graph {
            vars,
            funcs,
            inputs,
            outputs,
            producers,
            consumers,
            sigs,
            roots,
            leaves,
            order: Vec::with_capacity(num_vars),
            rank: IdVec::fill(0, num_vars),
        };
        graph.sort()?;

        log::debug!(
            "Built graph with {} nodes ({} roots, {} leaves)",
            graph.len(),
            graph.roots.len(),
            graph.leaves.len(),
        );
        Ok(graph)
    }
}

/// A DAG of variable nodes linked by the function nodes that produce them.
/// Each variable is either a root (supplied externally) or derived (produced by exactly one function).
#[derive(Debug)]
pub struct Graph {
    vars: Names<VarId>,
    funcs: IdVec<FuncId, FunctionNode>,
    /// param vars of each function, in declaration order
    inputs: IdVec<FuncId, Vec<VarId>>,
    outputs: IdVec<FuncId, VarId>,
    producers: IdVec<VarId, Option<FuncId>>,
    consumers: IdVec<VarId, Vec<FuncId>>,
    sigs: IdVec<VarId, Signature>,
    roots: Vec<VarId>,
    leaves: Vec<VarId>,
    /// cached topological order of all vars
    order: Vec<VarId>,
    /// position of each var in `order`
    rank: IdVec<VarId, usize>,
}

impl Graph {
    /// Build a graph from functions, allowing any unproduced param as a root.
    pub fn new(functions: impl IntoIterator<Item = FunctionNode>) -> Result<Self> {
        GraphBuilder::default().functions(functions).build()
    }

    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    // Kahn's algorithm; among ready nodes, the earliest-discovered goes first.
    fn sort(&mut self) -> Result<()> {
        let mut indegree: IdVec<VarId, usize> = self
            .producers
            .iter()
            .map(|p| p.map_or(0, |f| self.inputs[f].len()))
            .collect::<Vec<_>>()
            .into();

        let mut ready: BinaryHeap<Reverse<VarId>> = indegree
            .iter_ids()
            .filter(|(_, d)| **d == 0)
            .map(|(id, _)| Reverse(id))
            .collect();

        while let Some(Reverse(var)) = ready.pop() {
            self.order.push(var);
            for func in &self.consumers[var] {
                let out = self.outputs[*func];
                let d = &mut indegree[out];
                *d -= 1;
                if *d == 0 {
                    ready.push(Reverse(out));
                }
            }
        }

        if self.order.len() < self.len() {
            let stuck = indegree
                .iter_ids()
                .filter(|(_, d)| **d > 0)
                .map(|(id, _)| self.name(id).to_owned())
                .collect();
            return Err(Error::CyclicGraph(stuck).into());
        }

        for (i, var) in self.order.iter().enumerate() {
            self.rank[*var] = i;
        }
        Ok(())
    }

    // SECTION lookups ////////////////////

    /// Total number of variable nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Id of the variable with this name, if it exists.
    #[inline]
    pub fn find(&self, name: &str) -> Option<VarId> {
        self.vars.find(name)
    }

    /// Id of the variable with this name, or an `UnknownNode` error.
    pub fn var_id(&self, name: &str) -> Result<VarId> {
        self.find(name)
            .ok_or_else(|| Error::UnknownNode(name.to_owned()).into())
    }

    #[inline]
    pub fn name(&self, var: VarId) -> &str {
        self.vars.get(var)
    }

    /// All variable ids, in discovery order.
    pub fn ids(&self) -> impl Iterator<Item = VarId> {
        (0..self.len()).map(VarId::from)
    }

    /// Root ids, in discovery order.
    #[inline]
    pub fn roots(&self) -> &[VarId] {
        &self.roots
    }

    /// Leaf ids (no consumers), in discovery order.
    #[inline]
    pub fn leaves(&self) -> &[VarId] {
        &self.leaves
    }

    pub fn root_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.roots.iter().map(|id| self.name(*id))
    }

    pub fn leaf_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.leaves.iter().map(|id| self.name(*id))
    }

    #[inline]
    pub fn is_root(&self, var: VarId) -> bool {
        self.producers[var].is_none()
    }

    /// The function that produces `var`, if it is derived.
    pub fn producer(&self, var: VarId) -> Option<&FunctionNode> {
        self.producers[var].map(|f| &self.funcs[f])
    }

    /// Param vars of the function that produces `var`; empty for roots.
    pub fn inputs(&self, var: VarId) -> &[VarId] {
        match self.producers[var] {
            Some(f) => &self.inputs[f],
            None => &[],
        }
    }

    /// Merged default and kind of `var`.
    #[inline]
    pub fn signature(&self, var: VarId) -> &Signature {
        &self.sigs[var]
    }

    /// Kind declared for `var` by any function, if any.
    #[inline]
    pub fn kind(&self, var: VarId) -> Option<Kind> {
        self.sigs[var].kind
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionNode> {
        self.funcs.iter()
    }

    // SECTION ordering ////////////////////

    /// All vars in topological order.
    #[inline]
    pub fn order(&self) -> &[VarId] {
        &self.order
    }

    /// Vars reachable forward from `var`, excluding `var` itself,
    /// in topological order.
    pub fn successors(&self, var: VarId) -> Vec<VarId> {
        let mut seen: IdVec<VarId, bool> = IdVec::fill(false, self.len());
        let mut queue = VecDeque::with_capacity(QUEUE_CAPACITY);
        let mut found = Vec::with_capacity(QUEUE_CAPACITY);
        queue.push_back(var);
        while let Some(v) = queue.pop_front() {
            for func in &self.consumers[v] {
                let out = self.outputs[*func];
                if !seen[out] {
                    seen[out] = true;
                    found.push(out);
                    queue.push_back(out);
                }
            }
        }
        found.sort_by_key(|v| self.rank[*v]);
        found
    }

    /// Sort `subset` so that every var comes after all of its inputs.
    /// Ties keep discovery order. Duplicates are dropped.
    pub fn topological_order(&self, subset: impl IntoIterator<Item = VarId>) -> Vec<VarId> {
        let mut vars: Vec<VarId> = subset.into_iter().collect();
        vars.sort_by_key(|v| self.rank[*v]);
        vars.dedup();
        vars
    }

    /// Page title: first leaf, capitalized, plus "Calculator".
    pub fn title(&self) -> String {
        let Some(leaf) = self.leaf_names().next() else {
            return "Calculator".to_owned();
        };
        let mut chars = leaf.chars();
        let first: String = chars.next().map(|c| c.to_uppercase().collect()).unwrap_or_default();
        format!("{}{} Calculator", first, chars.as_str().to_lowercase())
    }
}
