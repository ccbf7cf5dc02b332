use anyhow::{Context, Result};
use colored::Colorize;
use std::borrow::Cow;

use graph::{Args, Graph, Kind, Value, VarId};
use util::IdVec;

use crate::{Error, Sequences};

/// Evenly spaced samples from `start` to `stop`, inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sweep {
    pub start: f64,
    pub stop: f64,
    pub num: usize,
}

impl Default for Sweep {
    fn default() -> Self {
        Self {
            start: 10.0,
            stop: 90.0,
            num: 5,
        }
    }
}

impl Sweep {
    pub fn new(start: f64, stop: f64, num: usize) -> Self {
        Self { start, stop, num }
    }

    pub fn samples(&self) -> Vec<f64> {
        match self.num {
            0 => Vec::new(),
            1 => vec![self.start],
            n => {
                let step = (self.stop - self.start) / (n - 1) as f64;
                (0..n).map(|i| self.start + step * i as f64).collect()
            }
        }
    }

    /// Samples as values; ints are truncated toward zero when `kind` is `Int`.
    pub fn values(&self, kind: Option<Kind>) -> Vec<Value> {
        let samples = self.samples().into_iter();
        match kind {
            Some(Kind::Int) => samples.map(|x| Value::Int(x as i64)).collect(),
            _ => samples.map(Value::Float).collect(),
        }
    }
}

/// Evaluates a graph element-wise over sequences bound to its nodes.
pub struct VectorizedEvaluator<'a> {
    graph: &'a Graph,
}

impl<'a> VectorizedEvaluator<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        Self { graph }
    }

    /// Sequences with every numeric root bound to the default sweep and nothing else computed.
    /// Other roots repeat their initial value once per sample.
    pub fn default_sequences(&self) -> Sequences {
        let sweep = Sweep::default();
        let mut seqs = Sequences::empty(self.graph);
        for root in self.graph.roots() {
            let initial = self.graph.signature(*root).initial_value();
            let kind = self.graph.kind(*root);
            let numeric = match kind {
                Some(kind) => kind.is_numeric(),
                None => matches!(initial, Value::Int(_) | Value::Float(_)),
            };
            let values = if numeric {
                sweep.values(kind)
            } else {
                vec![initial; sweep.num]
            };
            seqs.set(*root, values);
        }
        seqs
    }

    /// Bind `name` to a sequence of values.
    pub fn bind(&self, seqs: &mut Sequences, name: &str, values: Vec<Value>) -> Result<VarId> {
        let var = self.graph.var_id(name)?;
        log::debug!("Binding {} to {} values", name.cyan(), values.len());
        seqs.set(var, values);
        Ok(var)
    }

    /// Bind `name` to samples of `sweep`, typed by the node's declared kind.
    pub fn bind_sweep(&self, seqs: &mut Sequences, name: &str, sweep: &Sweep) -> Result<VarId> {
        let var = self.graph.var_id(name)?;
        self.bind(seqs, name, sweep.values(self.graph.kind(var)))
    }

    /// Recompute the derived nodes downstream of `name`, plus any derived node
    /// that has no sequence yet.
    ///
    /// If a node fails, it and its successors are cleared and skipped. Every other
    /// affected node is still recomputed, then the first error is returned.
    pub fn on_change(&self, seqs: &mut Sequences, name: &str) -> Result<Vec<VarId>> {
        let var = self.graph.var_id(name)?;
        let unset = self
            .graph
            .ids()
            .filter(|v| !self.graph.is_root(*v) && seqs.get(*v).is_none());
        let affected = self
            .graph
            .topological_order(self.graph.successors(var).into_iter().chain(unset));
        self.run(seqs, &affected)?;
        Ok(affected)
    }

    /// Recompute every derived node.
    pub fn reload(&self, seqs: &mut Sequences) -> Result<Vec<VarId>> {
        let derived: Vec<VarId> = self
            .graph
            .order()
            .iter()
            .copied()
            .filter(|v| !self.graph.is_root(*v))
            .collect();
        self.run(seqs, &derived)?;
        Ok(derived)
    }

    fn run(&self, seqs: &mut Sequences, nodes: &[VarId]) -> Result<()> {
        if seqs.len() != self.graph.len() {
            return Err(Error::ForeignAssignment {
                expected: self.graph.len(),
                found: seqs.len(),
            }
            .into());
        }
        let mut blocked: IdVec<VarId, bool> = IdVec::fill(false, self.graph.len());
        let mut first_err = None;
        for node in nodes {
            if blocked[*node] {
                continue;
            }
            if let Err(e) = self.recompute(seqs, *node) {
                seqs.clear(*node);
                for succ in self.graph.successors(*node) {
                    seqs.clear(succ);
                    blocked[succ] = true;
                }
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn recompute(&self, seqs: &mut Sequences, var: VarId) -> Result<()> {
        let name = self.graph.name(var);
        let values = self.call(seqs, var)?;
        log::debug!("Recomputed {} ({} values)", name.cyan(), values.len());
        seqs.set(var, values);
        Ok(())
    }

    fn call(&self, seqs: &Sequences, var: VarId) -> Result<Vec<Value>> {
        let name = self.graph.name(var);
        let Some(func) = self.graph.producer(var) else {
            return Ok(seqs.get(var).cloned().unwrap_or_default());
        };

        let inputs = self.graph.inputs(var);
        let mut columns = Vec::with_capacity(inputs.len());
        for (input, param) in inputs.iter().zip(func.params()) {
            let column = seqs.get(*input).ok_or_else(|| Error::MissingInput {
                node: name.to_owned(),
                input: param.name.clone(),
            })?;
            columns.push(column);
        }

        let lengths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
        let len = match lengths.first() {
            // a function with no params still runs once.
            None => 1,
            Some(first) if lengths.iter().all(|l| l == first) => *first,
            Some(_) => {
                return Err(Error::LengthMismatch {
                    node: name.to_owned(),
                    lengths,
                }
                .into())
            }
        };

        let mut out = Vec::with_capacity(len);
        for i in 0..len {
            let mut values = Vec::with_capacity(columns.len());
            for (column, param) in columns.iter().zip(func.params()) {
                let value = &column[i];
                if let Some(kind) = param.kind {
                    if !kind.accepts(value) {
                        return Err(Error::IllTyped {
                            node: name.to_owned(),
                            input: param.name.clone(),
                            expected: kind.name(),
                            found: value.type_name(),
                        }
                        .into());
                    }
                }
                values.push(Cow::Borrowed(value));
            }
            let args = Args::new(func, values);
            let value = func
                .call(&args)
                .with_context(|| Error::Recomputation(format!("{name}[{i}]")))?;
            out.push(value);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use graph::{FunctionNode, Param};

    fn simple() -> Result<Graph> {
        Graph::new([
            FunctionNode::new("b", |args| Ok(Value::Float(2f64.powf(args.num("a")?))))
                .param("a"),
            FunctionNode::new("d", |args| Ok(Value::Float(10.0 - 5f64.powf(args.num("c")?))))
                .param("c"),
            FunctionNode::new("result", |args| Ok(Value::Float(args.num("b")? * args.num("d")?)))
                .param("b")
                .param("d"),
        ])
    }

    fn floats(xs: &[f64]) -> Vec<Value> {
        xs.iter().copied().map(Value::Float).collect()
    }

    #[test]
    fn test_sweep() {
        assert_eq!(vec![10.0, 30.0, 50.0, 70.0, 90.0], Sweep::default().samples());
        assert_eq!(vec![2.0], Sweep::new(2.0, 8.0, 1).samples());
        assert!(Sweep::new(2.0, 8.0, 0).samples().is_empty());
        assert_eq!(
            vec![Value::Int(0), Value::Int(0), Value::Int(1)],
            Sweep::new(0.0, 1.0, 3).values(Some(Kind::Int))
        );
    }

    #[test]
    fn test_element_wise() -> Result<()> {
        let g = simple()?;
        let eval = VectorizedEvaluator::new(&g);
        let mut seqs = Sequences::empty(&g);
        eval.bind(&mut seqs, "a", floats(&[1.0, 2.0, 3.0]))?;
        eval.bind(&mut seqs, "c", floats(&[1.0, 2.0, 3.0]))?;
        eval.on_change(&mut seqs, "result")?;
        let result = seqs.get_by_name(&g, "result")?.cloned();
        // b = [2, 4, 8], d = [5, -15, -115]
        assert_eq!(Some(floats(&[10.0, -60.0, -920.0])), result);
        Ok(())
    }

    #[test]
    fn test_length_mismatch() -> Result<()> {
        let g = simple()?;
        let eval = VectorizedEvaluator::new(&g);
        let mut seqs = Sequences::empty(&g);
        eval.bind(&mut seqs, "a", floats(&[1.0, 2.0, 3.0]))?;
        eval.bind(&mut seqs, "c", floats(&[1.0, 2.0]))?;
        let e = eval.on_change(&mut seqs, "result").unwrap_err();
        match e.downcast_ref::<Error>() {
            Some(Error::LengthMismatch { node, lengths }) => {
                assert_eq!("result", node);
                assert_eq!(&vec![3, 2], lengths);
            }
            other => panic!("expected length mismatch, got {other:?}"),
        }
        assert_eq!(None, seqs.get_by_name(&g, "result")?);
        assert_eq!(Some(&floats(&[5.0, -15.0])), seqs.get_by_name(&g, "d")?);
        Ok(())
    }

    #[test]
    fn test_mismatch_clears_successors() -> Result<()> {
        let g = simple()?;
        let eval = VectorizedEvaluator::new(&g);
        let mut seqs = eval.default_sequences();
        eval.reload(&mut seqs)?;
        assert!(seqs.is_complete());

        eval.bind(&mut seqs, "a", floats(&[0.0]))?;
        assert!(eval.on_change(&mut seqs, "a").is_err());
        assert_eq!(Some(&floats(&[1.0])), seqs.get_by_name(&g, "b")?);
        assert_eq!(None, seqs.get_by_name(&g, "result")?);
        Ok(())
    }

    #[test]
    fn test_int_sweep_follows_kind() -> Result<()> {
        let g = Graph::new([FunctionNode::new("half", |args| Ok(Value::Int(args.int("n")? / 2)))
            .param(Param::new("n").of_kind(Kind::Int))])?;
        let eval = VectorizedEvaluator::new(&g);
        let mut seqs = Sequences::empty(&g);
        eval.bind_sweep(&mut seqs, "n", &Sweep::new(0.0, 9.0, 4))?;
        eval.on_change(&mut seqs, "n")?;
        let half: Vec<Value> = [0, 1, 3, 4].into_iter().map(Value::Int).collect();
        assert_eq!(Some(&half), seqs.get_by_name(&g, "half")?);
        Ok(())
    }

    #[test]
    fn test_default_sequences_repeat_non_numeric() -> Result<()> {
        let g = Graph::new([FunctionNode::new("gated", |args| {
            let x = args.num("x")?;
            Ok(Value::Float(if args.bool("on")? { x } else { 0.0 }))
        })
        .param("x")
        .param(Param::bool("on", true))])?;
        let eval = VectorizedEvaluator::new(&g);
        let mut seqs = eval.default_sequences();
        assert_eq!(Some(&vec![Value::Bool(true); 5]), seqs.get_by_name(&g, "on")?);
        eval.reload(&mut seqs)?;
        assert_eq!(
            Some(&floats(&[10.0, 30.0, 50.0, 70.0, 90.0])),
            seqs.get_by_name(&g, "gated")?
        );
        Ok(())
    }

    #[test]
    fn test_failure_does_not_leave_siblings_stale() -> Result<()> {
        let g = Graph::new([
            FunctionNode::new("x", |args| Ok(Value::Float(args.num("a")? + args.num("c")?)))
                .param("a")
                .param("c"),
            FunctionNode::new("y", |args| Ok(Value::Float(args.num("a")? * 10.0))).param("a"),
        ])?;
        let eval = VectorizedEvaluator::new(&g);
        let mut seqs = eval.default_sequences();
        eval.reload(&mut seqs)?;

        eval.bind(&mut seqs, "a", floats(&[1.0, 2.0, 3.0]))?;
        let e = eval.on_change(&mut seqs, "a").unwrap_err();
        assert!(matches!(e.downcast_ref::<Error>(), Some(Error::LengthMismatch { .. })));
        assert_eq!(None, seqs.get_by_name(&g, "x")?);
        assert_eq!(Some(&floats(&[10.0, 20.0, 30.0])), seqs.get_by_name(&g, "y")?);
        Ok(())
    }
}
