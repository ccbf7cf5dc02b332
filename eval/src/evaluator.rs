use anyhow::{Context, Result};
use colored::Colorize;
use std::borrow::Cow;

use graph::{Args, Graph, Value, VarId};
use util::Timer;

use crate::{Assignment, Error};

/// Result of one `on_change` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub changed: VarId,
    /// derived nodes recomputed, in the order they were computed
    pub recomputed: Vec<VarId>,
}

/// Computes default values and keeps an `Assignment` up to date with edits.
pub struct Evaluator<'a> {
    graph: &'a Graph,
}

impl<'a> Evaluator<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        Self { graph }
    }

    /// Build an assignment giving every node a value: roots get their declared default
    /// (or their kind's fallback, or 0.0), and each derived node is computed once,
    /// in topological order.
    pub fn infer_defaults(&self) -> Result<Assignment> {
        let timer = Timer::now();
        let mut asg = Assignment::empty(self.graph);
        for var in self.graph.order() {
            if self.graph.is_root(*var) {
                let value = self.graph.signature(*var).initial_value();
                log::trace!("Default for {}: {}", self.graph.name(*var).cyan(), value);
                asg.set(*var, value);
            } else {
                self.recompute(&mut asg, *var)?;
            }
        }
        timer.log_elapsed("Inferring defaults");
        Ok(asg)
    }

    /// Set `name` to `value` and recompute every node downstream of it.
    pub fn on_change(&self, asg: &mut Assignment, name: &str, value: Value) -> Result<Update> {
        let var = self.graph.var_id(name)?;
        self.on_change_id(asg, var, value)
    }

    /// Set `var` to `value` and recompute every node downstream of it, in topological order.
    /// Nodes not downstream of `var` are untouched.
    ///
    /// On failure, nodes recomputed before the failing one keep their new values;
    /// the failing node and everything after it keep their previous values.
    pub fn on_change_id(&self, asg: &mut Assignment, var: VarId, value: Value) -> Result<Update> {
        self.check(asg)?;
        log::info!("{} changed to {}", self.graph.name(var).cyan(), value);
        asg.set(var, value);

        let affected = self.graph.successors(var);
        for node in &affected {
            self.recompute(asg, *node)?;
        }
        Ok(Update {
            changed: var,
            recomputed: affected,
        })
    }

    /// Recompute every derived node from current root values, ignoring cached derived values.
    /// Returns the recomputed nodes in order.
    pub fn full_reload(&self, asg: &mut Assignment) -> Result<Vec<VarId>> {
        self.check(asg)?;
        log::info!("Reloading all derived nodes");
        let derived: Vec<VarId> = self
            .graph
            .order()
            .iter()
            .copied()
            .filter(|v| !self.graph.is_root(*v))
            .collect();
        for node in &derived {
            self.recompute(asg, *node)?;
        }
        Ok(derived)
    }

    fn check(&self, asg: &Assignment) -> Result<()> {
        if asg.len() != self.graph.len() {
            return Err(Error::ForeignAssignment {
                expected: self.graph.len(),
                found: asg.len(),
            }
            .into());
        }
        Ok(())
    }

    // the node's old value stays in place unless the call succeeds.
    fn recompute(&self, asg: &mut Assignment, var: VarId) -> Result<()> {
        let name = self.graph.name(var);
        let value = self
            .call(asg, var)
            .with_context(|| Error::Recomputation(name.to_owned()))?;
        log::debug!("Recomputed {} = {}", name.cyan(), value);
        asg.set(var, value);
        Ok(())
    }

    fn call(&self, asg: &Assignment, var: VarId) -> Result<Value> {
        let name = self.graph.name(var);
        let Some(func) = self.graph.producer(var) else {
            // roots are never recomputed; their value is their value.
            return asg.get(var).cloned().ok_or_else(|| {
                Error::MissingInput {
                    node: name.to_owned(),
                    input: name.to_owned(),
                }
                .into()
            });
        };

        let inputs = self.graph.inputs(var);
        let mut values = Vec::with_capacity(inputs.len());
        for (input, param) in inputs.iter().zip(func.params()) {
            let value = asg.get(*input).ok_or_else(|| Error::MissingInput {
                node: name.to_owned(),
                input: param.name.clone(),
            })?;
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
        log::trace!(
            "Calling {} with {:?}",
            func.name().cyan(),
            args.iter().collect::<Vec<_>>()
        );
        func.call(&args)
    }
}
