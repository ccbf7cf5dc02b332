use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

use graph::{FunctionNode, Graph, Param, Value};

use crate::{Assignment, Error, Evaluator};

/// Turn a whole graph into a single function node named `name`.
/// Its params are the graph's roots, with their merged defaults and kinds.
/// It returns the graph's leaf value, or a map of leaf name to value
/// if the graph has more than one leaf.
pub fn collapse(graph: Arc<Graph>, name: impl Into<String>) -> Result<FunctionNode> {
    if graph.is_empty() {
        return Err(Error::EmptyGraph.into());
    }
    let name = name.into();
    log::debug!("Collapsing \"{}\" into {}", graph.title(), name);

    let params: Vec<Param> = graph
        .roots()
        .iter()
        .map(|id| {
            let sig = graph.signature(*id);
            Param {
                name: graph.name(*id).to_owned(),
                default: sig.default.clone(),
                kind: sig.kind,
            }
        })
        .collect();

    let node = FunctionNode::new(name, move |args| {
        let eval = Evaluator::new(&graph);
        let mut asg = Assignment::empty(&graph);
        for (param, value) in args.iter() {
            asg.set(graph.var_id(param)?, value.clone());
        }
        eval.full_reload(&mut asg)?;

        let leaf_value = |id| {
            asg.get(id).cloned().ok_or_else(|| Error::MissingInput {
                node: graph.title(),
                input: graph.name(id).to_owned(),
            })
        };
        match graph.leaves() {
            [leaf] => Ok(leaf_value(*leaf)?),
            leaves => {
                let mut out = BTreeMap::new();
                for leaf in leaves {
                    out.insert(graph.name(*leaf).to_owned(), leaf_value(*leaf)?);
                }
                Ok(Value::Map(out))
            }
        }
    });
    Ok(params.into_iter().fold(node, FunctionNode::param))
}

#[cfg(test)]
mod test {
    use super::*;
    use graph::Kind;

    fn fees() -> Result<Graph> {
        Graph::new([
            FunctionNode::new("subtotal", |args| Ok(Value::Float(args.num("rate")? * args.num("days")?)))
                .param(Param::float("rate", 100.0))
                .param(Param::float("days", 8.0)),
            FunctionNode::new("vat", |args| Ok(Value::Float(args.num("subtotal")? * args.num("vat_rate")?)))
                .param("subtotal")
                .param(Param::float("vat_rate", 0.5)),
            FunctionNode::new("total", |args| Ok(Value::Float(args.num("subtotal")? + args.num("vat")?)))
                .param("subtotal")
                .param("vat"),
        ])
    }

    #[test]
    fn test_collapse_single_leaf() -> Result<()> {
        let node = collapse(Arc::new(fees()?), "monthly_total")?;
        let params: Vec<&str> = node.params().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(vec!["rate", "days", "vat_rate"], params);
        assert_eq!(Some(Kind::Float), node.params()[0].kind);

        let page = Graph::new([node])?;
        assert_eq!(vec!["monthly_total"], page.leaf_names().collect::<Vec<_>>());
        let asg = Evaluator::new(&page).infer_defaults()?;
        assert_eq!(Some(&Value::Float(1200.0)), asg.get_by_name(&page, "monthly_total")?);
        Ok(())
    }

    #[test]
    fn test_collapse_several_leaves() -> Result<()> {
        let g = Graph::new([
            FunctionNode::new("sum", |args| Ok(Value::Float(args.num("x")? + args.num("y")?)))
                .param("x")
                .param("y"),
            FunctionNode::new("diff", |args| Ok(Value::Float(args.num("x")? - args.num("y")?)))
                .param("x")
                .param("y"),
        ])?;
        let page = Graph::new([collapse(Arc::new(g), "both")?])?;
        let eval = Evaluator::new(&page);
        let mut asg = eval.infer_defaults()?;
        eval.on_change(&mut asg, "x", Value::Float(5.0))?;
        let expected: Value = [("diff", 5.0), ("sum", 5.0)].into_iter().collect();
        assert_eq!(Some(&expected), asg.get_by_name(&page, "both")?);
        Ok(())
    }
}
