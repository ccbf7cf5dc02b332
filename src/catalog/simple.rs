use anyhow::Result;

use graph::{FunctionNode, Graph, Value};

use super::Calculator;

pub fn graph() -> Result<Graph> {
    Graph::new([
        FunctionNode::new("b", |args| Ok(Value::Float(2f64.powf(args.num("a")?)))).param("a"),
        FunctionNode::new("d", |args| Ok(Value::Float(10.0 - 5f64.powf(args.num("c")?))))
            .param("c"),
        FunctionNode::new("result", |args| Ok(Value::Float(args.num("b")? * args.num("d")?)))
            .param("b")
            .param("d"),
    ])
}

pub fn calculator() -> Result<Calculator> {
    Ok(Calculator::with_default_configs("simple", vec![graph()?]))
}
