use anyhow::Result;

use graph::{Config, FunctionNode, Graph, InputKind, Kind, Param, Value};

use super::Calculator;
use crate::metrics::{classifier_score_node, confusion_count_node, prediction_node};

pub fn graph() -> Result<Graph> {
    let scores = vec![0.1, 0.3, 0.6, 0.2, 0.7, 0.8, 0.9];
    let truth = vec![0, 0, 0, 1, 1, 1, 1];
    let weights: Value = [("tp", 1), ("tn", 1), ("fp", -1), ("fn", -1)]
        .into_iter()
        .collect();
    Graph::new([
        FunctionNode::new("prediction", prediction_node)
            .param(Param::new("predict_proba").with_default(scores))
            .param(Param::float("threshold", 0.5)),
        FunctionNode::new("confusion_count", confusion_count_node)
            .param(Param::new("prediction").of_kind(Kind::IntList))
            .param(Param::new("truth").of_kind(Kind::IntList).with_default(truth))
            .param(Param::int("positive", 1)),
        FunctionNode::new("classifier_score", classifier_score_node)
            .param(Param::new("confusion_count").of_kind(Kind::Counts))
            .param(Param::new("confusion_value").of_kind(Kind::Counts).with_default(weights)),
    ])
}

pub fn calculator() -> Result<Calculator> {
    let config = Config::default()
        .input("predict_proba", InputKind::List)
        .slider("threshold", 0.0, 1.0)
        .input("truth", InputKind::List)
        .numeric("positive")
        .input("confusion_value", InputKind::Structured);
    Ok(Calculator {
        name: "metrics",
        pages: vec![graph()?],
        configs: vec![config],
    })
}
