//! Per-graph input configuration, and checks that it fits its graph.

use anyhow::Result;
use colored::Colorize;
use std::collections::BTreeMap;

use crate::{Errors, Graph, Kind, Value};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No config given for \"{0}\"")]
    Missing(String),
    #[error("Config declares no input kind for root \"{0}\"")]
    MissingInputKind(String),
    #[error("\"{0}\" is a slider, but config has no ranges")]
    MissingRanges(String),
    #[error("Slider \"{0}\" has no range")]
    MissingRange(String),
    #[error("Slider \"{node}\" has invalid range [{min}, {max}]")]
    InvalidRange { node: String, min: f64, max: f64 },
    #[error("Categorical input \"{0}\" has no categories")]
    EmptyCategories(String),
    #[error("Got {configs} configs for {graphs} graphs")]
    CountMismatch { graphs: usize, configs: usize },
}

/// How a presentation layer should offer a node for editing.
#[derive(Debug, Clone, PartialEq)]
pub enum InputKind {
    Numeric,
    /// numeric, constrained to a `Range`
    Slider,
    Boolean,
    Text,
    /// comma-separated numbers
    List,
    /// one of a fixed set of values
    Categorical(Vec<Value>),
    /// a mapping, edited field by field
    Structured,
}

impl InputKind {
    /// Input kind implied by a declared param kind.
    pub fn for_kind(kind: Option<Kind>) -> Self {
        match kind {
            Some(Kind::Int | Kind::Float) | None => Self::Numeric,
            Some(Kind::Bool) => Self::Boolean,
            Some(Kind::Text) => Self::Text,
            Some(Kind::IntList) => Self::List,
            Some(Kind::Counts) => Self::Structured,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// Input kinds per node name, and an optional table of slider ranges
/// keyed by node name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub inputs: BTreeMap<String, InputKind>,
    pub ranges: Option<BTreeMap<String, Range>>,
}

impl Config {
    pub fn input(mut self, name: impl Into<String>, kind: InputKind) -> Self {
        self.inputs.insert(name.into(), kind);
        self
    }

    pub fn numeric(self, name: impl Into<String>) -> Self {
        self.input(name, InputKind::Numeric)
    }

    /// Tag `name` as a slider and give it a range.
    pub fn slider(self, name: impl Into<String>, min: f64, max: f64) -> Self {
        let name = name.into();
        self.input(name.clone(), InputKind::Slider).range(name, min, max)
    }

    pub fn range(mut self, name: impl Into<String>, min: f64, max: f64) -> Self {
        self.ranges
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), Range { min, max });
        self
    }

    /// Derive a config from the kinds the graph's functions declare for its roots.
    pub fn default_for(graph: &Graph) -> Self {
        let inputs = graph
            .roots()
            .iter()
            .map(|id| (graph.name(*id).to_owned(), InputKind::for_kind(graph.kind(*id))))
            .collect();
        Self {
            inputs,
            ranges: None,
        }
    }

    pub fn input_kind(&self, name: &str) -> Option<&InputKind> {
        self.inputs.get(name)
    }

    pub fn range_of(&self, name: &str) -> Option<Range> {
        self.ranges.as_ref().and_then(|r| r.get(name)).copied()
    }

    fn check_slider(&self, name: &str) -> Result<(), Error> {
        let ranges = self
            .ranges
            .as_ref()
            .ok_or_else(|| Error::MissingRanges(name.to_owned()))?;
        let range = ranges
            .get(name)
            .ok_or_else(|| Error::MissingRange(name.to_owned()))?;
        if !range.is_valid() {
            return Err(Error::InvalidRange {
                node: name.to_owned(),
                min: range.min,
                max: range.max,
            });
        }
        Ok(())
    }
}

/// Check that `config` fits `graph`, failing on the first problem found:
/// a config must be present, tag every root, and give every slider a valid range.
pub fn validate(graph: &Graph, config: Option<&Config>) -> Result<()> {
    let config = config.ok_or_else(|| Error::Missing(graph.title()))?;

    for name in config.inputs.keys() {
        if graph.find(name).is_none() {
            log::warn!("Config names {}, which is not in the graph", name.cyan());
        }
    }

    for root in graph.root_names() {
        if config.input_kind(root).is_none() {
            return Err(Error::MissingInputKind(root.to_owned()).into());
        }
    }

    for root in graph.root_names() {
        if let Some(InputKind::Slider) = config.input_kind(root) {
            config.check_slider(root)?;
        }
    }

    // sliders may also be attached to derived nodes:
    for var in graph.order() {
        let name = graph.name(*var);
        if !graph.is_root(*var) && config.input_kind(name) == Some(&InputKind::Slider) {
            config.check_slider(name)?;
        }
    }

    for (name, kind) in &config.inputs {
        if let InputKind::Categorical(options) = kind {
            if options.is_empty() {
                return Err(Error::EmptyCategories(name.clone()).into());
            }
        }
    }

    log::debug!("Config for {} is valid", graph.title().cyan());
    Ok(())
}

/// Validate one config per graph, reporting every failing graph before failing.
pub fn validate_all(graphs: &[Graph], configs: &[Config]) -> Result<()> {
    if graphs.len() != configs.len() {
        return Err(Error::CountMismatch {
            graphs: graphs.len(),
            configs: configs.len(),
        }
        .into());
    }
    let mut errors = Errors::default();
    for (i, (graph, config)) in graphs.iter().zip(configs).enumerate() {
        if let Err(e) = validate(graph, Some(config)) {
            errors.add_context(e, format!("page {} ({})", i, graph.title()));
        }
    }
    errors.recap("validating configs")?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{FunctionNode, Param};

    fn pricing() -> Result<Graph> {
        Graph::new([
            FunctionNode::new("partners", |_| Ok(Value::Int(0)))
                .param(Param::new("max_partners").of_kind(Kind::Int))
                .param(Param::float("cost_per_click", 0.2)),
            FunctionNode::new("clicks", |_| Ok(Value::Int(0)))
                .param("partners")
                .param("clicks_per_partner"),
        ])
    }

    fn full_config() -> Config {
        Config::default()
            .slider("max_partners", 0.0, 2000.0)
            .slider("cost_per_click", 0.0, 1.0)
            .slider("clicks_per_partner", 0.0, 10.0)
    }

    fn config_err(e: &anyhow::Error) -> Option<&Error> {
        e.downcast_ref::<Error>()
    }

    #[test]
    fn test_complete_config_passes() -> Result<()> {
        let g = pricing()?;
        validate(&g, Some(&full_config()))?;
        validate(&g, Some(&Config::default_for(&g)))?;
        Ok(())
    }

    #[test]
    fn test_missing_config() -> Result<()> {
        let e = validate(&pricing()?, None).unwrap_err();
        assert!(matches!(config_err(&e), Some(Error::Missing(_))));
        Ok(())
    }

    #[test]
    fn test_missing_input_kind() -> Result<()> {
        let config = Config::default().numeric("max_partners").numeric("cost_per_click");
        let e = validate(&pricing()?, Some(&config)).unwrap_err();
        match config_err(&e) {
            Some(Error::MissingInputKind(root)) => assert_eq!("clicks_per_partner", root),
            other => panic!("expected missing input kind, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_slider_ranges() -> Result<()> {
        let g = pricing()?;

        let mut config = full_config();
        config.ranges = None;
        let e = validate(&g, Some(&config)).unwrap_err();
        assert!(matches!(config_err(&e), Some(Error::MissingRanges(_))));

        let mut config = full_config();
        if let Some(ranges) = config.ranges.as_mut() {
            ranges.remove("cost_per_click");
        }
        let e = validate(&g, Some(&config)).unwrap_err();
        assert!(matches!(config_err(&e), Some(Error::MissingRange(n)) if n == "cost_per_click"));

        let config = full_config().range("max_partners", 10.0, 1.0);
        let e = validate(&g, Some(&config)).unwrap_err();
        assert!(matches!(config_err(&e), Some(Error::InvalidRange { .. })));
        Ok(())
    }

    #[test]
    fn test_derived_slider_needs_range() -> Result<()> {
        let g = pricing()?;
        let config = full_config().input("partners", InputKind::Slider);
        let e = validate(&g, Some(&config)).unwrap_err();
        assert!(matches!(config_err(&e), Some(Error::MissingRange(n)) if n == "partners"));
        validate(&g, Some(&config.range("partners", 0.0, 1500.0)))?;
        Ok(())
    }

    #[test]
    fn test_empty_categories() -> Result<()> {
        let config = full_config().input("tier", InputKind::Categorical(vec![]));
        let e = validate(&pricing()?, Some(&config)).unwrap_err();
        assert!(matches!(config_err(&e), Some(Error::EmptyCategories(_))));
        Ok(())
    }

    #[test]
    fn test_default_for() -> Result<()> {
        let g = Graph::new([FunctionNode::new("score", |_| Ok(Value::Float(0.0)))
            .param(Param::new("counts").of_kind(Kind::Counts))
            .param(Param::bool("strict", false))
            .param("weight")])?;
        let config = Config::default_for(&g);
        assert_eq!(Some(&InputKind::Structured), config.input_kind("counts"));
        assert_eq!(Some(&InputKind::Boolean), config.input_kind("strict"));
        assert_eq!(Some(&InputKind::Numeric), config.input_kind("weight"));
        assert_eq!(None, config.input_kind("score"));
        Ok(())
    }

    #[test]
    fn test_validate_all() -> Result<()> {
        let graphs = vec![pricing()?, pricing()?];
        let e = validate_all(&graphs, &[full_config()]).unwrap_err();
        assert!(matches!(config_err(&e), Some(Error::CountMismatch { graphs: 2, configs: 1 })));

        let e = validate_all(&graphs, &[Config::default(), Config::default()]).unwrap_err();
        let agg = e.downcast_ref::<crate::AggregatedErrors>();
        assert_eq!(Some(2), agg.map(|a| a.1));

        validate_all(&graphs, &[full_config(), full_config()])?;
        Ok(())
    }
}
