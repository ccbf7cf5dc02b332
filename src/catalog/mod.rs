//! Built-in calculators.

use anyhow::Result;

use graph::{Config, Graph};

mod fees;
mod housing;
mod infection;
mod metrics;
mod pricing;
mod simple;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("No calculator named \"{0}\" (try --list)")]
    UnknownCalculator(String),
    #[error("Unknown tier \"{0}\" (expected light, regular or deep)")]
    UnknownTier(String),
    #[error("vax should be between 0 and 1, was {0}")]
    VaxOutOfRange(f64),
}

/// Names and one-line descriptions of every built-in calculator.
pub const ENTRIES: [(&str, &str); 6] = [
    ("simple", "b = 2^a, d = 10 - 5^c, result = b * d"),
    ("pricing", "partner clicks and user clicks, with profit"),
    ("infection", "infections and death toll given vaccination"),
    ("fees", "monthly consulting fees incl. VAT"),
    ("metrics", "binary classifier confusion counts and score"),
    ("housing", "net present cost of renting vs buying a home"),
];

/// One or more pages, each a graph with its own config.
#[derive(Debug)]
pub struct Calculator {
    pub name: &'static str,
    pub pages: Vec<Graph>,
    pub configs: Vec<Config>,
}

impl Calculator {
    /// Calculator whose configs are derived from the declared param kinds.
    fn with_default_configs(name: &'static str, pages: Vec<Graph>) -> Self {
        let configs = pages.iter().map(Config::default_for).collect();
        Self {
            name,
            pages,
            configs,
        }
    }
}

/// Build the calculator called `name`.
pub fn load(name: &str) -> Result<Calculator> {
    match name {
        "simple" => simple::calculator(),
        "pricing" => pricing::calculator(),
        "infection" => infection::calculator(),
        "fees" => fees::calculator(),
        "metrics" => metrics::calculator(),
        "housing" => housing::calculator(),
        _ => Err(Error::UnknownCalculator(name.to_owned()).into()),
    }
}
