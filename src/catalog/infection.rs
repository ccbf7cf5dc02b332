use anyhow::Result;

use graph::{Config, FunctionNode, Graph, Kind, Param, Value};

use super::{Calculator, Error};

const DEFAULT_VAX: f64 = 0.5;

// share of the unvaccinated effect that remains given vaccination rate `vax`.
fn factor(vax: f64, vax_factor: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&vax) {
        return Err(Error::VaxOutOfRange(vax).into());
    }
    Ok(vax * vax_factor + (1.0 - vax))
}

pub fn graph() -> Result<Graph> {
    Graph::new([
        FunctionNode::new("r", |args| {
            Ok(Value::Float(args.num("exposed")? * args.num("infect_if_expose")?))
        })
        .param(Param::float("exposed", 6.0))
        .param(Param::float("infect_if_expose", 1.0 / 5.0)),
        FunctionNode::new("infected", |args| {
            let f = factor(args.num("vax")?, args.num("infection_vax_factor")?)?;
            Ok(Value::Float(args.num("r")? * f))
        })
        .param(Param::float("r", 1.2))
        .param(Param::float("vax", DEFAULT_VAX))
        .param(Param::float("infection_vax_factor", 0.15)),
        FunctionNode::new("die", |args| {
            let f = factor(args.num("vax")?, args.num("death_vax_factor")?)?;
            Ok(Value::Float(
                args.num("infected")? * args.num("die_if_infected")? * f,
            ))
        })
        .param(Param::new("infected").of_kind(Kind::Float))
        .param(Param::float("die_if_infected", 0.05))
        .param(Param::float("vax", DEFAULT_VAX))
        .param(Param::float("death_vax_factor", 0.05)),
        FunctionNode::new("death_toll", |args| {
            Ok(Value::Int((args.num("die")? * args.num("population")?) as i64))
        })
        .param(Param::new("die").of_kind(Kind::Float))
        .param(Param::int("population", 1_000_000)),
    ])
}

pub fn calculator() -> Result<Calculator> {
    let config = [
        "exposed",
        "infect_if_expose",
        "vax",
        "infection_vax_factor",
        "infected",
        "die_if_infected",
        "death_vax_factor",
        "population",
    ]
    .into_iter()
    .fold(Config::default(), Config::numeric);
    Ok(Calculator {
        name: "infection",
        pages: vec![graph()?],
        configs: vec![config],
    })
}
