use anyhow::Result;
use std::sync::Arc;

use eval::collapse;
use graph::{Config, FunctionNode, Graph, InputKind, Kind, Param, Value};

use super::{Calculator, Error};

// shared param defaults, so functions taking the same param agree on it.
const RETAINER: bool = true;
const AD_HOC_DAY_RATE: f64 = 2800.0;
const RETAINER_DAY_RATE: f64 = 2400.0;
const COMMITTED_DAYS: f64 = 8.0;
const RAMP_UP_DAYS: f64 = 0.0;
const FLEX_PREMIUM_PCT: f64 = 0.10;
const VAT_RATE: f64 = 0.081;

fn float_input(name: &str) -> Param {
    Param::new(name).of_kind(Kind::Float)
}

/// Every intermediate fee as its own node.
pub fn details() -> Result<Graph> {
    Graph::new([
        FunctionNode::new("effective_day_rate", |args| {
            let rate = if args.bool("retainer")? {
                args.num("retainer_day_rate")?
            } else {
                args.num("ad_hoc_day_rate")?
            };
            Ok(Value::Float(rate))
        })
        .param(Param::bool("retainer", RETAINER))
        .param(Param::float("ad_hoc_day_rate", AD_HOC_DAY_RATE))
        .param(Param::float("retainer_day_rate", RETAINER_DAY_RATE)),
        FunctionNode::new("base_fee_ex_vat", |args| {
            Ok(Value::Float(args.num("effective_day_rate")? * args.num("committed_days")?))
        })
        .param(float_input("effective_day_rate"))
        .param(Param::float("committed_days", COMMITTED_DAYS)),
        FunctionNode::new("flex_fee_ex_vat", |args| {
            Ok(Value::Float(
                args.num("effective_day_rate")?
                    * args.num("ramp_up_days")?
                    * args.num("flex_premium_pct")?,
            ))
        })
        .param(float_input("effective_day_rate"))
        .param(Param::float("ramp_up_days", RAMP_UP_DAYS))
        .param(Param::float("flex_premium_pct", FLEX_PREMIUM_PCT)),
        FunctionNode::new("subtotal_ex_vat", |args| {
            Ok(Value::Float(args.num("base_fee_ex_vat")? + args.num("flex_fee_ex_vat")?))
        })
        .param(float_input("base_fee_ex_vat"))
        .param(Param::float("flex_fee_ex_vat", 0.0)),
        FunctionNode::new("vat_amount", |args| {
            Ok(Value::Float(args.num("subtotal_ex_vat")? * args.num("vat_rate")?))
        })
        .param(float_input("subtotal_ex_vat"))
        .param(Param::float("vat_rate", VAT_RATE)),
        FunctionNode::new("total_incl_vat", |args| {
            Ok(Value::Float(args.num("subtotal_ex_vat")? + args.num("vat_amount")?))
        })
        .param(float_input("subtotal_ex_vat"))
        .param(float_input("vat_amount")),
    ])
}

fn committed_days(tier: &str) -> Result<f64> {
    match tier {
        "light" => Ok(4.0),
        "regular" => Ok(8.0),
        "deep" => Ok(12.0),
        _ => Err(Error::UnknownTier(tier.to_owned()).into()),
    }
}

pub fn calculator() -> Result<Calculator> {
    let details_graph = Arc::new(details()?);

    // the whole fee computation as one node:
    let summary = Graph::new([collapse(details_graph.clone(), "monthly_total")?])?;

    // committed days picked by tier, feeding the collapsed computation:
    let tiered = Graph::new([
        FunctionNode::new("committed_days", |args| {
            Ok(Value::Float(committed_days(args.text("tier")?)?))
        })
        .param(Param::new("tier").of_kind(Kind::Text).with_default("regular")),
        collapse(details_graph, "tiered_total")?,
    ])?;
    let tiers = ["light", "regular", "deep"].map(Value::from).to_vec();
    let tiered_config =
        Config::default_for(&tiered).input("tier", InputKind::Categorical(tiers));

    let details = details()?;
    Ok(Calculator {
        name: "fees",
        configs: vec![
            Config::default_for(&summary),
            tiered_config,
            Config::default_for(&details),
        ],
        pages: vec![summary, tiered, details],
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use eval::Evaluator;

    fn approx(v: Option<&Value>, expected: f64) -> bool {
        v.and_then(Value::as_f64)
            .is_some_and(|x| (x - expected).abs() < 1e-6)
    }

    #[test]
    fn test_details() -> Result<()> {
        let g = details()?;
        let eval = Evaluator::new(&g);
        let mut asg = eval.infer_defaults()?;
        assert!(approx(asg.get_by_name(&g, "total_incl_vat")?, 19200.0 * 1.081));

        eval.on_change(&mut asg, "retainer", Value::Bool(false))?;
        assert!(approx(asg.get_by_name(&g, "base_fee_ex_vat")?, 22400.0));
        Ok(())
    }

    #[test]
    fn test_pages_agree() -> Result<()> {
        let calc = calculator()?;
        let [summary, tiered, details] = &calc.pages[..] else {
            panic!("expected three pages");
        };
        assert_eq!(vec!["monthly_total"], summary.leaf_names().collect::<Vec<_>>());
        let total = |g: &Graph, name: &str| -> Result<Option<f64>> {
            let asg = Evaluator::new(g).infer_defaults()?;
            Ok(asg.get_by_name(g, name)?.and_then(Value::as_f64))
        };
        let expected = total(details, "total_incl_vat")?;
        assert_eq!(expected, total(summary, "monthly_total")?);
        assert_eq!(expected, total(tiered, "tiered_total")?);

        let eval = Evaluator::new(tiered);
        let mut asg = eval.infer_defaults()?;
        eval.on_change(&mut asg, "tier", Value::from("light"))?;
        assert!(approx(asg.get_by_name(tiered, "tiered_total")?, 9600.0 * 1.081));
        assert!(eval.on_change(&mut asg, "tier", Value::from("huge")).is_err());
        Ok(())
    }
}
