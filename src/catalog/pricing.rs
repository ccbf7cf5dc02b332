use anyhow::Result;

use graph::{Config, FunctionNode, Graph, Kind, Param, Value};

use super::Calculator;

fn user_clicks() -> Result<Graph> {
    Graph::new([
        FunctionNode::new("user_clicks", |args| {
            Ok(Value::Float(
                args.num("a")? * args.num("b")?.powf(args.num("cost_per_click")?),
            ))
        })
        .param(Param::int("a", 100))
        .param(Param::int("b", 3))
        .param(Param::float("cost_per_click", 0.1)),
        FunctionNode::new("rev", |args| {
            Ok(Value::Float(args.num("user_clicks")? * args.num("revenue_per_click")?))
        })
        .param(Param::new("user_clicks").of_kind(Kind::Float))
        .param(Param::int("revenue_per_click", 2)),
        FunctionNode::new("cost", |args| {
            Ok(Value::Float(args.num("cost_per_click")? * args.num("user_clicks")?))
        })
        .param(Param::new("user_clicks").of_kind(Kind::Float))
        .param(Param::float("cost_per_click", 0.1)),
        FunctionNode::new("profit", |args| Ok(Value::Float(args.num("rev")? - args.num("cost")?)))
            .param(Param::new("cost").of_kind(Kind::Float))
            .param(Param::new("rev").of_kind(Kind::Float)),
    ])
}

fn partners() -> Result<Graph> {
    Graph::new([
        FunctionNode::new("partners", |args| {
            let partners = args.num("max_partners")?
                - args.num("cost_per_click")? * args.num("price_elasticity")?;
            Ok(Value::Int(partners as i64))
        })
        .param(Param::new("max_partners").of_kind(Kind::Int))
        .param(Param::float("cost_per_click", 0.2))
        .param(Param::int("price_elasticity", 120)),
        FunctionNode::new("clicks", |args| {
            Ok(Value::Int(
                (args.num("partners")? * args.num("clicks_per_partner")?) as i64,
            ))
        })
        .param(Param::new("partners").of_kind(Kind::Int))
        .param(Param::new("clicks_per_partner").of_kind(Kind::Float)),
        FunctionNode::new("revenue", |args| {
            Ok(Value::Float(args.num("clicks")? * args.num("cost_per_click")?))
        })
        .param(Param::new("clicks").of_kind(Kind::Int))
        .param(Param::float("cost_per_click", 0.2)),
    ])
}

pub fn calculator() -> Result<Calculator> {
    let user_config = Config::default()
        .numeric("a")
        .numeric("b")
        .numeric("cost_per_click")
        .numeric("revenue_per_click");
    let partner_config = Config::default()
        .slider("max_partners", 0.0, 2000.0)
        .slider("cost_per_click", 0.0, 1.0)
        .slider("price_elasticity", 0.0, 200.0)
        .slider("partners", 0.0, 1500.0)
        .slider("clicks_per_partner", 0.0, 10.0);
    Ok(Calculator {
        name: "pricing",
        pages: vec![user_clicks()?, partners()?],
        configs: vec![user_config, partner_config],
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use eval::Evaluator;

    #[test]
    fn test_partner_defaults() -> Result<()> {
        let g = partners()?;
        let eval = Evaluator::new(&g);
        let mut asg = eval.infer_defaults()?;
        assert_eq!(Some(&Value::Int(-24)), asg.get_by_name(&g, "partners")?);

        eval.on_change(&mut asg, "max_partners", Value::Int(1000))?;
        eval.on_change(&mut asg, "clicks_per_partner", Value::Float(2.5))?;
        assert_eq!(Some(&Value::Int(976)), asg.get_by_name(&g, "partners")?);
        assert_eq!(Some(&Value::Int(2440)), asg.get_by_name(&g, "clicks")?);
        Ok(())
    }

    #[test]
    fn test_profit() -> Result<()> {
        let g = user_clicks()?;
        let asg = Evaluator::new(&g).infer_defaults()?;
        let clicks = 100.0 * 3f64.powf(0.1);
        let profit = asg.get_by_name(&g, "profit")?.and_then(Value::as_f64);
        assert!(profit.is_some_and(|p| (p - (clicks * 2.0 - clicks * 0.1)).abs() < 1e-9));
        Ok(())
    }
}
