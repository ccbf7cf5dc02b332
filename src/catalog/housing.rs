use anyhow::Result;
use std::collections::BTreeMap;

use graph::{Args, FunctionNode, Graph, Param, Value};

use super::Calculator;

/// Inputs to the rent-or-buy simulation.
struct Scenario {
    years_to_evaluate: i64,
    home_price: f64,
    down_payment_percent: f64,
    mortgage_interest_rate: f64,
    property_tax_rate: f64,
    home_insurance_annual: f64,
    maintenance_percent: f64,
    closing_cost_percent: f64,
    selling_cost_percent: f64,
    annual_rent: f64,
    rent_increase_rate: f64,
    home_value_growth_rate: f64,
    investment_return_rate: f64,
    marginal_tax_rate: f64,
    loan_term_years: i64,
    inflation_rate: f64,
}

impl TryFrom<&Args<'_>> for Scenario {
    type Error = anyhow::Error;
    fn try_from(args: &Args) -> Result<Self> {
        Ok(Self {
            years_to_evaluate: args.int("years_to_evaluate")?,
            home_price: args.num("home_price")?,
            down_payment_percent: args.num("down_payment_percent")?,
            mortgage_interest_rate: args.num("mortgage_interest_rate")?,
            property_tax_rate: args.num("property_tax_rate")?,
            home_insurance_annual: args.num("home_insurance_annual")?,
            maintenance_percent: args.num("maintenance_percent")?,
            closing_cost_percent: args.num("closing_cost_percent")?,
            selling_cost_percent: args.num("selling_cost_percent")?,
            annual_rent: args.num("annual_rent")?,
            rent_increase_rate: args.num("rent_increase_rate")?,
            home_value_growth_rate: args.num("home_value_growth_rate")?,
            investment_return_rate: args.num("investment_return_rate")?,
            marginal_tax_rate: args.num("marginal_tax_rate")?,
            loan_term_years: args.int("loan_term_years")?,
            inflation_rate: args.num("inflation_rate")?,
        })
    }
}

impl Scenario {
    fn monthly_payment(&self, principal: f64) -> f64 {
        let monthly_rate = self.mortgage_interest_rate / 12.0;
        let num_payments = (self.loan_term_years * 12) as f64;
        if monthly_rate > 0.0 {
            principal * (monthly_rate / (1.0 - (1.0 + monthly_rate).powf(-num_payments)))
        } else {
            principal / num_payments
        }
    }

    /// Net present cost of buying and of renting, and the first year buying is cheaper.
    fn simulate(&self) -> BTreeMap<String, Value> {
        let principal = self.home_price * (1.0 - self.down_payment_percent);
        let closing_costs = self.home_price * self.closing_cost_percent;
        let monthly_rate = self.mortgage_interest_rate / 12.0;
        let payment = self.monthly_payment(principal);

        let mut loan_balance = principal;
        let mut rent_investment = self.home_price * self.down_payment_percent + closing_costs;
        let mut npv_buy = 0.0;
        let mut npv_rent = 0.0;
        let mut breakeven_year = None;

        for year in 1..=self.years_to_evaluate {
            let discount = (1.0 + self.inflation_rate).powi(year as i32);
            let property_tax = self.home_price * self.property_tax_rate;
            let maintenance = self.home_price * self.maintenance_percent;

            let mut interest_paid = 0.0;
            if year <= self.loan_term_years {
                for _ in 0..12 {
                    let interest = loan_balance * monthly_rate;
                    loan_balance -= payment - interest;
                    interest_paid += interest;
                }
            }
            let tax_deduction = (interest_paid + property_tax) * self.marginal_tax_rate;
            let mut buy_cost = payment * 12.0 + property_tax + maintenance
                + self.home_insurance_annual
                - tax_deduction;

            if year == self.years_to_evaluate {
                let home_value = self.home_price * (1.0 + self.home_value_growth_rate).powi(year as i32);
                buy_cost += home_value * self.selling_cost_percent;
                buy_cost -= home_value - loan_balance;
            }
            npv_buy += buy_cost / discount;

            let rent = self.annual_rent * (1.0 + self.rent_increase_rate).powi(year as i32 - 1);
            npv_rent += rent / discount;
            rent_investment *= 1.0 + self.investment_return_rate;

            if breakeven_year.is_none() && npv_buy < npv_rent {
                breakeven_year = Some(year);
            }
        }

        npv_buy += self.home_price * self.down_payment_percent + closing_costs;
        npv_rent -= rent_investment;

        let mut out = BTreeMap::new();
        out.insert("npv_buy_total".to_owned(), Value::Int(npv_buy as i64));
        out.insert("npv_rent_total".to_owned(), Value::Int(npv_rent as i64));
        out.insert(
            "breakeven_year".to_owned(),
            breakeven_year.map_or_else(|| Value::from("never"), Value::Int),
        );
        out
    }
}

fn rent_vs_buy(args: &Args) -> Result<Value> {
    let scenario = Scenario::try_from(args)?;
    Ok(Value::Map(scenario.simulate()))
}

pub fn graph() -> Result<Graph> {
    let node = FunctionNode::new("calculate_rent_vs_buy", rent_vs_buy)
        .with_output("rent_vs_buy")
        .param(Param::int("years_to_evaluate", 30))
        .param(Param::float("home_price", 500_000.0))
        .param(Param::float("down_payment_percent", 0.20))
        .param(Param::float("mortgage_interest_rate", 0.07))
        .param(Param::float("property_tax_rate", 0.01))
        .param(Param::float("home_insurance_annual", 1500.0))
        .param(Param::float("maintenance_percent", 0.01))
        .param(Param::float("closing_cost_percent", 0.02))
        .param(Param::float("selling_cost_percent", 0.06))
        .param(Param::float("annual_rent", 24_000.0))
        .param(Param::float("rent_increase_rate", 0.03))
        .param(Param::float("home_value_growth_rate", 0.04))
        .param(Param::float("investment_return_rate", 0.06))
        .param(Param::float("marginal_tax_rate", 0.25))
        .param(Param::int("loan_term_years", 30))
        .param(Param::float("inflation_rate", 0.025));
    Graph::new([node])
}

pub fn calculator() -> Result<Calculator> {
    Ok(Calculator::with_default_configs("housing", vec![graph()?]))
}
