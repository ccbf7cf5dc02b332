use anyhow::{Context, Result};
use std::fmt;

use eval::Sweep;
use graph::Value;
use syntax::ast;

use crate::args::Args;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("no calculator specified (use --calc NAME, or --list)")]
    NoCalculatorSpecified,
    #[error("sweep '{0}' is only allowed with --vectorize")]
    SweepWithoutVectorize(String),
}

/// New value for one node, from a `-s` flag.
#[derive(Debug, Clone, PartialEq)]
pub enum EditValue {
    Value(Value),
    Sweep(Sweep),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub name: String,
    pub value: EditValue,
}

impl From<ast::Edit<'_>> for Edit {
    fn from(edit: ast::Edit<'_>) -> Self {
        let value = match edit.rhs {
            ast::Rhs::Value(lit) => EditValue::Value(lit.into()),
            ast::Rhs::Sweep { start, stop, num } => EditValue::Sweep(Sweep::new(start, stop, num)),
        };
        Self {
            name: edit.name.to_owned(),
            value,
        }
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            EditValue::Value(v) => write!(f, "{}={}", self.name, v),
            EditValue::Sweep(s) => write!(f, "{}={}..{}:{}", self.name, s.start, s.stop, s.num),
        }
    }
}

/// Settings are like Args, except all the logic has
/// been applied so e.g. edits are parsed.
#[derive(Debug)]
pub struct Settings {
    pub calc: Option<String>,
    pub edits: Vec<Edit>,
    pub list: bool,
    pub reload: bool,
    pub vectorize: bool,
    pub verbose: u8,
}

impl TryFrom<Args> for Settings {
    type Error = anyhow::Error;
    fn try_from(args: Args) -> Result<Self, Self::Error> {
        if args.calc.is_none() && !args.list {
            return Err(Error::NoCalculatorSpecified.into());
        }

        let mut edits = Vec::with_capacity(args.set.len());
        for text in &args.set {
            let edit: Edit = syntax::parse_edit(text)
                .with_context(|| format!("while parsing edit '{text}'"))?
                .into();
            if !args.vectorize && matches!(edit.value, EditValue::Sweep(_)) {
                return Err(Error::SweepWithoutVectorize(text.clone()).into());
            }
            edits.push(edit);
        }

        Ok(Self {
            calc: args.calc,
            edits,
            list: args.list,
            reload: args.reload,
            vectorize: args.vectorize,
            verbose: args.verbose,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn args(set: &[&str], vectorize: bool) -> Args {
        Args {
            calc: Some("simple".to_owned()),
            set: set.iter().map(|s| s.to_string()).collect(),
            list: false,
            reload: false,
            vectorize,
            verbose: 0,
        }
    }

    #[test]
    fn test_edits() -> Result<()> {
        let settings = Settings::try_from(args(&["a=2", "c = 0.5", "xs=1,2"], false))?;
        assert_eq!(
            vec!["a=2", "c=0.5", "xs=[1, 2]"],
            settings.edits.iter().map(|e| e.to_string()).collect::<Vec<_>>()
        );
        Ok(())
    }

    #[test]
    fn test_sweeps() -> Result<()> {
        let settings = Settings::try_from(args(&["a=1..3:3"], true))?;
        assert_eq!(EditValue::Sweep(Sweep::new(1.0, 3.0, 3)), settings.edits[0].value);

        let e = Settings::try_from(args(&["a=1..3:3"], false)).unwrap_err();
        assert!(matches!(e.downcast_ref::<Error>(), Some(Error::SweepWithoutVectorize(_))));
        Ok(())
    }

    #[test]
    fn test_bad_input() {
        assert!(Settings::try_from(args(&["a=[1"], false)).is_err());
        let mut no_calc = args(&[], false);
        no_calc.calc = None;
        assert!(Settings::try_from(no_calc).is_err());
    }
}
