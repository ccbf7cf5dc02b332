use anyhow::Result;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::{Error, Kind, Value};

/// The pure function wrapped by a `FunctionNode`.
pub type Callable = Arc<dyn Fn(&Args) -> Result<Value> + Send + Sync>;

/// A declared parameter of a function.
/// `default: None` means "no default", which is distinct from a zero default.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub default: Option<Value>,
    pub kind: Option<Kind>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            kind: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn of_kind(mut self, kind: Kind) -> Self {
        self.kind = Some(kind);
        self
    }

    // shorthands for the common cases:
    pub fn float(name: impl Into<String>, default: f64) -> Self {
        Self::new(name).of_kind(Kind::Float).with_default(default)
    }

    pub fn int(name: impl Into<String>, default: i64) -> Self {
        Self::new(name).of_kind(Kind::Int).with_default(default)
    }

    pub fn bool(name: impl Into<String>, default: bool) -> Self {
        Self::new(name).of_kind(Kind::Bool).with_default(default)
    }
}

impl From<&str> for Param {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Wraps one pure function, its parameter declarations,
/// and the name of the variable node it produces.
#[derive(Clone)]
pub struct FunctionNode {
    name: String,
    output: String,
    params: Vec<Param>,
    callable: Callable,
}

impl FunctionNode {
    /// Create a function node named `name` whose output variable is also `name`.
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Args) -> Result<Value> + Send + Sync + 'static,
    {
        Self::from_callable(name, Arc::new(f))
    }

    pub fn from_callable(name: impl Into<String>, callable: Callable) -> Self {
        let name = name.into();
        Self {
            output: name.clone(),
            name,
            params: Vec::with_capacity(4),
            callable,
        }
    }

    /// Produce a differently-named output variable.
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    /// Append a parameter.
    pub fn param(mut self, param: impl Into<Param>) -> Self {
        self.params.push(param.into());
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn output_name(&self) -> &str {
        &self.output
    }

    #[inline]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Invoke the wrapped function.
    pub fn call(&self, args: &Args) -> Result<Value> {
        (self.callable)(args)
    }
}

impl fmt::Debug for FunctionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionNode")
            .field("name", &self.name)
            .field("output", &self.output)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Argument values for one call, aligned with the function's params.
pub struct Args<'a> {
    func: &'a str,
    params: &'a [Param],
    values: Vec<Cow<'a, Value>>,
}

impl<'a> Args<'a> {
    /// `values` must be in the same order as `func`'s params.
    pub fn new(func: &'a FunctionNode, values: Vec<Cow<'a, Value>>) -> Self {
        debug_assert_eq!(func.params.len(), values.len());
        Self {
            func: &func.name,
            params: &func.params,
            values,
        }
    }

    /// Iterate through (param name, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.params
            .iter()
            .zip(&self.values)
            .map(|(p, v)| (p.name.as_str(), v.as_ref()))
    }

    pub fn get(&self, name: &str) -> Result<&Value> {
        self.iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
            .ok_or_else(|| {
                Error::ArgNotFound {
                    func: self.func.to_owned(),
                    param: name.to_owned(),
                }
                .into()
            })
    }

    fn wrong_type(&self, name: &str, expected: &'static str, found: &Value) -> anyhow::Error {
        Error::ArgType {
            func: self.func.to_owned(),
            param: name.to_owned(),
            expected,
            found: found.type_name(),
        }
        .into()
    }

    /// Numeric arg, ints widened to f64.
    pub fn num(&self, name: &str) -> Result<f64> {
        let v = self.get(name)?;
        v.as_f64().ok_or_else(|| self.wrong_type(name, "number", v))
    }

    pub fn int(&self, name: &str) -> Result<i64> {
        let v = self.get(name)?;
        v.as_i64().ok_or_else(|| self.wrong_type(name, "int", v))
    }

    pub fn bool(&self, name: &str) -> Result<bool> {
        let v = self.get(name)?;
        v.as_bool().ok_or_else(|| self.wrong_type(name, "bool", v))
    }

    pub fn text(&self, name: &str) -> Result<&str> {
        let v = self.get(name)?;
        v.as_str().ok_or_else(|| self.wrong_type(name, "text", v))
    }

    pub fn list(&self, name: &str) -> Result<&[Value]> {
        let v = self.get(name)?;
        v.as_list().ok_or_else(|| self.wrong_type(name, "list", v))
    }

    /// List arg whose items are all numbers.
    pub fn nums(&self, name: &str) -> Result<Vec<f64>> {
        self.list(name)?
            .iter()
            .map(|v| v.as_f64().ok_or_else(|| self.wrong_type(name, "list of numbers", v)))
            .collect()
    }

    /// List of ints; floats are rejected rather than truncated.
    pub fn ints(&self, name: &str) -> Result<Vec<i64>> {
        self.list(name)?
            .iter()
            .map(|v| v.as_i64().ok_or_else(|| self.wrong_type(name, "list of ints", v)))
            .collect()
    }

    pub fn map(&self, name: &str) -> Result<&BTreeMap<String, Value>> {
        let v = self.get(name)?;
        v.as_map().ok_or_else(|| self.wrong_type(name, "map", v))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn double() -> FunctionNode {
        FunctionNode::new("doubled", |args| Ok(Value::Float(args.num("x")? * 2.0)))
            .param(Param::float("x", 1.0))
    }

    #[test]
    fn test_call() -> Result<()> {
        let f = double();
        assert_eq!("doubled", f.name());
        assert_eq!("doubled", f.output_name());
        let x = Value::Int(4);
        let args = Args::new(&f, vec![Cow::Borrowed(&x)]);
        assert_eq!(Value::Float(8.0), f.call(&args)?);
        Ok(())
    }

    #[test]
    fn test_arg_errors() {
        let f = double().with_output("twice");
        assert_eq!("twice", f.output_name());
        let args = Args::new(&f, vec![Cow::Owned(Value::from("four"))]);
        let e = f.call(&args).unwrap_err();
        assert!(matches!(
            e.downcast_ref::<Error>(),
            Some(Error::ArgType { expected: "number", found: "text", .. })
        ));
        assert!(args.get("y").is_err());
    }

    #[test]
    fn test_ints_reject_floats() -> Result<()> {
        let f = FunctionNode::new("count", |args| Ok(Value::Int(args.ints("xs")?.len() as i64)))
            .param("xs");
        let ints = Value::from(vec![1, 0, 1]);
        assert_eq!(Value::Int(3), f.call(&Args::new(&f, vec![Cow::Borrowed(&ints)]))?);

        let floats = Value::from(vec![1.0, 0.5]);
        let e = f.call(&Args::new(&f, vec![Cow::Borrowed(&floats)])).unwrap_err();
        assert!(matches!(
            e.downcast_ref::<Error>(),
            Some(Error::ArgType { expected: "list of ints", found: "float", .. })
        ));
        Ok(())
    }
}
