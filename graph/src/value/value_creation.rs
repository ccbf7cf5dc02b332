use syntax::ast::Literal;

use super::Value;

impl From<Literal<'_>> for Value {
    fn from(lit: Literal<'_>) -> Self {
        match lit {
            Literal::Int(i) => Self::Int(i),
            Literal::Float(f) => Self::Float(f),
            Literal::Bool(b) => Self::Bool(b),
            Literal::Text(s) => Self::Text(s.to_owned()),
            Literal::List(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Literal::Map(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.to_owned(), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod test {
    use super::Value;
    use anyhow::Result;

    #[test]
    fn test_from_parsed() -> Result<()> {
        let v = Value::from(syntax::parse_value("{tp: 3, fn: 1}")?);
        let expected: Value = [("tp", 3), ("fn", 1)].into_iter().collect();
        assert_eq!(expected, v);

        let v = Value::from(syntax::parse_value("0,0,1")?);
        assert_eq!(Value::from(vec![0, 0, 1]), v);
        Ok(())
    }
}
