/// type alias just to make type signatures look more consistent.
pub type Ident<'a> = &'a str;

/// A literal value as typed by a user.
#[derive(Debug, PartialEq)]
pub enum Literal<'a> {
    /// 42, -7
    Int(i64),
    /// 0.5, -1.5e3
    Float(f64),
    /// true, false
    Bool(bool),
    /// "quoted text" or a bare word
    Text(&'a str),
    /// [1, 2, 3] or (top-level only) 1,2,3
    List(Vec<Self>),
    /// {tp: 3, fn: 1}
    Map(Vec<(Ident<'a>, Self)>),
}

/// The right-hand side of an edit.
#[derive(Debug, PartialEq)]
pub enum Rhs<'a> {
    /// a single value
    Value(Literal<'a>),
    /// start..stop:num, a sequence of evenly spaced samples
    Sweep { start: f64, stop: f64, num: usize },
}

/// name=rhs
#[derive(Debug, PartialEq)]
pub struct Edit<'a> {
    pub name: Ident<'a>,
    pub rhs: Rhs<'a>,
}

// These methods are just to assist with writing more legible tests.
#[cfg(test)]
impl<'a> Literal<'a> {
    pub fn list(items: Vec<Self>) -> Self {
        Self::List(items)
    }
    pub fn ints(items: &[i64]) -> Self {
        Self::List(items.iter().copied().map(Self::Int).collect())
    }
}
