use super::Value;

/// Keys of a confusion-count mapping, in display order.
pub const CONFUSION_KEYS: [&str; 4] = ["tp", "fn", "fp", "tn"];

/// Declared semantic type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Int,
    Float,
    Bool,
    Text,
    /// a sequence of ints, e.g. labels
    IntList,
    /// a mapping of the four confusion counts
    Counts,
}

impl Kind {
    /// Value used for a root that declares this kind but no default.
    pub fn fallback(self) -> Value {
        match self {
            Self::Int => Value::Int(0),
            Self::Float => Value::Float(0.0),
            Self::Bool => Value::Bool(false),
            Self::Text => Value::Text(String::new()),
            Self::IntList => Value::List(vec![Value::Int(0); 4]),
            Self::Counts => CONFUSION_KEYS.iter().map(|k| (*k, 0)).collect(),
        }
    }

    /// True if `value` is well-typed for this kind.
    /// Float parameters accept ints as well.
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (Self::Int, Value::Int(_)) => true,
            (Self::Float, Value::Int(_) | Value::Float(_)) => true,
            (Self::Bool, Value::Bool(_)) => true,
            (Self::Text, Value::Text(_)) => true,
            (Self::IntList, Value::List(items)) => {
                items.iter().all(|v| matches!(v, Value::Int(_)))
            }
            (Self::Counts, Value::Map(map)) => map.values().all(|v| matches!(v, Value::Int(_))),
            _ => false,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Text => "text",
            Self::IntList => "int list",
            Self::Counts => "confusion counts",
        }
    }

    /// True for kinds that hold a single number.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }
}
