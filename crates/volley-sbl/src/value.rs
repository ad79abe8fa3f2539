use std::fmt::{self, Display};

/// A rendered tag value. Generators produce integers or text; encoders
/// always turn the result into text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Text(String),
}

impl Value {
    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Int(_) => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Text(String::new())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Value::Int(42), "42")]
    #[case(Value::Int(-7), "-7")]
    #[case(Value::Text("hello".to_string()), "hello")]
    #[case(Value::Text(String::new()), "")]
    fn test_display(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(value.to_string(), expected);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(1), Value::Int(1));
        assert_eq!(Value::from("a"), Value::Text("a".to_string()));
        assert!(Value::from(1).is_int());
        assert_eq!(Value::from(1).as_int(), Some(1));
        assert_eq!(Value::from("a").as_int(), None);
        assert_eq!(Value::from("a").as_text(), Some("a"));
        assert_eq!(Value::from(1).as_text(), None);
    }
}
