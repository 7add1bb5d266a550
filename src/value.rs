//! Bound values and argument containers.

pub use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dynamic value type for placeholder bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// Infer a value from command-line text: integer, float, bool, else string.
    ///
    /// Zero-padded integers and non-finite floats (`nan`, `inf`) stay strings.
    pub fn parse_literal(text: &str) -> Self {
        let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
        let numeric = digits.starts_with(|c: char| c.is_ascii_digit());
        let zero_padded = digits.len() > 1
            && digits.starts_with('0')
            && digits[1..].starts_with(|c: char| c.is_ascii_digit());

        if numeric && !zero_padded {
            if let Ok(n) = text.parse::<i64>() {
                return Value::Int(n);
            }
            if let Ok(f) = text.parse::<f64>() {
                if f.is_finite() {
                    return Value::Float(f);
                }
            }
        }
        match text {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(text.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "'{}'", s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// How an argument container addresses its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgFamily {
    /// By position.
    Ordered,
    /// By key.
    Named,
}

impl fmt::Display for ArgFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgFamily::Ordered => f.write_str("ordered"),
            ArgFamily::Named => f.write_str("named"),
        }
    }
}

/// Arguments bound to a statement: a sequence or a key/value mapping.
///
/// Mapping keys keep insertion order for serialization; equality ignores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Args {
    Ordered(Vec<Value>),
    Named(IndexMap<String, Value>),
}

impl Args {
    /// An empty container of the given family.
    pub fn empty(family: ArgFamily) -> Self {
        match family {
            ArgFamily::Ordered => Args::Ordered(Vec::new()),
            ArgFamily::Named => Args::Named(IndexMap::new()),
        }
    }

    pub fn family(&self) -> ArgFamily {
        match self {
            Args::Ordered(_) => ArgFamily::Ordered,
            Args::Named(_) => ArgFamily::Named,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Args::Ordered(values) => values.len(),
            Args::Named(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Args {
    fn default() -> Self {
        Args::Ordered(Vec::new())
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Args::Ordered(values)
    }
}

impl From<IndexMap<String, Value>> for Args {
    fn from(map: IndexMap<String, Value>) -> Self {
        Args::Named(map)
    }
}

impl fmt::Display for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Args::Ordered(values) => {
                let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "({})", items.join(", "))
            }
            Args::Named(map) => {
                let items: Vec<String> = map.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
                write!(f, "{{{}}}", items.join(", "))
            }
        }
    }
}

/// Build ordered [`Args`] from anything convertible to [`Value`].
///
/// ```
/// use pstyle::{args, Args, Value};
///
/// let a = args![10, "hello"];
/// assert_eq!(a, Args::Ordered(vec![Value::Int(10), Value::from("hello")]));
/// ```
#[macro_export]
macro_rules! args {
    ($($value:expr),* $(,)?) => {
        $crate::value::Args::Ordered(vec![$($crate::value::Value::from($value)),*])
    };
}

/// Build named [`Args`] from `key => value` pairs.
///
/// ```
/// use pstyle::kwargs;
///
/// let a = kwargs! { "name" => 7 };
/// assert_eq!(a.len(), 1);
/// ```
#[macro_export]
macro_rules! kwargs {
    ($($key:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut map = $crate::value::IndexMap::new();
        $(map.insert(::std::string::String::from($key), $crate::value::Value::from($value));)*
        $crate::value::Args::Named(map)
    }};
}
