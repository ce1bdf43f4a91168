use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, prelude::FromPrimitive};

/// A runtime value handed to, and returned by, storage managers.
///
/// Integers and floats stay distinct, as the query text decodes integer
/// literals to 64 bits and decimal literals to floats. `Decimal`, `Date` and
/// `DateTime` only come out of the converter.
///
/// # Examples
///
/// ```
/// use artemis_query::Value;
///
/// let key = Value::from("Diana");
/// let id = Value::from(12_i64);
/// assert_eq!(key, Value::String("Diana".to_string()));
/// assert_eq!(id.as_i64(), Some(12));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,

    Boolean(bool),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// Floating-point number
    Float(f64),

    /// Arbitrary precision number
    Decimal(Decimal),

    /// UTF-8 string; JSON literals are carried as strings too
    String(String),

    Date(NaiveDate),

    DateTime(NaiveDateTime),

    Array(Vec<Value>),

    /// Embedded document
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            Value::Decimal(d) => rust_decimal::prelude::ToPrimitive::to_f64(d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view used for cross-type comparison.
    fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Integer(n) => Some(Decimal::from(*n)),
            Value::Float(n) => Decimal::from_f64(*n),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Orders two values of compatible types.
    ///
    /// Integers, floats and decimals compare numerically with each other;
    /// other types only compare with themselves. Returns `None` otherwise.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::DateTime(b)) => a.and_time(Default::default()).partial_cmp(b),
            (Value::DateTime(a), Value::Date(b)) => a.partial_cmp(&b.and_time(Default::default())),
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (a, b) => match (a.as_decimal(), b.as_decimal()) {
                (Some(x), Some(y)) => Some(x.cmp(&y)),
                _ => None,
            },
        }
    }

    /// Equality that treats `1`, `1.0` and decimal `1` as the same number.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (Value::Object(_), Value::Object(_)) => self == other,
            _ => self.compare(other) == Some(Ordering::Equal),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Date(d) => write!(f, "{}", d),
            Value::DateTime(dt) => write!(f, "{}", dt),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Object(map) => {
                f.write_str("{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "\"{}\": {}", key, item)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n as i64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

/// A record of a named entity (column family, collection or bucket).
///
/// Nested documents are `Value::Object`s and are addressed with dotted
/// paths such as `address.city`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entity {
    pub name: String,
    pub fields: BTreeMap<String, Value>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Entity {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.set(path, value.into());
        self
    }

    /// Reads a dotted path, descending into embedded objects.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.fields.get(first)?;
        for segment in segments {
            match current {
                Value::Object(map) => current = map.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Writes a dotted path, creating intermediate objects as needed.
    pub fn set(&mut self, path: &str, value: Value) {
        let segments: Vec<&str> = path.split('.').collect();
        let (last, parents) = match segments.split_last() {
            Some(split) => split,
            None => return,
        };

        let mut map = &mut self.fields;
        for segment in parents {
            let slot = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(BTreeMap::new()));
            if !matches!(slot, Value::Object(_)) {
                *slot = Value::Object(BTreeMap::new());
            }
            map = match slot {
                Value::Object(inner) => inner,
                _ => return,
            };
        }
        map.insert(last.to_string(), value);
    }

    /// Keeps only the given paths. An empty list keeps everything.
    pub fn project(&self, paths: &[String]) -> Entity {
        if paths.is_empty() {
            return self.clone();
        }
        let mut projected = Entity::new(self.name.clone());
        for path in paths {
            if let Some(value) = self.get(path) {
                projected.set(path, value.clone());
            }
        }
        projected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_compare_across_types() {
        assert_eq!(Value::Integer(2).compare(&Value::Float(1.5)), Some(Ordering::Greater));
        assert!(Value::Integer(10).loose_eq(&Value::Float(10.0)));
        assert!(Value::Decimal(Decimal::new(105, 1)).loose_eq(&Value::Float(10.5)));
        assert_eq!(Value::String("a".into()).compare(&Value::Integer(1)), None);
    }

    #[test]
    fn test_entity_dotted_paths() {
        let entity = Entity::new("Person")
            .with("name", "Ada")
            .with("address.city", "London");

        assert_eq!(entity.get("address.city"), Some(&Value::from("London")));
        assert_eq!(entity.get("address.zip"), None);
        assert_eq!(entity.get("name.first"), None);

        let projected = entity.project(&["address.city".to_string()]);
        assert_eq!(projected.get("name"), None);
        assert_eq!(projected.get("address.city"), Some(&Value::from("London")));
    }
}
