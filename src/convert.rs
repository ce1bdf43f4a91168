//! Coercion of literals into typed values.
//!
//! `convert("2018-01-10", java.time.LocalDate)` in a query names its target
//! type with a (possibly qualified) type name. Only the last segment of the
//! name is significant, so `LocalDate` and `java.time.LocalDate` agree.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};

use crate::error::{QueryError, QueryResult};
use crate::value::Value;

/// Turns a value into the type named by `type_name`.
pub trait ValueConverter: Send + Sync {
    fn convert(&self, value: Value, type_name: &str) -> QueryResult<Value>;
}

/// Target types understood by [`DefaultConverter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetType {
    String,
    Boolean,
    Long,
    Integer,
    Short,
    Byte,
    Double,
    Decimal,
    Date,
    DateTime,
}

impl TargetType {
    /// Resolves a simple or qualified type name.
    pub fn from_type_name(type_name: &str) -> Option<TargetType> {
        let simple = type_name.rsplit('.').next().unwrap_or(type_name);
        let target = match simple {
            "String" | "CharSequence" => TargetType::String,
            "Boolean" | "boolean" => TargetType::Boolean,
            "Long" | "long" => TargetType::Long,
            "Integer" | "int" => TargetType::Integer,
            "Short" | "short" => TargetType::Short,
            "Byte" | "byte" => TargetType::Byte,
            "Double" | "double" | "Float" | "float" => TargetType::Double,
            "BigDecimal" | "BigInteger" | "Number" => TargetType::Decimal,
            "LocalDate" | "Date" => TargetType::Date,
            "LocalDateTime" => TargetType::DateTime,
            _ => return None,
        };
        Some(target)
    }

    /// Inclusive bounds of the integral types.
    fn integral_range(&self) -> Option<(i64, i64)> {
        match self {
            TargetType::Long => Some((i64::MIN, i64::MAX)),
            TargetType::Integer => Some((i32::MIN as i64, i32::MAX as i64)),
            TargetType::Short => Some((i16::MIN as i64, i16::MAX as i64)),
            TargetType::Byte => Some((i8::MIN as i64, i8::MAX as i64)),
            _ => None,
        }
    }
}

/// Converter for strings, booleans, numbers and ISO dates.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConverter;

impl DefaultConverter {
    pub fn new() -> Self {
        DefaultConverter
    }

    fn to_integral(value: &Value, target: TargetType, type_name: &str) -> QueryResult<Value> {
        let fail = || QueryError::conversion(value, type_name);
        let n = match value {
            Value::Integer(n) => *n,
            Value::Float(f) if f.fract() == 0.0 => f.to_i64().ok_or_else(fail)?,
            Value::Decimal(d) if d.fract().is_zero() => d.to_i64().ok_or_else(fail)?,
            Value::String(s) => s.trim().parse::<i64>().map_err(|_| fail())?,
            _ => return Err(fail()),
        };

        match target.integral_range() {
            Some((min, max)) if n >= min && n <= max => Ok(Value::Integer(n)),
            _ => Err(fail()),
        }
    }

    fn to_double(value: &Value, type_name: &str) -> QueryResult<Value> {
        match value {
            Value::Integer(n) => Ok(Value::Float(*n as f64)),
            Value::Float(f) => Ok(Value::Float(*f)),
            Value::Decimal(d) => d
                .to_f64()
                .map(Value::Float)
                .ok_or_else(|| QueryError::conversion(value, type_name)),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| QueryError::conversion(value, type_name)),
            _ => Err(QueryError::conversion(value, type_name)),
        }
    }

    fn to_decimal(value: &Value, type_name: &str) -> QueryResult<Value> {
        let decimal = match value {
            Value::Integer(n) => Some(Decimal::from(*n)),
            Value::Float(f) => Decimal::from_f64(*f),
            Value::Decimal(d) => Some(*d),
            Value::String(s) => Decimal::from_str(s.trim()).ok(),
            _ => None,
        };
        decimal
            .map(Value::Decimal)
            .ok_or_else(|| QueryError::conversion(value, type_name))
    }

    fn to_date(value: &Value, type_name: &str) -> QueryResult<Value> {
        match value {
            Value::Date(d) => Ok(Value::Date(*d)),
            Value::DateTime(dt) => Ok(Value::Date(dt.date())),
            Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| QueryError::conversion(value, type_name)),
            _ => Err(QueryError::conversion(value, type_name)),
        }
    }

    fn to_date_time(value: &Value, type_name: &str) -> QueryResult<Value> {
        match value {
            Value::DateTime(dt) => Ok(Value::DateTime(*dt)),
            Value::Date(d) => Ok(Value::DateTime(d.and_time(Default::default()))),
            Value::String(s) => NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%dT%H:%M"))
                .map(Value::DateTime)
                .map_err(|_| QueryError::conversion(value, type_name)),
            _ => Err(QueryError::conversion(value, type_name)),
        }
    }

    fn to_boolean(value: &Value, type_name: &str) -> QueryResult<Value> {
        match value {
            Value::Boolean(b) => Ok(Value::Boolean(*b)),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Value::Boolean(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Value::Boolean(false)),
            Value::Integer(n) => Ok(Value::Boolean(*n != 0)),
            _ => Err(QueryError::conversion(value, type_name)),
        }
    }
}

impl ValueConverter for DefaultConverter {
    fn convert(&self, value: Value, type_name: &str) -> QueryResult<Value> {
        let target = TargetType::from_type_name(type_name)
            .ok_or_else(|| QueryError::conversion(&value, type_name))?;

        match target {
            TargetType::String => Ok(match value {
                Value::String(s) => Value::String(s),
                other => Value::String(other.to_string()),
            }),
            TargetType::Boolean => Self::to_boolean(&value, type_name),
            TargetType::Long | TargetType::Integer | TargetType::Short | TargetType::Byte => {
                Self::to_integral(&value, target, type_name)
            }
            TargetType::Double => Self::to_double(&value, type_name),
            TargetType::Decimal => Self::to_decimal(&value, type_name),
            TargetType::Date => Self::to_date(&value, type_name),
            TargetType::DateTime => Self::to_date_time(&value, type_name),
        }
    }
}
