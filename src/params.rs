//! Parameter binding and query resolution.

use std::collections::HashMap;

use tracing::trace;

use crate::ast::{Literal, Query, QueryValue, Rewriter};
use crate::convert::ValueConverter;
use crate::error::{QueryError, QueryResult};
use crate::observer::ObserverParser;
use crate::value::Value;

/// Binding progress of a prepared query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// Nothing bound yet
    Created,
    /// Some declared parameters still unbound
    PartiallyBound,
    /// Every declared parameter bound; ready to execute
    FullyBound,
}

/// Declared parameters of a query and their current bindings.
///
/// Bindings persist until overwritten; executing does not clear them.
#[derive(Debug, Clone, Default)]
pub struct Params {
    declared: Vec<String>,
    bound: HashMap<String, Value>,
}

impl Params {
    pub fn of(query: &Query) -> Self {
        Params {
            declared: query.parameters(),
            bound: HashMap::new(),
        }
    }

    /// Parameter names in order of first appearance.
    pub fn declared(&self) -> &[String] {
        &self.declared
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.declared.iter().any(|d| d == name)
    }

    /// Binds or rebinds a declared parameter.
    pub fn bind(&mut self, name: &str, value: Value) -> QueryResult<()> {
        if !self.is_declared(name) {
            return Err(QueryError::IllegalArgument(format!(
                "The parameter @{} is not declared in the query; declared: {:?}",
                name, self.declared
            )));
        }
        trace!(name, value = %value, "bind parameter");
        self.bound.insert(name.to_string(), value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bound.get(name)
    }

    pub fn unbound(&self) -> Vec<&str> {
        self.declared
            .iter()
            .filter(|d| !self.bound.contains_key(*d))
            .map(String::as_str)
            .collect()
    }

    pub fn is_all_bound(&self) -> bool {
        self.unbound().is_empty()
    }

    pub fn state(&self) -> BindingState {
        if self.is_all_bound() {
            BindingState::FullyBound
        } else if self.bound.is_empty() {
            BindingState::Created
        } else {
            BindingState::PartiallyBound
        }
    }

    /// Substitutes bindings, applies conversions and maps names.
    pub fn resolve(
        &self,
        query: &Query,
        observer: &dyn ObserverParser,
        converter: &dyn ValueConverter,
    ) -> QueryResult<Query<Value>> {
        let unbound = self.unbound();
        if !unbound.is_empty() {
            return Err(QueryError::query(format!(
                "Check all the parameters before execute the query, params left: {:?}",
                unbound
            )));
        }

        let mut resolution = Resolution {
            params: self,
            observer,
            converter,
            entity: String::new(),
        };
        query.rewrite(&mut resolution)
    }
}

/// Decodes a literal into its runtime value.
pub fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::String(s) => Value::String(s.clone()),
        Literal::Integer(n) => Value::Integer(*n),
        Literal::Float(n) => Value::Float(*n),
        Literal::Boolean(b) => Value::Boolean(*b),
        Literal::Null => Value::Null,
        Literal::Json(json) => Value::String(json.clone()),
    }
}

struct Resolution<'a> {
    params: &'a Params,
    observer: &'a dyn ObserverParser,
    converter: &'a dyn ValueConverter,
    /// Logical name of the entity being rewritten
    entity: String,
}

impl Rewriter<QueryValue, Value> for Resolution<'_> {
    fn entity(&mut self, name: &str) -> String {
        self.entity = name.to_string();
        self.observer.entity(name)
    }

    fn field(&mut self, name: &str) -> String {
        self.observer.field(&self.entity, name)
    }

    fn value(&mut self, value: &QueryValue) -> QueryResult<Value> {
        match value {
            QueryValue::Literal(literal) => Ok(literal_value(literal)),
            QueryValue::Param(name) => self
                .params
                .get(name)
                .cloned()
                .ok_or_else(|| QueryError::query(format!("The parameter @{} is not bound", name))),
            QueryValue::Convert { value, type_name } => {
                self.converter.convert(literal_value(value), type_name)
            }
            QueryValue::Array(items) => items
                .iter()
                .map(|item| self.value(item))
                .collect::<QueryResult<Vec<_>>>()
                .map(Value::Array),
        }
    }
}
