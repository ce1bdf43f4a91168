//! A storage manager that keeps everything in memory.
//!
//! Holds one key-value bucket and any number of named entity collections.
//! Backs the command line tool and serves as a reference for manager
//! implementations.

use std::cmp::Ordering;
use std::collections::HashMap;

use parking_lot::RwLock;
use regex::Regex;
use tracing::trace;

use crate::ast::{Condition, Direction, InsertQuery, Operator, SelectQuery, Sort, UpdateQuery};
use crate::error::{QueryError, QueryResult};
use crate::manager::{Callback, StorageManager, StorageManagerAsync};
use crate::value::{Entity, Value};

#[derive(Debug, Default)]
pub struct InMemoryManager {
    bucket: RwLock<Vec<(Value, Entity)>>,
    collections: RwLock<HashMap<String, Vec<Entity>>>,
}

impl InMemoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an entity in the bucket, replacing any entity under `key`.
    pub fn put(&self, key: impl Into<Value>, entity: Entity) {
        let key = key.into();
        let mut bucket = self.bucket.write();
        match bucket.iter_mut().find(|(k, _)| k.loose_eq(&key)) {
            Some(slot) => slot.1 = entity,
            None => bucket.push((key, entity)),
        }
    }

    /// Appends an entity to the collection named after it.
    pub fn add(&self, entity: Entity) {
        self.collections
            .write()
            .entry(entity.name.clone())
            .or_default()
            .push(entity);
    }

    /// Snapshot of a collection.
    pub fn entities(&self, name: &str) -> Vec<Entity> {
        self.collections.read().get(name).cloned().unwrap_or_default()
    }

    pub fn bucket_len(&self) -> usize {
        self.bucket.read().len()
    }
}

/// Whether an entity satisfies a resolved condition.
pub fn matches(entity: &Entity, condition: &Condition<Value>) -> QueryResult<bool> {
    Ok(Filter::new(condition)?.matches(entity))
}

/// A resolved condition with its `like` patterns compiled once, ready to be
/// tested against every entity of a collection.
#[derive(Debug)]
pub struct Filter<'a> {
    condition: &'a Condition<Value>,
    patterns: HashMap<&'a str, Regex>,
}

impl<'a> Filter<'a> {
    pub fn new(condition: &'a Condition<Value>) -> QueryResult<Self> {
        let mut patterns = HashMap::new();
        collect_patterns(condition, &mut patterns)?;
        Ok(Filter {
            condition,
            patterns,
        })
    }

    pub fn matches(&self, entity: &Entity) -> bool {
        self.test(entity, self.condition)
    }

    /// Distinct `like` patterns compiled for this condition.
    pub fn patterns(&self) -> usize {
        self.patterns.len()
    }

    fn test(&self, entity: &Entity, condition: &Condition<Value>) -> bool {
        match condition {
            Condition::Compare { field, op, value } => {
                let actual = entity.get(field).unwrap_or(&Value::Null);
                self.compare(actual, *op, value)
            }
            Condition::Between { field, low, high } => {
                let actual = entity.get(field).unwrap_or(&Value::Null);
                let above = matches!(
                    actual.compare(low),
                    Some(Ordering::Greater | Ordering::Equal)
                );
                let below = matches!(actual.compare(high), Some(Ordering::Less | Ordering::Equal));
                above && below
            }
            Condition::And(items) => items.iter().all(|item| self.test(entity, item)),
            Condition::Or(items) => items.iter().any(|item| self.test(entity, item)),
            Condition::Not(inner) => !self.test(entity, inner),
        }
    }

    fn compare(&self, actual: &Value, op: Operator, expected: &Value) -> bool {
        let ordering = || actual.compare(expected);
        match op {
            Operator::Equals => actual.loose_eq(expected),
            Operator::Greater => ordering() == Some(Ordering::Greater),
            Operator::Lesser => ordering() == Some(Ordering::Less),
            Operator::GreaterEquals => {
                matches!(ordering(), Some(Ordering::Greater | Ordering::Equal))
            }
            Operator::LesserEquals => matches!(ordering(), Some(Ordering::Less | Ordering::Equal)),
            Operator::Like => match (actual, expected) {
                (Value::String(text), Value::String(pattern)) => self
                    .patterns
                    .get(pattern.as_str())
                    .is_some_and(|re| re.is_match(text)),
                _ => false,
            },
            Operator::In => match expected {
                Value::Array(items) => items.iter().any(|item| actual.loose_eq(item)),
                single => actual.loose_eq(single),
            },
        }
    }
}

fn collect_patterns<'a>(
    condition: &'a Condition<Value>,
    patterns: &mut HashMap<&'a str, Regex>,
) -> QueryResult<()> {
    match condition {
        Condition::Compare {
            op: Operator::Like,
            value: Value::String(pattern),
            ..
        } => {
            if !patterns.contains_key(pattern.as_str()) {
                patterns.insert(pattern.as_str(), like_regex(pattern)?);
            }
        }
        Condition::And(items) | Condition::Or(items) => {
            for item in items {
                collect_patterns(item, patterns)?;
            }
        }
        Condition::Not(inner) => collect_patterns(inner, patterns)?,
        Condition::Compare { .. } | Condition::Between { .. } => {}
    }
    Ok(())
}

/// `%` matches any run of chars, `_` exactly one; everything else is literal.
pub fn like_regex(pattern: &str) -> QueryResult<Regex> {
    let mut regex = String::from("^");
    let mut buf = [0u8; 4];
    for c in pattern.chars() {
        match c {
            '%' => regex.push_str(".*"),
            '_' => regex.push('.'),
            _ => regex.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
    }
    regex.push('$');
    Regex::new(&regex).map_err(|e| QueryError::query(format!("Invalid like pattern: {}", e)))
}

fn sort_entities(entities: &mut [Entity], sorts: &[Sort]) {
    if sorts.is_empty() {
        return;
    }
    entities.sort_by(|a, b| {
        for sort in sorts {
            let left = a.get(&sort.field).unwrap_or(&Value::Null);
            let right = b.get(&sort.field).unwrap_or(&Value::Null);
            let ordering = left.compare(right).unwrap_or(Ordering::Equal);
            let ordering = match sort.direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

impl StorageManager for InMemoryManager {
    fn get(&self, keys: &[Value]) -> QueryResult<Vec<Entity>> {
        trace!(keys = keys.len(), "bucket get");
        let bucket = self.bucket.read();
        Ok(keys
            .iter()
            .filter_map(|key| bucket.iter().find(|(k, _)| k.loose_eq(key)))
            .map(|(_, entity)| entity.clone())
            .collect())
    }

    fn delete(&self, keys: &[Value]) -> QueryResult<()> {
        trace!(keys = keys.len(), "bucket delete");
        self.bucket
            .write()
            .retain(|(k, _)| !keys.iter().any(|key| k.loose_eq(key)));
        Ok(())
    }

    fn select(&self, query: &SelectQuery<Value>) -> QueryResult<Vec<Entity>> {
        let collections = self.collections.read();
        let Some(entities) = collections.get(&query.entity) else {
            return Ok(vec![]);
        };

        let filter = query
            .condition
            .as_ref()
            .map(|w| Filter::new(&w.condition))
            .transpose()?;
        let mut found: Vec<Entity> = entities
            .iter()
            .filter(|entity| filter.as_ref().is_none_or(|f| f.matches(entity)))
            .cloned()
            .collect();
        trace!(entity = %query.entity, matched = found.len(), "select");

        sort_entities(&mut found, &query.sorts);
        let skip = query.skip.unwrap_or(0) as usize;
        let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(found
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|entity| entity.project(&query.fields))
            .collect())
    }

    fn update(&self, query: &UpdateQuery<Value>) -> QueryResult<Vec<Entity>> {
        let mut collections = self.collections.write();
        let Some(entities) = collections.get_mut(&query.entity) else {
            return Ok(vec![]);
        };

        let filter = query
            .condition
            .as_ref()
            .map(|w| Filter::new(&w.condition))
            .transpose()?;
        let mut updated = vec![];
        for entity in entities.iter_mut() {
            if filter.as_ref().is_none_or(|f| f.matches(entity)) {
                for item in &query.set {
                    entity.set(&item.field, item.value.clone());
                }
                updated.push(entity.clone());
            }
        }
        trace!(entity = %query.entity, updated = updated.len(), "update");
        Ok(updated)
    }

    fn insert(&self, query: &InsertQuery<Value>) -> QueryResult<Vec<Entity>> {
        let mut entity = Entity::new(query.entity.clone());
        for item in &query.items {
            entity.set(&item.field, item.value.clone());
        }
        trace!(entity = %query.entity, "insert");
        self.add(entity.clone());
        Ok(vec![entity])
    }
}

/// Runs each operation synchronously and invokes the callback inline.
impl StorageManagerAsync for InMemoryManager {
    fn get_async(&self, keys: &[Value], callback: Callback<Vec<Entity>>) -> QueryResult<()> {
        callback(self.get(keys)?);
        Ok(())
    }

    fn delete_async(&self, keys: &[Value], callback: Callback<()>) -> QueryResult<()> {
        self.delete(keys)?;
        callback(());
        Ok(())
    }

    fn select_async(
        &self,
        query: &SelectQuery<Value>,
        callback: Callback<Vec<Entity>>,
    ) -> QueryResult<()> {
        callback(self.select(query)?);
        Ok(())
    }

    fn update_async(
        &self,
        query: &UpdateQuery<Value>,
        callback: Callback<Vec<Entity>>,
    ) -> QueryResult<()> {
        callback(self.update(query)?);
        Ok(())
    }

    fn insert_async(
        &self,
        query: &InsertQuery<Value>,
        callback: Callback<Vec<Entity>>,
    ) -> QueryResult<()> {
        callback(self.insert(query)?);
        Ok(())
    }
}
