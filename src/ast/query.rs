use crate::ast::{Direction, QueryValue, Where};
use crate::error::QueryResult;

/// Renames fields and rewrites operands while an AST is rebuilt.
///
/// Implemented by the parameter binder to turn a parsed
/// `Query<QueryValue>` into a resolved `Query<Value>`.
pub trait Rewriter<V, W> {
    /// Maps an entity name to its native name.
    fn entity(&mut self, name: &str) -> String {
        name.to_string()
    }

    /// Maps a logical field path to its native path.
    fn field(&mut self, name: &str) -> String;

    fn value(&mut self, value: &V) -> QueryResult<W>;
}

/// One `order by` item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: Direction,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Sort {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Sort {
            field: field.into(),
            direction: Direction::Desc,
        }
    }
}

/// `field = value` in an update `set` list or an insert body.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateItem<V = QueryValue> {
    pub field: String,
    pub value: V,
}

/// `get "key", 12`
#[derive(Debug, Clone, PartialEq)]
pub struct GetQuery<V = QueryValue> {
    pub keys: Vec<V>,
}

/// `delete "key", 12`
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteQuery<V = QueryValue> {
    pub keys: Vec<V>,
}

/// `select name, age from Person where age > 10 order by name skip 2 limit 5`
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery<V = QueryValue> {
    pub entity: String,
    /// Projected fields; empty means all (`*`).
    pub fields: Vec<String>,
    pub condition: Option<Where<V>>,
    pub sorts: Vec<Sort>,
    pub limit: Option<u64>,
    pub skip: Option<u64>,
}

/// `update Person set age = 30 where name = "Ada"`
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateQuery<V = QueryValue> {
    pub entity: String,
    pub set: Vec<UpdateItem<V>>,
    pub condition: Option<Where<V>>,
}

/// `insert Person (name = "Ada", age = 36)`
#[derive(Debug, Clone, PartialEq)]
pub struct InsertQuery<V = QueryValue> {
    pub entity: String,
    pub items: Vec<UpdateItem<V>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Get,
    Delete,
    Select,
    Update,
    Insert,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Get => "get",
            QueryKind::Delete => "delete",
            QueryKind::Select => "select",
            QueryKind::Update => "update",
            QueryKind::Insert => "insert",
        }
    }
}

/// A parsed query. Exactly one operation per query.
#[derive(Debug, Clone, PartialEq)]
pub enum Query<V = QueryValue> {
    Get(GetQuery<V>),
    Delete(DeleteQuery<V>),
    Select(SelectQuery<V>),
    Update(UpdateQuery<V>),
    Insert(InsertQuery<V>),
}

impl<V> Query<V> {
    pub fn kind(&self) -> QueryKind {
        match self {
            Query::Get(_) => QueryKind::Get,
            Query::Delete(_) => QueryKind::Delete,
            Query::Select(_) => QueryKind::Select,
            Query::Update(_) => QueryKind::Update,
            Query::Insert(_) => QueryKind::Insert,
        }
    }

    /// Visits every operand in source order.
    pub fn for_each_value<F: FnMut(&V)>(&self, f: &mut F) {
        match self {
            Query::Get(GetQuery { keys }) | Query::Delete(DeleteQuery { keys }) => {
                keys.iter().for_each(&mut *f)
            }
            Query::Select(select) => {
                if let Some(w) = &select.condition {
                    w.condition.for_each_value(f);
                }
            }
            Query::Update(update) => {
                update.set.iter().for_each(|item| f(&item.value));
                if let Some(w) = &update.condition {
                    w.condition.for_each_value(f);
                }
            }
            Query::Insert(insert) => insert.items.iter().for_each(|item| f(&item.value)),
        }
    }

    pub fn rewrite<W, R>(&self, rewriter: &mut R) -> QueryResult<Query<W>>
    where
        R: Rewriter<V, W> + ?Sized,
    {
        Ok(match self {
            Query::Get(get) => Query::Get(GetQuery {
                keys: rewrite_values(&get.keys, rewriter)?,
            }),
            Query::Delete(delete) => Query::Delete(DeleteQuery {
                keys: rewrite_values(&delete.keys, rewriter)?,
            }),
            Query::Select(select) => {
                let entity = rewriter.entity(&select.entity);
                let fields = select.fields.iter().map(|f| rewriter.field(f)).collect();
                let condition = match &select.condition {
                    Some(w) => Some(w.rewrite(rewriter)?),
                    None => None,
                };
                let sorts = select
                    .sorts
                    .iter()
                    .map(|s| Sort {
                        field: rewriter.field(&s.field),
                        direction: s.direction,
                    })
                    .collect();
                Query::Select(SelectQuery {
                    entity,
                    fields,
                    condition,
                    sorts,
                    limit: select.limit,
                    skip: select.skip,
                })
            }
            Query::Update(update) => {
                let entity = rewriter.entity(&update.entity);
                let set = rewrite_items(&update.set, rewriter)?;
                let condition = match &update.condition {
                    Some(w) => Some(w.rewrite(rewriter)?),
                    None => None,
                };
                Query::Update(UpdateQuery {
                    entity,
                    set,
                    condition,
                })
            }
            Query::Insert(insert) => Query::Insert(InsertQuery {
                entity: rewriter.entity(&insert.entity),
                items: rewrite_items(&insert.items, rewriter)?,
            }),
        })
    }
}

impl Query<QueryValue> {
    /// Parameter names in order of first appearance.
    pub fn parameters(&self) -> Vec<String> {
        let mut names = vec![];
        self.for_each_value(&mut |v: &QueryValue| v.collect_params(&mut names));
        names
    }

    pub fn has_parameters(&self) -> bool {
        !self.parameters().is_empty()
    }
}

fn rewrite_values<V, W, R>(values: &[V], rewriter: &mut R) -> QueryResult<Vec<W>>
where
    R: Rewriter<V, W> + ?Sized,
{
    values.iter().map(|v| rewriter.value(v)).collect()
}

fn rewrite_items<V, W, R>(
    items: &[UpdateItem<V>],
    rewriter: &mut R,
) -> QueryResult<Vec<UpdateItem<W>>>
where
    R: Rewriter<V, W> + ?Sized,
{
    items
        .iter()
        .map(|item| {
            Ok(UpdateItem {
                field: rewriter.field(&item.field),
                value: rewriter.value(&item.value)?,
            })
        })
        .collect()
}
