use crate::ast::{Operator, QueryValue, Rewriter};
use crate::error::QueryResult;

/// Boolean condition tree of a `where` clause.
///
/// Generic over the operand type: the parser produces
/// `Condition<QueryValue>`, resolution turns it into `Condition<Value>`.
/// Chains of the same connective are kept flat.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition<V = QueryValue> {
    /// Leaf comparison
    ///
    /// # Examples
    /// ```text
    /// age > 10
    /// name like "Ad%"
    /// id in (1, 2, 3)
    /// ```
    Compare {
        field: String,
        op: Operator,
        value: V,
    },

    /// Inclusive range
    ///
    /// # Example
    /// ```text
    /// age between 10 and 20
    /// ```
    Between { field: String, low: V, high: V },

    And(Vec<Condition<V>>),
    Or(Vec<Condition<V>>),
    Not(Box<Condition<V>>),
}

impl<V> Condition<V> {
    pub fn compare(field: impl Into<String>, op: Operator, value: V) -> Self {
        Condition::Compare {
            field: field.into(),
            op,
            value,
        }
    }

    /// Conjunction that absorbs nested `And` nodes on the left.
    pub fn and(self, other: Condition<V>) -> Self {
        match self {
            Condition::And(mut items) => {
                items.push(other);
                Condition::And(items)
            }
            left => Condition::And(vec![left, other]),
        }
    }

    /// Disjunction that absorbs nested `Or` nodes on the left.
    pub fn or(self, other: Condition<V>) -> Self {
        match self {
            Condition::Or(mut items) => {
                items.push(other);
                Condition::Or(items)
            }
            left => Condition::Or(vec![left, other]),
        }
    }

    pub fn negate(self) -> Self {
        Condition::Not(Box::new(self))
    }

    pub fn for_each_value<F: FnMut(&V)>(&self, f: &mut F) {
        match self {
            Condition::Compare { value, .. } => f(value),
            Condition::Between { low, high, .. } => {
                f(low);
                f(high);
            }
            Condition::And(items) | Condition::Or(items) => {
                for item in items {
                    item.for_each_value(f);
                }
            }
            Condition::Not(inner) => inner.for_each_value(f),
        }
    }

    /// Rebuilds the tree with renamed fields and rewritten operands.
    pub fn rewrite<W, R>(&self, rewriter: &mut R) -> QueryResult<Condition<W>>
    where
        R: Rewriter<V, W> + ?Sized,
    {
        Ok(match self {
            Condition::Compare { field, op, value } => Condition::Compare {
                field: rewriter.field(field),
                op: *op,
                value: rewriter.value(value)?,
            },
            Condition::Between { field, low, high } => Condition::Between {
                field: rewriter.field(field),
                low: rewriter.value(low)?,
                high: rewriter.value(high)?,
            },
            Condition::And(items) => Condition::And(
                items
                    .iter()
                    .map(|item| item.rewrite(rewriter))
                    .collect::<QueryResult<_>>()?,
            ),
            Condition::Or(items) => Condition::Or(
                items
                    .iter()
                    .map(|item| item.rewrite(rewriter))
                    .collect::<QueryResult<_>>()?,
            ),
            Condition::Not(inner) => Condition::Not(Box::new(inner.rewrite(rewriter)?)),
        })
    }
}

/// The `where` clause of a select or update.
#[derive(Debug, Clone, PartialEq)]
pub struct Where<V = QueryValue> {
    pub condition: Condition<V>,
}

impl<V> Where<V> {
    pub fn new(condition: Condition<V>) -> Self {
        Where { condition }
    }

    pub fn rewrite<W, R>(&self, rewriter: &mut R) -> QueryResult<Where<W>>
    where
        R: Rewriter<V, W> + ?Sized,
    {
        Ok(Where {
            condition: self.condition.rewrite(rewriter)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Literal;

    fn leaf(field: &str, n: i64) -> Condition {
        Condition::compare(field, Operator::Equals, QueryValue::Literal(Literal::Integer(n)))
    }

    #[test]
    fn test_and_chain_is_flat() {
        let cond = leaf("a", 1).and(leaf("b", 2)).and(leaf("c", 3));
        match cond {
            Condition::And(items) => assert_eq!(items.len(), 3),
            other => panic!("Expected And, got {:?}", other),
        }
    }

    #[test]
    fn test_or_does_not_absorb_and() {
        let cond = leaf("a", 1).and(leaf("b", 2)).or(leaf("c", 3));
        match cond {
            Condition::Or(items) => {
                assert_eq!(items.len(), 2);
                assert!(matches!(items[0], Condition::And(_)));
            }
            other => panic!("Expected Or, got {:?}", other),
        }
    }

    #[test]
    fn test_for_each_value_visits_between_bounds() {
        let cond = Condition::Between {
            field: "age".to_string(),
            low: QueryValue::Param("low".to_string()),
            high: QueryValue::Param("high".to_string()),
        }
        .negate();
        let mut names = vec![];
        cond.for_each_value(&mut |v: &QueryValue| v.collect_params(&mut names));
        assert_eq!(names, vec!["low".to_string(), "high".to_string()]);
    }
}
