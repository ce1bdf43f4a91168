use std::fmt;

/// Leaf comparison operators of a condition.
///
/// `between` has two operands and is modelled as its own condition node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Equal (`=`)
    Equals,
    /// Greater than (`>`)
    Greater,
    /// Less than (`<`)
    Lesser,
    /// Greater than or equal (`>=`)
    GreaterEquals,
    /// Less than or equal (`<=`)
    LesserEquals,
    /// Pattern match (`like`), `%` and `_` wildcards
    Like,
    /// Membership (`in`)
    In,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Equals => "=",
            Operator::Greater => ">",
            Operator::Lesser => "<",
            Operator::GreaterEquals => ">=",
            Operator::LesserEquals => "<=",
            Operator::Like => "like",
            Operator::In => "in",
        };
        f.write_str(symbol)
    }
}

/// Sort direction of an `order by` item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}
