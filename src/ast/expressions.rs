use std::fmt;

/// A literal as written in the query text.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// String literal
    ///
    /// # Example
    /// ```text
    /// "Diana"
    /// ```
    String(String),

    /// Integer literal, decoded to 64 bits
    Integer(i64),

    /// Decimal literal, decoded to a float
    Float(f64),

    /// `true` / `false`
    Boolean(bool),

    /// `null`
    Null,

    /// JSON object or array, kept as its normalized string form
    ///
    /// # Example
    /// ```text
    /// {"Ana" : "Sister"}   // Json("{\"Ana\":\"Sister\"}")
    /// ```
    Json(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "\"{}\"", s),
            Literal::Integer(n) => write!(f, "{}", n),
            Literal::Float(n) => write!(f, "{}", n),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Null => f.write_str("null"),
            Literal::Json(s) => f.write_str(s),
        }
    }
}

/// A value position in the parsed query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Literal(Literal),

    /// Parameter reference, bound before execution
    ///
    /// # Examples
    /// ```text
    /// @id     // Param("id")
    /// ?1      // Param("1")
    /// ```
    Param(String),

    /// Typed value built through the converter at resolution time
    ///
    /// # Example
    /// ```text
    /// convert("2018-01-10", java.time.LocalDate)
    /// ```
    Convert { value: Literal, type_name: String },

    /// List operand of `in`
    ///
    /// # Example
    /// ```text
    /// age in (10, 20, @max)
    /// ```
    Array(Vec<QueryValue>),
}

impl QueryValue {
    /// Appends every parameter name referenced by this value, in order.
    pub fn collect_params(&self, names: &mut Vec<String>) {
        match self {
            QueryValue::Param(name) => {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
            QueryValue::Array(items) => {
                for item in items {
                    item.collect_params(names);
                }
            }
            QueryValue::Literal(_) | QueryValue::Convert { .. } => {}
        }
    }
}

impl From<Literal> for QueryValue {
    fn from(literal: Literal) -> Self {
        QueryValue::Literal(literal)
    }
}
