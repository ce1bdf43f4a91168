use std::fmt;

use crate::error::Position;

/// Reserved words of the query grammar. Matched case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Get,
    Delete,
    Update,
    Select,
    Insert,
    Set,
    From,
    Where,
    Order,
    By,
    Asc,
    Desc,
    Skip,
    Limit,
    And,
    Or,
    Not,
    Like,
    In,
    Between,
    Convert,
    True,
    False,
    Null,
}

impl Keyword {
    /// Looks up a keyword ignoring ASCII case.
    pub fn lookup(word: &str) -> Option<Keyword> {
        let keyword = match word.to_ascii_lowercase().as_str() {
            "get" => Keyword::Get,
            "delete" => Keyword::Delete,
            "update" => Keyword::Update,
            "select" => Keyword::Select,
            "insert" => Keyword::Insert,
            "set" => Keyword::Set,
            "from" => Keyword::From,
            "where" => Keyword::Where,
            "order" => Keyword::Order,
            "by" => Keyword::By,
            "asc" => Keyword::Asc,
            "desc" => Keyword::Desc,
            "skip" => Keyword::Skip,
            "limit" => Keyword::Limit,
            "and" => Keyword::And,
            "or" => Keyword::Or,
            "not" => Keyword::Not,
            "like" => Keyword::Like,
            "in" => Keyword::In,
            "between" => Keyword::Between,
            "convert" => Keyword::Convert,
            "true" => Keyword::True,
            "false" => Keyword::False,
            "null" => Keyword::Null,
            _ => return None,
        };
        Some(keyword)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Get => "get",
            Keyword::Delete => "delete",
            Keyword::Update => "update",
            Keyword::Select => "select",
            Keyword::Insert => "insert",
            Keyword::Set => "set",
            Keyword::From => "from",
            Keyword::Where => "where",
            Keyword::Order => "order",
            Keyword::By => "by",
            Keyword::Asc => "asc",
            Keyword::Desc => "desc",
            Keyword::Skip => "skip",
            Keyword::Limit => "limit",
            Keyword::And => "and",
            Keyword::Or => "or",
            Keyword::Not => "not",
            Keyword::Like => "like",
            Keyword::In => "in",
            Keyword::Between => "between",
            Keyword::Convert => "convert",
            Keyword::True => "true",
            Keyword::False => "false",
            Keyword::Null => "null",
        }
    }
}

/// Coarse classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCategory {
    Keyword,
    Identifier,
    String,
    Number,
    Param,
    Operator,
    Punctuation,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Reserved word
    ///
    /// # Examples
    /// ```text
    /// get
    /// SELECT
    /// Where
    /// ```
    Keyword(Keyword),

    /// Entity, field or type name segment
    ///
    /// Must start with a letter or underscore, followed by letters, digits
    /// or underscores. Dotted paths are built by the parser from `Dot`s.
    ///
    /// # Examples
    /// ```text
    /// Person
    /// userName
    /// _id
    /// ```
    Identifier(String),

    /// String literal enclosed in double quotes
    ///
    /// # Examples
    /// ```text
    /// "Diana"
    /// "2018-01-10"
    /// ```
    String(String),

    /// Integer literal, always 64-bit
    Integer(i64),

    /// Decimal literal, always floating point
    Float(f64),

    /// Parameter marker
    ///
    /// Named parameters keep their name, positional ones use the index
    /// as name.
    ///
    /// # Examples
    /// ```text
    /// @id      // Param("id")
    /// ?1       // Param("1")
    /// ```
    Param(String),

    /// JSON object or array span, captured verbatim
    ///
    /// # Examples
    /// ```text
    /// {"Ana" : "Sister"}
    /// [1, 2, 3]
    /// ```
    Json(String),

    // Operators
    /// `=`
    Eq,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    GtEq,
    /// `<=`
    LtEq,
    /// `*` in `select *`
    Star,

    // Punctuation
    Comma,
    LParen,
    RParen,
    Dot,

    /// End of input
    Eof,
}

impl TokenKind {
    pub fn category(&self) -> TokenCategory {
        match self {
            TokenKind::Keyword(_) => TokenCategory::Keyword,
            TokenKind::Identifier(_) => TokenCategory::Identifier,
            TokenKind::String(_) | TokenKind::Json(_) => TokenCategory::String,
            TokenKind::Integer(_) | TokenKind::Float(_) => TokenCategory::Number,
            TokenKind::Param(_) => TokenCategory::Param,
            TokenKind::Eq
            | TokenKind::Gt
            | TokenKind::Lt
            | TokenKind::GtEq
            | TokenKind::LtEq
            | TokenKind::Star => TokenCategory::Operator,
            TokenKind::Comma | TokenKind::LParen | TokenKind::RParen | TokenKind::Dot => {
                TokenCategory::Punctuation
            }
            TokenKind::Eof => TokenCategory::End,
        }
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self, TokenKind::Keyword(k) if *k == keyword)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(k) => write!(f, "keyword '{}'", k.as_str()),
            TokenKind::Identifier(name) => write!(f, "identifier '{}'", name),
            TokenKind::String(s) => write!(f, "string \"{}\"", s),
            TokenKind::Integer(n) => write!(f, "number {}", n),
            TokenKind::Float(n) => write!(f, "number {}", n),
            TokenKind::Param(name) => write!(f, "parameter @{}", name),
            TokenKind::Json(s) => write!(f, "JSON literal {}", s),
            TokenKind::Eq => write!(f, "'='"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::GtEq => write!(f, "'>='"),
            TokenKind::LtEq => write!(f, "'<='"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Dot => write!(f, "'.'"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// A token with the raw text it was read from and where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, position: Position) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            position,
        }
    }

    pub fn category(&self) -> TokenCategory {
        self.kind.category()
    }
}
