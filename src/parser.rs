use std::mem;

use tracing::debug;

use crate::{
    ast::{
        Condition, DeleteQuery, Direction, GetQuery, InsertQuery, Keyword, Literal, Operator,
        Query, QueryValue, SelectQuery, Sort, Token, TokenKind, UpdateItem, UpdateQuery, Where,
    },
    error::{QueryError, QueryResult},
    lexer::Lexer,
};

/// Deepest allowed chain of `not` and `(` in a condition.
pub const MAX_NESTING: usize = 128;

pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    depth: usize,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> QueryResult<Self> {
        let current_token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token,
            depth: 0,
        })
    }

    fn advance(&mut self) -> QueryResult<Token> {
        let next = self.lexer.next_token()?;
        Ok(mem::replace(&mut self.current_token, next))
    }

    fn unexpected(&self, expected: &str) -> QueryError {
        QueryError::syntax(
            format!("Expected {}, found {}", expected, self.current_token.kind),
            self.current_token.position,
        )
    }

    fn check(&self, kind: &TokenKind) -> bool {
        mem::discriminant(&self.current_token.kind) == mem::discriminant(kind)
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current_token.kind.is_keyword(keyword)
    }

    fn expect(&mut self, expected: TokenKind) -> QueryResult<Token> {
        if !self.check(&expected) {
            return Err(self.unexpected(&expected.to_string()));
        }
        self.advance()
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> QueryResult<()> {
        if !self.check_keyword(keyword) {
            return Err(self.unexpected(&format!("'{}'", keyword.as_str())));
        }
        self.advance()?;
        Ok(())
    }

    /// Consumes the keyword when present.
    fn accept_keyword(&mut self, keyword: Keyword) -> QueryResult<bool> {
        if self.check_keyword(keyword) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect_identifier(&mut self, what: &str) -> QueryResult<String> {
        match &self.current_token.kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance()?;
                Ok(name)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    fn expect_count(&mut self, clause: &str) -> QueryResult<u64> {
        match self.current_token.kind {
            TokenKind::Integer(n) if n >= 0 => {
                self.advance()?;
                Ok(n as u64)
            }
            _ => Err(self.unexpected(&format!("a non-negative integer after '{}'", clause))),
        }
    }

    /// Parse a complete query
    pub fn parse_query(&mut self) -> QueryResult<Query> {
        let query = match &self.current_token.kind {
            TokenKind::Keyword(Keyword::Get) => Query::Get(GetQuery {
                keys: self.parse_keys(Keyword::Get)?,
            }),
            TokenKind::Keyword(Keyword::Delete) => Query::Delete(DeleteQuery {
                keys: self.parse_keys(Keyword::Delete)?,
            }),
            TokenKind::Keyword(Keyword::Select) => Query::Select(self.parse_select()?),
            TokenKind::Keyword(Keyword::Update) => Query::Update(self.parse_update()?),
            TokenKind::Keyword(Keyword::Insert) => Query::Insert(self.parse_insert()?),
            TokenKind::Eof => return Err(QueryError::query("Query has no operation")),
            TokenKind::Keyword(_) | TokenKind::Identifier(_) => {
                return Err(QueryError::query(format!(
                    "Unknown operation '{}'",
                    self.current_token.lexeme
                )));
            }
            _ => return Err(self.unexpected("an operation keyword")),
        };

        self.expect(TokenKind::Eof)?;
        debug!(kind = query.kind().as_str(), "parsed query");
        Ok(query)
    }

    fn parse_keys(&mut self, operation: Keyword) -> QueryResult<Vec<QueryValue>> {
        self.advance()?; // consume get/delete

        if self.check(&TokenKind::Eof) {
            return Err(QueryError::query(format!(
                "'{}' requires at least one key",
                operation.as_str()
            )));
        }

        let mut keys = vec![self.parse_value()?];
        while self.check(&TokenKind::Comma) {
            self.advance()?;
            keys.push(self.parse_value()?);
        }
        Ok(keys)
    }

    fn parse_select(&mut self) -> QueryResult<SelectQuery> {
        self.advance()?; // consume select

        let mut fields = vec![];
        if self.check(&TokenKind::Star) {
            self.advance()?;
        } else if !self.check_keyword(Keyword::From) {
            fields.push(self.parse_path()?);
            while self.check(&TokenKind::Comma) {
                self.advance()?;
                fields.push(self.parse_path()?);
            }
        }

        self.expect_keyword(Keyword::From)?;
        let entity = self.expect_identifier("an entity name")?;
        let condition = self.parse_where()?;

        let mut sorts = vec![];
        if self.accept_keyword(Keyword::Order)? {
            self.expect_keyword(Keyword::By)?;
            sorts.push(self.parse_sort()?);
            while self.check(&TokenKind::Comma) {
                self.advance()?;
                sorts.push(self.parse_sort()?);
            }
        }

        let skip = if self.accept_keyword(Keyword::Skip)? {
            Some(self.expect_count("skip")?)
        } else {
            None
        };
        let limit = if self.accept_keyword(Keyword::Limit)? {
            Some(self.expect_count("limit")?)
        } else {
            None
        };

        Ok(SelectQuery {
            entity,
            fields,
            condition,
            sorts,
            limit,
            skip,
        })
    }

    fn parse_sort(&mut self) -> QueryResult<Sort> {
        let field = self.parse_path()?;
        let direction = if self.accept_keyword(Keyword::Desc)? {
            Direction::Desc
        } else {
            self.accept_keyword(Keyword::Asc)?;
            Direction::Asc
        };
        Ok(Sort { field, direction })
    }

    fn parse_update(&mut self) -> QueryResult<UpdateQuery> {
        self.advance()?; // consume update
        let entity = self.expect_identifier("an entity name")?;
        self.expect_keyword(Keyword::Set)?;
        let set = self.parse_assignments()?;
        let condition = self.parse_where()?;
        Ok(UpdateQuery {
            entity,
            set,
            condition,
        })
    }

    fn parse_insert(&mut self) -> QueryResult<InsertQuery> {
        self.advance()?; // consume insert
        let entity = self.expect_identifier("an entity name")?;
        self.expect(TokenKind::LParen)?;
        let items = self.parse_assignments()?;
        self.expect(TokenKind::RParen)?;
        Ok(InsertQuery { entity, items })
    }

    fn parse_assignments(&mut self) -> QueryResult<Vec<UpdateItem>> {
        let mut items = vec![self.parse_assignment()?];
        while self.check(&TokenKind::Comma) {
            self.advance()?;
            items.push(self.parse_assignment()?);
        }
        Ok(items)
    }

    fn parse_assignment(&mut self) -> QueryResult<UpdateItem> {
        let field = self.parse_path()?;
        self.expect(TokenKind::Eq)?;
        let value = self.parse_value()?;
        Ok(UpdateItem { field, value })
    }

    /// Dotted field path: `name`, `address.city`
    fn parse_path(&mut self) -> QueryResult<String> {
        let mut path = self.expect_identifier("a field name")?;
        while self.check(&TokenKind::Dot) {
            self.advance()?;
            path.push('.');
            path.push_str(&self.expect_identifier("a field name after '.'")?);
        }
        Ok(path)
    }

    fn parse_where(&mut self) -> QueryResult<Option<Where>> {
        if self.accept_keyword(Keyword::Where)? {
            Ok(Some(Where::new(self.parse_condition()?)))
        } else {
            Ok(None)
        }
    }

    pub fn parse_condition(&mut self) -> QueryResult<Condition> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> QueryResult<Condition> {
        let mut left = self.parse_and()?;

        while self.accept_keyword(Keyword::Or)? {
            let right = self.parse_and()?;
            left = left.or(right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> QueryResult<Condition> {
        let mut left = self.parse_term()?;

        while self.accept_keyword(Keyword::And)? {
            let right = self.parse_term()?;
            left = left.and(right);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> QueryResult<Condition> {
        if self.check_keyword(Keyword::Not) {
            // Right-associative: not not a = b
            return self.nested(|parser| {
                parser.advance()?;
                Ok(parser.parse_term()?.negate())
            });
        }

        if self.check(&TokenKind::LParen) {
            return self.nested(|parser| {
                parser.advance()?;
                let condition = parser.parse_or()?;
                parser.expect(TokenKind::RParen)?;
                Ok(condition)
            });
        }

        self.parse_comparison()
    }

    /// Runs `parse` one nesting level down, failing at the current token
    /// once [`MAX_NESTING`] is reached.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> QueryResult<T>) -> QueryResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(QueryError::syntax(
                format!("Conditions nested deeper than {} levels", MAX_NESTING),
                self.current_token.position,
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_comparison(&mut self) -> QueryResult<Condition> {
        let field = self.parse_path()?;

        let op = match &self.current_token.kind {
            TokenKind::Eq => Operator::Equals,
            TokenKind::Gt => Operator::Greater,
            TokenKind::Lt => Operator::Lesser,
            TokenKind::GtEq => Operator::GreaterEquals,
            TokenKind::LtEq => Operator::LesserEquals,
            TokenKind::Keyword(Keyword::Like) => Operator::Like,
            TokenKind::Keyword(Keyword::In) => {
                self.advance()?;
                let values = self.parse_in_list()?;
                return Ok(Condition::compare(field, Operator::In, values));
            }
            TokenKind::Keyword(Keyword::Between) => {
                self.advance()?;
                let low = self.parse_value()?;
                self.expect_keyword(Keyword::And)?;
                let high = self.parse_value()?;
                return Ok(Condition::Between { field, low, high });
            }
            _ => return Err(self.unexpected(&format!("a comparison operator after '{}'", field))),
        };

        self.advance()?;
        let value = self.parse_value()?;
        Ok(Condition::compare(field, op, value))
    }

    fn parse_in_list(&mut self) -> QueryResult<QueryValue> {
        if !self.check(&TokenKind::LParen) {
            // A parameter or a JSON array span
            return self.parse_value();
        }

        self.advance()?;
        let mut values = vec![self.parse_value()?];
        while self.check(&TokenKind::Comma) {
            self.advance()?;
            values.push(self.parse_value()?);
        }
        self.expect(TokenKind::RParen)?;
        Ok(QueryValue::Array(values))
    }

    /// Parse a value position: literal, parameter or `convert(...)`
    pub fn parse_value(&mut self) -> QueryResult<QueryValue> {
        let value = match &self.current_token.kind {
            TokenKind::Param(name) => QueryValue::Param(name.clone()),
            TokenKind::Keyword(Keyword::Convert) => return self.parse_convert(),
            _ => match self.parse_literal()? {
                Some(literal) => return Ok(QueryValue::Literal(literal)),
                None => return Err(self.unexpected("a value")),
            },
        };
        self.advance()?;
        Ok(value)
    }

    /// Consumes a literal token, or returns `None` without consuming.
    fn parse_literal(&mut self) -> QueryResult<Option<Literal>> {
        let literal = match &self.current_token.kind {
            TokenKind::String(s) => Literal::String(s.clone()),
            TokenKind::Integer(n) => Literal::Integer(*n),
            TokenKind::Float(n) => Literal::Float(*n),
            TokenKind::Keyword(Keyword::True) => Literal::Boolean(true),
            TokenKind::Keyword(Keyword::False) => Literal::Boolean(false),
            TokenKind::Keyword(Keyword::Null) => Literal::Null,
            TokenKind::Json(raw) => Literal::Json(self.normalize_json(raw)?),
            _ => return Ok(None),
        };
        self.advance()?;
        Ok(Some(literal))
    }

    fn normalize_json(&self, raw: &str) -> QueryResult<String> {
        serde_json::from_str::<serde_json::Value>(raw)
            .map(|json| json.to_string())
            .map_err(|e| {
                QueryError::syntax(
                    format!("Invalid JSON literal: {}", e),
                    self.current_token.position,
                )
            })
    }

    /// `convert(<string|number>, a.qualified.TypeName)`
    fn parse_convert(&mut self) -> QueryResult<QueryValue> {
        self.advance()?; // consume convert
        self.expect(TokenKind::LParen)?;

        let value = match &self.current_token.kind {
            TokenKind::String(_) | TokenKind::Integer(_) | TokenKind::Float(_) => {
                self.parse_literal()?
            }
            _ => None,
        }
        .ok_or_else(|| self.unexpected("a string or number to convert"))?;

        self.expect(TokenKind::Comma)?;
        let type_name = self.parse_path()?;
        self.expect(TokenKind::RParen)?;

        Ok(QueryValue::Convert { value, type_name })
    }
}

/// Parses query text into a [`Query`].
pub fn parse(text: &str) -> QueryResult<Query> {
    let lexer = Lexer::new(text);
    let mut parser = Parser::new(lexer)?;
    parser.parse_query()
}
