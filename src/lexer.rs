use tracing::trace;

use crate::ast::{Keyword, Token, TokenKind};
use crate::error::{Position, QueryError, QueryResult};

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if self.current_char() == Some('\n') {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.position += 1;
    }

    fn here(&self) -> Position {
        Position::new(self.position, self.line, self.column)
    }

    fn lexeme(&self, start: Position) -> String {
        self.input[start.offset..self.position].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Reads up to the next matching quote. There are no escape sequences.
    fn read_string(&mut self, quote: char, start: Position) -> QueryResult<String> {
        let mut result = String::new();
        self.advance(); // Consume opening quote

        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == quote {
                return Ok(result);
            }
            result.push(ch);
        }

        Err(QueryError::syntax(
            "Unterminated string: missing closing quote",
            start,
        ))
    }

    fn read_number(&mut self, start: Position) -> QueryResult<TokenKind> {
        let mut number = String::new();
        let mut is_float = false;

        if self.current_char() == Some('-') {
            number.push('-');
            self.advance();
        }

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let invalid = || QueryError::syntax(format!("Invalid number '{}'", number), start);
        if is_float {
            number.parse::<f64>().map(TokenKind::Float).map_err(|_| invalid())
        } else {
            number.parse::<i64>().map(TokenKind::Integer).map_err(|_| invalid())
        }
    }

    /// Captures a `{...}` or `[...]` span verbatim, balancing nested
    /// braces and brackets outside of JSON strings.
    fn read_json_span(&mut self, start: Position) -> QueryResult<String> {
        let mut closers: Vec<char> = vec![];
        let mut in_string = false;
        let mut escaped = false;

        while let Some(ch) = self.current_char() {
            self.advance();

            if in_string {
                match ch {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }

            match ch {
                '"' => in_string = true,
                '{' => closers.push('}'),
                '[' => closers.push(']'),
                '}' | ']' => {
                    if closers.pop() != Some(ch) {
                        return Err(QueryError::syntax(
                            format!("Unbalanced '{}' in JSON literal", ch),
                            start,
                        ));
                    }
                    if closers.is_empty() {
                        return Ok(self.lexeme(start));
                    }
                }
                _ => {}
            }
        }

        Err(QueryError::syntax(
            "Unbalanced JSON literal: missing closing brace",
            start,
        ))
    }

    fn read_param(&mut self, start: Position) -> QueryResult<TokenKind> {
        let marker = self.current_char();
        self.advance();

        let name = match marker {
            Some('?') => {
                let mut digits = String::new();
                while let Some(ch) = self.current_char().filter(|c| c.is_ascii_digit()) {
                    digits.push(ch);
                    self.advance();
                }
                digits
            }
            _ if self
                .current_char()
                .is_some_and(|c| c.is_alphanumeric() || c == '_') =>
            {
                self.read_identifier()
            }
            _ => String::new(),
        };

        if name.is_empty() {
            return Err(QueryError::syntax(
                "Parameter marker must be followed by a name",
                start,
            ));
        }
        Ok(TokenKind::Param(name))
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    fn single_or_eq(&mut self, single: TokenKind, with_eq: TokenKind) -> TokenKind {
        if self.peek_char(1) == Some('=') {
            self.advance();
            self.advance();
            with_eq
        } else {
            self.advance();
            single
        }
    }

    pub fn next_token(&mut self) -> QueryResult<Token> {
        self.skip_whitespace();
        let start = self.here();

        let kind = match self.current_char() {
            None => TokenKind::Eof,
            Some('"') => TokenKind::String(self.read_string('"', start)?),
            Some('\'') => TokenKind::String(self.read_string('\'', start)?),
            Some('{') | Some('[') => TokenKind::Json(self.read_json_span(start)?),
            Some('@') | Some('?') => self.read_param(start)?,
            Some('-') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number(start)?
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number(start)?,
            Some('=') => self.single(TokenKind::Eq),
            Some('>') => self.single_or_eq(TokenKind::Gt, TokenKind::GtEq),
            Some('<') => self.single_or_eq(TokenKind::Lt, TokenKind::LtEq),
            Some('*') => self.single(TokenKind::Star),
            Some(',') => self.single(TokenKind::Comma),
            Some('(') => self.single(TokenKind::LParen),
            Some(')') => self.single(TokenKind::RParen),
            Some('.') => self.single(TokenKind::Dot),
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();
                match Keyword::lookup(&ident) {
                    Some(keyword) => TokenKind::Keyword(keyword),
                    None => TokenKind::Identifier(ident),
                }
            }
            Some(ch @ ('}' | ']')) => {
                return Err(QueryError::syntax(
                    format!("Unbalanced '{}' without opening", ch),
                    start,
                ));
            }
            Some(ch) => {
                return Err(QueryError::syntax(
                    format!("Unexpected character '{}'", ch),
                    start,
                ));
            }
        };

        let token = Token::new(kind, self.lexeme(start), start);
        trace!(kind = ?token.kind, offset = start.offset, "token");
        Ok(token)
    }
}

/// Splits query text into tokens, ending with a single `Eof` token.
pub fn tokenize(text: &str) -> QueryResult<Vec<Token>> {
    let mut lexer = Lexer::new(text);
    let mut tokens = vec![];
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

#[test]
fn test_keywords_ignore_case() {
    let mut lexer = Lexer::new("GET Select wHeRe");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Keyword(Keyword::Get));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Keyword(Keyword::Select));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Keyword(Keyword::Where));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
}

#[test]
fn test_condition_tokens() {
    let mut lexer = Lexer::new("age >= @min");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Identifier("age".to_string()));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::GtEq);
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Param("min".to_string()));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
}
