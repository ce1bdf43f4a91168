// tests/lexer_tests.rs

use artemis_query::ast::{Keyword, TokenCategory, TokenKind};
use artemis_query::lexer::{Lexer, tokenize};
use artemis_query::{Position, QueryError};
use pretty_assertions::assert_eq;

fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input)
        .unwrap()
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

fn syntax_error_at(input: &str) -> Position {
    match tokenize(input) {
        Err(QueryError::Syntax { position, .. }) => position,
        other => panic!("Expected syntax error for {:?}, got {:?}", input, other),
    }
}

// ============================================================================
// Operators and Punctuation
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        ("=", TokenKind::Eq),
        (">", TokenKind::Gt),
        ("<", TokenKind::Lt),
        ("*", TokenKind::Star),
        (",", TokenKind::Comma),
        ("(", TokenKind::LParen),
        (")", TokenKind::RParen),
        (".", TokenKind::Dot),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        assert_eq!(lexer.next_token().unwrap().kind, expected, "Failed for input: {}", input);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }
}

#[test]
fn test_two_char_tokens() {
    assert_eq!(kinds(">="), vec![TokenKind::GtEq, TokenKind::Eof]);
    assert_eq!(kinds("<="), vec![TokenKind::LtEq, TokenKind::Eof]);
    assert_eq!(kinds("> ="), vec![TokenKind::Gt, TokenKind::Eq, TokenKind::Eof]);
}

// ============================================================================
// Keywords and Identifiers
// ============================================================================

#[test]
fn test_keywords() {
    let test_cases = vec![
        ("get", Keyword::Get),
        ("DELETE", Keyword::Delete),
        ("Select", Keyword::Select),
        ("update", Keyword::Update),
        ("insert", Keyword::Insert),
        ("set", Keyword::Set),
        ("from", Keyword::From),
        ("where", Keyword::Where),
        ("order", Keyword::Order),
        ("by", Keyword::By),
        ("asc", Keyword::Asc),
        ("DESC", Keyword::Desc),
        ("skip", Keyword::Skip),
        ("limit", Keyword::Limit),
        ("and", Keyword::And),
        ("or", Keyword::Or),
        ("not", Keyword::Not),
        ("like", Keyword::Like),
        ("in", Keyword::In),
        ("between", Keyword::Between),
        ("convert", Keyword::Convert),
        ("true", Keyword::True),
        ("False", Keyword::False),
        ("null", Keyword::Null),
    ];

    for (input, expected) in test_cases {
        assert_eq!(
            kinds(input),
            vec![TokenKind::Keyword(expected), TokenKind::Eof],
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_identifiers() {
    assert_eq!(
        kinds("userName _id address2"),
        vec![
            TokenKind::Identifier("userName".to_string()),
            TokenKind::Identifier("_id".to_string()),
            TokenKind::Identifier("address2".to_string()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_dotted_path_is_split() {
    assert_eq!(
        kinds("address.city"),
        vec![
            TokenKind::Identifier("address".to_string()),
            TokenKind::Dot,
            TokenKind::Identifier("city".to_string()),
            TokenKind::Eof,
        ]
    );
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_strings() {
    assert_eq!(
        kinds(r#""Diana" 'Ana' """#),
        vec![
            TokenKind::String("Diana".to_string()),
            TokenKind::String("Ana".to_string()),
            TokenKind::String(String::new()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_string_has_no_escapes() {
    assert_eq!(
        kinds(r#""a\" b"#),
        vec![
            TokenKind::String("a\\".to_string()),
            TokenKind::Identifier("b".to_string()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_numbers() {
    let test_cases = vec![
        ("12", TokenKind::Integer(12)),
        ("-3", TokenKind::Integer(-3)),
        ("10.5", TokenKind::Float(10.5)),
        ("-0.25", TokenKind::Float(-0.25)),
        ("9223372036854775807", TokenKind::Integer(i64::MAX)),
    ];

    for (input, expected) in test_cases {
        assert_eq!(kinds(input), vec![expected, TokenKind::Eof], "Failed for input: {}", input);
    }
}

#[test]
fn test_number_followed_by_dot() {
    assert_eq!(
        kinds("10."),
        vec![TokenKind::Integer(10), TokenKind::Dot, TokenKind::Eof]
    );
}

#[test]
fn test_number_out_of_range() {
    assert_eq!(syntax_error_at("get 99999999999999999999").column, 5);
}

#[test]
fn test_json_spans() {
    let test_cases = vec![
        (r#"{"Ana" : "Sister"}"#, r#"{"Ana" : "Sister"}"#),
        (r#"[1, [2, 3], {"a": []}]"#, r#"[1, [2, 3], {"a": []}]"#),
        (r#"{"text": "}{][", "n": 1}"#, r#"{"text": "}{][", "n": 1}"#),
        (r#"{"q": "say \"}\""}"#, r#"{"q": "say \"}\""}"#),
    ];

    for (input, expected) in test_cases {
        assert_eq!(
            kinds(input),
            vec![TokenKind::Json(expected.to_string()), TokenKind::Eof],
            "Failed for input: {}",
            input
        );
    }
}

// ============================================================================
// Parameters
// ============================================================================

#[test]
fn test_parameters() {
    assert_eq!(
        kinds("@id @user_name ?1 ?12"),
        vec![
            TokenKind::Param("id".to_string()),
            TokenKind::Param("user_name".to_string()),
            TokenKind::Param("1".to_string()),
            TokenKind::Param("12".to_string()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_parameter_without_name() {
    assert_eq!(syntax_error_at("get @").column, 5);
    assert_eq!(syntax_error_at("get ?x").column, 5);
}

// ============================================================================
// Categories and Positions
// ============================================================================

#[test]
fn test_categories() {
    let tokens = tokenize(r#"select name from Person where age >= @min, "x" 1 {"a":1}"#).unwrap();
    let categories: Vec<TokenCategory> = tokens.iter().map(|t| t.category()).collect();
    assert_eq!(
        categories,
        vec![
            TokenCategory::Keyword,
            TokenCategory::Identifier,
            TokenCategory::Keyword,
            TokenCategory::Identifier,
            TokenCategory::Keyword,
            TokenCategory::Identifier,
            TokenCategory::Operator,
            TokenCategory::Param,
            TokenCategory::Punctuation,
            TokenCategory::String,
            TokenCategory::Number,
            TokenCategory::String,
            TokenCategory::End,
        ]
    );
}

#[test]
fn test_positions_and_lexemes() {
    let tokens = tokenize("select *\n  from Person").unwrap();

    assert_eq!(tokens[0].position, Position::new(0, 1, 1));
    assert_eq!(tokens[1].lexeme, "*");
    assert_eq!(tokens[1].position, Position::new(7, 1, 8));
    assert_eq!(tokens[2].lexeme, "from");
    assert_eq!(tokens[2].position, Position::new(11, 2, 3));
    assert_eq!(tokens[3].position, Position::new(16, 2, 8));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unterminated_string() {
    let position = syntax_error_at(r#"get "Diana"#);
    assert_eq!(position, Position::new(4, 1, 5));
}

#[test]
fn test_unbalanced_json() {
    assert_eq!(syntax_error_at(r#"get {"a": [1}"#).column, 5);
    assert_eq!(syntax_error_at(r#"get {"a": 1"#).column, 5);
    assert_eq!(syntax_error_at("get ]").column, 5);
}

#[test]
fn test_unknown_character() {
    let err = tokenize("select * from Person where age != 1").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Syntax error at line 1, column 32: Unexpected character '!'"
    );
}
