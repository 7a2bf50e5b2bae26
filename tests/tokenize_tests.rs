use serde_perky::{tokenize, tokenize_with_whitespace, ErrorKind, Token};

fn s(text: &str) -> Token {
    Token::String(text.to_string())
}

fn ws(text: &str) -> Token {
    Token::Whitespace(text.to_string())
}

/// Checks `line` with whitespace tokens kept, then again with them dropped.
fn check(line: &str, expected: &[Token]) {
    assert_eq!(tokenize_with_whitespace(line).unwrap(), expected, "{:?}", line);

    let without: Vec<Token> = expected
        .iter()
        .filter(|token| !token.is_whitespace())
        .cloned()
        .collect();
    assert_eq!(tokenize(line).unwrap(), without, "{:?}", line);
}

#[test]
fn test_unquoted_and_comments() {
    check("hey party people ", &[s("hey party people"), ws(" ")]);
    check("  hey party people ", &[ws("  "), s("hey party people"), ws(" ")]);
    check(
        "# hey party people ",
        &[Token::Comment(" hey party people ".to_string())],
    );
    check(
        " # hey party people ",
        &[ws(" "), Token::Comment(" hey party people ".to_string())],
    );
}

#[test]
fn test_quoted_escapes() {
    check(
        r#" "quoted \u1234 string" "#,
        &[ws(" "), s("quoted \u{1234} string"), ws(" ")],
    );
    check(
        r#" "quoted \N{END OF LINE} string" "#,
        &[ws(" "), s("quoted \n string"), ws(" ")],
    );
}

#[test]
fn test_assignments() {
    check(
        r#" "quoted string" = value "#,
        &[
            ws(" "),
            s("quoted string"),
            ws(" "),
            Token::Equals,
            ws(" "),
            s("value"),
            ws(" "),
        ],
    );
    check(
        r#" "quoted string"=value "#,
        &[ws(" "), s("quoted string"), Token::Equals, s("value"), ws(" ")],
    );
    check(
        r#" "quoted string"={"#,
        &[ws(" "), s("quoted string"), Token::Equals, Token::LeftBrace],
    );
    check(
        r#" "quoted string" = ["#,
        &[
            ws(" "),
            s("quoted string"),
            ws(" "),
            Token::Equals,
            ws(" "),
            Token::LeftBracket,
        ],
    );
    check("x=y", &[s("x"), Token::Equals, s("y")]);
    check("x={", &[s("x"), Token::Equals, Token::LeftBrace]);
    check("x=[", &[s("x"), Token::Equals, Token::LeftBracket]);
    check(
        r#"x="quoted string""#,
        &[s("x"), Token::Equals, s("quoted string")],
    );
}

#[test]
fn test_empty_containers() {
    check("[]", &[Token::EmptyBrackets]);
    check("[ ]", &[Token::EmptyBrackets]);
    check("{}", &[Token::EmptyBraces]);
    check("{ }", &[Token::EmptyBraces]);
}

#[test]
fn test_everything_at_once() {
    check(
        r#" 'quoted string' "quoted string 2" [ { = "quoted value" [ { ] } = "yes!" [{}] ''' "#,
        &[
            ws(" "),
            s("quoted string"),
            ws(" "),
            s("quoted string 2"),
            ws(" "),
            Token::LeftBracket,
            ws(" "),
            Token::LeftBrace,
            ws(" "),
            Token::Equals,
            ws(" "),
            s("quoted value"),
            ws(" "),
            Token::LeftBracket,
            ws(" "),
            Token::LeftBrace,
            ws(" "),
            Token::RightBracket,
            ws(" "),
            Token::RightBrace,
            ws(" "),
            Token::Equals,
            ws(" "),
            s("yes!"),
            ws(" "),
            Token::LeftBracket,
            Token::EmptyBraces,
            Token::RightBracket,
            ws(" "),
            Token::TripleSingleQuote,
        ],
    );
}

#[test]
fn test_whitespace_after_triple_quote_is_dropped() {
    check(
        "a = '''   ",
        &[s("a"), ws(" "), Token::Equals, ws(" "), Token::TripleSingleQuote],
    );
    check("  \"\"\"\t ", &[ws("  "), Token::TripleDoubleQuote]);
}

#[test]
fn test_lex_errors() {
    for line in [
        "'unterminated",
        r#""bad \q escape""#,
        r#""\N{NO SUCH CHARACTER}""#,
        "x = ''' trailing",
    ] {
        let err = tokenize(line).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Lex), "{:?}", line);
    }
}
