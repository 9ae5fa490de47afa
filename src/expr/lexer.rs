//! Lexer for template expressions using logos

use logos::Logos;

use crate::error::ParseError;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    // Literal keywords
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("undefined")]
    Undefined,

    // Comparison operators (longer first)
    #[token("===")]
    StrictEq,
    #[token("!==")]
    StrictNotEq,
    #[token("==")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LessOrEqual,
    #[token(">=")]
    GreaterOrEqual,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,

    // Logical operators
    #[token("&&")]
    And,
    #[token("||")]
    Or,
    #[token("!")]
    Not,

    // Arithmetic operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    // Delimiters
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[token(".")]
    Dot,

    // Identifiers may start with `$` so generated accessors like `$images` lex as names
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| unescape(lex.slice()))]
    String(String),

    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    #[regex(r"\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),
}

/// Strip the surrounding quotes and resolve backslash escapes
fn unescape(quoted: &str) -> Option<String> {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            'u' => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16).ok()?;
                out.push(char::from_u32(code)?);
            }
            other => out.push(other),
        }
    }
    Some(out)
}

/// Lex input string into tokens with spans
///
/// Unlike the grammar, the lexer fails on the first character it cannot
/// classify; there is no sensible token to recover with.
pub fn lex(input: &str) -> impl Iterator<Item = Result<(Token, Span), ParseError>> + '_ {
    Token::lexer(input).spanned().map(move |(tok, span)| match tok {
        Ok(t) => Ok((t, span)),
        Err(()) => Err(ParseError::Syntax {
            message: format!("Unexpected character sequence '{}'", &input[span.clone()]),
            span,
            expected: Vec::new(),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        lex(input)
            .map(|r| r.expect("should lex").0)
            .collect()
    }

    #[test]
    fn test_accessor_identifiers() {
        assert_eq!(
            tokens("task.$images(0)"),
            vec![
                Token::Ident("task".to_string()),
                Token::Dot,
                Token::Ident("$images".to_string()),
                Token::ParenOpen,
                Token::Number(0.0),
                Token::ParenClose,
            ]
        );
    }

    #[test]
    fn test_comparison_operators_longest_first() {
        assert_eq!(
            tokens("=== !== == != <= >= < >"),
            vec![
                Token::StrictEq,
                Token::StrictNotEq,
                Token::Eq,
                Token::NotEq,
                Token::LessOrEqual,
                Token::GreaterOrEqual,
                Token::Less,
                Token::Greater,
            ]
        );
    }

    #[test]
    fn test_keywords_vs_identifiers() {
        assert_eq!(
            tokens("true truely null nullable"),
            vec![
                Token::True,
                Token::Ident("truely".to_string()),
                Token::Null,
                Token::Ident("nullable".to_string()),
            ]
        );
    }

    #[test]
    fn test_string_quotes_and_escapes() {
        assert_eq!(
            tokens(r#"'case' "say \"hi\"" 'it\'s' 'A\n'"#),
            vec![
                Token::String("case".to_string()),
                Token::String("say \"hi\"".to_string()),
                Token::String("it's".to_string()),
                Token::String("A\n".to_string()),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokens("12 1.5 2e3 .25"),
            vec![
                Token::Number(12.0),
                Token::Number(1.5),
                Token::Number(2000.0),
                Token::Number(0.25),
            ]
        );
    }

    #[test]
    fn test_unknown_character_is_an_error() {
        let result: Result<Vec<_>, _> = lex("a # b").collect();
        match result {
            Err(ParseError::Syntax { span, .. }) => assert_eq!(span, 2..3),
            other => panic!("Expected syntax error, got {:?}", other),
        }
    }
}
