//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::expr::ast::*;
use crate::expr::lexer::Token;

/// Helper enum for the postfix chain of a primary expression
#[derive(Debug, Clone)]
enum Postfix {
    Member(String),
    Index(Spanned<Expr>),
    Call(Vec<Spanned<Expr>>),
}

/// Longest token sequence accepted by [`parse`]
pub const MAX_TOKENS: usize = 2048;

/// Parse expression source into an AST
pub fn parse(input: &str) -> Result<Spanned<Expr>, Vec<crate::ParseError>> {
    let len = input.len();

    let tokens = crate::expr::lexer::lex(input)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| vec![e])?;
    // The parser recurses per nesting level, so cap the input before it runs
    if let Some((_, span)) = tokens.get(MAX_TOKENS) {
        return Err(vec![crate::ParseError::Syntax {
            span: span.clone(),
            message: format!("Expression is longer than {} tokens", MAX_TOKENS),
            expected: vec![],
        }]);
    }
    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    expr_parser()
        .then_ignore(end())
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn binary(lhs: Spanned<Expr>, op: BinaryOp, rhs: Spanned<Expr>) -> Spanned<Expr> {
    let span = lhs.span.start..rhs.span.end;
    Spanned::new(
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        span,
    )
}

fn expr_parser<'a, I>() -> impl Parser<'a, I, Spanned<Expr>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|expr| {
        let ident = select! {
            Token::Ident(s) => s,
        };

        let literal = select! {
            Token::Number(n) => Expr::Number(n),
            Token::String(s) => Expr::String(s),
            Token::True => Expr::Bool(true),
            Token::False => Expr::Bool(false),
            Token::Null => Expr::Null,
            Token::Undefined => Expr::Null,
        };

        let items = expr
            .clone()
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>();

        let array = items
            .clone()
            .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
            .map(Expr::Array);

        // Object keys may be bare names or quoted strings
        let property_key = choice((
            ident.clone(),
            select! {
                Token::String(s) => s,
            },
        ));

        let object = property_key
            .then_ignore(just(Token::Colon))
            .then(expr.clone())
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(Token::BraceOpen), just(Token::BraceClose))
            .map(Expr::Object);

        let atom = choice((literal, ident.clone().map(Expr::Ident), array, object))
            .map_with(|node, e| Spanned::new(node, span_range(&e.span())))
            .or(expr
                .clone()
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)));

        // Member access, indexing and calls bind tightest and chain left to right:
        // task.$images(0).$versions(0)
        let postfix = choice((
            just(Token::Dot).ignore_then(ident).map(Postfix::Member),
            expr.clone()
                .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
                .map(Postfix::Index),
            items
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
                .map(Postfix::Call),
        ))
        .map_with(|op, e| (op, span_range(&e.span())));

        let call = atom
            .foldl(postfix.repeated(), |target, (op, op_span)| {
                let span = target.span.start..op_span.end;
                let node = match op {
                    Postfix::Member(name) => Expr::Member {
                        target: Box::new(target),
                        name,
                    },
                    Postfix::Index(index) => Expr::Index {
                        target: Box::new(target),
                        index: Box::new(index),
                    },
                    Postfix::Call(args) => Expr::Call {
                        callee: Box::new(target),
                        args,
                    },
                };
                Spanned::new(node, span)
            })
            .boxed();

        let unary_op = choice((
            just(Token::Minus).to(UnaryOp::Negate),
            just(Token::Plus).to(UnaryOp::Plus),
            just(Token::Not).to(UnaryOp::Not),
        ))
        .map_with(|op, e| (op, span_range(&e.span())));

        let unary = unary_op
            .repeated()
            .foldr(call, |(op, op_span), operand| {
                let span = op_span.start..operand.span.end;
                Spanned::new(
                    Expr::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                    span,
                )
            })
            .boxed();

        // Binary operators, from tightest to loosest binding
        let product = unary
            .clone()
            .foldl(
                choice((
                    just(Token::Star).to(BinaryOp::Mul),
                    just(Token::Slash).to(BinaryOp::Div),
                    just(Token::Percent).to(BinaryOp::Rem),
                ))
                .then(unary)
                .repeated(),
                |lhs, (op, rhs)| binary(lhs, op, rhs),
            )
            .boxed();

        let sum = product
            .clone()
            .foldl(
                choice((
                    just(Token::Plus).to(BinaryOp::Add),
                    just(Token::Minus).to(BinaryOp::Sub),
                ))
                .then(product)
                .repeated(),
                |lhs, (op, rhs)| binary(lhs, op, rhs),
            )
            .boxed();

        let comparison = sum
            .clone()
            .foldl(
                choice((
                    just(Token::LessOrEqual).to(BinaryOp::LessOrEqual),
                    just(Token::GreaterOrEqual).to(BinaryOp::GreaterOrEqual),
                    just(Token::Less).to(BinaryOp::Less),
                    just(Token::Greater).to(BinaryOp::Greater),
                ))
                .then(sum)
                .repeated(),
                |lhs, (op, rhs)| binary(lhs, op, rhs),
            )
            .boxed();

        let equality = comparison
            .clone()
            .foldl(
                choice((
                    just(Token::StrictEq).to(BinaryOp::StrictEq),
                    just(Token::StrictNotEq).to(BinaryOp::StrictNotEq),
                    just(Token::Eq).to(BinaryOp::Eq),
                    just(Token::NotEq).to(BinaryOp::NotEq),
                ))
                .then(comparison)
                .repeated(),
                |lhs, (op, rhs)| binary(lhs, op, rhs),
            )
            .boxed();

        let and = equality
            .clone()
            .foldl(
                just(Token::And).to(BinaryOp::And).then(equality).repeated(),
                |lhs, (op, rhs)| binary(lhs, op, rhs),
            )
            .boxed();

        let or = and
            .clone()
            .foldl(
                just(Token::Or).to(BinaryOp::Or).then(and).repeated(),
                |lhs, (op, rhs)| binary(lhs, op, rhs),
            )
            .boxed();

        // Ternary is right-associative through the recursive branches
        or.then(
            just(Token::Question)
                .ignore_then(expr.clone())
                .then_ignore(just(Token::Colon))
                .then(expr)
                .or_not(),
        )
        .map(|(test, branches)| match branches {
            Some((then, otherwise)) => {
                let span = test.span.start..otherwise.span.end;
                Spanned::new(
                    Expr::Conditional {
                        test: Box::new(test),
                        then: Box::new(then),
                        otherwise: Box::new(otherwise),
                    },
                    span,
                )
            }
            None => test,
        })
    })
}
