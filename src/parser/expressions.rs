//! Expression parsing
//!
//! Precedence, loosest first: conditional `?:`, `or`, `and`, a single
//! comparison, additive, multiplicative, `**` (right associative), prefix
//! `-`/`!`, then postfix calls, member access, indexing and slicing.

use crate::cst::{CstNode, Rule};
use crate::error::PanicResult;
use crate::lexer::Token;
use super::Parser;

/// Parses an expression (entry point)
pub fn parse_expression(parser: &mut Parser) -> PanicResult<CstNode> {
    let start = parser.pos;
    let test = parse_or(parser)?;
    if parser.match_token(&Token::Question) {
        let consequent = parse_expression(parser)?;
        parser.expect(&Token::Colon, "':' in conditional expression")?;
        let alternate = parse_expression(parser)?;
        return Ok(parser.node_from(Rule::Conditional, start, vec![test, consequent, alternate]));
    }
    Ok(test)
}

fn parse_or(parser: &mut Parser) -> PanicResult<CstNode> {
    let start = parser.pos;
    let mut left = parse_and(parser)?;
    while parser.check(&Token::Or) {
        let op = operator(parser);
        let right = parse_and(parser)?;
        left = parser.node_from(Rule::Binary, start, vec![left, op, right]);
    }
    Ok(left)
}

fn parse_and(parser: &mut Parser) -> PanicResult<CstNode> {
    let start = parser.pos;
    let mut left = parse_comparison(parser)?;
    while parser.check(&Token::And) {
        let op = operator(parser);
        let right = parse_comparison(parser)?;
        left = parser.node_from(Rule::Binary, start, vec![left, op, right]);
    }
    Ok(left)
}

/// Comparisons do not chain: `a < b < c` is a syntax error.
fn parse_comparison(parser: &mut Parser) -> PanicResult<CstNode> {
    let start = parser.pos;
    let left = parse_additive(parser)?;
    if is_relop(parser.peek()) {
        let op = operator(parser);
        let right = parse_additive(parser)?;
        if is_relop(parser.peek()) {
            return Err(parser.error("Comparison operators cannot be chained"));
        }
        return Ok(parser.node_from(Rule::Binary, start, vec![left, op, right]));
    }
    Ok(left)
}

fn is_relop(token: &Token) -> bool {
    matches!(
        token,
        Token::Lt | Token::Le | Token::Gt | Token::Ge | Token::Eq | Token::NotEq
    )
}

fn parse_additive(parser: &mut Parser) -> PanicResult<CstNode> {
    let start = parser.pos;
    let mut left = parse_multiplicative(parser)?;
    while matches!(parser.peek(), Token::Plus | Token::Minus) {
        let op = operator(parser);
        let right = parse_multiplicative(parser)?;
        left = parser.node_from(Rule::Binary, start, vec![left, op, right]);
    }
    Ok(left)
}

fn parse_multiplicative(parser: &mut Parser) -> PanicResult<CstNode> {
    let start = parser.pos;
    let mut left = parse_power(parser)?;
    while matches!(parser.peek(), Token::Star | Token::Slash | Token::Percent) {
        let op = operator(parser);
        let right = parse_power(parser)?;
        left = parser.node_from(Rule::Binary, start, vec![left, op, right]);
    }
    Ok(left)
}

fn parse_power(parser: &mut Parser) -> PanicResult<CstNode> {
    let start = parser.pos;
    let base = parse_unary(parser)?;
    if parser.check(&Token::StarStar) {
        let op = operator(parser);
        let exponent = parse_power(parser)?;
        return Ok(parser.node_from(Rule::Binary, start, vec![base, op, exponent]));
    }
    Ok(base)
}

fn parse_unary(parser: &mut Parser) -> PanicResult<CstNode> {
    let start = parser.pos;
    if matches!(parser.peek(), Token::Minus | Token::Bang) {
        let op = operator(parser);
        let operand = parse_unary(parser)?;
        return Ok(parser.node_from(Rule::Unary, start, vec![op, operand]));
    }
    parse_postfix(parser)
}

/// Parses calls, member access, indexing and slicing. A `(` or `[` on a new
/// line starts a new statement instead of continuing the expression.
fn parse_postfix(parser: &mut Parser) -> PanicResult<CstNode> {
    let start = parser.pos;
    let mut expr = parse_primary(parser)?;

    loop {
        if parser.check(&Token::LParen) && parser.on_same_line() {
            let args = parse_arguments(parser)?;
            expr = match expr.rule {
                Rule::Id => parser.node_from(Rule::Call, start, vec![expr, args]),
                Rule::Member => {
                    let mut parts = expr.children;
                    parts.push(args);
                    parser.node_from(Rule::MethodCall, start, parts)
                }
                _ => return Err(parser.error("Only functions and methods can be called")),
            };
        } else if parser.check(&Token::LBracket) && parser.on_same_line() {
            parser.advance();
            let index = parse_expression(parser)?;
            if parser.match_token(&Token::DotDotDot) {
                let end = parse_expression(parser)?;
                parser.expect(&Token::RBracket, "']' after slice")?;
                expr = parser.node_from(Rule::Slice, start, vec![expr, index, end]);
            } else {
                parser.expect(&Token::RBracket, "']' after index")?;
                expr = parser.node_from(Rule::Index, start, vec![expr, index]);
            }
        } else if parser.match_token(&Token::Dot) {
            let member = parser.identifier("a member name after '.'")?;
            expr = parser.node_from(Rule::Member, start, vec![expr, member]);
        } else {
            break;
        }
    }

    Ok(expr)
}

fn parse_primary(parser: &mut Parser) -> PanicResult<CstNode> {
    let start = parser.pos;
    let rule = match parser.peek() {
        Token::IntLiteral(_) => Rule::IntLit,
        Token::FloatLiteral(_) => Rule::FloatLit,
        Token::StringLiteral(_) => Rule::StringLit,
        Token::True => Rule::True,
        Token::False => Rule::False,
        Token::Identifier(_) => Rule::Id,
        Token::LParen => {
            parser.advance();
            let inner = parse_expression(parser)?;
            parser.expect(&Token::RParen, "')'")?;
            return Ok(inner);
        }
        Token::LBracket => return parse_bracketed(parser, start),
        _ => return Err(parser.error("Expected an expression")),
    };
    let token = parser.advance();
    Ok(parser.leaf(rule, &token))
}

/// `[]`, `[a b c]` or `[start...end, op step]`.
fn parse_bracketed(parser: &mut Parser, start: usize) -> PanicResult<CstNode> {
    parser.advance();
    if parser.match_token(&Token::RBracket) {
        return Ok(parser.node_from(Rule::EmptyArray, start, Vec::new()));
    }

    let first = parse_expression(parser)?;
    if parser.match_token(&Token::DotDotDot) {
        let end = parse_expression(parser)?;
        let mut children = vec![first, end];
        if parser.match_token(&Token::Comma) {
            if is_step_operator(parser.peek()) {
                children.push(operator(parser));
            }
            children.push(parse_unary(parser)?);
        }
        parser.expect(&Token::RBracket, "']' after range")?;
        return Ok(parser.node_from(Rule::RangeExp, start, children));
    }

    let mut elements = vec![first];
    while !parser.match_token(&Token::RBracket) {
        if parser.match_token(&Token::Comma) && parser.check(&Token::RBracket) {
            return Err(parser.error("Expected an expression"));
        }
        elements.push(parse_expression(parser)?);
    }
    Ok(parser.node_from(Rule::ArrayLit, start, elements))
}

fn is_step_operator(token: &Token) -> bool {
    matches!(
        token,
        Token::Plus | Token::Minus | Token::Star | Token::StarStar | Token::Slash | Token::Percent
    )
}

/// Parses `( arg arg ... )`; commas between arguments are optional.
pub fn parse_arguments(parser: &mut Parser) -> PanicResult<CstNode> {
    let start = parser.pos;
    parser.expect(&Token::LParen, "'('")?;
    let mut args = Vec::new();
    while !parser.match_token(&Token::RParen) {
        if !args.is_empty() && parser.match_token(&Token::Comma) && parser.check(&Token::RParen) {
            return Err(parser.error("Expected an expression"));
        }
        args.push(parse_expression(parser)?);
    }
    Ok(parser.node_from(Rule::Args, start, args))
}

fn operator(parser: &mut Parser) -> CstNode {
    let token = parser.advance();
    parser.leaf(Rule::Operator, &token)
}
