//! Type annotations: `int`, `Dog`, `[T]`, `(T U) -> R`, each optionally
//! followed by `?`.

use crate::cst::{CstNode, Rule};
use crate::error::PanicResult;
use crate::lexer::Token;
use super::Parser;

pub fn parse_type(parser: &mut Parser) -> PanicResult<CstNode> {
    let start = parser.pos;
    let mut ty = match parser.peek() {
        Token::Identifier(_) => {
            let token = parser.advance();
            parser.leaf(Rule::TypeName, &token)
        }
        Token::LBracket => {
            parser.advance();
            let base = parse_type(parser)?;
            parser.expect(&Token::RBracket, "']' after array element type")?;
            parser.node_from(Rule::ArrayType, start, vec![base])
        }
        Token::LParen => {
            parser.advance();
            let mut parts = Vec::new();
            while !parser.match_token(&Token::RParen) {
                if !parts.is_empty() {
                    parser.match_token(&Token::Comma);
                }
                parts.push(parse_type(parser)?);
            }
            parser.expect(&Token::Arrow, "'->' in function type")?;
            parts.push(parse_type(parser)?);
            parser.node_from(Rule::FunctionType, start, parts)
        }
        _ => return Err(parser.error("Type expected")),
    };

    while parser.match_token(&Token::Question) {
        ty = parser.node_from(Rule::OptionalType, start, vec![ty]);
    }
    Ok(ty)
}
