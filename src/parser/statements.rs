//! Statement and declaration parsing

use crate::cst::{CstNode, Rule};
use crate::error::PanicResult;
use crate::lexer::Token;
use super::Parser;
use super::expressions::{parse_arguments, parse_expression};
use super::types::parse_type;

pub fn parse_statement(parser: &mut Parser) -> PanicResult<CstNode> {
    match parser.peek() {
        Token::Im | Token::Mu => parse_var_decl(parser),
        Token::Func => parse_function(parser),
        Token::Class => parse_class(parser),
        Token::If => parse_if(parser),
        Token::Loop => parse_loop(parser),
        Token::Break => {
            let token = parser.advance();
            Ok(parser.leaf(Rule::Break, &token))
        }
        Token::Return => parse_return(parser),
        _ => parse_expression_statement(parser),
    }
}

pub fn parse_block(parser: &mut Parser) -> PanicResult<CstNode> {
    let start = parser.pos;
    parser.expect(&Token::LBrace, "'{'")?;
    let mut statements = Vec::new();
    while !parser.check(&Token::RBrace) {
        if parser.is_at_end() {
            return Err(parser.error("Expected '}'"));
        }
        statements.push(parse_statement(parser)?);
    }
    parser.advance();
    Ok(parser.node_from(Rule::Block, start, statements))
}

/// `im name: exp` or `mu name: exp`
fn parse_var_decl(parser: &mut Parser) -> PanicResult<CstNode> {
    let start = parser.pos;
    let keyword = parser.advance();
    let keyword = parser.leaf(Rule::Keyword, &keyword);
    let name = parser.identifier("a variable name")?;
    parser.expect(&Token::Colon, "':' after variable name")?;
    let initializer = parse_expression(parser)?;
    Ok(parser.node_from(Rule::VarDec, start, vec![keyword, name, initializer]))
}

/// `f name(params) [-> type] { ... }`
pub fn parse_function(parser: &mut Parser) -> PanicResult<CstNode> {
    let start = parser.pos;
    parser.expect(&Token::Func, "'f'")?;
    let name = parser.identifier("a function name")?;
    let params = parse_params(parser)?;
    let mut children = vec![name, params];
    if parser.match_token(&Token::Arrow) {
        children.push(parse_type(parser)?);
    }
    children.push(parse_block(parser)?);
    Ok(parser.node_from(Rule::FuncDec, start, children))
}

/// `( name type  name: default ... )`, commas optional.
fn parse_params(parser: &mut Parser) -> PanicResult<CstNode> {
    let start = parser.pos;
    parser.expect(&Token::LParen, "'('")?;
    let mut params = Vec::new();
    while !parser.match_token(&Token::RParen) {
        if !params.is_empty() {
            parser.match_token(&Token::Comma);
        }
        let param_start = parser.pos;
        let name = parser.identifier("a parameter name")?;
        let param = if parser.match_token(&Token::Colon) {
            let default = parse_expression(parser)?;
            parser.node_from(Rule::DefaultParam, param_start, vec![name, default])
        } else {
            let ty = parse_type(parser)?;
            parser.node_from(Rule::TypedParam, param_start, vec![name, ty])
        };
        params.push(param);
    }
    Ok(parser.node_from(Rule::Params, start, params))
}

/// `c Name { [con(params) [{}]] f ... }`
fn parse_class(parser: &mut Parser) -> PanicResult<CstNode> {
    let start = parser.pos;
    parser.advance();
    let name = parser.identifier("a class name")?;
    parser.expect(&Token::LBrace, "'{' after class name")?;

    let mut children = vec![name];
    if parser.check(&Token::Con) {
        let con_start = parser.pos;
        parser.advance();
        let params = parse_params(parser)?;
        if parser.match_token(&Token::LBrace) {
            parser.expect(&Token::RBrace, "'}' after constructor")?;
        }
        children.push(parser.node_from(Rule::Constructor, con_start, vec![params]));
    }
    while !parser.match_token(&Token::RBrace) {
        if !parser.check(&Token::Func) {
            return Err(parser.error("Expected a method declaration"));
        }
        children.push(parse_function(parser)?);
    }
    Ok(parser.node_from(Rule::ClassDec, start, children))
}

fn parse_if(parser: &mut Parser) -> PanicResult<CstNode> {
    let start = parser.pos;
    let mut clauses = vec![clause(parser, Rule::IfClause)?];
    while parser.check(&Token::Elif) {
        clauses.push(clause(parser, Rule::ElifClause)?);
    }
    if parser.check(&Token::Else) {
        let else_start = parser.pos;
        parser.advance();
        let block = parse_block(parser)?;
        clauses.push(parser.node_from(Rule::ElseClause, else_start, vec![block]));
    }
    Ok(parser.node_from(Rule::IfStmt, start, clauses))
}

fn clause(parser: &mut Parser, rule: Rule) -> PanicResult<CstNode> {
    let start = parser.pos;
    parser.advance();
    let test = parse_expression(parser)?;
    let block = parse_block(parser)?;
    Ok(parser.node_from(rule, start, vec![test, block]))
}

/// `l name in pattern {}` is a for loop, `l test {}` a while loop.
fn parse_loop(parser: &mut Parser) -> PanicResult<CstNode> {
    let start = parser.pos;
    parser.advance();
    if matches!(parser.peek(), Token::Identifier(_)) && matches!(parser.peek_at(1), Token::In) {
        let iterator = parser.identifier("a loop variable")?;
        parser.advance();
        let collection = parse_expression(parser)?;
        let body = parse_block(parser)?;
        return Ok(parser.node_from(Rule::ForLoop, start, vec![iterator, collection, body]));
    }
    let test = parse_expression(parser)?;
    let body = parse_block(parser)?;
    Ok(parser.node_from(Rule::WhileLoop, start, vec![test, body]))
}

/// The value of `r` must start on the same line.
fn parse_return(parser: &mut Parser) -> PanicResult<CstNode> {
    let start = parser.pos;
    parser.advance();
    let mut children = Vec::new();
    if parser.on_same_line() && parser.peek().starts_expression() {
        children.push(parse_expression(parser)?);
    }
    Ok(parser.node_from(Rule::Return, start, children))
}

/// Assignment, paren-less call (`p x`) or a bare expression.
fn parse_expression_statement(parser: &mut Parser) -> PanicResult<CstNode> {
    let start = parser.pos;

    if matches!(parser.peek(), Token::Identifier(_)) {
        let next = parser.peek_at(1);
        let next_on_same_line = !parser.tokens[(parser.pos + 1).min(parser.tokens.len() - 1)].line_start;
        let continues_expression = matches!(next, Token::LParen | Token::LBracket | Token::Minus);
        if next_on_same_line && next.starts_expression() && !continues_expression {
            let token = parser.advance();
            let callee = parser.leaf(Rule::Id, &token);
            let args_start = parser.pos;
            let arg = parse_expression(parser)?;
            let args = parser.node_from(Rule::Args, args_start, vec![arg]);
            let call = parser.node_from(Rule::Call, start, vec![callee, args]);
            return Ok(parser.node_from(Rule::ExprStmt, start, vec![call]));
        }
    }

    let expr = parse_expression(parser)?;
    if parser.match_token(&Token::Colon) {
        let source = parse_expression(parser)?;
        return Ok(parser.node_from(Rule::Assign, start, vec![expr, source]));
    }
    Ok(parser.node_from(Rule::ExprStmt, start, vec![expr]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn statement(source: &str) -> CstNode {
        let mut parser = Parser::new(source, lex(source).unwrap());
        parse_statement(&mut parser).unwrap()
    }

    #[test]
    fn test_function_declaration_parts() {
        let func = statement("f add(x int, y: 2) -> int { r x + y }");
        let rules: Vec<Rule> = func.children.iter().map(|c| c.rule).collect();
        assert_eq!(rules, vec![Rule::Id, Rule::Params, Rule::TypeName, Rule::Block]);
        let params = &func.children[1];
        assert_eq!(params.children[0].rule, Rule::TypedParam);
        assert_eq!(params.children[1].rule, Rule::DefaultParam);
    }

    #[test]
    fn test_class_declaration_parts() {
        let class = statement("c Dog { con(name string) f bark() {} f sit() {} }");
        let rules: Vec<Rule> = class.children.iter().map(|c| c.rule).collect();
        assert_eq!(rules, vec![Rule::Id, Rule::Constructor, Rule::FuncDec, Rule::FuncDec]);
    }

    #[test]
    fn test_if_chain() {
        let stmt = statement("if a {} elif b {} elif c {} else {}");
        assert_eq!(stmt.children.len(), 4);
        assert_eq!(stmt.children[3].rule, Rule::ElseClause);
    }

    #[test]
    fn test_loop_forms() {
        assert_eq!(statement("l i in [1...3] {}").rule, Rule::ForLoop);
        assert_eq!(statement("l i < 3 {}").rule, Rule::WhileLoop);
        assert_eq!(statement("l true {}").rule, Rule::WhileLoop);
    }

    #[test]
    fn test_paren_less_call_stops_at_line_end() {
        let stmt = statement("func\n2");
        assert_eq!(stmt.children[0].rule, Rule::Id);
        let stmt = statement("func 2");
        assert_eq!(stmt.children[0].rule, Rule::Call);
    }

    #[test]
    fn test_member_assignment() {
        let stmt = statement("d.name: \"rex\"");
        assert_eq!(stmt.rule, Rule::Assign);
        assert_eq!(stmt.children[0].rule, Rule::Member);
    }
}
