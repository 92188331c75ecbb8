//! PANIC grammar front end
//!
//! Recursive-descent parser turning the token stream into the concrete
//! syntax tree consumed by the semantic analyzer. Statements need no
//! terminators; a line break only matters where an expression could
//! otherwise continue (call/index postfixes, optional return values and
//! paren-less calls such as `p x`).

mod expressions;
mod statements;
mod types;

use std::mem::discriminant;
use log::debug;
use crate::cst::{CstNode, Rule};
use crate::error::{PanicError, PanicResult, SourceLocation, syntax_error};
use crate::lexer::{Token, TokenWithLocation};

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<TokenWithLocation>,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: Vec<TokenWithLocation>) -> Self {
        Self { source, tokens, pos: 0 }
    }

    pub fn parse(&mut self) -> PanicResult<CstNode> {
        let start = self.pos;
        let mut statements = Vec::new();
        while !self.is_at_end() {
            statements.push(statements::parse_statement(self)?);
        }
        debug!("parsed {} top-level statements", statements.len());
        Ok(self.node_from(Rule::Program, start, statements))
    }

    fn current(&self) -> &TokenWithLocation {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn peek(&self) -> &Token {
        &self.current().token
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + offset).min(last)].token
    }

    fn current_loc(&self) -> SourceLocation {
        self.current().loc
    }

    /// Whether the current token sits on the same line as the previous one.
    fn on_same_line(&self) -> bool {
        !self.current().line_start
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    fn check(&self, token: &Token) -> bool {
        discriminant(self.peek()) == discriminant(token)
    }

    fn advance(&mut self) -> TokenWithLocation {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, what: &str) -> PanicResult<TokenWithLocation> {
        if self.check(token) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("Expected {}", what)))
        }
    }

    fn error(&self, message: impl Into<String>) -> PanicError {
        syntax_error(self.current_loc(), message)
    }

    fn slice(&self, token: &TokenWithLocation) -> &'a str {
        &self.source[token.span.clone()]
    }

    /// Leaf node for the token just consumed.
    fn leaf(&self, rule: Rule, token: &TokenWithLocation) -> CstNode {
        CstNode::leaf(rule, self.slice(token), token.loc)
    }

    /// Node covering every token consumed since `start`.
    fn node_from(&self, rule: Rule, start: usize, children: Vec<CstNode>) -> CstNode {
        let first = &self.tokens[start.min(self.tokens.len() - 1)];
        let text = if self.pos > start {
            let last = &self.tokens[self.pos - 1];
            &self.source[first.span.start..last.span.end]
        } else {
            ""
        };
        CstNode::new(rule, text, first.loc, children)
    }

    fn identifier(&mut self, what: &str) -> PanicResult<CstNode> {
        let token = self.expect(&Token::Identifier(String::new()), what)?;
        Ok(self.leaf(Rule::Id, &token))
    }
}

pub fn parse(source: &str, tokens: Vec<TokenWithLocation>) -> PanicResult<CstNode> {
    let mut parser = Parser::new(source, tokens);
    parser.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn parse_source(source: &str) -> PanicResult<CstNode> {
        parse(source, lex(source)?)
    }

    #[test]
    fn test_accepts_valid_programs() {
        let programs = [
            "p 1",
            "mu x: 1",
            "im x: 1",
            "f function1(){}",
            "f function2(param1 int param2 float){}",
            "f function3(param1: 2 param2 int){n:1 r n}",
            "if n=0{r 1}",
            "if n = 0 {r 0} elif n=1{r 2}",
            "if n = 0 {return 0} elif n=1{ r 2} else {return x}",
            "l i in x {r 1}",
            "l i in [0...3] {if x = 1 {p 45}}",
            "l i in [1...5]  {l j in i {p(4) p(5)}}",
            "p 1 > 3",
            "f function4() {r 2} # hello",
            "f func(x int y: 3 z float){} func(3 5 2.0)",
            "p 3 pl(5) print(8 4 8)",
            "c Dog {}",
            "c Dog {con(x int y int){} f bark(){p \"bark\" }}",
            "im x: [1...5, +3]",
            "l i < 3 {p i}",
            "3 ** 4 + 2 - 10 % 8 / -3",
            "f why() -> int {if 3 != 4 { r 2} elif 3 ** 4 > 3 and true {r 3}}",
            "l i in [1...5] {if i = 3 { b }}",
            "im x: [1 2 3] x[2] p x[2]",
            "f apply(g (int) -> int, xs [int]?) -> [int] { r [] }",
            "im y: x ? 1 : 2",
            "p(x[1...2])",
        ];
        for source in programs {
            assert!(parse_source(source).is_ok(), "should parse: {}", source);
        }
    }

    #[test]
    fn test_rejects_invalid_programs() {
        let cases = [
            ("p 1 + ", "Line 1, col 7:"),
            ("p foo(,)", "Line 1, col 7:"),
            ("p foo(1,)", "Line 1, col 9:"),
            ("p 2 **", "Line 1, col 7:"),
            ("if true p 1", "Line 1, col 9:"),
            ("l i in [0...5] p 1", "Line 1, col 16:"),
            ("p (1 + 2", "Line 1, col 9:"),
            ("return: 5", "Line 1, col 7:"),
        ];
        for (source, prefix) in cases {
            let err = parse_source(source).unwrap_err();
            assert!(
                err.to_string().starts_with(prefix),
                "{} should fail at {}, got {}",
                source,
                prefix,
                err
            );
        }
    }

    #[test]
    fn test_statement_shapes() {
        let program = parse_source("mu x: 1 x: 3\np x").unwrap();
        let rules: Vec<Rule> = program.children.iter().map(|c| c.rule).collect();
        assert_eq!(rules, vec![Rule::VarDec, Rule::Assign, Rule::ExprStmt]);
        let call = &program.children[2].children[0];
        assert_eq!(call.rule, Rule::Call);
        assert_eq!(call.text, "p x");
    }

    #[test]
    fn test_line_break_ends_return_value() {
        let program = parse_source("f g() {\n  r\n}").unwrap();
        let block = program.children[0].find(Rule::Block).unwrap();
        assert_eq!(block.children[0].rule, Rule::Return);
        assert!(block.children[0].children.is_empty());
    }
}
