//! Concrete syntax tree handed from the grammar front end to the analyzer.
//!
//! Nodes keep the production that matched, the literal source text they
//! cover and the position of their first token, so that diagnostics can be
//! reported in the same `Line L, col C:` form as syntax errors.

use crate::error::SourceLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Program,
    Block,
    VarDec,
    Assign,
    IfStmt,
    IfClause,
    ElifClause,
    ElseClause,
    WhileLoop,
    ForLoop,
    Break,
    Return,
    FuncDec,
    Params,
    TypedParam,
    DefaultParam,
    ClassDec,
    Constructor,
    ExprStmt,

    Conditional,
    Binary,
    Unary,
    Call,
    MethodCall,
    Member,
    Index,
    Slice,
    ArrayLit,
    EmptyArray,
    RangeExp,
    Args,
    Id,
    IntLit,
    FloatLit,
    StringLit,
    True,
    False,
    Operator,
    Keyword,

    TypeName,
    ArrayType,
    OptionalType,
    FunctionType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CstNode {
    pub rule: Rule,
    pub text: String,
    pub loc: SourceLocation,
    pub children: Vec<CstNode>,
}

impl CstNode {
    pub fn new(rule: Rule, text: impl Into<String>, loc: SourceLocation, children: Vec<CstNode>) -> Self {
        Self { rule, text: text.into(), loc, children }
    }

    pub fn leaf(rule: Rule, text: impl Into<String>, loc: SourceLocation) -> Self {
        Self::new(rule, text, loc, Vec::new())
    }

    /// First child matching `rule`.
    pub fn find(&self, rule: Rule) -> Option<&CstNode> {
        self.children.iter().find(|c| c.rule == rule)
    }

    pub fn location_prefix(&self) -> String {
        format!("Line {}, col {}: ", self.loc.line, self.loc.column)
    }
}
