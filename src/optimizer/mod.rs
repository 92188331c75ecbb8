//! IR optimizer
//!
//! A single bottom-up pass over the typed program. Expressions are folded
//! (see [`folding`]); statements that can never run or that do nothing are
//! dropped, and `if` chains with literal tests are reduced to the branch
//! that is taken. Function and method bodies live in the entity arena and
//! are optimized in place. Running the pass twice gives the same program.

mod folding;

pub use folding::{fold_literals, optimize_expression};

use log::debug;
use crate::ir::*;

#[derive(Debug, Clone, Default)]
pub struct OptimizationStats {
    pub statements_removed: usize,
    pub branches_eliminated: usize,
}

pub struct Optimizer<'a> {
    entities: &'a mut Entities,
    stats: OptimizationStats,
}

pub fn optimize(program: Program) -> Program {
    let Program { statements, mut entities } = program;
    let mut optimizer = Optimizer::new(&mut entities);
    let statements = optimizer.optimize_statements(statements);
    let stats = optimizer.stats;
    debug!(
        "optimizer removed {} statements, eliminated {} branches",
        stats.statements_removed, stats.branches_eliminated
    );
    Program { statements, entities }
}

impl<'a> Optimizer<'a> {
    pub fn new(entities: &'a mut Entities) -> Self {
        Self { entities, stats: OptimizationStats::default() }
    }

    pub fn optimize_statements(&mut self, statements: Vec<Stmt>) -> Vec<Stmt> {
        statements
            .into_iter()
            .flat_map(|stmt| self.optimize_statement(stmt))
            .collect()
    }

    /// Optimizes one statement into zero or more statements.
    pub fn optimize_statement(&mut self, stmt: Stmt) -> Vec<Stmt> {
        match stmt {
            Stmt::VariableDeclaration { variable, initializer } => vec![Stmt::VariableDeclaration {
                variable,
                initializer: optimize_expression(initializer),
            }],
            Stmt::Assignment { target, source } => {
                let target = optimize_expression(target);
                let source = optimize_expression(source);
                match (&target.kind, &source.kind) {
                    (ExprKind::Entity(t), ExprKind::Entity(s)) if t == s => self.removed(),
                    _ => vec![Stmt::Assignment { target, source }],
                }
            }
            Stmt::If(if_stmt) => self.optimize_if(if_stmt),
            Stmt::While { test, body } => {
                let test = optimize_expression(test);
                if test.as_bool() == Some(false) {
                    return self.removed();
                }
                vec![Stmt::While { test, body: self.optimize_statements(body) }]
            }
            Stmt::For { iterator, collection, body } => {
                let collection = optimize_expression(collection);
                if let ExprKind::Range(range) = &collection.kind {
                    if range.is_provably_empty() {
                        return self.removed();
                    }
                }
                vec![Stmt::For { iterator, collection, body: self.optimize_statements(body) }]
            }
            Stmt::Return(value) => vec![Stmt::Return(value.map(optimize_expression))],
            Stmt::FunctionDeclaration(id) => {
                self.optimize_function(id);
                vec![Stmt::FunctionDeclaration(id)]
            }
            Stmt::ClassDeclaration(id) => {
                let Some(class) = self.entities.class(id) else {
                    return vec![Stmt::ClassDeclaration(id)];
                };
                let (fields, methods) = (class.constructor_params.clone(), class.methods.clone());
                self.optimize_defaults(&fields);
                for method in methods {
                    self.optimize_function(method);
                }
                vec![Stmt::ClassDeclaration(id)]
            }
            Stmt::Expression(expr) => vec![Stmt::Expression(optimize_expression(expr))],
            Stmt::Break => vec![Stmt::Break],
        }
    }

    fn removed(&mut self) -> Vec<Stmt> {
        self.stats.statements_removed += 1;
        Vec::new()
    }

    fn optimize_function(&mut self, id: EntityId) {
        let Some(function) = self.entities.function_mut(id) else {
            return;
        };
        let (params, body) = (function.params.clone(), std::mem::take(&mut function.body));
        self.optimize_defaults(&params);
        let body = self.optimize_statements(body);
        if let Some(function) = self.entities.function_mut(id) {
            function.body = body;
        }
    }

    fn optimize_defaults(&mut self, params: &[EntityId]) {
        for param in params {
            if let Some(param) = self.entities.parameter_mut(*param) {
                param.default = param.default.take().map(optimize_expression);
            }
        }
    }

    /// A literal `true` test selects its block. A literal `false` test
    /// hands over to the next `elif`, and a test that is not a literal
    /// stops the reduction.
    fn optimize_if(&mut self, if_stmt: IfStmt) -> Vec<Stmt> {
        let IfStmt { test, consequent, alternates, otherwise } = if_stmt;
        let test = optimize_expression(test);
        let consequent = self.optimize_statements(consequent);
        let mut alternates: Vec<ElseIf> = alternates
            .into_iter()
            .map(|alt| ElseIf {
                test: optimize_expression(alt.test),
                consequent: self.optimize_statements(alt.consequent),
            })
            .collect();
        let otherwise = otherwise.map(|block| self.optimize_statements(block));

        match test.as_bool() {
            None => vec![Stmt::If(IfStmt { test, consequent, alternates, otherwise })],
            Some(true) => {
                self.stats.branches_eliminated += 1;
                consequent
            }
            Some(false) => {
                self.stats.branches_eliminated += 1;
                while !alternates.is_empty() {
                    let ElseIf { test, consequent } = alternates.remove(0);
                    match test.as_bool() {
                        Some(true) => return consequent,
                        Some(false) => self.stats.branches_eliminated += 1,
                        None => {
                            return vec![Stmt::If(IfStmt { test, consequent, alternates, otherwise })];
                        }
                    }
                }
                otherwise.unwrap_or_default()
            }
        }
    }
}
