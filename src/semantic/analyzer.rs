//! Semantic analyzer core: statements, functions and type annotations

use log::debug;
use crate::cst::{CstNode, Rule};
use crate::error::{PanicResult, SourceLocation, semantic_error};
use crate::ir::*;
use crate::types::{FunctionType, Type};
use super::context::{Context, ScopeFlags};

pub struct SemanticAnalyzer {
    pub(super) entities: Entities,
    pub(super) context: Context,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        let mut entities = Entities::new();
        let print = entities.alloc(Entity::Intrinsic(Intrinsic::Print));
        let print_line = entities.alloc(Entity::Intrinsic(Intrinsic::PrintLine));
        let context = Context::root([("print", print), ("p", print), ("pl", print_line)]);
        Self { entities, context }
    }

    /// Checks the whole program and builds its typed representation. The
    /// first error aborts analysis.
    pub fn analyze(&mut self, program: &CstNode) -> PanicResult<Program> {
        let statements = self.statements(&program.children)?;
        debug!(
            "analyzed {} top-level statements, {} entities",
            statements.len(),
            self.entities.len()
        );
        Ok(Program {
            statements,
            entities: std::mem::take(&mut self.entities),
        })
    }

    pub(super) fn statements(&mut self, nodes: &[CstNode]) -> PanicResult<Vec<Stmt>> {
        nodes.iter().map(|node| self.statement(node)).collect()
    }

    /// Analyzes a block in a fresh child scope.
    fn block(&mut self, node: &CstNode, flags: ScopeFlags) -> PanicResult<Vec<Stmt>> {
        self.context.push(flags);
        let body = self.statements(&node.children)?;
        self.context.pop();
        Ok(body)
    }

    fn statement(&mut self, node: &CstNode) -> PanicResult<Stmt> {
        match node.rule {
            Rule::VarDec => self.variable_declaration(node),
            Rule::Assign => self.assignment(node),
            Rule::IfStmt => self.if_statement(node),
            Rule::WhileLoop => {
                let test = self.boolean(&node.children[0])?;
                let flags = ScopeFlags { in_loop: true, ..self.context.flags() };
                let body = self.block(&node.children[1], flags)?;
                Ok(Stmt::While { test, body })
            }
            Rule::ForLoop => self.for_loop(node),
            Rule::Break => {
                if !self.context.flags().in_loop {
                    return Err(semantic_error(node.loc, "Break can only appear in a loop"));
                }
                Ok(Stmt::Break)
            }
            Rule::Return => self.return_statement(node),
            Rule::FuncDec => {
                let id = self.function_declaration(node, None)?;
                Ok(Stmt::FunctionDeclaration(id))
            }
            Rule::ClassDec => self.class_declaration(node),
            Rule::ExprStmt => Ok(Stmt::Expression(self.expression(&node.children[0])?)),
            _ => Err(semantic_error(node.loc, format!("Unexpected statement: {}", node.text))),
        }
    }

    fn variable_declaration(&mut self, node: &CstNode) -> PanicResult<Stmt> {
        let mutable = node.children[0].text == "mu";
        let name = &node.children[1];
        let initializer = self.expression(&node.children[2])?;
        let variable = self.entities.alloc(Entity::Variable(Variable {
            name: name.text.clone(),
            mutable,
            ty: initializer.ty.clone(),
        }));
        self.context.declare(&name.text, variable, name.loc)?;
        Ok(Stmt::VariableDeclaration { variable, initializer })
    }

    fn assignment(&mut self, node: &CstNode) -> PanicResult<Stmt> {
        let target_node = &node.children[0];
        let source = self.expression(&node.children[1])?;
        let target = self.expression(target_node)?;
        if !self.is_mutable(&target) {
            let name = self.root_name(&target).unwrap_or(target_node.text.as_str()).to_string();
            return Err(semantic_error(
                target_node.loc,
                format!("Cannot assign to immutable {}", name),
            ));
        }
        self.must_be_assignable(&source.ty, &target.ty, target_node.loc)?;
        Ok(Stmt::Assignment { target, source })
    }

    /// Writes go through a mutable variable, possibly by way of indexing or
    /// member access.
    fn is_mutable(&self, target: &Expr) -> bool {
        match &target.kind {
            ExprKind::Entity(id) => matches!(self.entities.get(*id), Entity::Variable(v) if v.mutable),
            ExprKind::Index { base, .. } => self.is_mutable(base),
            ExprKind::Member { object, .. } => self.is_mutable(object),
            _ => false,
        }
    }

    fn root_name<'e>(&'e self, target: &Expr) -> Option<&'e str> {
        match &target.kind {
            ExprKind::Entity(id) => Some(self.entities.name(*id)),
            ExprKind::Index { base, .. } => self.root_name(base),
            ExprKind::Member { object, .. } => self.root_name(object),
            _ => None,
        }
    }

    fn if_statement(&mut self, node: &CstNode) -> PanicResult<Stmt> {
        let flags = self.context.flags();
        let mut test = None;
        let mut consequent = Vec::new();
        let mut alternates = Vec::new();
        let mut otherwise = None;

        for clause in &node.children {
            match clause.rule {
                Rule::IfClause => {
                    test = Some(self.boolean(&clause.children[0])?);
                    consequent = self.block(&clause.children[1], flags)?;
                }
                Rule::ElifClause => {
                    let test = self.boolean(&clause.children[0])?;
                    let consequent = self.block(&clause.children[1], flags)?;
                    alternates.push(ElseIf { test, consequent });
                }
                _ => otherwise = Some(self.block(&clause.children[0], flags)?),
            }
        }

        let test = test.ok_or_else(|| semantic_error(node.loc, "Expected an if clause"))?;
        Ok(Stmt::If(IfStmt { test, consequent, alternates, otherwise }))
    }

    /// `l x in [a...b, op s]`, `l x in n` (one through n) or `l x in xs`.
    fn for_loop(&mut self, node: &CstNode) -> PanicResult<Stmt> {
        let name = &node.children[0];
        let pattern = &node.children[1];
        let collection = self.expression(pattern)?;

        let element_type = match &collection.ty {
            Type::Int => None,
            Type::Array(base) => Some((**base).clone()),
            Type::String => Some(Type::String),
            _ => return Err(semantic_error(pattern.loc, "Expected an iterable")),
        };
        let (collection, element_type) = match element_type {
            Some(element_type) => (collection, element_type),
            None => {
                let range = Range {
                    start: Expr::int(1),
                    end: collection,
                    op: StepOp::Add,
                    step: Expr::int(1),
                    element_type: Type::Int,
                };
                (Expr::new(ExprKind::Range(Box::new(range)), Type::array(Type::Int)), Type::Int)
            }
        };

        self.context.push(ScopeFlags { in_loop: true, ..self.context.flags() });
        let iterator = self.entities.alloc(Entity::Variable(Variable {
            name: name.text.clone(),
            mutable: false,
            ty: element_type,
        }));
        self.context.declare(&name.text, iterator, name.loc)?;
        let body = self.statements(&node.children[2].children)?;
        self.context.pop();

        Ok(Stmt::For { iterator, collection, body })
    }

    fn return_statement(&mut self, node: &CstNode) -> PanicResult<Stmt> {
        let function = self
            .context
            .flags()
            .function
            .ok_or_else(|| semantic_error(node.loc, "Return can only appear in a function"))?;
        let return_type = self
            .entities
            .function(function)
            .map(|f| f.ty.return_type.clone())
            .unwrap_or(Type::Void);

        match node.children.first() {
            Some(value) => {
                if return_type == Type::Void {
                    return Err(semantic_error(node.loc, "Cannot return a value from this function"));
                }
                let value_expr = self.expression(value)?;
                self.must_be_assignable(&value_expr.ty, &return_type, value.loc)?;
                Ok(Stmt::Return(Some(value_expr)))
            }
            None => {
                if return_type != Type::Void {
                    return Err(semantic_error(node.loc, "Something should be returned"));
                }
                Ok(Stmt::Return(None))
            }
        }
    }

    /// Declares the function, and registers a method with its class, before
    /// analyzing its parameters and body so that it can call itself.
    pub(super) fn function_declaration(
        &mut self,
        node: &CstNode,
        class: Option<EntityId>,
    ) -> PanicResult<EntityId> {
        let name = &node.children[0];
        debug!("{}function {}", node.location_prefix(), name.text);
        let id = self.entities.alloc(Entity::Function(FunctionEntity {
            name: name.text.clone(),
            params: Vec::new(),
            body: Vec::new(),
            ty: FunctionType { params: Vec::new(), return_type: Type::Void },
            class,
        }));
        self.context.declare(&name.text, id, name.loc)?;
        if let Some(class) = class.and_then(|c| self.entities.class_mut(c)) {
            class.methods.push(id);
        }

        self.context.push(ScopeFlags {
            in_loop: false,
            function: Some(id),
            ..self.context.flags()
        });
        let params = self.parameters(&node.children[1])?;
        let return_type = if node.children.len() == 4 {
            self.resolve_type(&node.children[2])?
        } else {
            Type::Void
        };
        let param_types = self.parameter_types(&params);
        if let Some(function) = self.entities.function_mut(id) {
            function.params = params;
            function.ty = FunctionType { params: param_types, return_type };
        }

        let block = &node.children[node.children.len() - 1];
        let body = self.statements(&block.children)?;
        self.context.pop();

        if let Some(function) = self.entities.function_mut(id) {
            function.body = body;
        }
        Ok(id)
    }

    /// Declares each parameter in the current scope. A defaulted
    /// parameter takes the type of its default value.
    pub(super) fn parameters(&mut self, node: &CstNode) -> PanicResult<Vec<EntityId>> {
        let mut params = Vec::with_capacity(node.children.len());
        for param in &node.children {
            let name = &param.children[0];
            let (default, ty) = match param.rule {
                Rule::DefaultParam => {
                    let value = self.expression(&param.children[1])?;
                    let ty = value.ty.clone();
                    (Some(value), ty)
                }
                _ => (None, self.resolve_type(&param.children[1])?),
            };
            let id = self.entities.alloc(Entity::Parameter(Parameter {
                name: name.text.clone(),
                default,
                ty,
            }));
            self.context.declare(&name.text, id, name.loc)?;
            params.push(id);
        }
        Ok(params)
    }

    pub(super) fn parameter_types(&self, params: &[EntityId]) -> Vec<Type> {
        params
            .iter()
            .filter_map(|id| self.entities.parameter(*id))
            .map(|p| p.ty.clone())
            .collect()
    }

    pub(super) fn resolve_type(&self, node: &CstNode) -> PanicResult<Type> {
        match node.rule {
            Rule::TypeName => {
                if let Some(ty) = Type::from_name(&node.text) {
                    return Ok(ty);
                }
                match self.context.lookup(&node.text) {
                    Some(id) if self.entities.class(id).is_some() => Ok(self.entities.class_type(id)),
                    _ => Err(semantic_error(node.loc, "Type expected")),
                }
            }
            Rule::ArrayType => Ok(Type::array(self.resolve_type(&node.children[0])?)),
            Rule::OptionalType => Ok(Type::optional(self.resolve_type(&node.children[0])?)),
            Rule::FunctionType => {
                let (ret, params) = node
                    .children
                    .split_last()
                    .ok_or_else(|| semantic_error(node.loc, "Type expected"))?;
                let params = params
                    .iter()
                    .map(|p| self.resolve_type(p))
                    .collect::<PanicResult<Vec<_>>>()?;
                Ok(Type::function(params, self.resolve_type(ret)?))
            }
            _ => Err(semantic_error(node.loc, "Type expected")),
        }
    }

    pub(super) fn must_be_assignable(&self, from: &Type, to: &Type, loc: SourceLocation) -> PanicResult<()> {
        if from.assignable_to(to) {
            Ok(())
        } else {
            Err(semantic_error(loc, format!("Cannot assign a {} to a {}", from, to)))
        }
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
