//! Class declarations, field access and method calls

use std::collections::HashSet;
use log::debug;
use crate::cst::{CstNode, Rule};
use crate::error::{PanicResult, SourceLocation, semantic_error};
use crate::ir::*;
use crate::types::Type;
use super::analyzer::SemanticAnalyzer;
use super::context::ScopeFlags;

impl SemanticAnalyzer {
    /// A class's fields are its constructor parameters; they are declared
    /// in the class scope so that methods can refer to them by name.
    pub(super) fn class_declaration(&mut self, node: &CstNode) -> PanicResult<Stmt> {
        let name = &node.children[0];
        debug!("{}class {}", node.location_prefix(), name.text);
        let id = self.entities.alloc(Entity::Class(ClassEntity {
            name: name.text.clone(),
            constructor_params: Vec::new(),
            methods: Vec::new(),
        }));
        self.context.declare(&name.text, id, name.loc)?;

        self.context.push(ScopeFlags {
            in_loop: false,
            function: None,
            class: Some(id),
        });

        if let Some(constructor) = node.find(Rule::Constructor) {
            let params = &constructor.children[0];
            let mut seen = HashSet::new();
            if !params.children.iter().all(|p| seen.insert(p.children[0].text.as_str())) {
                return Err(semantic_error(constructor.loc, "Fields must be distinct"));
            }
            let fields = self.parameters(params)?;
            if let Some(class) = self.entities.class_mut(id) {
                class.constructor_params = fields;
            }
            if self.includes_as_field(id, id, &mut HashSet::new()) {
                return Err(semantic_error(constructor.loc, "Class type must not be self-containing"));
            }
        }

        for method in node.children.iter().filter(|c| c.rule == Rule::FuncDec) {
            self.function_declaration(method, Some(id))?;
        }

        self.context.pop();
        Ok(Stmt::ClassDeclaration(id))
    }

    /// Whether `class` has a field of class `target`, directly or through
    /// the fields of its field classes.
    fn includes_as_field(&self, class: EntityId, target: EntityId, visited: &mut HashSet<EntityId>) -> bool {
        if !visited.insert(class) {
            return false;
        }
        let Some(entity) = self.entities.class(class) else {
            return false;
        };
        entity.constructor_params.iter().any(|field| {
            match self.entities.parameter(*field).map(|p| &p.ty) {
                Some(Type::Class(field_class)) => {
                    field_class.id == target || self.includes_as_field(field_class.id, target, visited)
                }
                _ => false,
            }
        })
    }

    fn class_of(&self, object: &Expr, loc: SourceLocation) -> PanicResult<EntityId> {
        match &object.ty {
            Type::Class(class) => Ok(class.id),
            _ => Err(semantic_error(loc, "Expected a class instance")),
        }
    }

    pub(super) fn member(&mut self, node: &CstNode) -> PanicResult<Expr> {
        let object_node = &node.children[0];
        let field_node = &node.children[1];
        let object = self.expression(object_node)?;
        let class = self.class_of(&object, object_node.loc)?;

        let field = self
            .entities
            .class(class)
            .and_then(|c| {
                c.constructor_params
                    .iter()
                    .copied()
                    .find(|f| self.entities.name(*f) == field_node.text)
            })
            .ok_or_else(|| semantic_error(field_node.loc, format!("No such field {}", field_node.text)))?;
        let ty = self.entities.value_type(field).unwrap_or(Type::Any);

        Ok(Expr::new(ExprKind::Member { object: Box::new(object), field }, ty))
    }

    pub(super) fn method_call(&mut self, node: &CstNode) -> PanicResult<Expr> {
        let object_node = &node.children[0];
        let method_node = &node.children[1];
        let object = self.expression(object_node)?;
        let class = self.class_of(&object, object_node.loc)?;

        let method = self
            .entities
            .class(class)
            .and_then(|c| {
                c.methods
                    .iter()
                    .copied()
                    .find(|m| self.entities.name(*m) == method_node.text)
            })
            .ok_or_else(|| semantic_error(method_node.loc, format!("No such method {}", method_node.text)))?;
        let (params, return_type) = match self.entities.function(method) {
            Some(f) => (f.params.clone(), f.ty.return_type.clone()),
            None => return Err(semantic_error(method_node.loc, format!("No such method {}", method_node.text))),
        };

        let args = self.arguments(&params, &node.children[2], node.loc)?;
        Ok(Expr::new(
            ExprKind::MethodCall { object: Box::new(object), method, args },
            return_type,
        ))
    }
}
