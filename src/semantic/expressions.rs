//! Expression typing and call checking

use crate::cst::{CstNode, Rule};
use crate::error::{PanicResult, SourceLocation, semantic_error};
use crate::ir::*;
use crate::types::Type;
use super::analyzer::SemanticAnalyzer;

impl SemanticAnalyzer {
    pub(super) fn expression(&mut self, node: &CstNode) -> PanicResult<Expr> {
        match node.rule {
            Rule::IntLit => node
                .text
                .parse::<i64>()
                .map(Expr::int)
                .map_err(|_| semantic_error(node.loc, format!("Integer literal out of range: {}", node.text))),
            Rule::FloatLit => node
                .text
                .parse::<f64>()
                .map(Expr::float)
                .map_err(|_| semantic_error(node.loc, format!("Invalid float literal: {}", node.text))),
            Rule::StringLit => {
                let text = &node.text;
                Ok(Expr::string(&text[1..text.len() - 1]))
            }
            Rule::True => Ok(Expr::boolean(true)),
            Rule::False => Ok(Expr::boolean(false)),
            Rule::Id => self.identifier(node),
            Rule::Binary => self.binary(node),
            Rule::Unary => self.unary(node),
            Rule::Conditional => {
                let test = self.boolean(&node.children[0])?;
                let consequent = self.expression(&node.children[1])?;
                let alternate = self.expression(&node.children[2])?;
                self.must_have_same_type(&consequent, &alternate, node.children[2].loc)?;
                let ty = consequent.ty.clone();
                Ok(Expr::new(
                    ExprKind::Conditional {
                        test: Box::new(test),
                        consequent: Box::new(consequent),
                        alternate: Box::new(alternate),
                    },
                    ty,
                ))
            }
            Rule::ArrayLit => {
                let elements = node
                    .children
                    .iter()
                    .map(|e| self.expression(e))
                    .collect::<PanicResult<Vec<_>>>()?;
                let element_type = elements.first().map(|e| e.ty.clone()).unwrap_or(Type::Any);
                if !elements.iter().all(|e| e.ty.equivalent(&element_type)) {
                    return Err(semantic_error(node.loc, "Not all elements have the same type"));
                }
                Ok(Expr::new(ExprKind::Array(elements), Type::array(element_type)))
            }
            Rule::EmptyArray => Ok(Expr::new(ExprKind::EmptyArray, Type::array(Type::Any))),
            Rule::RangeExp => self.range(node),
            Rule::Index => {
                let base = self.expression(&node.children[0])?;
                let ty = self.element_type(&base, node.children[0].loc)?;
                let index = self.integer(&node.children[1])?;
                Ok(Expr::new(
                    ExprKind::Index { base: Box::new(base), index: Box::new(index) },
                    ty,
                ))
            }
            Rule::Slice => {
                let base = self.expression(&node.children[0])?;
                self.element_type(&base, node.children[0].loc)?;
                let start = self.integer(&node.children[1])?;
                let end = self.integer(&node.children[2])?;
                let ty = base.ty.clone();
                Ok(Expr::new(
                    ExprKind::Slice { base: Box::new(base), start: Box::new(start), end: Box::new(end) },
                    ty,
                ))
            }
            Rule::Call => self.call(node),
            Rule::MethodCall => self.method_call(node),
            Rule::Member => self.member(node),
            _ => Err(semantic_error(node.loc, format!("Unexpected expression: {}", node.text))),
        }
    }

    fn identifier(&self, node: &CstNode) -> PanicResult<Expr> {
        let id = self.lookup(node)?;
        match self.entities.value_type(id) {
            Some(ty) => Ok(Expr::entity(id, ty)),
            None => Err(semantic_error(node.loc, format!("{} is not a value", node.text))),
        }
    }

    fn lookup(&self, node: &CstNode) -> PanicResult<EntityId> {
        self.context
            .lookup(&node.text)
            .ok_or_else(|| semantic_error(node.loc, format!("Identifier {} not declared", node.text)))
    }

    fn binary(&mut self, node: &CstNode) -> PanicResult<Expr> {
        let (left_node, op_node, right_node) = (&node.children[0], &node.children[1], &node.children[2]);
        let op = BinaryOp::from_symbol(&op_node.text)
            .ok_or_else(|| semantic_error(op_node.loc, format!("Unknown operator {}", op_node.text)))?;
        let left = self.expression(left_node)?;
        let right = self.expression(right_node)?;

        let ty = match op {
            BinaryOp::And | BinaryOp::Or => {
                self.must_be_boolean(&left, left_node.loc)?;
                self.must_be_boolean(&right, right_node.loc)?;
                Type::Boolean
            }
            BinaryOp::Eq | BinaryOp::Ne => {
                self.must_have_same_type(&left, &right, op_node.loc)?;
                Type::Boolean
            }
            BinaryOp::Add => {
                self.must_be_numeric_or_string(&left, left_node.loc)?;
                self.must_have_same_type(&left, &right, op_node.loc)?;
                left.ty.clone()
            }
            _ if op.is_ordering() => {
                self.must_be_numeric_or_string(&left, left_node.loc)?;
                self.must_have_same_type(&left, &right, op_node.loc)?;
                Type::Boolean
            }
            _ => {
                self.must_be_numeric(&left, left_node.loc)?;
                self.must_have_same_type(&left, &right, op_node.loc)?;
                left.ty.clone()
            }
        };
        Ok(Expr::binary(op, left, right, ty))
    }

    fn unary(&mut self, node: &CstNode) -> PanicResult<Expr> {
        let operand_node = &node.children[1];
        let operand = self.expression(operand_node)?;
        if node.children[0].text == "!" {
            self.must_be_boolean(&operand, operand_node.loc)?;
            Ok(Expr::unary(UnaryOp::Not, operand, Type::Boolean))
        } else {
            self.must_be_numeric(&operand, operand_node.loc)?;
            let ty = operand.ty.clone();
            Ok(Expr::unary(UnaryOp::Neg, operand, ty))
        }
    }

    /// `[start...end]`, `[start...end, step]` or `[start...end, op step]`.
    fn range(&mut self, node: &CstNode) -> PanicResult<Expr> {
        let start = self.number(&node.children[0])?;
        let end = self.number(&node.children[1])?;
        let (op, step) = match node.children.len() {
            4 => {
                let op_node = &node.children[2];
                let op = StepOp::from_symbol(&op_node.text)
                    .ok_or_else(|| semantic_error(op_node.loc, format!("Unknown operator {}", op_node.text)))?;
                (op, self.number(&node.children[3])?)
            }
            3 => (StepOp::Add, self.number(&node.children[2])?),
            _ => (StepOp::Add, Expr::int(1)),
        };

        let element_type = if [&start, &end, &step].iter().any(|e| e.ty == Type::Float) {
            Type::Float
        } else {
            Type::Int
        };
        let ty = Type::array(element_type.clone());
        Ok(Expr::new(
            ExprKind::Range(Box::new(Range { start, end, op, step, element_type })),
            ty,
        ))
    }

    fn call(&mut self, node: &CstNode) -> PanicResult<Expr> {
        let callee_node = &node.children[0];
        let args_node = &node.children[1];
        let callee = self.lookup(callee_node)?;

        match self.entities.get(callee).clone() {
            Entity::Function(function) => {
                let args = self.arguments(&function.params, args_node, node.loc)?;
                Ok(Expr::new(ExprKind::Call { callee, args }, function.ty.return_type))
            }
            Entity::Class(class) => {
                let args = self.arguments(&class.constructor_params, args_node, node.loc)?;
                let ty = self.entities.class_type(callee);
                Ok(Expr::new(ExprKind::ConstructorCall { class: callee, args }, ty))
            }
            Entity::Intrinsic(_) => {
                let args = args_node
                    .children
                    .iter()
                    .map(|a| self.expression(a).map(Some))
                    .collect::<PanicResult<Vec<_>>>()?;
                Ok(Expr::new(ExprKind::Call { callee, args }, Type::Void))
            }
            Entity::Variable(Variable { ty: Type::Function(signature), .. })
            | Entity::Parameter(Parameter { ty: Type::Function(signature), .. }) => {
                let passed = args_node.children.len();
                if passed != signature.params.len() {
                    return Err(semantic_error(
                        node.loc,
                        format!("Expected {} argument(s) but {} passed", signature.params.len(), passed),
                    ));
                }
                let mut args = Vec::with_capacity(passed);
                for (arg_node, param_ty) in args_node.children.iter().zip(&signature.params) {
                    let arg = self.expression(arg_node)?;
                    self.must_be_assignable(&arg.ty, param_ty, arg_node.loc)?;
                    args.push(Some(arg));
                }
                Ok(Expr::new(ExprKind::Call { callee, args }, signature.return_type))
            }
            _ => Err(semantic_error(callee_node.loc, "Call of non-function or non-constructor")),
        }
    }

    /// Matches arguments to parameters. Missing arguments are taken from
    /// defaulted parameters, dropped from the end of the list first; their
    /// slots stay empty.
    pub(super) fn arguments(
        &mut self,
        params: &[EntityId],
        args_node: &CstNode,
        loc: SourceLocation,
    ) -> PanicResult<Vec<Option<Expr>>> {
        let params: Vec<Parameter> = params
            .iter()
            .filter_map(|id| self.entities.parameter(*id).cloned())
            .collect();
        let passed = args_node.children.len();
        let max = params.len();
        let min = params.iter().filter(|p| p.default.is_none()).count();

        if passed < min || passed > max {
            let message = if min == max {
                format!("Expected {} argument(s) but {} passed", max, passed)
            } else {
                format!("Expected between {} and {} argument(s) but {} passed", min, max, passed)
            };
            return Err(semantic_error(loc, message));
        }

        let mut skipped = vec![false; max];
        let mut to_skip = max - passed;
        for (i, param) in params.iter().enumerate().rev() {
            if to_skip == 0 {
                break;
            }
            if param.default.is_some() {
                skipped[i] = true;
                to_skip -= 1;
            }
        }

        let mut arg_nodes = args_node.children.iter();
        let mut args = Vec::with_capacity(max);
        for (param, skip) in params.iter().zip(skipped) {
            let arg_node = if skip { None } else { arg_nodes.next() };
            match arg_node {
                Some(arg_node) => {
                    let arg = self.expression(arg_node)?;
                    self.must_be_assignable(&arg.ty, &param.ty, arg_node.loc)?;
                    args.push(Some(arg));
                }
                None => args.push(None),
            }
        }
        Ok(args)
    }

    pub(super) fn boolean(&mut self, node: &CstNode) -> PanicResult<Expr> {
        let expr = self.expression(node)?;
        self.must_be_boolean(&expr, node.loc)?;
        Ok(expr)
    }

    fn integer(&mut self, node: &CstNode) -> PanicResult<Expr> {
        let expr = self.expression(node)?;
        if expr.ty != Type::Int {
            return Err(semantic_error(node.loc, "Expected an integer"));
        }
        Ok(expr)
    }

    fn number(&mut self, node: &CstNode) -> PanicResult<Expr> {
        let expr = self.expression(node)?;
        self.must_be_numeric(&expr, node.loc)?;
        Ok(expr)
    }

    /// Element type when indexing `base`.
    fn element_type(&self, base: &Expr, loc: SourceLocation) -> PanicResult<Type> {
        match &base.ty {
            Type::Array(element) => Ok((**element).clone()),
            Type::String => Ok(Type::String),
            _ => Err(semantic_error(loc, "Expected an array or string")),
        }
    }

    fn must_be_boolean(&self, expr: &Expr, loc: SourceLocation) -> PanicResult<()> {
        if expr.ty == Type::Boolean {
            Ok(())
        } else {
            Err(semantic_error(loc, "Expected a boolean"))
        }
    }

    fn must_be_numeric(&self, expr: &Expr, loc: SourceLocation) -> PanicResult<()> {
        if expr.ty.is_numeric() {
            Ok(())
        } else {
            Err(semantic_error(loc, "Expected a number"))
        }
    }

    fn must_be_numeric_or_string(&self, expr: &Expr, loc: SourceLocation) -> PanicResult<()> {
        if expr.ty.is_numeric_or_string() {
            Ok(())
        } else {
            Err(semantic_error(loc, "Expected a number or string"))
        }
    }

    fn must_have_same_type(&self, left: &Expr, right: &Expr, loc: SourceLocation) -> PanicResult<()> {
        if left.ty.equivalent(&right.ty) {
            Ok(())
        } else {
            Err(semantic_error(loc, "Operands do not have the same type"))
        }
    }
}
