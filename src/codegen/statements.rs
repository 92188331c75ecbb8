//! Statement generation, including every control-flow construct
use crate::codegen::context::JsGenerator;
use crate::ir::{Entity, EntityId, Expr, ExprKind, IfStmt, Range, Stmt};

impl<'p> JsGenerator<'p> {
    pub fn generate_block(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.generate_statement(statement);
        }
    }

    pub fn generate_statement(&mut self, statement: &Stmt) {
        match statement {
            Stmt::VariableDeclaration { variable, initializer } => {
                let keyword = match self.entities.get(*variable) {
                    Entity::Variable(v) if v.mutable => "let",
                    _ => "const",
                };
                let name = self.target_name(*variable);
                let value = self.generate_expression(initializer);
                self.emit_line(&format!("{} {} = {};", keyword, name, value));
            }
            Stmt::Assignment { target, source } => {
                let target = self.generate_expression(target);
                let source = self.generate_expression(source);
                self.emit_line(&format!("{} = {};", target, source));
            }
            Stmt::If(if_stmt) => self.generate_if(if_stmt),
            Stmt::While { test, body } => {
                let test = self.condition(test);
                self.emit_block(&format!("while ({}) {{", test), |g| g.generate_block(body));
            }
            Stmt::For { iterator, collection, body } => self.generate_for(*iterator, collection, body),
            Stmt::Break => self.emit_line("break;"),
            Stmt::Return(None) => self.emit_line("return;"),
            Stmt::Return(Some(value)) => {
                let value = self.generate_expression(value);
                self.emit_line(&format!("return {};", value));
            }
            Stmt::FunctionDeclaration(id) => self.generate_function(*id),
            Stmt::ClassDeclaration(id) => self.generate_class(*id),
            Stmt::Expression(expr) => {
                let expr = self.generate_expression(expr);
                self.emit_line(&format!("{};", expr));
            }
        }
    }

    /// Each clause opens on its own line after the closing brace of the
    /// previous one.
    fn generate_if(&mut self, if_stmt: &IfStmt) {
        let test = self.condition(&if_stmt.test);
        self.emit_block(&format!("if ({}) {{", test), |g| {
            g.generate_block(&if_stmt.consequent)
        });
        for alternate in &if_stmt.alternates {
            let test = self.condition(&alternate.test);
            self.emit_block(&format!("else if ({}) {{", test), |g| {
                g.generate_block(&alternate.consequent)
            });
        }
        if let Some(otherwise) = &if_stmt.otherwise {
            self.emit_block("else {", |g| g.generate_block(otherwise));
        }
    }

    /// A test rendered for `if (...)` or `while (...)`. Binary and
    /// conditional expressions carry one outer pair of parentheses, which
    /// the statement syntax already supplies.
    fn condition(&mut self, test: &Expr) -> String {
        let rendered = self.generate_expression(test);
        match test.kind {
            ExprKind::Binary { .. } | ExprKind::Conditional { .. } => {
                rendered[1..rendered.len() - 1].to_string()
            }
            _ => rendered,
        }
    }

    fn generate_for(&mut self, iterator: EntityId, collection: &Expr, body: &[Stmt]) {
        let name = self.target_name(iterator);
        let header = match &collection.kind {
            ExprKind::Range(range) => self.counted_loop_header(&name, range),
            _ => {
                let collection = self.generate_expression(collection);
                format!("for (const {} of {}) {{", name, collection)
            }
        };
        self.emit_block(&header, |g| g.generate_block(body));
    }

    /// `for (let i = start; i <= end; i op= step) {`, with `>=` for ranges
    /// that iterate downward.
    pub fn counted_loop_header(&mut self, name: &str, range: &Range) -> String {
        let start = self.generate_expression(&range.start);
        let end = self.generate_expression(&range.end);
        let step = self.generate_expression(&range.step);
        let comparison = if range.ascending() { "<=" } else { ">=" };
        format!(
            "for (let {name} = {start}; {name} {comparison} {end}; {name} {op}= {step}) {{",
            op = range.op.symbol()
        )
    }

    fn generate_function(&mut self, id: EntityId) {
        let entities = self.entities;
        let Some(function) = entities.function(id) else {
            return;
        };
        let name = self.target_name(id);
        let params = self.parameter_list(&function.params);
        // Nested functions inside methods are arrows so `this` stays bound.
        let header = match (function.class, self.current_class) {
            (Some(_), _) => format!("{}({}) {{", name, params),
            (None, Some(_)) => format!("const {} = ({}) => {{", name, params),
            (None, None) => format!("function {}({}) {{", name, params),
        };
        self.emit_block(&header, |g| g.generate_block(&function.body));
    }

    fn parameter_list(&mut self, params: &[EntityId]) -> String {
        let entities = self.entities;
        let mut rendered = Vec::with_capacity(params.len());
        for &param in params {
            let name = self.target_name(param);
            let default = entities.parameter(param).and_then(|p| p.default.as_ref());
            match default {
                Some(default) => {
                    let value = self.generate_expression(default);
                    rendered.push(format!("{} = {}", name, value));
                }
                None => rendered.push(name),
            }
        }
        rendered.join(", ")
    }

    fn generate_class(&mut self, id: EntityId) {
        let entities = self.entities;
        let Some(class) = entities.class(id) else {
            return;
        };
        let name = self.target_name(id);
        // Defaults run before the fields are bound, so they name the
        // earlier parameters directly rather than through `this`.
        let enclosing = self.current_class.take();
        let params = self.parameter_list(&class.constructor_params);
        self.current_class = Some(id);
        self.emit_block(&format!("class {} {{", name), |g| {
            if !class.constructor_params.is_empty() {
                g.emit_block(&format!("constructor({}) {{", params), |g| {
                    for &field in &class.constructor_params {
                        let field = g.target_name(field);
                        g.emit_line(&format!("this.{} = {};", field, field));
                    }
                });
            }
            for &method in &class.methods {
                g.generate_function(method);
            }
        });
        self.current_class = enclosing;
    }
}
