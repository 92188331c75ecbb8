//! Semantic analysis
//!
//! Turns the concrete syntax tree into a typed [`Program`], resolving every
//! identifier to an entity and rejecting ill-typed programs with a
//! position-qualified error.

mod analyzer;
mod class_analysis;
mod context;
mod expressions;

pub use analyzer::SemanticAnalyzer;
pub use context::{Context, ScopeFlags};

use crate::cst::CstNode;
use crate::error::PanicResult;
use crate::ir::Program;

pub fn analyze(program: &CstNode) -> PanicResult<Program> {
    SemanticAnalyzer::new().analyze(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Entity, ExprKind, Stmt};
    use crate::types::Type;
    use crate::{lexer, parser};

    fn check(source: &str) -> PanicResult<Program> {
        let tokens = lexer::lex(source)?;
        let cst = parser::parse(source, tokens)?;
        analyze(&cst)
    }

    fn error_of(source: &str) -> String {
        match check(source) {
            Ok(_) => panic!("expected an error for: {}", source),
            Err(e) => e.to_string(),
        }
    }

    #[test]
    fn test_accepts_valid_programs() {
        let programs = [
            "im x: 1 mu y: \"hello\" y: y + \"!\"",
            "mu x: 1 l x < 10 { x: x + 1 }",
            "f fact(n int) -> int { if n <= 1 { r 1 } r n * fact(n - 1) }",
            "f greet(name: \"you\" times int) { l i in times { p name } } greet(3) greet(\"me\" 2)",
            "l i in [10...1, -2] { p i }",
            "l x in [1.5...3.0] { p x * 2.0 }",
            "l ch in \"abc\" { p ch }",
            "mu xs: [1 2 3] xs[0]: 4 p xs[0...1]",
            "im xs: [[1 2], [3 4]] p xs[1][0]",
            "c Dog { con(name string age: 3) f bark(sound string) -> string { r name + sound } }
             mu d: Dog(\"rex\") p d.bark(\"woof\") p d.name d.age: 4",
            "f apply(g (int) -> int, v int) -> int { r g(v) } f inc(x int) -> int { r x + 1 } p apply(inc 2)",
            "im e: [] mu m: 5 > 3 ? \"yes\" : \"no\"",
            "f outer() { f inner() -> boolean { r !false } p inner() r }",
            "mu a: 1 if a = 1 { p 1 } elif a = 2 { p 2 } else { mu a: \"shadow\" p a }",
            "p(-3 ** 2 % 5)",
            "mu n: 0 l true { n: n + 1 if n > 3 { b } }",
            "c Dog { con(n int) f bark(other Dog) -> int { r other.bark(other) } }",
            "c Counter { con(n int) f down(k int) -> int { r k = 0 ? n : down(k - 1) } }",
        ];
        for source in programs {
            if let Err(e) = check(source) {
                panic!("{} should be accepted: {}", source, e);
            }
        }
    }

    #[test]
    fn test_rejects_invalid_programs() {
        let cases = [
            ("im x: 1 im x: 2", "Identifier x already declared"),
            ("p y", "Identifier y not declared"),
            ("im x: 1 x: 2", "Cannot assign to immutable x"),
            ("im xs: [1 2] xs[0]: 3", "Cannot assign to immutable xs"),
            ("mu x: 1 x: \"one\"", "Cannot assign a string to a int"),
            ("p 1 + \"a\"", "Operands do not have the same type"),
            ("p true + true", "Expected a number or string"),
            ("p \"a\" * 2", "Expected a number"),
            ("p 1 and true", "Expected a boolean"),
            ("if 1 { }", "Expected a boolean"),
            ("l 3 { }", "Expected a boolean"),
            ("p([1 \"a\"])", "Not all elements have the same type"),
            ("b", "Break can only appear in a loop"),
            ("r 1", "Return can only appear in a function"),
            ("f g() -> int { r }", "Something should be returned"),
            ("f g() { r 1 }", "Cannot return a value from this function"),
            ("f g() -> int { r \"x\" }", "Cannot assign a string to a int"),
            ("im x: 1 x(2)", "Call of non-function or non-constructor"),
            ("f g(x int) {} g(1 2)", "Expected 1 argument(s) but 2 passed"),
            ("f g(x int) {} g(\"a\")", "Cannot assign a string to a int"),
            ("f g(x: 1 y: 2) {} g(1 2 3)", "Expected between 0 and 2 argument(s) but 3 passed"),
            ("f g(x blob) {}", "Type expected"),
            ("c A { con(x int x int) }", "Fields must be distinct"),
            ("c Node { con(next Node) }", "Class type must not be self-containing"),
            ("c A { con(x int) } im a: A(1) p a.y", "No such field y"),
            ("c A { con(x int) } im a: A(1) p a.go()", "No such method go"),
            ("c A { con(x int) } im a: A(1 2)", "Expected 1 argument(s) but 2 passed"),
            ("c A { con(x int) } im a: A(\"x\")", "Cannot assign a string to a int"),
            ("c A { con(x int) } im k: A", "A is not a value"),
            ("f g(h (int) -> any) {} c A { con(x int) } g(A)", "A is not a value"),
            ("im q: p", "p is not a value"),
            ("im a: 3 p a.x", "Expected a class instance"),
            ("l i in true { }", "Expected an iterable"),
            ("im x: 1 p x[0]", "Expected an array or string"),
            ("im xs: [1] p xs[\"a\"]", "Expected an integer"),
            ("l i in [1...\"a\"] { }", "Expected a number"),
            ("l i in [1...3] { i: 2 }", "Cannot assign to immutable i"),
            ("f g(x int) { x: 2 }", "Cannot assign to immutable x"),
            ("f g(x int x int) {}", "Identifier x already declared"),
            ("im x: 1 < 2 ? 1 : \"a\"", "Operands do not have the same type"),
            ("f g(h (int) -> int) { h() }", "Expected 1 argument(s) but 0 passed"),
            ("im x: -true", "Expected a number"),
        ];
        for (source, message) in cases {
            let error = error_of(source);
            assert!(error.ends_with(message), "{}: expected {:?}, got {:?}", source, message, error);
        }
    }

    #[test]
    fn test_error_locations() {
        assert_eq!(error_of("im x: 1\nmu x: 2"), "Line 2, col 4: Identifier x already declared");
        assert_eq!(
            error_of("f f1(x int y: 2) {}\nf1(1 2 3)"),
            "Line 2, col 1: Expected between 1 and 2 argument(s) but 3 passed"
        );
        assert_eq!(error_of("p 1 + \"a\""), "Line 1, col 5: Operands do not have the same type");
    }

    #[test]
    fn test_skipped_defaults_leave_empty_slots() {
        let program = check("f g(a: 1 b int c: 2) {} g(5)").unwrap();
        let Stmt::Expression(call) = &program.statements[1] else {
            panic!("expected an expression statement");
        };
        let ExprKind::Call { args, .. } = &call.kind else {
            panic!("expected a call");
        };
        assert_eq!(args.len(), 3);
        assert!(args[0].is_none());
        assert!(args[1].is_some());
        assert!(args[2].is_none());
    }

    #[test]
    fn test_integer_loop_desugars_to_range() {
        let program = check("l i in 5 { p i }").unwrap();
        let Stmt::For { collection, iterator, .. } = &program.statements[0] else {
            panic!("expected a for loop");
        };
        let ExprKind::Range(range) = &collection.kind else {
            panic!("expected a range");
        };
        assert_eq!(range.start, crate::ir::Expr::int(1));
        assert_eq!(range.end, crate::ir::Expr::int(5));
        assert_eq!(program.entities.value_type(*iterator), Some(Type::Int));
    }

    #[test]
    fn test_range_element_type() {
        let program = check("im steps: [1...4, *1.5]").unwrap();
        let Stmt::VariableDeclaration { initializer, .. } = &program.statements[0] else {
            panic!("expected a declaration");
        };
        assert_eq!(initializer.ty, Type::array(Type::Float));
    }

    #[test]
    fn test_recursive_function_is_declared_before_its_body() {
        let program = check("f count(n int) -> int { r n = 0 ? 0 : count(n - 1) }").unwrap();
        let Stmt::FunctionDeclaration(id) = program.statements[0] else {
            panic!("expected a function declaration");
        };
        let Entity::Function(function) = program.entities.get(id) else {
            panic!("expected a function entity");
        };
        assert_eq!(function.ty.return_type, Type::Int);
        assert_eq!(function.body.len(), 1);
    }

    #[test]
    fn test_method_is_registered_before_its_body() {
        let program = check("c Dog { con(n int) f bark(other Dog) -> int { r other.bark(other) } }").unwrap();
        let Stmt::ClassDeclaration(id) = program.statements[0] else {
            panic!("expected a class declaration");
        };
        let class = program.entities.class(id).unwrap();
        assert_eq!(class.methods.len(), 1);
        let method = program.entities.function(class.methods[0]).unwrap();
        assert_eq!(method.class, Some(id));
        assert_eq!(method.body.len(), 1);
    }

    #[test]
    fn test_constructor_call_has_class_type() {
        let program = check("c Dog { con(name string) } im d: Dog(\"rex\")").unwrap();
        let Stmt::VariableDeclaration { initializer, .. } = &program.statements[1] else {
            panic!("expected a declaration");
        };
        assert!(matches!(initializer.kind, ExprKind::ConstructorCall { .. }));
        assert_eq!(initializer.ty.to_string(), "Dog");
    }
}
