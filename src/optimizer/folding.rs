//! Expression folding
//!
//! Children are optimized first, then the node itself is folded when its
//! operands are literals or simplified by an algebraic identity. Integer
//! arithmetic that would overflow, division or remainder by zero, inexact
//! integer division and negative integer powers are left to run time.

use crate::ir::*;
use crate::types::Type;

pub fn optimize_expression(expr: Expr) -> Expr {
    let Expr { kind, ty } = expr;
    match kind {
        ExprKind::Binary { op, left, right } => {
            fold_binary(op, optimize_expression(*left), optimize_expression(*right), ty)
        }
        ExprKind::Unary { op, operand } => fold_unary(op, optimize_expression(*operand), ty),
        ExprKind::Conditional { test, consequent, alternate } => {
            let test = optimize_expression(*test);
            let consequent = optimize_expression(*consequent);
            let alternate = optimize_expression(*alternate);
            match test.as_bool() {
                Some(true) => consequent,
                Some(false) => alternate,
                None => Expr::new(
                    ExprKind::Conditional {
                        test: Box::new(test),
                        consequent: Box::new(consequent),
                        alternate: Box::new(alternate),
                    },
                    ty,
                ),
            }
        }
        ExprKind::Range(range) => {
            let Range { start, end, op, step, element_type } = *range;
            let range = Range {
                start: optimize_expression(start),
                end: optimize_expression(end),
                op,
                step: optimize_expression(step),
                element_type,
            };
            Expr::new(ExprKind::Range(Box::new(range)), ty)
        }
        ExprKind::Array(elements) => {
            Expr::new(ExprKind::Array(elements.into_iter().map(optimize_expression).collect()), ty)
        }
        ExprKind::Index { base, index } => Expr::new(
            ExprKind::Index {
                base: Box::new(optimize_expression(*base)),
                index: Box::new(optimize_expression(*index)),
            },
            ty,
        ),
        ExprKind::Slice { base, start, end } => Expr::new(
            ExprKind::Slice {
                base: Box::new(optimize_expression(*base)),
                start: Box::new(optimize_expression(*start)),
                end: Box::new(optimize_expression(*end)),
            },
            ty,
        ),
        ExprKind::Call { callee, args } => {
            Expr::new(ExprKind::Call { callee, args: optimize_arguments(args) }, ty)
        }
        ExprKind::ConstructorCall { class, args } => {
            Expr::new(ExprKind::ConstructorCall { class, args: optimize_arguments(args) }, ty)
        }
        ExprKind::MethodCall { object, method, args } => Expr::new(
            ExprKind::MethodCall {
                object: Box::new(optimize_expression(*object)),
                method,
                args: optimize_arguments(args),
            },
            ty,
        ),
        ExprKind::Member { object, field } => Expr::new(
            ExprKind::Member { object: Box::new(optimize_expression(*object)), field },
            ty,
        ),
        kind => Expr::new(kind, ty),
    }
}

fn optimize_arguments(args: Vec<Option<Expr>>) -> Vec<Option<Expr>> {
    args.into_iter().map(|arg| arg.map(optimize_expression)).collect()
}

fn fold_binary(op: BinaryOp, left: Expr, right: Expr, ty: Type) -> Expr {
    if let Some(folded) = fold_literals(op, &left, &right) {
        return folded;
    }

    match op {
        BinaryOp::And => match (left.as_bool(), right.as_bool()) {
            (Some(true), _) => return right,
            (Some(false), _) => return left,
            (_, Some(true)) => return left,
            _ => {}
        },
        BinaryOp::Or => match (left.as_bool(), right.as_bool()) {
            (Some(false), _) => return right,
            (Some(true), _) => return left,
            (_, Some(false)) => return left,
            _ => {}
        },
        BinaryOp::Add if right.is_number(0.0) => return left,
        BinaryOp::Add if left.is_number(0.0) => return right,
        BinaryOp::Sub if right.is_number(0.0) => return left,
        BinaryOp::Sub if left.is_number(0.0) => return Expr::unary(UnaryOp::Neg, right, ty),
        BinaryOp::Mul if right.is_number(1.0) => return left,
        BinaryOp::Mul if left.is_number(1.0) => return right,
        BinaryOp::Mul if right.is_number(0.0) => return right,
        BinaryOp::Mul if left.is_number(0.0) => return left,
        BinaryOp::Div if right.is_number(1.0) => return left,
        BinaryOp::Div if left.is_number(0.0) && !right.is_number(0.0) => return left,
        BinaryOp::Pow if right.is_number(1.0) => return left,
        BinaryOp::Pow if right.is_number(0.0) => return one(&ty),
        BinaryOp::Pow if left.is_number(1.0) => return left,
        _ => {}
    }

    Expr::binary(op, left, right, ty)
}

fn one(ty: &Type) -> Expr {
    match ty {
        Type::Float => Expr::float(1.0),
        _ => Expr::int(1),
    }
}

/// Folds an operator applied to two literals, if that is safe.
pub fn fold_literals(op: BinaryOp, left: &Expr, right: &Expr) -> Option<Expr> {
    match (&left.kind, &right.kind) {
        (ExprKind::Int(a), ExprKind::Int(b)) => fold_ints(op, *a, *b),
        (ExprKind::Float(a), ExprKind::Float(b)) => fold_floats(op, *a, *b),
        (ExprKind::Bool(a), ExprKind::Bool(b)) => match op {
            BinaryOp::And => Some(Expr::boolean(*a && *b)),
            BinaryOp::Or => Some(Expr::boolean(*a || *b)),
            BinaryOp::Eq => Some(Expr::boolean(a == b)),
            BinaryOp::Ne => Some(Expr::boolean(a != b)),
            _ => None,
        },
        (ExprKind::Str(a), ExprKind::Str(b)) => fold_strings(op, a, b),
        _ => None,
    }
}

fn fold_ints(op: BinaryOp, a: i64, b: i64) -> Option<Expr> {
    let value = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Div if b != 0 && a.checked_rem(b) == Some(0) => a.checked_div(b),
        BinaryOp::Mod if b != 0 => a.checked_rem(b),
        BinaryOp::Pow => u32::try_from(b).ok().and_then(|exp| a.checked_pow(exp)),
        _ => return compare(op, a.cmp(&b)),
    };
    // JavaScript numbers are doubles; beyond 2^53 integers lose precision
    value.filter(|v| v.unsigned_abs() <= 1 << 53).map(Expr::int)
}

fn fold_floats(op: BinaryOp, a: f64, b: f64) -> Option<Expr> {
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div if b != 0.0 => a / b,
        BinaryOp::Mod if b != 0.0 => a % b,
        BinaryOp::Pow => a.powf(b),
        BinaryOp::Div | BinaryOp::Mod => return None,
        _ => return a.partial_cmp(&b).and_then(|ordering| compare(op, ordering)),
    };
    value.is_finite().then(|| Expr::float(value))
}

fn fold_strings(op: BinaryOp, a: &str, b: &str) -> Option<Expr> {
    if op == BinaryOp::Add {
        return Some(Expr::string(format!("{}{}", a, b)));
    }
    // escapes and non-ASCII text compare differently once rendered
    let plain = |s: &str| s.is_ascii() && !s.contains('\\');
    if plain(a) && plain(b) {
        compare(op, a.cmp(b))
    } else {
        None
    }
}

fn compare(op: BinaryOp, ordering: std::cmp::Ordering) -> Option<Expr> {
    use std::cmp::Ordering::*;
    let result = match op {
        BinaryOp::Lt => ordering == Less,
        BinaryOp::Le => ordering != Greater,
        BinaryOp::Gt => ordering == Greater,
        BinaryOp::Ge => ordering != Less,
        BinaryOp::Eq => ordering == Equal,
        BinaryOp::Ne => ordering != Equal,
        _ => return None,
    };
    Some(Expr::boolean(result))
}

fn fold_unary(op: UnaryOp, operand: Expr, ty: Type) -> Expr {
    match (op, &operand.kind) {
        (UnaryOp::Neg, ExprKind::Int(v)) => {
            if let Some(negated) = v.checked_neg() {
                return Expr::int(negated);
            }
        }
        (UnaryOp::Neg, ExprKind::Float(v)) => return Expr::float(-v),
        (UnaryOp::Not, ExprKind::Bool(b)) => return Expr::boolean(!b),
        _ => {}
    }
    Expr::unary(op, operand, ty)
}
