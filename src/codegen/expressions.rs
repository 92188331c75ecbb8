//! Expression generation
use crate::codegen::context::JsGenerator;
use crate::ir::{BinaryOp, Entity, EntityId, Expr, ExprKind, Range, StepOp, UnaryOp};

/// Ranges with literal parts are expanded into array literals up to this
/// many elements; longer ones are built at run time.
pub const MAX_EXPANDED_RANGE: usize = 10_000;

impl<'p> JsGenerator<'p> {
    pub fn generate_expression(&mut self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Int(value) => value.to_string(),
            ExprKind::Float(value) => render_number(*value),
            ExprKind::Str(contents) => format!("\"{}\"", contents),
            ExprKind::Bool(value) => value.to_string(),
            ExprKind::EmptyArray => "[]".to_string(),
            ExprKind::Entity(id) => self.reference(*id),
            ExprKind::Binary { op, left, right } => {
                let mut left = self.generate_expression(left);
                let right = self.generate_expression(right);
                // A unary operand on the left of `**` is a JavaScript syntax error.
                if *op == BinaryOp::Pow && (left.starts_with('-') || left.starts_with('!')) {
                    left = format!("({})", left);
                }
                format!("({} {} {})", left, js_operator(*op), right)
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.generate_expression(operand);
                match op {
                    UnaryOp::Neg if operand.starts_with('-') => format!("-({})", operand),
                    UnaryOp::Neg => format!("-{}", operand),
                    UnaryOp::Not => format!("!{}", operand),
                }
            }
            ExprKind::Range(range) => self.generate_range(range),
            ExprKind::Array(elements) => {
                let elements: Vec<String> = elements.iter().map(|e| self.generate_expression(e)).collect();
                format!("[{}]", elements.join(", "))
            }
            ExprKind::Index { base, index } => {
                let base = self.generate_expression(base);
                let index = self.generate_expression(index);
                format!("{}[{}]", base, index)
            }
            ExprKind::Slice { base, start, end } => {
                let base = self.generate_expression(base);
                let start = self.generate_expression(start);
                let end = self.generate_expression(end);
                format!("{}.slice({}, {} + 1)", base, start, end)
            }
            ExprKind::Call { callee, args } => {
                let args = self.arguments(args);
                let entities = self.entities;
                let callee = match entities.get(*callee) {
                    Entity::Intrinsic(_) => "console.log".to_string(),
                    _ => self.reference(*callee),
                };
                format!("{}({})", callee, args)
            }
            ExprKind::ConstructorCall { class, args } => {
                let class = self.target_name(*class);
                let args = self.arguments(args);
                format!("new {}({})", class, args)
            }
            ExprKind::MethodCall { object, method, args } => {
                let object = self.generate_expression(object);
                let method = self.target_name(*method);
                let args = self.arguments(args);
                format!("{}.{}({})", object, method, args)
            }
            ExprKind::Member { object, field } => {
                let object = self.generate_expression(object);
                let field = self.target_name(*field);
                format!("{}.{}", object, field)
            }
            ExprKind::Conditional { test, consequent, alternate } => {
                let test = self.generate_expression(test);
                let consequent = self.generate_expression(consequent);
                let alternate = self.generate_expression(alternate);
                format!("({} ? {} : {})", test, consequent, alternate)
            }
        }
    }

    fn reference(&mut self, id: EntityId) -> String {
        let name = self.target_name(id);
        if self.is_own_member(id) {
            format!("this.{}", name)
        } else {
            name
        }
    }

    /// Omitted slots before the last passed argument become `undefined`
    /// so JavaScript applies the parameter default; trailing ones are dropped.
    fn arguments(&mut self, args: &[Option<Expr>]) -> String {
        let passed = args.iter().rposition(Option::is_some).map_or(0, |last| last + 1);
        let rendered: Vec<String> = args[..passed]
            .iter()
            .map(|arg| match arg {
                Some(arg) => self.generate_expression(arg),
                None => "undefined".to_string(),
            })
            .collect();
        rendered.join(", ")
    }

    fn generate_range(&mut self, range: &Range) -> String {
        if let Some(values) = expand_range(range) {
            let values: Vec<String> = values.into_iter().map(render_number).collect();
            return format!("[{}]", values.join(", "));
        }
        let header = self.counted_loop_header("v", range);
        format!("(() => {{ const values = []; {} values.push(v); }} return values; }})()", header)
    }
}

/// The elements of a range whose parts are all literals, or `None` when
/// the range must be built at run time.
pub fn expand_range(range: &Range) -> Option<Vec<f64>> {
    if range.is_degenerate() {
        return None;
    }
    let (start, end, step) = range.literal_parts()?;
    let ascending = range.ascending();
    let mut values = Vec::new();
    let mut current = start;
    while if ascending { current <= end } else { current >= end } {
        if values.len() == MAX_EXPANDED_RANGE {
            return None;
        }
        values.push(current);
        let k = values.len() as f64;
        let next = match range.op {
            // Recomputed from the start so float steps do not accumulate error.
            StepOp::Add => start + k * step,
            StepOp::Sub => start - k * step,
            StepOp::Mul => current * step,
            StepOp::Div => current / step,
            StepOp::Pow => current.powf(step),
            StepOp::Mod => current % step,
        };
        if !next.is_finite() || next == current {
            return None;
        }
        current = next;
    }
    Some(values)
}

pub fn render_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "Infinity".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        value.to_string()
    }
}

fn js_operator(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Eq => "===",
        BinaryOp::Ne => "!==",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
        other => other.symbol(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;

    fn range(start: Expr, end: Expr, op: StepOp, step: Expr) -> Range {
        Range { start, end, op, step, element_type: Type::Int }
    }

    #[test]
    fn test_expand_additive_ranges() {
        let up = range(Expr::int(1), Expr::int(10), StepOp::Add, Expr::int(3));
        assert_eq!(expand_range(&up), Some(vec![1.0, 4.0, 7.0, 10.0]));
        let down = range(Expr::int(10), Expr::int(1), StepOp::Add, Expr::int(-4));
        assert_eq!(expand_range(&down), Some(vec![10.0, 6.0, 2.0]));
        let sub = range(Expr::int(5), Expr::int(1), StepOp::Sub, Expr::int(2));
        assert_eq!(expand_range(&sub), Some(vec![5.0, 3.0, 1.0]));
    }

    #[test]
    fn test_expand_multiplicative_ranges() {
        let doubling = range(Expr::int(1), Expr::int(20), StepOp::Mul, Expr::int(2));
        assert_eq!(expand_range(&doubling), Some(vec![1.0, 2.0, 4.0, 8.0, 16.0]));
        let halving = range(Expr::int(16), Expr::int(3), StepOp::Div, Expr::int(2));
        assert_eq!(expand_range(&halving), Some(vec![16.0, 8.0, 4.0]));
    }

    #[test]
    fn test_empty_and_unexpandable_ranges() {
        let empty = range(Expr::int(5), Expr::int(1), StepOp::Add, Expr::int(1));
        assert_eq!(expand_range(&empty), Some(vec![]));
        let stuck = range(Expr::int(1), Expr::int(5), StepOp::Add, Expr::int(0));
        assert_eq!(expand_range(&stuck), None);
        let huge = range(Expr::int(1), Expr::int(1_000_000), StepOp::Add, Expr::int(1));
        assert_eq!(expand_range(&huge), None);
        let fixpoint = range(Expr::int(0), Expr::int(5), StepOp::Pow, Expr::int(2));
        assert_eq!(expand_range(&fixpoint), None);
    }

    #[test]
    fn test_render_number() {
        assert_eq!(render_number(2.0), "2");
        assert_eq!(render_number(2.5), "2.5");
        assert_eq!(render_number(f64::INFINITY), "Infinity");
        assert_eq!(render_number(f64::NEG_INFINITY), "-Infinity");
    }
}
