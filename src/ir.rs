//! Typed program representation shared by the analyzer, the optimizer and
//! the code generator.
//!
//! Declared entities (variables, parameters, functions, classes and the
//! standard-library intrinsics) live in an arena owned by the [`Program`];
//! statements and expressions refer to them by [`EntityId`]. Ids are stable
//! for the whole compilation, which is what lets the analyzer declare an
//! entity before it is fully defined and the generator name entities by
//! identity rather than by name.

use crate::types::{ClassType, FunctionType, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
    pub entities: Entities,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub mutable: bool,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub default: Option<Expr>,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionEntity {
    pub name: String,
    pub params: Vec<EntityId>,
    pub body: Vec<Stmt>,
    pub ty: FunctionType,
    /// Owning class when the function is a method.
    pub class: Option<EntityId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassEntity {
    pub name: String,
    pub constructor_params: Vec<EntityId>,
    pub methods: Vec<EntityId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intrinsic {
    Print,
    PrintLine,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Variable(Variable),
    Parameter(Parameter),
    Function(FunctionEntity),
    Class(ClassEntity),
    Intrinsic(Intrinsic),
}

impl Entity {
    pub fn name(&self) -> &str {
        match self {
            Entity::Variable(v) => &v.name,
            Entity::Parameter(p) => &p.name,
            Entity::Function(f) => &f.name,
            Entity::Class(c) => &c.name,
            Entity::Intrinsic(Intrinsic::Print) => "print",
            Entity::Intrinsic(Intrinsic::PrintLine) => "printLine",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entities {
    items: Vec<Entity>,
}

impl Entities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, entity: Entity) -> EntityId {
        self.items.push(entity);
        EntityId(self.items.len() - 1)
    }

    pub fn get(&self, id: EntityId) -> &Entity {
        &self.items[id.0]
    }

    pub fn get_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.items[id.0]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn name(&self, id: EntityId) -> &str {
        self.get(id).name()
    }

    pub fn function(&self, id: EntityId) -> Option<&FunctionEntity> {
        match self.get(id) {
            Entity::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn function_mut(&mut self, id: EntityId) -> Option<&mut FunctionEntity> {
        match self.get_mut(id) {
            Entity::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn class(&self, id: EntityId) -> Option<&ClassEntity> {
        match self.get(id) {
            Entity::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn class_mut(&mut self, id: EntityId) -> Option<&mut ClassEntity> {
        match self.get_mut(id) {
            Entity::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn parameter(&self, id: EntityId) -> Option<&Parameter> {
        match self.get(id) {
            Entity::Parameter(p) => Some(p),
            _ => None,
        }
    }

    pub fn parameter_mut(&mut self, id: EntityId) -> Option<&mut Parameter> {
        match self.get_mut(id) {
            Entity::Parameter(p) => Some(p),
            _ => None,
        }
    }

    /// The type an entity has when it is used as a value. Classes and
    /// intrinsics are not values.
    pub fn value_type(&self, id: EntityId) -> Option<Type> {
        match self.get(id) {
            Entity::Variable(v) => Some(v.ty.clone()),
            Entity::Parameter(p) => Some(p.ty.clone()),
            Entity::Function(f) => Some(Type::Function(Box::new(f.ty.clone()))),
            Entity::Class(_) | Entity::Intrinsic(_) => None,
        }
    }

    pub fn class_type(&self, id: EntityId) -> Type {
        Type::Class(ClassType { id, name: self.name(id).to_string() })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VariableDeclaration { variable: EntityId, initializer: Expr },
    Assignment { target: Expr, source: Expr },
    If(IfStmt),
    While { test: Expr, body: Vec<Stmt> },
    For { iterator: EntityId, collection: Expr, body: Vec<Stmt> },
    Break,
    Return(Option<Expr>),
    FunctionDeclaration(EntityId),
    ClassDeclaration(EntityId),
    Expression(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub test: Expr,
    pub consequent: Vec<Stmt>,
    pub alternates: Vec<ElseIf>,
    pub otherwise: Option<Vec<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseIf {
    pub test: Expr,
    pub consequent: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    EmptyArray,
    Entity(EntityId),
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr> },
    Unary { op: UnaryOp, operand: Box<Expr> },
    Range(Box<Range>),
    Array(Vec<Expr>),
    Index { base: Box<Expr>, index: Box<Expr> },
    Slice { base: Box<Expr>, start: Box<Expr>, end: Box<Expr> },
    /// One argument slot per declared parameter; `None` means the parameter
    /// falls back to its default value.
    Call { callee: EntityId, args: Vec<Option<Expr>> },
    ConstructorCall { class: EntityId, args: Vec<Option<Expr>> },
    MethodCall { object: Box<Expr>, method: EntityId, args: Vec<Option<Expr>> },
    Member { object: Box<Expr>, field: EntityId },
    Conditional { test: Box<Expr>, consequent: Box<Expr>, alternate: Box<Expr> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    pub start: Expr,
    pub end: Expr,
    pub op: StepOp,
    pub step: Expr,
    pub element_type: Type,
}

impl Range {
    /// Start, end and step when all three are numeric literals.
    pub fn literal_parts(&self) -> Option<(f64, f64, f64)> {
        Some((self.start.as_number()?, self.end.as_number()?, self.step.as_number()?))
    }

    /// Whether the iteration moves upward and is bounded by `<=` rather
    /// than downward with `>=`. Steps that are not literals count upward
    /// for `+ * **` and downward for `- / %`.
    pub fn ascending(&self) -> bool {
        let step = self.step.as_number();
        match self.op {
            StepOp::Add => step.is_none_or(|s| s >= 0.0),
            StepOp::Sub => step.is_some_and(|s| s < 0.0),
            StepOp::Mul | StepOp::Pow => step.is_none_or(|s| s > 1.0),
            StepOp::Div => step.is_some_and(|s| s > 0.0 && s < 1.0),
            StepOp::Mod => false,
        }
    }

    /// Steps that never move the iterator (`+ 0`, `* 1`, `/ 1`, ...).
    pub fn is_degenerate(&self) -> bool {
        match (self.op, self.step.as_number()) {
            (StepOp::Add | StepOp::Sub, Some(s)) => s == 0.0,
            (StepOp::Mul | StepOp::Pow | StepOp::Div, Some(s)) => s == 0.0 || s == 1.0,
            (StepOp::Mod, Some(s)) => s == 0.0,
            (_, None) => false,
        }
    }

    /// A range with literal parts that yields no element.
    pub fn is_provably_empty(&self) -> bool {
        if self.is_degenerate() {
            return false;
        }
        match self.literal_parts() {
            Some((start, end, _)) if self.ascending() => start > end,
            Some((start, end, _)) => start < end,
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Mod,
}

impl StepOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(StepOp::Add),
            "-" => Some(StepOp::Sub),
            "*" => Some(StepOp::Mul),
            "/" => Some(StepOp::Div),
            "**" => Some(StepOp::Pow),
            "%" => Some(StepOp::Mod),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            StepOp::Add => "+",
            StepOp::Sub => "-",
            StepOp::Mul => "*",
            StepOp::Div => "/",
            StepOp::Pow => "**",
            StepOp::Mod => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(BinaryOp::Add),
            "-" => Some(BinaryOp::Sub),
            "*" => Some(BinaryOp::Mul),
            "/" => Some(BinaryOp::Div),
            "%" => Some(BinaryOp::Mod),
            "**" => Some(BinaryOp::Pow),
            "<" => Some(BinaryOp::Lt),
            "<=" => Some(BinaryOp::Le),
            ">" => Some(BinaryOp::Gt),
            ">=" => Some(BinaryOp::Ge),
            "=" => Some(BinaryOp::Eq),
            "!=" => Some(BinaryOp::Ne),
            "and" => Some(BinaryOp::And),
            "or" => Some(BinaryOp::Or),
            _ => None,
        }
    }

    /// The operator as written in PANIC source.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod | BinaryOp::Pow
        )
    }

    pub fn is_ordering(self) -> bool {
        matches!(self, BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl Expr {
    pub fn new(kind: ExprKind, ty: Type) -> Self {
        Self { kind, ty }
    }

    pub fn int(value: i64) -> Self {
        Self::new(ExprKind::Int(value), Type::Int)
    }

    pub fn float(value: f64) -> Self {
        Self::new(ExprKind::Float(value), Type::Float)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ExprKind::Str(value.into()), Type::String)
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(ExprKind::Bool(value), Type::Boolean)
    }

    pub fn entity(id: EntityId, ty: Type) -> Self {
        Self::new(ExprKind::Entity(id), ty)
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr, ty: Type) -> Self {
        Self::new(ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) }, ty)
    }

    pub fn unary(op: UnaryOp, operand: Expr, ty: Type) -> Self {
        Self::new(ExprKind::Unary { op, operand: Box::new(operand) }, ty)
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Int(_) | ExprKind::Float(_) | ExprKind::Str(_) | ExprKind::Bool(_)
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.kind {
            ExprKind::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Numeric literal value, for either int or float literals.
    pub fn as_number(&self) -> Option<f64> {
        match self.kind {
            ExprKind::Int(i) => Some(i as f64),
            ExprKind::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn is_number(&self, value: f64) -> bool {
        self.as_number() == Some(value)
    }
}
