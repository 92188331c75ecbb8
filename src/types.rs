use std::fmt;
use crate::ir::EntityId;

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Int,
    Float,
    String,
    Boolean,
    Void,
    Any,
    Array(Box<Type>),
    Optional(Box<Type>),
    Function(Box<FunctionType>),
    /// Class types are nominal: two class types are the same type only when
    /// they come from the same declaration.
    Class(ClassType),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub params: Vec<Type>,
    pub return_type: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassType {
    pub id: EntityId,
    pub name: String,
}

impl Type {
    pub fn array(base: Type) -> Self {
        Type::Array(Box::new(base))
    }

    pub fn optional(base: Type) -> Self {
        Type::Optional(Box::new(base))
    }

    pub fn function(params: Vec<Type>, return_type: Type) -> Self {
        Type::Function(Box::new(FunctionType { params, return_type }))
    }

    /// Primitive type names as they are written in PANIC source.
    pub fn from_name(name: &str) -> Option<Type> {
        match name {
            "int" => Some(Type::Int),
            "float" => Some(Type::Float),
            "string" => Some(Type::String),
            "boolean" | "bool" => Some(Type::Boolean),
            "void" => Some(Type::Void),
            "any" => Some(Type::Any),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    pub fn is_numeric_or_string(&self) -> bool {
        matches!(self, Type::Int | Type::Float | Type::String)
    }

    /// Structural equivalence; class types compare by declaration.
    pub fn equivalent(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Int, Type::Int)
            | (Type::Float, Type::Float)
            | (Type::String, Type::String)
            | (Type::Boolean, Type::Boolean)
            | (Type::Void, Type::Void)
            | (Type::Any, Type::Any) => true,
            (Type::Array(a), Type::Array(b)) => a.equivalent(b),
            (Type::Optional(a), Type::Optional(b)) => a.equivalent(b),
            (Type::Function(a), Type::Function(b)) => {
                a.return_type.equivalent(&b.return_type)
                    && a.params.len() == b.params.len()
                    && a.params.iter().zip(&b.params).all(|(x, y)| x.equivalent(y))
            }
            (Type::Class(a), Type::Class(b)) => a.id == b.id,
            _ => false,
        }
    }

    /// Whether a value of type `self` may be used where `to` is expected.
    ///
    /// Function types are covariant in their return type and contravariant in
    /// their parameter types. `any` accepts everything, but only as the target.
    pub fn assignable_to(&self, to: &Type) -> bool {
        if *to == Type::Any || self.equivalent(to) {
            return true;
        }
        match (self, to) {
            (Type::Function(from), Type::Function(to)) => {
                from.params.len() == to.params.len()
                    && from.return_type.assignable_to(&to.return_type)
                    && to.params.iter().zip(&from.params).all(|(t, f)| t.assignable_to(f))
            }
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::String => write!(f, "string"),
            Type::Boolean => write!(f, "boolean"),
            Type::Void => write!(f, "void"),
            Type::Any => write!(f, "any"),
            Type::Array(base) => write!(f, "[{}]", base),
            Type::Optional(base) => write!(f, "{}?", base),
            Type::Class(class) => write!(f, "{}", class.name),
            Type::Function(func) => {
                write!(f, "(")?;
                for (i, param) in func.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ")->{}", func.return_type)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn class(id: usize, name: &str) -> Type {
        Type::Class(ClassType { id: EntityId(id), name: name.to_string() })
    }

    fn type_strategy() -> impl Strategy<Value = Type> {
        let leaf = prop_oneof![
            Just(Type::Int),
            Just(Type::Float),
            Just(Type::String),
            Just(Type::Boolean),
            Just(Type::Void),
            Just(Type::Any),
            (0usize..3).prop_map(|id| class(id, "C")),
        ];
        leaf.prop_recursive(3, 16, 3, |inner| {
            prop_oneof![
                inner.clone().prop_map(Type::array),
                inner.clone().prop_map(Type::optional),
                (prop::collection::vec(inner.clone(), 0..3), inner)
                    .prop_map(|(params, ret)| Type::function(params, ret)),
            ]
        })
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(Type::array(Type::array(Type::Int)).to_string(), "[[int]]");
        assert_eq!(Type::optional(Type::String).to_string(), "string?");
        let f = Type::function(vec![Type::Int, Type::array(Type::Float)], Type::Boolean);
        assert_eq!(f.to_string(), "(int, [float])->boolean");
        assert_eq!(class(4, "Dog").to_string(), "Dog");
    }

    #[test]
    fn test_arrays_are_invariant() {
        assert!(!Type::array(Type::Int).assignable_to(&Type::array(Type::Any)));
        assert!(Type::array(Type::Int).assignable_to(&Type::Any));
    }

    #[test]
    fn test_any_is_not_assignable_to_concrete_types() {
        assert!(!Type::Any.assignable_to(&Type::Int));
        assert!(Type::Any.assignable_to(&Type::Any));
    }

    #[test]
    fn test_classes_compare_by_declaration() {
        assert!(class(1, "Dog").equivalent(&class(1, "Dog")));
        assert!(!class(1, "Dog").equivalent(&class(2, "Dog")));
    }

    #[test]
    fn test_function_variance() {
        let takes_any = Type::function(vec![Type::Any], Type::Int);
        let takes_int = Type::function(vec![Type::Int], Type::Any);
        // (any)->int can stand in for (int)->any, not the other way round
        assert!(takes_any.assignable_to(&takes_int));
        assert!(!takes_int.assignable_to(&takes_any));
    }

    #[test]
    fn test_function_arity_must_match() {
        let one = Type::function(vec![Type::Int], Type::Int);
        let two = Type::function(vec![Type::Int, Type::Int], Type::Int);
        assert!(!one.assignable_to(&two));
        assert!(!one.equivalent(&two));
    }

    /// `(wider, narrower)` pairs: the wider type is often the narrower one
    /// itself or `any`, and otherwise unrelated.
    fn related_pair() -> impl Strategy<Value = (Type, Type)> {
        type_strategy().prop_flat_map(|narrower| {
            let wider = prop_oneof![Just(narrower.clone()), Just(Type::Any), type_strategy()];
            (wider, Just(narrower))
        })
    }

    proptest! {
        #[test]
        fn prop_everything_is_assignable_to_any(t in type_strategy()) {
            prop_assert!(t.assignable_to(&Type::Any));
        }

        #[test]
        fn prop_assignability_is_reflexive(t in type_strategy()) {
            prop_assert!(t.equivalent(&t));
            prop_assert!(t.assignable_to(&t));
        }

        #[test]
        fn prop_functions_are_contravariant_in_params_and_covariant_in_results(
            (p1, p2) in related_pair(),
            (r2, r1) in related_pair(),
        ) {
            prop_assume!(p2.assignable_to(&p1) && r1.assignable_to(&r2));
            let from = Type::function(vec![p1], r1);
            let to = Type::function(vec![p2], r2);
            prop_assert!(from.assignable_to(&to));
        }
    }
}
