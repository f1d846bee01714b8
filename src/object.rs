// ABOUTME: Runtime value types, type tags, hashing, and inspect forms

use crate::ast::{BlockStatement, Expression, Identifier};
use crate::env::Env;
use indexmap::IndexMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Native function signature. Errors come back as `Object::Error`, never as
/// a Rust error.
pub type BuiltinFunction = fn(Vec<Object>) -> Object;

/// A user-defined function closed over the environment it was created in.
#[derive(Debug, Clone)]
pub struct Function {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub env: Env,
}

/// A macro definition. Like `Function` but applied to unevaluated syntax at
/// expansion time.
#[derive(Debug, Clone)]
pub struct Macro {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub env: Env,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

/// Every value the evaluator can produce. `ReturnValue`, `Error`, `Quote`,
/// and `Macro` are internal signals and carriers, not user-constructible
/// values.
#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(String),
    Null,
    Array(Vec<Object>),
    /// Pairs are keyed by `HashKey` but keep the original key object around
    /// for `inspect`. Iteration order is first-insertion order.
    Hash(IndexMap<HashKey, HashPair>),
    Function(Function),
    Builtin(BuiltinFunction),
    ReturnValue(Box<Object>),
    Error(String),
    Quote(Expression),
    Macro(Macro),
}

/// Stable identity of a hashable value: the type tag plus a 64-bit content
/// hash. Derived purely from the value, never from pointer identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HashKey {
    kind: &'static str,
    value: u64,
}

impl Object {
    /// Type tags are stable strings used verbatim in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Integer(_) => "INTEGER",
            Object::Boolean(_) => "BOOLEAN",
            Object::String(_) => "STRING",
            Object::Null => "NULL",
            Object::Array(_) => "ARRAY",
            Object::Hash(_) => "HASH",
            Object::Function(_) => "FUNCTION",
            Object::Builtin(_) => "BUILTIN",
            Object::ReturnValue(_) => "RETURN_VALUE",
            Object::Error(_) => "ERROR",
            Object::Quote(_) => "QUOTE",
            Object::Macro(_) => "MACRO",
        }
    }

    /// Only integers, booleans, and strings may key a hash.
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Object::Integer(value) => Some(HashKey {
                kind: "INTEGER",
                value: *value as u64,
            }),
            Object::Boolean(value) => Some(HashKey {
                kind: "BOOLEAN",
                value: *value as u64,
            }),
            Object::String(value) => {
                let mut hasher = DefaultHasher::new();
                value.hash(&mut hasher);
                Some(HashKey {
                    kind: "STRING",
                    value: hasher.finish(),
                })
            }
            _ => None,
        }
    }

    pub fn inspect(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(value) => write!(f, "{}", value),
            Object::Boolean(value) => write!(f, "{}", value),
            Object::String(value) => write!(f, "{}", value),
            Object::Null => write!(f, "null"),
            Object::Array(elements) => {
                let elements = elements
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "[{}]", elements)
            }
            Object::Hash(pairs) => {
                let pairs = pairs
                    .values()
                    .map(|pair| format!("{}: {}", pair.key, pair.value))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{}}}", pairs)
            }
            Object::Function(function) => {
                let parameters = function
                    .parameters
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "fn({}) {{\n{}\n}}", parameters, function.body)
            }
            Object::Builtin(_) => write!(f, "builtin function"),
            Object::ReturnValue(value) => write!(f, "{}", value),
            Object::Error(message) => write!(f, "ERROR: {}", message),
            Object::Quote(node) => write!(f, "QUOTE({})", node),
            Object::Macro(macro_object) => {
                let parameters = macro_object
                    .parameters
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "macro({}) {{\n{}\n}}", parameters, macro_object.body)
            }
        }
    }
}

/// Structural equality by value. Functions, builtins, and macros compare
/// unequal even to themselves, mirroring their reference semantics in the
/// language.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::String(a), Object::String(b)) => a == b,
            (Object::Null, Object::Null) => true,
            (Object::Array(a), Object::Array(b)) => a == b,
            (Object::Hash(a), Object::Hash(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|((ka, pa), (kb, pb))| ka == kb && pa == pb)
            }
            (Object::ReturnValue(a), Object::ReturnValue(b)) => a == b,
            (Object::Error(a), Object::Error(b)) => a == b,
            (Object::Quote(a), Object::Quote(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_hash_keys_agree_with_equality() {
        let one_a = Object::Integer(1);
        let one_b = Object::Integer(1);
        let two = Object::Integer(2);
        assert_eq!(one_a.hash_key(), one_b.hash_key());
        assert_ne!(one_a.hash_key(), two.hash_key());
    }

    #[test]
    fn test_string_hash_keys_agree_with_equality() {
        let hello_a = Object::String("Hello World".to_string());
        let hello_b = Object::String("Hello World".to_string());
        let diff = Object::String("My name is johnny".to_string());
        assert_eq!(hello_a.hash_key(), hello_b.hash_key());
        assert_ne!(hello_a.hash_key(), diff.hash_key());
    }

    #[test]
    fn test_boolean_hash_keys_are_distinct() {
        assert_eq!(
            Object::Boolean(true).hash_key(),
            Object::Boolean(true).hash_key()
        );
        assert_ne!(
            Object::Boolean(true).hash_key(),
            Object::Boolean(false).hash_key()
        );
    }

    #[test]
    fn test_keys_of_different_types_never_collide() {
        // 1, true, and "1" all reduce to small hash payloads; the type tag
        // keeps them apart.
        let int = Object::Integer(1);
        let boolean = Object::Boolean(true);
        assert_ne!(int.hash_key(), boolean.hash_key());
    }

    #[test]
    fn test_only_scalars_are_hashable() {
        assert!(Object::Integer(0).hash_key().is_some());
        assert!(Object::String(String::new()).hash_key().is_some());
        assert!(Object::Boolean(false).hash_key().is_some());
        assert!(Object::Null.hash_key().is_none());
        assert!(Object::Array(vec![]).hash_key().is_none());
    }

    #[test]
    fn test_inspect_forms() {
        assert_eq!(Object::Integer(5).inspect(), "5");
        assert_eq!(Object::Boolean(true).inspect(), "true");
        assert_eq!(Object::String("raw text".to_string()).inspect(), "raw text");
        assert_eq!(Object::Null.inspect(), "null");
        assert_eq!(
            Object::Error("type mismatch: INTEGER + BOOLEAN".to_string()).inspect(),
            "ERROR: type mismatch: INTEGER + BOOLEAN"
        );
        let array = Object::Array(vec![Object::Integer(1), Object::Integer(2)]);
        assert_eq!(array.inspect(), "[1, 2]");
    }

    #[test]
    fn test_structural_equality() {
        let a = Object::Array(vec![Object::Integer(1), Object::String("x".to_string())]);
        let b = Object::Array(vec![Object::Integer(1), Object::String("x".to_string())]);
        assert_eq!(a, b);
        assert_ne!(a, Object::Array(vec![Object::Integer(1)]));
        assert_eq!(Object::Null, Object::Null);
        assert_ne!(Object::Integer(1), Object::Boolean(true));
    }
}
