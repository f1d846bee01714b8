// ABOUTME: Recursive tree-walking evaluator over the AST

use crate::ast::{BlockStatement, Expression, Program, Statement};
use crate::builtins;
use crate::env::{Env, Environment};
use crate::object::{Function, HashPair, Object};
use crate::quote;
use indexmap::IndexMap;
use std::rc::Rc;

/// Evaluates a whole program. A `ReturnValue` reaching the top is unwrapped;
/// an `Error` stops evaluation and becomes the result. `None` means the
/// program had no statements to produce a value.
pub fn eval_program(program: &Program, env: &Env) -> Option<Object> {
    let mut result = None;
    for statement in &program.statements {
        match eval_statement(statement, env) {
            Object::ReturnValue(value) => return Some(*value),
            error @ Object::Error(_) => return Some(error),
            object => result = Some(object),
        }
    }
    result
}

/// Evaluates a block, passing `ReturnValue` and `Error` through unmodified
/// so the enclosing program or call boundary can consume them.
pub fn eval_block_statement(block: &BlockStatement, env: &Env) -> Object {
    let mut result = Object::Null;
    for statement in &block.statements {
        result = eval_statement(statement, env);
        if matches!(result, Object::ReturnValue(_) | Object::Error(_)) {
            return result;
        }
    }
    result
}

fn eval_statement(statement: &Statement, env: &Env) -> Object {
    match statement {
        Statement::Let { name, value, .. } => {
            let value = eval_expression(value, env);
            if is_error(&value) {
                return value;
            }
            env.set(name.value.clone(), value)
        }
        Statement::Return { value, .. } => {
            let value = eval_expression(value, env);
            if is_error(&value) {
                return value;
            }
            Object::ReturnValue(Box::new(value))
        }
        Statement::Expression { expression, .. } => eval_expression(expression, env),
    }
}

pub fn eval_expression(expression: &Expression, env: &Env) -> Object {
    match expression {
        Expression::IntegerLiteral { value, .. } => Object::Integer(*value),
        Expression::StringLiteral { value, .. } => Object::String(value.clone()),
        Expression::Boolean { value, .. } => Object::Boolean(*value),
        Expression::Identifier(identifier) => eval_identifier(&identifier.value, env),
        Expression::Prefix {
            operator, right, ..
        } => {
            let right = eval_expression(right, env);
            if is_error(&right) {
                return right;
            }
            eval_prefix_expression(operator, right)
        }
        Expression::Infix {
            left,
            operator,
            right,
            ..
        } => {
            let left = eval_expression(left, env);
            if is_error(&left) {
                return left;
            }
            let right = eval_expression(right, env);
            if is_error(&right) {
                return right;
            }
            eval_infix_expression(operator, left, right)
        }
        Expression::If {
            condition,
            consequence,
            alternative,
            ..
        } => {
            let condition = eval_expression(condition, env);
            if is_error(&condition) {
                return condition;
            }
            if is_truthy(&condition) {
                eval_block_statement(consequence, env)
            } else if let Some(alternative) = alternative {
                eval_block_statement(alternative, env)
            } else {
                Object::Null
            }
        }
        Expression::Function {
            parameters, body, ..
        } => Object::Function(Function {
            parameters: parameters.clone(),
            body: body.clone(),
            env: Rc::clone(env),
        }),
        Expression::Call {
            function,
            arguments,
            ..
        } => {
            // quote suppresses evaluation of its single argument.
            if function.token_literal() == "quote" && arguments.len() == 1 {
                return quote::quote(&arguments[0], env);
            }
            let function = eval_expression(function, env);
            if is_error(&function) {
                return function;
            }
            match eval_expressions(arguments, env) {
                Ok(args) => apply_function(function, args),
                Err(error) => error,
            }
        }
        Expression::Array { elements, .. } => match eval_expressions(elements, env) {
            Ok(elements) => Object::Array(elements),
            Err(error) => error,
        },
        Expression::Index { left, index, .. } => {
            let left = eval_expression(left, env);
            if is_error(&left) {
                return left;
            }
            let index = eval_expression(index, env);
            if is_error(&index) {
                return index;
            }
            eval_index_expression(left, index)
        }
        Expression::Hash { pairs, .. } => eval_hash_literal(pairs, env),
        // A macro literal outside a `let` never survives expansion with a
        // meaning; it evaluates to nothing.
        Expression::Macro { .. } => Object::Null,
    }
}

pub fn is_error(object: &Object) -> bool {
    matches!(object, Object::Error(_))
}

fn is_truthy(object: &Object) -> bool {
    match object {
        Object::Boolean(value) => *value,
        Object::Null => false,
        _ => true,
    }
}

fn eval_identifier(name: &str, env: &Env) -> Object {
    if let Some(value) = env.get(name) {
        return value;
    }
    if let Some(builtin) = builtins::lookup(name) {
        return builtin;
    }
    Object::Error(format!("identifier not found: {}", name))
}

fn eval_prefix_expression(operator: &str, right: Object) -> Object {
    match operator {
        "!" => eval_bang_operator_expression(right),
        "-" => eval_minus_prefix_operator_expression(right),
        _ => Object::Error(format!(
            "unknown operator: {}{}",
            operator,
            right.type_name()
        )),
    }
}

fn eval_bang_operator_expression(right: Object) -> Object {
    Object::Boolean(!is_truthy(&right))
}

fn eval_minus_prefix_operator_expression(right: Object) -> Object {
    match right {
        Object::Integer(value) => Object::Integer(-value),
        other => Object::Error(format!("unknown operator: -{}", other.type_name())),
    }
}

fn eval_infix_expression(operator: &str, left: Object, right: Object) -> Object {
    match (&left, &right) {
        (Object::Integer(l), Object::Integer(r)) => {
            eval_integer_infix_expression(operator, *l, *r)
        }
        (Object::String(l), Object::String(r)) => eval_string_infix_expression(operator, l, r),
        _ => match operator {
            // Identity comparison: meaningful for booleans and null, always
            // unequal for anything else.
            "==" => Object::Boolean(objects_identical(&left, &right)),
            "!=" => Object::Boolean(!objects_identical(&left, &right)),
            _ if left.type_name() != right.type_name() => Object::Error(format!(
                "type mismatch: {} {} {}",
                left.type_name(),
                operator,
                right.type_name()
            )),
            _ => Object::Error(format!(
                "unknown operator: {} {} {}",
                left.type_name(),
                operator,
                right.type_name()
            )),
        },
    }
}

fn objects_identical(left: &Object, right: &Object) -> bool {
    match (left, right) {
        (Object::Boolean(l), Object::Boolean(r)) => l == r,
        (Object::Null, Object::Null) => true,
        _ => false,
    }
}

fn eval_integer_infix_expression(operator: &str, left: i64, right: i64) -> Object {
    match operator {
        "+" => Object::Integer(left + right),
        "-" => Object::Integer(left - right),
        "*" => Object::Integer(left * right),
        "/" => Object::Integer(left / right),
        "<" => Object::Boolean(left < right),
        ">" => Object::Boolean(left > right),
        "==" => Object::Boolean(left == right),
        "!=" => Object::Boolean(left != right),
        _ => Object::Error(format!(
            "unknown operator: INTEGER {} INTEGER",
            operator
        )),
    }
}

fn eval_string_infix_expression(operator: &str, left: &str, right: &str) -> Object {
    if operator == "+" {
        let mut concatenated = String::with_capacity(left.len() + right.len());
        concatenated.push_str(left);
        concatenated.push_str(right);
        Object::String(concatenated)
    } else {
        Object::Error(format!("unknown operator: STRING {} STRING", operator))
    }
}

/// Evaluates left to right; the first error aborts and is returned as `Err`.
fn eval_expressions(expressions: &[Expression], env: &Env) -> Result<Vec<Object>, Object> {
    let mut results = Vec::with_capacity(expressions.len());
    for expression in expressions {
        let evaluated = eval_expression(expression, env);
        if is_error(&evaluated) {
            return Err(evaluated);
        }
        results.push(evaluated);
    }
    Ok(results)
}

pub fn apply_function(function: Object, args: Vec<Object>) -> Object {
    match function {
        Object::Function(function) => {
            if args.len() != function.parameters.len() {
                return Object::Error(format!(
                    "wrong number of arguments. got={}, want={}",
                    args.len(),
                    function.parameters.len()
                ));
            }
            let extended = extend_function_env(&function, args);
            let evaluated = eval_block_statement(&function.body, &extended);
            unwrap_return_value(evaluated)
        }
        Object::Builtin(builtin) => builtin(args),
        other => Object::Error(format!("not a function: {}", other.type_name())),
    }
}

fn extend_function_env(function: &Function, args: Vec<Object>) -> Env {
    let env = Environment::new_enclosed(Rc::clone(&function.env));
    for (parameter, arg) in function.parameters.iter().zip(args) {
        env.set(parameter.value.clone(), arg);
    }
    env
}

/// Unwraps at the call boundary so a `return` only exits the function it
/// appears in, not every caller up the stack.
fn unwrap_return_value(object: Object) -> Object {
    match object {
        Object::ReturnValue(value) => *value,
        other => other,
    }
}

fn eval_index_expression(left: Object, index: Object) -> Object {
    match (left, index) {
        (Object::Array(elements), Object::Integer(i)) => {
            if i < 0 || i as usize >= elements.len() {
                Object::Null
            } else {
                elements[i as usize].clone()
            }
        }
        (Object::Hash(pairs), key) => match key.hash_key() {
            Some(hash_key) => pairs
                .get(&hash_key)
                .map(|pair| pair.value.clone())
                .unwrap_or(Object::Null),
            None => Object::Error(format!("unusable as hash key: {}", key.type_name())),
        },
        (left, _) => Object::Error(format!(
            "index operator not supported: {}",
            left.type_name()
        )),
    }
}

fn eval_hash_literal(node_pairs: &[(Expression, Expression)], env: &Env) -> Object {
    let mut pairs = IndexMap::new();
    for (key_node, value_node) in node_pairs {
        let key = eval_expression(key_node, env);
        if is_error(&key) {
            return key;
        }
        let hash_key = match key.hash_key() {
            Some(hash_key) => hash_key,
            None => {
                return Object::Error(format!("unusable as hash key: {}", key.type_name()));
            }
        };
        let value = eval_expression(value_node, env);
        if is_error(&value) {
            return value;
        }
        pairs.insert(hash_key, HashPair { key, value });
    }
    Object::Hash(pairs)
}
