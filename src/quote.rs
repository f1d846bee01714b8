// ABOUTME: quote/unquote handling and object-to-AST conversion

use crate::ast::Expression;
use crate::env::Env;
use crate::eval::eval_expression;
use crate::modify::modify_expression;
use crate::object::Object;
use crate::token::{Token, TokenKind};
use std::convert::Infallible;

/// Lifts an expression into a `Quote` object, splicing in every
/// `unquote(...)` call it contains. `unquote` arguments are evaluated in
/// the current environment; anything that cannot be converted back into
/// syntax leaves the call in place.
pub fn quote(expression: &Expression, env: &Env) -> Object {
    Object::Quote(process_unquote_calls(expression.clone(), env))
}

fn process_unquote_calls(expression: Expression, env: &Env) -> Expression {
    let processed = modify_expression(expression, &mut |expression| {
        if !is_unquote_call(&expression) {
            return Ok::<_, Infallible>(expression);
        }
        let arguments = match &expression {
            Expression::Call { arguments, .. } => arguments,
            _ => return Ok(expression),
        };
        if arguments.len() != 1 {
            return Ok(expression);
        }
        let evaluated = eval_expression(&arguments[0], env);
        Ok(convert_object_to_node(evaluated).unwrap_or(expression))
    });
    match processed {
        Ok(expression) => expression,
        Err(never) => match never {},
    }
}

fn is_unquote_call(expression: &Expression) -> bool {
    match expression {
        Expression::Call { function, .. } => function.token_literal() == "unquote",
        _ => false,
    }
}

/// Maps a runtime object back into the syntax that would produce it.
/// Quotes splice through as their inner node; only integers and booleans
/// otherwise have a syntactic form.
fn convert_object_to_node(object: Object) -> Option<Expression> {
    match object {
        Object::Integer(value) => Some(Expression::IntegerLiteral {
            token: Token::new(TokenKind::Int, value.to_string()),
            value,
        }),
        Object::Boolean(value) => {
            let token = if value {
                Token::new(TokenKind::True, "true")
            } else {
                Token::new(TokenKind::False, "false")
            };
            Some(Expression::Boolean { token, value })
        }
        Object::Quote(node) => Some(node),
        _ => None,
    }
}
