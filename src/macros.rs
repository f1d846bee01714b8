// ABOUTME: Macro definition collection and call-site expansion

use crate::ast::{Expression, Program, Statement};
use crate::env::{Env, Environment};
use crate::error::MacroError;
use crate::eval::eval_block_statement;
use crate::modify::modify_program;
use crate::object::{Macro, Object};
use std::rc::Rc;

/// Collects every top-level `let name = macro(...) { ... };` into the macro
/// environment and removes those statements from the program. Everything
/// else is kept in order.
pub fn define_macros(program: &mut Program, env: &Env) {
    let statements = std::mem::take(&mut program.statements);
    program.statements = statements
        .into_iter()
        .filter_map(|statement| {
            if is_macro_definition(&statement) {
                add_macro(statement, env);
                None
            } else {
                Some(statement)
            }
        })
        .collect();
}

fn is_macro_definition(statement: &Statement) -> bool {
    matches!(
        statement,
        Statement::Let {
            value: Expression::Macro { .. },
            ..
        }
    )
}

fn add_macro(statement: Statement, env: &Env) {
    if let Statement::Let {
        name,
        value: Expression::Macro {
            parameters, body, ..
        },
        ..
    } = statement
    {
        let macro_object = Object::Macro(Macro {
            parameters,
            body,
            env: Rc::clone(env),
        });
        env.set(name.value, macro_object);
    }
}

/// Rewrites every call to a defined macro by evaluating the macro body with
/// the raw argument syntax bound as `Quote`s, then splicing the resulting
/// quote back into the tree. A macro body producing anything but a quote is
/// a fatal expansion error.
pub fn expand_macros(program: Program, env: &Env) -> Result<Program, MacroError> {
    modify_program(program, &mut |expression| {
        let (function, arguments) = match &expression {
            Expression::Call {
                function,
                arguments,
                ..
            } => (function, arguments),
            _ => return Ok(expression),
        };
        let macro_object = match lookup_macro(function, env) {
            Some(macro_object) => macro_object,
            None => return Ok(expression),
        };

        let args = quote_args(arguments);
        let eval_env = extend_macro_env(&macro_object, args);
        match eval_block_statement(&macro_object.body, &eval_env) {
            Object::Quote(node) => Ok(node),
            _ => Err(MacroError::NonQuoteResult),
        }
    })
}

/// A call expands only when its function position is a bare identifier
/// bound to a macro in the macro environment.
fn lookup_macro(function: &Expression, env: &Env) -> Option<Macro> {
    let identifier = match function {
        Expression::Identifier(identifier) => identifier,
        _ => return None,
    };
    match env.get(&identifier.value) {
        Some(Object::Macro(macro_object)) => Some(macro_object),
        _ => None,
    }
}

fn quote_args(arguments: &[Expression]) -> Vec<Object> {
    arguments
        .iter()
        .map(|argument| Object::Quote(argument.clone()))
        .collect()
}

fn extend_macro_env(macro_object: &Macro, args: Vec<Object>) -> Env {
    let extended = Environment::new_enclosed(Rc::clone(&macro_object.env));
    for (parameter, arg) in macro_object.parameters.iter().zip(args) {
        extended.set(parameter.value.clone(), arg);
    }
    extended
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn parse(input: &str) -> Program {
        let lexer = Lexer::new(input);
        let mut parser = Parser::new(lexer);
        let program = parser.parse_program();
        assert!(parser.errors().is_empty(), "{:?}", parser.errors());
        program
    }

    #[test]
    fn test_define_macros_strips_definitions() {
        let input = "let number = 1;\
                     let function = fn(x, y) { x + y };\
                     let mymacro = macro(x, y) { x + y; };";
        let mut program = parse(input);
        let env = Environment::new();

        define_macros(&mut program, &env);

        assert_eq!(program.statements.len(), 2);
        assert!(env.get("number").is_none());
        assert!(env.get("function").is_none());

        match env.get("mymacro") {
            Some(Object::Macro(macro_object)) => {
                let params: Vec<_> = macro_object
                    .parameters
                    .iter()
                    .map(|p| p.value.as_str())
                    .collect();
                assert_eq!(params, ["x", "y"]);
                assert_eq!(macro_object.body.to_string(), "(x + y)");
            }
            other => panic!("expected macro binding, got {:?}", other),
        }
    }

    #[test]
    fn test_define_macros_ignores_nested_definitions() {
        // Only top-level lets are scanned.
        let mut program = parse("let f = fn() { let inner = macro(x) { x }; 1 };");
        let env = Environment::new();
        define_macros(&mut program, &env);
        assert_eq!(program.statements.len(), 1);
        assert!(env.get("inner").is_none());
    }

    fn expand(input: &str) -> Program {
        let mut program = parse(input);
        let env = Environment::new();
        define_macros(&mut program, &env);
        expand_macros(program, &env).expect("expansion failed")
    }

    #[test]
    fn test_expand_macros() {
        let tests = [
            (
                "let infixExpression = macro() { quote(1 + 2); };\
                 infixExpression();",
                "(1 + 2)",
            ),
            (
                "let reverse = macro(a, b) { quote(unquote(b) - unquote(a)); };\
                 reverse(2 + 2, 10 - 5);",
                "(10 - 5) - (2 + 2)",
            ),
        ];
        for (input, expected) in tests {
            let expanded = expand(input);
            let expected_program = parse(expected);
            assert_eq!(
                expanded.to_string(),
                expected_program.to_string(),
                "input {:?}",
                input
            );
        }
    }

    #[test]
    fn test_expand_unless_macro() {
        let input = "let unless = macro(condition, consequence, alternative) {\
                       quote(if (!(unquote(condition))) {\
                         unquote(consequence);\
                       } else {\
                         unquote(alternative);\
                       });\
                     };\
                     unless(10 > 5, puts(\"not greater\"), puts(\"greater\"));";
        let expanded = expand(input);
        let expected = parse("if (!(10 > 5)) { puts(\"not greater\") } else { puts(\"greater\") }");
        assert_eq!(expanded.to_string(), expected.to_string());
    }

    #[test]
    fn test_arguments_reach_the_macro_unevaluated() {
        // `undefinedIdentifier` would be an eval error if the argument were
        // evaluated before expansion.
        let expanded = expand(
            "let ignores = macro(x) { quote(1); };\
             ignores(undefinedIdentifier);",
        );
        assert_eq!(expanded.to_string(), "1");
    }

    #[test]
    fn test_non_quote_macro_result_is_fatal() {
        let mut program = parse(
            "let bad = macro() { 1 + 2; };\
             bad();",
        );
        let env = Environment::new();
        define_macros(&mut program, &env);
        assert_eq!(
            expand_macros(program, &env),
            Err(MacroError::NonQuoteResult)
        );
    }

    #[test]
    fn test_calls_to_non_macros_are_untouched() {
        let expanded = expand("let f = fn(x) { x }; f(1 + 2);");
        assert_eq!(expanded.to_string(), "let f = fn(x) x;f((1 + 2))");
    }
}
