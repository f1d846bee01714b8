// ABOUTME: End-to-end tests across lexing, parsing, macro expansion, and eval

use lc3::env::{Env, Environment};
use lc3::eval::eval_program;
use lc3::lexer::Lexer;
use lc3::macros::{define_macros, expand_macros};
use lc3::object::Object;
use lc3::parser::Parser;

/// Runs source through the full pipeline against the given environments.
fn run_with(input: &str, env: &Env, macro_env: &Env) -> Object {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer);
    let mut program = parser.parse_program();
    assert!(
        parser.errors().is_empty(),
        "parser errors for {:?}: {:?}",
        input,
        parser.errors()
    );

    define_macros(&mut program, macro_env);
    let expanded = expand_macros(program, macro_env).expect("macro expansion failed");
    eval_program(&expanded, env).unwrap_or(Object::Null)
}

fn run(input: &str) -> Object {
    let env = Environment::new();
    let macro_env = Environment::new();
    run_with(input, &env, &macro_env)
}

/// Preloads lib/std.lc3, then runs the input in the same session.
fn run_with_stdlib(input: &str) -> Object {
    let env = Environment::new();
    let macro_env = Environment::new();
    run_with(include_str!("../lib/std.lc3"), &env, &macro_env);
    run_with(input, &env, &macro_env)
}

#[test]
fn test_arithmetic_end_to_end() {
    assert_eq!(
        run("(5 + 10 * 2 + 15 / 3) * 2 + -10"),
        Object::Integer(50)
    );
}

#[test]
fn test_closure_capture() {
    let input = "let newAdder = fn(x) { fn(y) { x + y }; };\
                 let addTwo = newAdder(2);\
                 addTwo(2);";
    assert_eq!(run(input), Object::Integer(4));
}

#[test]
fn test_hash_with_mixed_keys() {
    let input = "let two = \"two\";\
                 {\"one\": 10 - 9, two: 1 + 1, \"thr\" + \"ee\": 6 / 2, 4: 4, true: 5, false: 6}";
    match run(input) {
        Object::Hash(pairs) => {
            assert_eq!(pairs.len(), 6);
            let values: Vec<_> = pairs.values().map(|pair| pair.value.clone()).collect();
            assert_eq!(
                values,
                (1..=6).map(Object::Integer).collect::<Vec<_>>()
            );
        }
        other => panic!("expected hash, got {:?}", other),
    }
}

#[test]
fn test_type_mismatch_error() {
    assert_eq!(
        run("5 + true;"),
        Object::Error("type mismatch: INTEGER + BOOLEAN".to_string())
    );
}

#[test]
fn test_function_as_hash_key_error() {
    assert_eq!(
        run("{\"name\": \"Monkey\"}[fn(x) { x }];"),
        Object::Error("unusable as hash key: FUNCTION".to_string())
    );
}

#[test]
fn test_unless_macro_rewrites_to_inverted_if() {
    let input = "let unless = macro(condition, consequence, alternative) {\
                   quote(if (!(unquote(condition))) {\
                     unquote(consequence);\
                   } else {\
                     unquote(alternative);\
                   });\
                 };\
                 unless(10 > 5, puts(\"not greater\"), puts(\"greater\"));";
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer);
    let mut program = parser.parse_program();
    assert!(parser.errors().is_empty());

    let macro_env = Environment::new();
    define_macros(&mut program, &macro_env);
    let expanded = expand_macros(program, &macro_env).expect("expansion failed");

    let expected_lexer =
        Lexer::new("if (!(10 > 5)) { puts(\"not greater\") } else { puts(\"greater\") }");
    let mut expected_parser = Parser::new(expected_lexer);
    let expected = expected_parser.parse_program();

    assert_eq!(expanded.to_string(), expected.to_string());
}

#[test]
fn test_unless_macro_evaluates_the_right_branch() {
    let input = "let unless = macro(condition, consequence, alternative) {\
                   quote(if (!(unquote(condition))) {\
                     unquote(consequence);\
                   } else {\
                     unquote(alternative);\
                   });\
                 };\
                 unless(10 > 5, 1, 2);";
    assert_eq!(run(input), Object::Integer(2));

    let flipped = "let unless = macro(condition, consequence, alternative) {\
                     quote(if (!(unquote(condition))) {\
                       unquote(consequence);\
                     } else {\
                       unquote(alternative);\
                     });\
                   };\
                   unless(10 < 5, 1, 2);";
    assert_eq!(run(flipped), Object::Integer(1));
}

#[test]
fn test_higher_order_functions() {
    let input = "let apply = fn(f, x) { f(x) };\
                 let double = fn(n) { n * 2 };\
                 apply(double, 21)";
    assert_eq!(run(input), Object::Integer(42));
}

#[test]
fn test_environment_persists_across_inputs() {
    let env = Environment::new();
    let macro_env = Environment::new();
    run_with("let counter = 10;", &env, &macro_env);
    run_with("let bump = fn(x) { x + 1 };", &env, &macro_env);
    assert_eq!(
        run_with("bump(counter)", &env, &macro_env),
        Object::Integer(11)
    );
}

#[test]
fn test_macros_persist_across_inputs() {
    let env = Environment::new();
    let macro_env = Environment::new();
    run_with(
        "let swap = macro(a, b) { quote(unquote(b) - unquote(a)); };",
        &env,
        &macro_env,
    );
    assert_eq!(run_with("swap(1, 10)", &env, &macro_env), Object::Integer(9));
}

#[test]
fn test_return_exits_only_the_enclosing_function() {
    let input = "let early = fn() { return 1; 2 };\
                 early() + 10";
    assert_eq!(run(input), Object::Integer(11));
}

#[test]
fn test_array_pipeline() {
    let input = "let xs = [1, 2, 3, 4];\
                 push(rest(xs), first(xs))[3]";
    assert_eq!(run(input), Object::Integer(1));
}

#[test]
fn test_stdlib_map() {
    assert_eq!(
        run_with_stdlib("map([1, 2, 3], fn(x) { x * 2 })"),
        Object::Array(vec![
            Object::Integer(2),
            Object::Integer(4),
            Object::Integer(6),
        ])
    );
}

#[test]
fn test_stdlib_filter() {
    assert_eq!(
        run_with_stdlib("filter([1, 2, 3, 4], fn(x) { x > 2 })"),
        Object::Array(vec![Object::Integer(3), Object::Integer(4)])
    );
}

#[test]
fn test_stdlib_reduce_and_sum() {
    assert_eq!(
        run_with_stdlib("reduce([1, 2, 3, 4], 1, fn(acc, el) { acc * el })"),
        Object::Integer(24)
    );
    assert_eq!(run_with_stdlib("sum([1, 2, 3, 4, 5])"), Object::Integer(15));
    assert_eq!(run_with_stdlib("sum([])"), Object::Integer(0));
}

#[test]
fn test_stdlib_unless_macro() {
    assert_eq!(
        run_with_stdlib("unless(1 > 2, \"smaller\", \"bigger\")"),
        Object::String("smaller".to_string())
    );
}

#[test]
fn test_quote_roundtrip_through_macro_env() {
    let input = "let id = macro(x) { quote(unquote(x)); };\
                 id(3 + 4)";
    assert_eq!(run(input), Object::Integer(7));
}

#[test]
fn test_len_on_empty_containers() {
    assert_eq!(run("len(\"\")"), Object::Integer(0));
    assert_eq!(run("len([])"), Object::Integer(0));
}
