// ABOUTME: One-shot interpretation: parse, expand macros, evaluate, print

use crate::env::{Env, Environment};
use crate::eval::eval_program;
use crate::lexer::Lexer;
use crate::macros::{define_macros, expand_macros};
use crate::object::Object;
use crate::parser::Parser;
use std::fs;
use std::io;
use std::path::Path;

/// Runs one source string against the given environments and prints the
/// outcome: parser errors, a runtime error from macro expansion, or the
/// inspect form of the final value.
pub fn interp(input: &str, env: &Env, macro_env: &Env) {
    if let Some(result) = run_source(input, env, macro_env) {
        println!("{}", result.inspect());
    }
}

/// Like `interp` but discards the final value, so preloading the standard
/// library does not echo its last binding. Errors still print.
pub fn load_prelude(input: &str, env: &Env, macro_env: &Env) {
    run_source(input, env, macro_env);
}

fn run_source(input: &str, env: &Env, macro_env: &Env) -> Option<Object> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer);
    let mut program = parser.parse_program();
    if report_parser_errors(&parser) {
        return None;
    }

    define_macros(&mut program, macro_env);
    match expand_macros(program, macro_env) {
        Ok(expanded) => eval_program(&expanded, env),
        Err(error) => {
            println!("runtime error: {}", error);
            None
        }
    }
}

fn report_parser_errors(parser: &Parser) -> bool {
    let errors = parser.errors();
    if errors.is_empty() {
        return false;
    }
    println!("parser has {} errors", errors.len());
    for error in errors {
        println!("parser error: {}", error);
    }
    true
}

/// Reads an entire file as UTF-8 source and interprets it once.
pub fn load(path: &Path, env: &Env, macro_env: &Env) -> io::Result<()> {
    let input = fs::read_to_string(path)?;
    interp(&input, env, macro_env);
    Ok(())
}

/// Executes a script file with fresh environments.
pub fn run(path: &Path) -> io::Result<()> {
    let env = Environment::new();
    let macro_env = Environment::new();
    load(path, &env, &macro_env)
}
