// ABOUTME: CLI entry point: script execution or the interactive REPL

use clap::Parser;
use lc3::env::Environment;
use lc3::interpret;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use std::path::Path;

/// lc3 interpreter
#[derive(Parser, Debug)]
#[command(name = "lc3")]
#[command(version)]
#[command(about = "A tree-walking interpreter for the lc3 language")]
struct CliArgs {
    /// Script file to run; omit it (or pass "repl") for an interactive session
    #[arg(value_name = "FILE")]
    script: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();
    match args.script.as_deref() {
        None | Some("repl") => start_repl(),
        Some(path) => {
            interpret::run(Path::new(path))?;
            Ok(())
        }
    }
}

fn start_repl() -> Result<(), Box<dyn std::error::Error>> {
    println!("lc3 Version 0.1");
    println!("Press Ctrl+c to Exit\n");

    let env = Environment::new();
    let macro_env = Environment::new();

    // Bundled standard library; every session starts with it loaded.
    interpret::load_prelude(include_str!("../lib/std.lc3"), &env, &macro_env);

    let config = Config::builder().auto_add_history(true).build();
    let mut editor = DefaultEditor::with_config(config)?;

    loop {
        match editor.readline("lc3> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                interpret::interp(&line, &env, &macro_env);
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(error) => {
                eprintln!("Error: {}", error);
                break;
            }
        }
    }
    Ok(())
}
