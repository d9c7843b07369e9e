use lispet::ast::Value;
use lispet::builtins::create_global_env;
use lispet::eval::eval;
use lispet::reader::parse_program;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::panic;
use std::process;

fn main() {
    let result = panic::catch_unwind(run_repl);

    match result {
        Ok(code) => process::exit(code),
        Err(panic_info) => {
            eprintln!("The REPL encountered an unexpected error and must exit.");

            if let Some(msg) = panic_info.downcast_ref::<&str>() {
                eprintln!("Error: {msg}");
            } else if let Some(msg) = panic_info.downcast_ref::<String>() {
                eprintln!("Error: {msg}");
            } else {
                eprintln!("Error: Unknown panic occurred");
            }

            process::exit(1);
        }
    }
}

fn run_repl() -> i32 {
    println!("Lispet - a small Lisp with Q-expressions and errors as values");
    println!("Enter expressions like: (+ 1 2) or (def {{double}} (\\ {{x}} {{* x 2}}))");
    println!("Type :help for commands, or Ctrl+C to exit.");
    println!();

    let Ok(mut rl) = DefaultEditor::new() else {
        eprintln!("Could not initialize line editor");
        return 1;
    };
    let env = create_global_env();

    loop {
        match rl.readline("lispet> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match line {
                    ":help" => {
                        print_help();
                        continue;
                    }
                    ":env" => {
                        print_environment(&env);
                        continue;
                    }
                    ":quit" | ":exit" => {
                        println!("Goodbye!");
                        return 0;
                    }
                    _ => {}
                }

                // A whole line reads as one S-expression, so `def {x} 1`
                // works without outer parentheses
                let forms = match parse_program(line) {
                    Ok(forms) => forms,
                    Err(err) => {
                        println!("Parse error: {err}");
                        continue;
                    }
                };
                if forms.is_empty() {
                    continue;
                }

                match eval(&env, Value::Sexpr(forms)) {
                    Ok(result) => {
                        // Skip the unit value produced by definitions
                        if result != Value::unit() {
                            println!("{result}");
                        }
                    }
                    Err(exit) => {
                        println!("Goodbye!");
                        return exit.code;
                    }
                }
            }

            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => {
                println!("Goodbye!");
                return 0;
            }
            Err(err) => {
                println!("Error: {err:?}");
                return 1;
            }
        }
    }
}

fn print_help() {
    println!("Lispet interpreter:");
    println!("  :help  - Show this help message");
    println!("  :env   - Show current environment bindings");
    println!("  :quit  - Exit the interpreter");
    println!("  :exit  - Exit the interpreter");
    println!("  Ctrl+C - Exit the interpreter");
    println!();
    println!("Language overview:");
    println!("  Numbers: 42, -5, 3.14 (integers promote to decimals when mixed)");
    println!("  Strings: \"hello\\n\"");
    println!("  Booleans: True / False");
    println!("  S-expressions evaluate: (+ 1 2 3)");
    println!("  Q-expressions are data: {{1 2 3}}, evaluate with (eval {{+ 1 2}})");
    println!("  Functions: (\\ {{x y}} {{+ x y}}), partial application supported");
    println!("  Definitions: def {{name}} value (global), = {{name}} value (local)");
    println!("  Files: load \"prelude\" reads prelude.lspy");
    println!();
    println!("Examples:");
    println!("  (head {{a b c}})");
    println!("  def {{add5}} (\\ {{x}} {{+ x 5}})");
    println!("  if (> 2 1) {{\"yes\"}} {{\"no\"}}");
    println!();
}

fn print_environment(env: &lispet::env::Environment) {
    let names = env.bound_names();

    println!("Environment bindings ({} total):", names.len());
    let mut col = 0;
    for name in names {
        print!("  {name:<15}");
        col += 1;
        if col % 4 == 0 {
            println!();
        }
    }
    if col % 4 != 0 {
        println!();
    }
}
