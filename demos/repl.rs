use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::panic;
use std::process;
use sublisp::evaluator;
use sublisp::host::TableHost;
use sublisp::scheme::parse_expression;

fn main() {
    // Leave a readable message behind if the line editor or the
    // interpreter panics instead of dumping a raw backtrace prompt
    if let Err(payload) = panic::catch_unwind(run_repl) {
        let detail = payload
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_owned());
        eprintln!("sublisp: internal error: {detail}");
        process::exit(1);
    }
}

fn run_repl() {
    println!("SubLisp - substitution-based Lisp interpreter");
    println!("Procedure application rewrites the body instead of binding an environment.");
    println!("Enter S-expressions like: ((lambda (x) (cons x (quote (b)))) (quote a))");
    println!("Type :help for commands, or Ctrl+C to exit.");
    println!();

    let mut rl = DefaultEditor::new().expect("Could not initialize REPL");
    let host = TableHost::with_builtins();

    loop {
        match rl.readline("sublisp> ") {
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
                    ":globals" => {
                        print_globals(&host);
                        continue;
                    }
                    ":quit" | ":exit" => {
                        println!("Goodbye!");
                        break;
                    }
                    _ => {}
                }

                // One expression per line: parse, evaluate, print, and
                // resume with the next input on failure
                match parse_expression(line) {
                    Ok(expr) => match evaluator::evaluate(&expr, &host) {
                        Ok(result) => println!("{result}"),
                        Err(e) => println!("Error: {e}"),
                    },
                    Err(e) => println!("Error: {e}"),
                }
            }

            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {err:?}");
                break;
            }
        }
    }
}

fn print_help() {
    println!("SubLisp interpreter:");
    println!("  :help    - Show this help message");
    println!("  :globals - List the host's global symbols");
    println!("  :quit    - Exit the interpreter");
    println!("  :exit    - Exit the interpreter");
    println!("  Ctrl+C   - Exit the interpreter");
    println!();
    println!("Special forms: quote, if, lambda");
    println!("  (quote x) or 'x   - literal data, never evaluated");
    println!("  (if c a b)        - any value except #f selects a");
    println!("  (lambda (x y) e)  - a procedure; applied by substitution");
    println!();
    println!("There is no define: recursion needs self-application, e.g.");
    println!("  ((lambda (self n) (if (null? n) 0 (+ 1 (self self (cdr n)))))");
    println!("   (lambda (self n) (if (null? n) 0 (+ 1 (self self (cdr n)))))");
    println!("   (quote (a b c)))");
    println!();
}

fn print_globals(host: &TableHost) {
    let names = host.global_names();
    println!("Global symbols ({} total):", names.len());

    let mut col = 0;
    for name in names {
        print!("  {name:<10}");
        col += 1;
        if col % 6 == 0 {
            println!();
        }
    }
    if col % 6 != 0 {
        println!();
    }
}
