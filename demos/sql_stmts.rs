use std::env;
use std::fs;

use googlesql_separator::separate_preserving_comments_with_status;

/// Separate specified files and print all statements.
// RUST_LOG=separator=debug
fn main() {
    env_logger::init();
    let args = env::args();
    for arg in args.skip(1) {
        println!("{arg}");
        let input = match fs::read_to_string(&arg) {
            Ok(input) => input,
            Err(err) => {
                eprintln!("Err: {err} in {arg}");
                continue;
            }
        };
        let (stmts, status) = separate_preserving_comments_with_status(&input, &[r"\G"]);
        for stmt in &stmts {
            println!("{stmt}");
        }
        if let Some(last) = stmts.last().filter(|stmt| !stmt.is_terminated()) {
            eprintln!("Warn: missing terminator after {:?} in {arg}", last.statement);
        }
        if let Err(err) = status.check() {
            eprintln!("Err: {err} in {arg}");
        }
    }
}
