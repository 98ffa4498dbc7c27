//! Non-interactive CLI for exercising the index engine.
//!
//! Usage:
//!   indexfile-cli <db_path> create
//!   indexfile-cli <db_path> insert <key> <value>
//!   indexfile-cli <db_path> search <key>
//!   indexfile-cli <db_path> load <text_path>
//!   indexfile-cli <db_path> extract <text_path>
//!   indexfile-cli <db_path> print
//!   indexfile-cli <db_path> stats

use indexfile::{io, Engine};
use std::env;
use std::io::stderr;
use std::process::exit;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: indexfile-cli <db_path> <command> [args...]");
        eprintln!("Commands:");
        eprintln!("  create                    - Create a new index file");
        eprintln!("  insert <key> <value>      - Insert a key-value pair");
        eprintln!("  search <key>              - Look up a key");
        eprintln!("  load <text_path>          - Bulk load <key>,<value> lines");
        eprintln!("  extract <text_path>       - Bulk extract to <key>,<value> lines");
        eprintln!("  print                     - Print the current tree shape as JSON");
        eprintln!("  stats                     - Show index statistics");
        exit(1);
    }

    let db_path = &args[1];
    let command = args[2].as_str();

    if command == "create" {
        match Engine::create(db_path) {
            Ok(_) => println!("OK"),
            Err(e) => {
                eprintln!("ERROR: {e}");
                exit(1);
            }
        }
        return;
    }

    let mut engine = match Engine::open(db_path) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("ERROR: {e}");
            exit(1);
        }
    };

    match command {
        "insert" => {
            if args.len() < 5 {
                eprintln!("Usage: indexfile-cli <db_path> insert <key> <value>");
                exit(1);
            }
            let (key, value) = match (args[3].parse(), args[4].parse()) {
                (Ok(k), Ok(v)) => (k, v),
                _ => {
                    eprintln!("ERROR: key and value must be non-negative integers");
                    exit(1);
                }
            };
            match engine.insert(key, value) {
                Ok(()) => println!("OK"),
                Err(e) => {
                    eprintln!("ERROR: {e}");
                    exit(1);
                }
            }
        }

        "search" => {
            if args.len() < 4 {
                eprintln!("Usage: indexfile-cli <db_path> search <key>");
                exit(1);
            }
            let key: u64 = match args[3].parse() {
                Ok(k) => k,
                Err(_) => {
                    eprintln!("ERROR: key must be a non-negative integer");
                    exit(1);
                }
            };
            match engine.search(key) {
                Ok(Some(value)) => println!("{value}"),
                Ok(None) => println!("NOT_FOUND"),
                Err(e) => {
                    eprintln!("ERROR: {e}");
                    exit(1);
                }
            }
        }

        "load" => {
            if args.len() < 4 {
                eprintln!("Usage: indexfile-cli <db_path> load <text_path>");
                exit(1);
            }
            let mut diagnostics = stderr();
            match io::load(&mut engine, &args[3], &mut diagnostics) {
                Ok(count) => println!("LOADED: {count}"),
                Err(e) => {
                    eprintln!("ERROR: {e}");
                    exit(1);
                }
            }
        }

        "extract" => {
            if args.len() < 4 {
                eprintln!("Usage: indexfile-cli <db_path> extract <text_path>");
                exit(1);
            }
            match io::extract(&mut engine, &args[3]) {
                Ok(count) => println!("EXTRACTED: {count}"),
                Err(e) => {
                    eprintln!("ERROR: {e}");
                    exit(1);
                }
            }
        }

        "print" => match engine.export_tree() {
            Ok(Some(tree)) => match serde_json::to_string_pretty(&tree) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("ERROR: {e}");
                    exit(1);
                }
            },
            Ok(None) => println!("Empty Tree."),
            Err(e) => {
                eprintln!("ERROR: {e}");
                exit(1);
            }
        },

        "stats" => match engine.traverse() {
            Ok(pairs) => {
                println!("path: {}", engine.path().display());
                println!("entry_count: {}", pairs.len());
            }
            Err(e) => {
                eprintln!("ERROR: {e}");
                exit(1);
            }
        },

        _ => {
            eprintln!("Unknown command: {command}");
            exit(1);
        }
    }

    if let Err(e) = engine.close() {
        eprintln!("Warning: failed to close cleanly: {e}");
    }
}
