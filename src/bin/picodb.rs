//! # CLI Entry Point
//!
//! ```bash
//! # Open (or create) a database file and start the prompt
//! picodb ./my.db
//!
//! # Show version / help
//! picodb --version
//! picodb --help
//! ```

use eyre::{bail, Result, WrapErr};
use std::env;
use std::path::PathBuf;

use picodb::cli::Repl;
use picodb::Table;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<PathBuf> = None;
    for arg in &args[1..] {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--version" | "-v" => {
                println!("picodb {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            flag if flag.starts_with('-') => {
                bail!("unknown option: {}", flag);
            }
            path => {
                if db_path.is_some() {
                    bail!("multiple database paths specified");
                }
                db_path = Some(PathBuf::from(path));
            }
        }
    }

    let db_path = match db_path {
        Some(path) => path,
        None => {
            print_usage();
            bail!("must supply a database filename");
        }
    };

    let table = Table::open(&db_path)
        .wrap_err_with(|| format!("failed to open database at {:?}", db_path))?;

    Repl::new(table)?.run()
}

fn print_usage() {
    println!("picodb - minimal single-file embedded database");
    println!();
    println!("USAGE:");
    println!("    picodb [OPTIONS] <DATABASE_PATH>");
    println!();
    println!("ARGS:");
    println!("    <DATABASE_PATH>    Path to the database file (created if missing)");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help         Print help information");
    println!("    -v, --version      Print version information");
}
