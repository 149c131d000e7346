use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::env;
use std::io::Write;
use tracing_subscriber::EnvFilter;

use expense_tracker::{call_tool, catalog, read_resource, Config, Ledger, CATEGORIES_URI};

const USAGE: &str = "Usage:
  expense-tracker init                     Create the expense table
  expense-tracker tools                    List available operations
  expense-tracker call <tool> [json-args]  Run one operation
  expense-tracker categories               Print the categories document";

fn main() -> Result<()> {
    // Logs go to stderr so command output stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let config = Config::from_env();
    let ledger = Ledger::from_config(&config);

    match args.get(1).map(String::as_str) {
        Some("init") => run_init(&ledger),
        Some("tools") => run_tools(),
        Some("call") => {
            let name = match args.get(2) {
                Some(name) => name,
                None => bail!("missing tool name\n\n{}", USAGE),
            };
            run_call(&ledger, name, args.get(3).map(String::as_str))
        }
        Some("categories") => run_categories(&ledger),
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}

fn run_init(ledger: &Ledger) -> Result<()> {
    println!("🗄️  Expense Tracker - database setup");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    ledger
        .initialize()
        .with_context(|| format!("Failed to initialize {:?}", ledger.db_path()))?;
    println!("✓ Table ready at {:?}", ledger.db_path());

    let count = ledger.count()?;
    println!("✓ Database contains {} entries", count);

    Ok(())
}

fn run_tools() -> Result<()> {
    for tool in catalog() {
        println!("{:<16} {}", tool.name, tool.description);
        println!("{:<16} args: {}", "", tool.arguments.join(", "));
    }

    Ok(())
}

fn run_call(ledger: &Ledger, name: &str, raw_args: Option<&str>) -> Result<()> {
    let args: Value = match raw_args {
        Some(raw) => serde_json::from_str(raw).context("Arguments must be a JSON object")?,
        None => Value::Null,
    };

    ledger.initialize()?;
    let result = call_tool(ledger, name, args)?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

fn run_categories(ledger: &Ledger) -> Result<()> {
    let content = read_resource(ledger, CATEGORIES_URI)
        .with_context(|| format!("Failed to read {:?}", ledger.categories_path()))?;

    let mut stdout = std::io::stdout();
    stdout.write_all(&content.bytes)?;
    stdout.flush()?;

    Ok(())
}
