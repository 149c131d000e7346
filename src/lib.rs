// Expense Tracker - Core Library
// Exposes all modules for use in the CLI, the HTTP server and tests

pub mod config;
pub mod db;
pub mod error;
pub mod ledger;
pub mod resources;
pub mod tools;
pub mod validation;

#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use db::{
    CategoryTotal, Entry, EntryPatch, EntryType, NewEntry,
    setup_database, insert_entry, get_entry, list_entries,
    summarize_expenses, update_entry, set_deleted, count_entries,
};
pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use ledger::Ledger;
pub use resources::{
    ResourceContent, ResourceError, ResourceInfo,
    read_resource, CATEGORIES_URI, RESOURCES,
};
pub use tools::{call_tool, catalog, Tool, ToolFault, ToolInfo};
pub use validation::{validate_amount, validate_date};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
