// Named operations - the call interface exposed to transports
//
// A caller names an operation and passes a JSON object of arguments. Domain
// rejections come back as `{"status": "error", "message": ...}` values; only
// unknown tools, undecodable arguments and storage faults are `Err`.

use crate::db::EntryPatch;
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::Ledger;
use crate::validation::amount_from_json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, error};

// ============================================================================
// TOOL CATALOG
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    AddExpense,
    AddCredit,
    ListExpenses,
    Summarize,
    EditExpense,
    DeleteExpense,
    RestoreExpense,
}

impl Tool {
    pub const ALL: [Tool; 7] = [
        Tool::AddExpense,
        Tool::AddCredit,
        Tool::ListExpenses,
        Tool::Summarize,
        Tool::EditExpense,
        Tool::DeleteExpense,
        Tool::RestoreExpense,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::AddExpense => "add_expense",
            Tool::AddCredit => "add_credit",
            Tool::ListExpenses => "list_expenses",
            Tool::Summarize => "summarize",
            Tool::EditExpense => "edit_expense",
            Tool::DeleteExpense => "delete_expense",
            Tool::RestoreExpense => "restore_expense",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tool::AddExpense => "Add a new expense entry.",
            Tool::AddCredit => "Add an income/credit (e.g., salary).",
            Tool::ListExpenses => "List all entries within an inclusive date range.",
            Tool::Summarize => {
                "Summarize expenses by category within an inclusive date range (expense only)."
            }
            Tool::EditExpense => "Edit an existing expense or income entry.",
            Tool::DeleteExpense => "Soft delete: hides an entry without removing it.",
            Tool::RestoreExpense => "Restore a previously deleted entry.",
        }
    }

    /// Argument names in call order
    pub fn arguments(&self) -> &'static [&'static str] {
        match self {
            Tool::AddExpense => &["amount", "category", "subcategory", "note", "date"],
            Tool::AddCredit => &["amount", "source", "note", "date"],
            Tool::ListExpenses => &["start_date", "end_date"],
            Tool::Summarize => &["start_date", "end_date", "category"],
            Tool::EditExpense => &["id", "amount", "category", "subcategory", "note", "date"],
            Tool::DeleteExpense | Tool::RestoreExpense => &["id"],
        }
    }

    /// Arguments that must be present
    pub fn required(&self) -> &'static [&'static str] {
        match self {
            Tool::AddExpense => &["amount", "category", "date"],
            Tool::AddCredit => &["amount", "source", "date"],
            Tool::ListExpenses | Tool::Summarize => &["start_date", "end_date"],
            Tool::EditExpense | Tool::DeleteExpense | Tool::RestoreExpense => &["id"],
        }
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        Tool::ALL.into_iter().find(|tool| tool.name() == name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: &'static [&'static str],
    pub required: &'static [&'static str],
}

pub fn catalog() -> Vec<ToolInfo> {
    Tool::ALL
        .iter()
        .map(|tool| ToolInfo {
            name: tool.name(),
            description: tool.description(),
            arguments: tool.arguments(),
            required: tool.required(),
        })
        .collect()
}

// ============================================================================
// FAULTS
// ============================================================================

#[derive(Debug, Error)]
pub enum ToolFault {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Internal(LedgerError),

    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

// ============================================================================
// ARGUMENTS
// ============================================================================

// `amount` stays raw JSON so "abc" is a validation result, not a decode error.

#[derive(Debug, Deserialize)]
struct AddExpenseArgs {
    amount: Value,
    category: String,
    #[serde(default)]
    subcategory: Option<String>,
    #[serde(default)]
    note: Option<String>,
    date: String,
}

#[derive(Debug, Deserialize)]
struct AddCreditArgs {
    amount: Value,
    source: String,
    #[serde(default)]
    note: Option<String>,
    date: String,
}

#[derive(Debug, Deserialize)]
struct RangeArgs {
    start_date: String,
    end_date: String,
    #[serde(default)]
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EditArgs {
    id: i64,
    #[serde(default)]
    amount: Option<Value>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    subcategory: Option<String>,
    #[serde(default)]
    note: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdArgs {
    id: i64,
}

fn decode<T: DeserializeOwned>(args: Value) -> Result<T, ToolFault> {
    let args = match args {
        Value::Null => Value::Object(Map::new()),
        Value::Object(map) => Value::Object(map),
        other => {
            return Err(ToolFault::InvalidArguments(format!(
                "expected an object, got {}",
                other
            )))
        }
    };

    serde_json::from_value(args).map_err(|e| ToolFault::InvalidArguments(e.to_string()))
}

fn amount_arg(raw: &Value) -> LedgerResult<f64> {
    amount_from_json(raw).ok_or(LedgerError::InvalidAmount)
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Run the named operation against `ledger`
pub fn call_tool(ledger: &Ledger, name: &str, args: Value) -> Result<Value, ToolFault> {
    let tool = Tool::from_name(name).ok_or_else(|| ToolFault::UnknownTool(name.to_string()))?;
    debug!(tool = tool.name(), "tool call");

    match tool {
        Tool::AddExpense => {
            let args: AddExpenseArgs = decode(args)?;
            let result = amount_arg(&args.amount).and_then(|amount| {
                ledger.add_expense(
                    amount,
                    &args.category,
                    args.subcategory.as_deref().unwrap_or(""),
                    args.note.as_deref().unwrap_or(""),
                    &args.date,
                )
            });
            respond(tool, result, |id| created(id, "Expense added successfully"))
        }
        Tool::AddCredit => {
            let args: AddCreditArgs = decode(args)?;
            let result = amount_arg(&args.amount).and_then(|amount| {
                ledger.add_credit(
                    amount,
                    &args.source,
                    args.note.as_deref().unwrap_or(""),
                    &args.date,
                )
            });
            respond(tool, result, |id| created(id, "Credit added successfully"))
        }
        Tool::ListExpenses => {
            let args: RangeArgs = decode(args)?;
            let result = ledger.list_expenses(&args.start_date, &args.end_date);
            respond(tool, result, |entries| Ok(serde_json::to_value(entries)?))
        }
        Tool::Summarize => {
            let args: RangeArgs = decode(args)?;
            let result = ledger.summarize(&args.start_date, &args.end_date, args.category.as_deref());
            respond(tool, result, |totals| Ok(serde_json::to_value(totals)?))
        }
        Tool::EditExpense => {
            let args: EditArgs = decode(args)?;
            let amount = match &args.amount {
                Some(raw) => amount_arg(raw).map(Some),
                None => Ok(None),
            };
            let result = amount.and_then(|amount| {
                let patch = EntryPatch {
                    amount,
                    category: args.category,
                    subcategory: args.subcategory,
                    note: args.note,
                    date: args.date,
                };
                ledger.edit_expense(args.id, &patch)
            });
            respond(tool, result, |_| success("Expense updated successfully"))
        }
        Tool::DeleteExpense => {
            let args: IdArgs = decode(args)?;
            let result = ledger.delete_expense(args.id);
            respond(tool, result, |_| success("Entry hidden (soft deleted)"))
        }
        Tool::RestoreExpense => {
            let args: IdArgs = decode(args)?;
            let result = ledger.restore_expense(args.id);
            respond(tool, result, |_| success("Entry restored"))
        }
    }
}

/// Shape a ledger result: rejections become error payloads, faults escape
fn respond<T, F>(tool: Tool, result: LedgerResult<T>, on_ok: F) -> Result<Value, ToolFault>
where
    F: FnOnce(T) -> Result<Value, ToolFault>,
{
    match result {
        Ok(value) => on_ok(value),
        Err(err) if err.is_fault() => {
            error!(tool = tool.name(), error = %err, "tool call failed");
            Err(ToolFault::Internal(err))
        }
        Err(err) => Ok(rejection(&err)),
    }
}

fn created(id: i64, message: &str) -> Result<Value, ToolFault> {
    Ok(json!({ "status": "success", "id": id, "message": message }))
}

fn success(message: &str) -> Result<Value, ToolFault> {
    Ok(json!({ "status": "success", "message": message }))
}

pub fn rejection(err: &LedgerError) -> Value {
    json!({ "status": "error", "message": err.to_string() })
}
