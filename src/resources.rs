// Read-only resources served by fixed identifier

use crate::error::LedgerError;
use crate::ledger::Ledger;
use serde::Serialize;
use thiserror::Error;

pub const CATEGORIES_URI: &str = "expense://categories";
pub const JSON_MIME: &str = "application/json";

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResourceInfo {
    pub uri: &'static str,
    pub name: &'static str,
    pub mime_type: &'static str,
}

pub static RESOURCES: [ResourceInfo; 1] = [ResourceInfo {
    uri: CATEGORIES_URI,
    name: "categories",
    mime_type: JSON_MIME,
}];

/// Resource body plus the content type it is declared with
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceContent {
    pub uri: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Unknown resource: {0}")]
    Unknown(String),

    #[error(transparent)]
    Read(#[from] LedgerError),
}

/// Look up a resource by uri or short name
pub fn find_resource(key: &str) -> Option<&'static ResourceInfo> {
    RESOURCES.iter().find(|r| r.uri == key || r.name == key)
}

/// Read a resource body. The categories document is passed through as-is,
/// never parsed.
pub fn read_resource(ledger: &Ledger, key: &str) -> Result<ResourceContent, ResourceError> {
    let info = find_resource(key).ok_or_else(|| ResourceError::Unknown(key.to_string()))?;

    let bytes = match info.uri {
        CATEGORIES_URI => ledger.read_categories()?,
        _ => return Err(ResourceError::Unknown(key.to_string())),
    };

    Ok(ResourceContent {
        uri: info.uri,
        mime_type: info.mime_type,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_uri_or_name() {
        assert_eq!(find_resource("expense://categories").unwrap().name, "categories");
        assert_eq!(find_resource("categories").unwrap().uri, CATEGORIES_URI);
        assert!(find_resource("expense://budgets").is_none());
    }

    #[test]
    fn test_read_categories_passthrough() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("categories.json");
        let raw = "{\n  \"food\": [\"groceries\", \"dining_out\"]\n}\n";
        std::fs::write(&path, raw).unwrap();

        let ledger = Ledger::new(dir.path().join("expenses.db"), path);
        let content = read_resource(&ledger, CATEGORIES_URI).unwrap();

        assert_eq!(content.mime_type, "application/json");
        assert_eq!(content.bytes, raw.as_bytes());
    }

    #[test]
    fn test_unknown_resource() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::new(dir.path().join("expenses.db"), dir.path().join("categories.json"));

        let err = read_resource(&ledger, "expense://nope").unwrap_err();
        assert!(matches!(err, ResourceError::Unknown(_)));

        // Known resource, missing file
        let err = read_resource(&ledger, "categories").unwrap_err();
        assert!(matches!(err, ResourceError::Read(_)));
    }
}
