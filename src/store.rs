//! Persisted record collection.
//!
//! The collection is a pretty-printed JSON array. Merging renames the
//! existing file to `<file>.bak` before the merged array is written, so
//! an interrupted write never loses what was already collected.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Path meaning "standard input" for the reader.
pub const STDIN_PATH: &str = "-";

/// Load a collection from a file, or from stdin when the path is `-`.
pub fn load_collection(path: &Path) -> Result<Vec<Value>> {
    let content = if path.as_os_str() == STDIN_PATH {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read collection from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read collection: {}", path.display()))?
    };

    parse_collection(&content).with_context(|| format!("Invalid collection: {}", path.display()))
}

/// Parse a collection document; it must be a JSON array.
pub fn parse_collection(content: &str) -> Result<Vec<Value>> {
    match serde_json::from_str::<Value>(content)? {
        Value::Array(records) => Ok(records),
        other => bail!("expected a JSON array, found {}", kind(&other)),
    }
}

/// Render a collection the way it is stored on disk.
pub fn to_document(records: &[Value]) -> Result<String> {
    let mut output = serde_json::to_string_pretty(records)?;
    output.push('\n');
    Ok(output)
}

/// Backup path for a collection file.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Append `records` to the collection at `path`.
///
/// An existing non-empty file is loaded, moved to its backup path and
/// replaced by the merged collection. Records are appended as-is; no
/// deduplication is done. Returns the size of the merged collection.
pub fn merge_into(path: &Path, records: Vec<Value>) -> Result<usize> {
    let has_existing = std::fs::metadata(path)
        .map(|m| m.len() != 0)
        .unwrap_or(false);

    let merged = if has_existing {
        let mut existing = load_collection(path)?;
        let backup = backup_path(path);
        std::fs::rename(path, &backup).with_context(|| {
            format!(
                "Failed to move {} to {}",
                path.display(),
                backup.display()
            )
        })?;
        debug!("Previous collection kept at {}", backup.display());
        existing.extend(records);
        existing
    } else {
        records
    };

    std::fs::write(path, to_document(&merged)?)
        .with_context(|| format!("Failed to write collection: {}", path.display()))?;
    info!("Wrote {} records to {}", merged.len(), path.display());

    Ok(merged.len())
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_parse_collection_requires_array() {
        assert_eq!(parse_collection("[]").unwrap().len(), 0);
        assert_eq!(parse_collection(r#"[{"a":1},{"b":2}]"#).unwrap().len(), 2);
        assert!(parse_collection(r#"{"a":1}"#).is_err());
        assert!(parse_collection("not json").is_err());
    }

    #[test]
    fn test_backup_path() {
        assert_eq!(
            backup_path(Path::new("/tmp/db.json")),
            PathBuf::from("/tmp/db.json.bak")
        );
    }

    #[test]
    fn test_merge_into_new_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");

        let size = merge_into(&path, vec![json!({"id": 1})]).unwrap();
        assert_eq!(size, 1);
        assert!(!backup_path(&path).exists());
        assert_eq!(load_collection(&path).unwrap(), vec![json!({"id": 1})]);
    }

    #[test]
    fn test_merge_into_existing_file_keeps_backup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "[{\"id\": 1}]").unwrap();

        let size = merge_into(&path, vec![json!({"id": 2}), json!({"id": 1})]).unwrap();
        assert_eq!(size, 3);

        let merged = load_collection(&path).unwrap();
        assert_eq!(merged, vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 1})]);

        let backup = load_collection(&backup_path(&path)).unwrap();
        assert_eq!(backup, vec![json!({"id": 1})]);
    }

    #[test]
    fn test_merge_into_empty_file_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "").unwrap();

        merge_into(&path, vec![json!({"id": 1})]).unwrap();
        assert!(!backup_path(&path).exists());
        assert_eq!(load_collection(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_document_keeps_non_ascii() {
        let doc = to_document(&[json!({"elecWave": "920.6〜928.0MHz"})]).unwrap();
        assert!(doc.contains("920.6〜928.0MHz"));
        assert!(doc.starts_with("[\n  {"));
    }
}
