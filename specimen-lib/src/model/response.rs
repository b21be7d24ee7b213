//! Query response types

use serde::Deserialize;

/// Response of `/api/build_query`.
///
/// The server has shipped both `results` and `rows` for the row array, so
/// both are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResponse {
    /// Generated SQL, when the server echoes it.
    #[serde(default)]
    pub sql: Option<String>,
    #[serde(default, alias = "results")]
    pub rows: Vec<Vec<serde_json::Value>>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

impl QueryResponse {
    /// Total number of matching rows, falling back to the rows received.
    pub fn row_count(&self) -> u64 {
        self.total_count.unwrap_or(self.rows.len() as u64)
    }

    /// Rows rendered as display strings, one `Vec` per row.
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect()
    }
}

/// Renders a JSON cell the way a table shows it: strings unquoted, null empty.
pub fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
