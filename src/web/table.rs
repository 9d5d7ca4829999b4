//! Column-oriented JSON tables, `{"column": [v0, v1, ...]}`, as exchanged with API clients.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

pub type ColumnTable = BTreeMap<String, Vec<Value>>;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("row {0} did not serialize to an object")]
    NotARecord(usize),

    #[error("column {column:?} has {found} values, expected {expected}")]
    Ragged {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("row {index} is malformed: {source}")]
    Row {
        index: usize,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Pivots rows into columns. Every row must serialize to an object with the same keys.
pub fn to_columns<T: Serialize>(rows: &[T]) -> Result<ColumnTable, TableError> {
    let mut table = ColumnTable::new();
    for (index, row) in rows.iter().enumerate() {
        let record = match serde_json::to_value(row)? {
            Value::Object(record) => record,
            _ => return Err(TableError::NotARecord(index)),
        };
        for (column, value) in record {
            table.entry(column).or_default().push(value);
        }
    }
    Ok(table)
}

/// Pivots columns back into rows. All columns must have the same length.
pub fn from_columns<T: DeserializeOwned>(table: &ColumnTable) -> Result<Vec<T>, TableError> {
    let expected = table.values().map(Vec::len).max().unwrap_or(0);
    if let Some((column, values)) = table.iter().find(|(_, values)| values.len() != expected) {
        return Err(TableError::Ragged {
            column: column.to_owned(),
            expected,
            found: values.len(),
        });
    }

    (0..expected)
        .map(|index| {
            let record: Map<String, Value> = table
                .iter()
                .map(|(column, values)| (column.to_owned(), values[index].to_owned()))
                .collect();
            serde_json::from_value(Value::Object(record))
                .map_err(|source| TableError::Row { index, source })
        })
        .collect()
}
