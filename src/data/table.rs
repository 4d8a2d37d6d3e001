use chrono::{DateTime, Utc};

use crate::data::row::TweetRow;

/// Column names in export order. The schema is fixed; every table has
/// exactly these ten columns.
pub const COLUMNS: [&str; 10] = [
    "id",
    "created_at",
    "text",
    "author_id",
    "like_count",
    "retweet_count",
    "reply_count",
    "quote_count",
    "lang",
    "conversation_id",
];

/// A single cell value in the table.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Count(i64),
    Timestamp(DateTime<Utc>),
    Null,
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Rendering for CSV output; null becomes the empty field.
    pub fn render(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Count(n) => n.to_string(),
            CellValue::Timestamp(ts) => ts.to_rfc3339(),
            CellValue::Null => String::new(),
        }
    }
}

/// Typed table of flattened tweets, ready for export.
#[derive(Debug, Clone, Default)]
pub struct TweetTable {
    rows: Vec<Vec<CellValue>>,
}

impl TweetTable {
    /// Build a table from flat rows. `created_at` values are coerced to
    /// typed timestamps; anything unparsable becomes null rather than
    /// failing the build.
    pub fn from_rows(rows: &[TweetRow]) -> Self {
        let rows = rows
            .iter()
            .map(|row| {
                vec![
                    CellValue::Text(row.id.clone()),
                    parse_timestamp(row.created_at.as_deref()),
                    CellValue::Text(row.text.clone()),
                    text_or_null(row.author_id.as_deref()),
                    count_or_null(row.like_count),
                    count_or_null(row.retweet_count),
                    count_or_null(row.reply_count),
                    count_or_null(row.quote_count),
                    text_or_null(row.lang.as_deref()),
                    text_or_null(row.conversation_id.as_deref()),
                ]
            })
            .collect();
        Self { rows }
    }

    pub fn column_names(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell lookup by row index and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = COLUMNS.iter().position(|c| *c == column)?;
        self.rows.get(row)?.get(col)
    }
}

fn parse_timestamp(value: Option<&str>) -> CellValue {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| CellValue::Timestamp(dt.with_timezone(&Utc)))
        .unwrap_or(CellValue::Null)
}

fn text_or_null(value: Option<&str>) -> CellValue {
    match value {
        Some(s) => CellValue::Text(s.to_string()),
        None => CellValue::Null,
    }
}

fn count_or_null(value: Option<i64>) -> CellValue {
    match value {
        Some(n) => CellValue::Count(n),
        None => CellValue::Null,
    }
}
