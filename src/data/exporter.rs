use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::data::table::TweetTable;

/// Write the table to `path` as UTF-8 CSV with a header row and no
/// index column. Missing parent directories are created. Returns the
/// written path.
pub fn save_csv(table: &TweetTable, path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
    }

    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    wtr.write_record(table.column_names())?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(|cell| cell.render()))?;
    }
    wtr.flush()?;

    info!(target: "export", "wrote {} rows to {}", table.row_count(), path.display());
    Ok(path.to_path_buf())
}
