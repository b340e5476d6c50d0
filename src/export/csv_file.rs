use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::export::row::ExportRow;
use crate::observability::metrics::get_metrics;

/// Write `rows` with an `email,role` header, replacing whatever is at `path`.
/// Callers only export a non-empty set of rows.
///
/// Rows go to a sibling `.tmp` file first and are renamed into place once the
/// writer is flushed.
pub async fn write_rows(path: &Path, rows: &[ExportRow]) -> Result<()> {
    let tmp = path.with_extension("csv.tmp");
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let bytes = encode_rows(rows)?;
    tokio::fs::write(&tmp, bytes)
        .await
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("failed to move export into {}", path.display()))?;

    get_metrics().await.rows_exported.inc_by(rows.len() as u64);
    info!("Exported {} users with roles to {}", rows.len(), path.display());
    Ok(())
}

fn encode_rows(rows: &[ExportRow]) -> Result<Vec<u8>> {
    // header comes from the ExportRow field names on the first row
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow!("failed to flush csv writer: {}", e.error()))
}
