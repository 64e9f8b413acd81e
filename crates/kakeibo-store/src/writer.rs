//! Serialization of the processed ledger file

use csv::WriterBuilder;
use encoding_rs::Encoding;
use std::path::Path;

use crate::error::{StoreError, StoreResult};
use crate::types::*;

/// Render ledger rows as CSV text with the fixed ledger header
pub fn render_ledger(rows: &[LedgerRow], path: &Path) -> StoreResult<String> {
    let csv_error = |source: csv::Error| StoreError::Csv {
        path: path.display().to_string(),
        source,
    };

    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(LEDGER_COLUMNS).map_err(csv_error)?;

    for row in rows {
        writer
            .write_record([
                row.date.format(COMPACT_DATE_FORMAT).to_string(),
                row.income.to_string(),
                row.expense.to_string(),
                row.trade_type.clone().unwrap_or_default(),
                row.counterpart.clone().unwrap_or_default(),
                row.balance.to_string(),
                row.net.to_string(),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| StoreError::io(path, e.into_error()))?;

    String::from_utf8(bytes).map_err(|e| {
        StoreError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        )
    })
}

/// Encode text, failing if any character has no mapping in the encoding
pub fn encode(text: &str, encoding: &'static Encoding, path: &Path) -> StoreResult<Vec<u8>> {
    let (bytes, _, had_errors) = encoding.encode(text);
    if had_errors {
        return Err(StoreError::Encode {
            path: path.display().to_string(),
            encoding: encoding.name().to_string(),
        });
    }
    Ok(bytes.into_owned())
}

/// Write bytes through a temporary sibling so readers never see a partial file
pub fn write_atomically(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let mut partial = path.as_os_str().to_owned();
    partial.push(".partial");
    let partial = std::path::PathBuf::from(partial);

    std::fs::write(&partial, bytes).map_err(|e| StoreError::io(&partial, e))?;
    if let Err(e) = std::fs::rename(&partial, path) {
        let _ = std::fs::remove_file(&partial);
        return Err(StoreError::io(path, e));
    }
    Ok(())
}
