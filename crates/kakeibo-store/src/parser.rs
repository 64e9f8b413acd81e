//! CSV decoding for the raw bank export and the processed ledger file

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use encoding_rs::Encoding;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::error::{StoreError, StoreResult};
use crate::types::*;

/// Date layouts seen in the `取引日` column
const DATE_FORMATS: [&str; 3] = [COMPACT_DATE_FORMAT, "%Y/%m/%d", "%Y-%m-%d"];

// ==================== Cell Helpers ====================

/// Parse an amount cell; blank means absent
pub fn parse_amount(raw: &str) -> Result<Option<Decimal>, String> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(&cleaned)
        .map(Some)
        .map_err(|_| format!("'{}' is not an amount", raw.trim()))
}

/// Parse a date cell in any of the accepted layouts
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

fn parse_text(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

// ==================== Decoding ====================

/// Decode file bytes, failing on any malformed sequence
pub fn decode(bytes: &[u8], encoding: &'static Encoding, path: &Path) -> StoreResult<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(StoreError::Decode {
            path: path.display().to_string(),
            encoding: encoding.name().to_string(),
        });
    }
    Ok(text.into_owned())
}

/// Drop the first `lines` lines of the text
pub fn skip_lines(text: &str, lines: usize) -> &str {
    if lines == 0 {
        return text;
    }
    match text.match_indices('\n').nth(lines - 1) {
        Some((idx, _)) => &text[idx + 1..],
        None => "",
    }
}

/// Column positions resolved from a header row
struct Columns<'a> {
    headers: &'a StringRecord,
    path: &'a Path,
}

impl<'a> Columns<'a> {
    fn index(&self, name: &str) -> StoreResult<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().trim_start_matches('\u{feff}') == name)
            .ok_or_else(|| StoreError::MissingColumn {
                path: self.path.display().to_string(),
                column: name.to_string(),
            })
    }
}

fn csv_error(path: &Path, source: csv::Error) -> StoreError {
    StoreError::Csv {
        path: path.display().to_string(),
        source,
    }
}

fn invalid(path: &Path, line: u64, message: String) -> StoreError {
    StoreError::InvalidValue {
        path: path.display().to_string(),
        line,
        message,
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

// ==================== Raw Export ====================

/// Parse the raw export body (preamble already removed)
///
/// `line_offset` is added to reported line numbers so errors point at the
/// line of the original file.
pub fn parse_raw_records(
    body: &str,
    path: &Path,
    line_offset: u64,
) -> StoreResult<Vec<RawTransactionRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader.headers().map_err(|e| csv_error(path, e))?.clone();
    let columns = Columns {
        headers: &headers,
        path,
    };
    let date_idx = columns.index(COL_DATE)?;
    let expense_idx = columns.index(COL_RAW_EXPENSE)?;
    let income_idx = columns.index(COL_RAW_INCOME)?;
    let balance_idx = columns.index(COL_RAW_BALANCE)?;
    let type_idx = columns.index(COL_RAW_TYPE)?;
    let counterpart_idx = columns.index(COL_RAW_COUNTERPART)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| csv_error(path, e))?;
        if is_blank(&record) {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0) + line_offset;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let date = parse_date(cell(date_idx)).ok_or_else(|| {
            invalid(path, line, format!("'{}' is not a date", cell(date_idx).trim()))
        })?;
        let amount = |idx: usize| parse_amount(cell(idx)).map_err(|m| invalid(path, line, m));

        records.push(RawTransactionRecord {
            date,
            expense: amount(expense_idx)?,
            income: amount(income_idx)?,
            balance: amount(balance_idx)?,
            trade_type: parse_text(cell(type_idx)),
            counterpart: parse_text(cell(counterpart_idx)),
        });
    }

    Ok(records)
}

// ==================== Ledger File ====================

/// Parse the processed ledger file
pub fn parse_ledger_rows(body: &str, path: &Path) -> StoreResult<Vec<LedgerRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(body.as_bytes());

    let headers = reader.headers().map_err(|e| csv_error(path, e))?.clone();
    let columns = Columns {
        headers: &headers,
        path,
    };
    let date_idx = columns.index(COL_DATE)?;
    let income_idx = columns.index(COL_INCOME)?;
    let expense_idx = columns.index(COL_EXPENSE)?;
    let type_idx = columns.index(COL_TYPE)?;
    let counterpart_idx = columns.index(COL_COUNTERPART)?;
    let balance_idx = columns.index(COL_BALANCE)?;
    let net_idx = columns.index(COL_NET)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| csv_error(path, e))?;
        if is_blank(&record) {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let date = parse_date(cell(date_idx)).ok_or_else(|| {
            invalid(path, line, format!("'{}' is not a date", cell(date_idx).trim()))
        })?;
        let amount = |idx: usize, column: &str| -> StoreResult<Decimal> {
            parse_amount(cell(idx))
                .map_err(|m| invalid(path, line, m))?
                .ok_or_else(|| invalid(path, line, format!("empty {}", column)))
        };

        rows.push(LedgerRow {
            date,
            income: amount(income_idx, COL_INCOME)?,
            expense: amount(expense_idx, COL_EXPENSE)?,
            trade_type: parse_text(cell(type_idx)),
            counterpart: parse_text(cell(counterpart_idx)),
            balance: amount(balance_idx, COL_BALANCE)?,
            net: amount(net_idx, COL_NET)?,
        });
    }

    Ok(rows)
}
