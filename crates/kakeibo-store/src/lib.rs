//! CSV storage for raw bank exports and the monthly ledger file
//!
//! Raw exports live at `<cashtrade base>/<YYYYMM>/<any>.csv`, the processed
//! ledger at `<tmp base>/<YYYYMM>/cash_record_tmp.csv`.

use encoding_rs::Encoding;
use kakeibo_config::Config;
use kakeibo_utils::LoggerRef;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod error;
pub mod parser;
pub mod types;
pub mod writer;

pub use error::{StoreError, StoreErrorKind, StoreResult};
pub use types::{
    LedgerRow, RawTransactionRecord, YearMonth, COMPACT_DATE_FORMAT, LEDGER_COLUMNS,
    TMP_FILE_NAME,
};

// ==================== Store Trait ====================

/// Store reference type
pub type StoreRef = Arc<dyn CashRecordStore>;

/// Trait for reading bank exports and reading/writing ledger files
pub trait CashRecordStore: Send + Sync {
    /// Locate the single raw export under `directory/year_month/` and parse it
    fn find_and_read(
        &self,
        directory: &Path,
        year_month: YearMonth,
    ) -> StoreResult<Vec<RawTransactionRecord>>;

    /// Persist ledger rows to `directory/year_month/cash_record_tmp.csv`
    fn write(&self, directory: &Path, year_month: YearMonth, rows: &[LedgerRow])
        -> StoreResult<PathBuf>;

    /// Read back the ledger rows persisted by [`CashRecordStore::write`]
    fn read(&self, directory: &Path, year_month: YearMonth) -> StoreResult<Vec<LedgerRow>>;
}

/// Path of the processed ledger file of a month
pub fn ledger_path(directory: &Path, year_month: YearMonth) -> PathBuf {
    directory.join(year_month.to_string()).join(TMP_FILE_NAME)
}

// ==================== CSV Store ====================

/// Default store backed by encoded CSV files on disk
pub struct CsvStore {
    raw_encoding: &'static Encoding,
    skip_rows: usize,
    tmp_encoding: &'static Encoding,
    logger: LoggerRef,
}

impl CsvStore {
    /// Create a store from the `cashtrade` and `tmp` sections of the config
    pub fn new(config: &Config, logger: LoggerRef) -> StoreResult<Self> {
        Ok(Self {
            raw_encoding: lookup_encoding(&config.cashtrade.encoding)?,
            skip_rows: config.cashtrade.skip_rows,
            tmp_encoding: lookup_encoding(&config.tmp.encoding)?,
            logger,
        })
    }

    /// Candidate raw exports of a month, sorted by path
    fn candidates(&self, month_dir: &Path) -> StoreResult<Vec<PathBuf>> {
        let pattern = format!(
            "{}/*.csv",
            glob::Pattern::escape(&month_dir.to_string_lossy())
        );
        let options = glob::MatchOptions {
            case_sensitive: false,
            ..Default::default()
        };

        let entries = glob::glob_with(&pattern, options).map_err(|e| StoreError::Pattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| {
                let path = e.path().to_path_buf();
                StoreError::io(&path, e.into_error())
            })?;
            let is_ledger = path
                .file_name()
                .map(|n| n.to_string_lossy().eq_ignore_ascii_case(TMP_FILE_NAME))
                .unwrap_or(false);
            if path.is_file() && !is_ledger {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn read_raw(
        &self,
        directory: &Path,
        year_month: YearMonth,
    ) -> StoreResult<Vec<RawTransactionRecord>> {
        let month_dir = directory.join(year_month.to_string());
        let mut candidates = self.candidates(&month_dir)?;
        self.logger.log_debug(
            "find_and_read",
            &format!("{} candidate files in {}", candidates.len(), month_dir.display()),
        );

        let path = match candidates.len() {
            0 => {
                return Err(StoreError::SourceNotFound {
                    dir: month_dir.display().to_string(),
                })
            }
            1 => candidates.remove(0),
            count => {
                return Err(StoreError::AmbiguousSource {
                    dir: month_dir.display().to_string(),
                    count,
                })
            }
        };

        let bytes = std::fs::read(&path).map_err(|e| StoreError::io(&path, e))?;
        let text = parser::decode(&bytes, self.raw_encoding, &path)?;
        let body = parser::skip_lines(&text, self.skip_rows);
        let records = parser::parse_raw_records(body, &path, self.skip_rows as u64)?;

        self.logger.log_info(
            "find_and_read",
            &format!("loaded {} records from {}", records.len(), path.display()),
        );
        Ok(records)
    }

    fn write_ledger(
        &self,
        directory: &Path,
        year_month: YearMonth,
        rows: &[LedgerRow],
    ) -> StoreResult<PathBuf> {
        let path = ledger_path(directory, year_month);
        let text = writer::render_ledger(rows, &path)?;
        let bytes = writer::encode(&text, self.tmp_encoding, &path)?;
        writer::write_atomically(&path, &bytes)?;

        self.logger.log_info(
            "write",
            &format!("wrote {} rows to {}", rows.len(), path.display()),
        );
        Ok(path)
    }

    fn read_ledger(&self, directory: &Path, year_month: YearMonth) -> StoreResult<Vec<LedgerRow>> {
        let path = ledger_path(directory, year_month);
        if !path.is_file() {
            return Err(StoreError::SourceNotFound {
                dir: directory.join(year_month.to_string()).display().to_string(),
            });
        }

        let bytes = std::fs::read(&path).map_err(|e| StoreError::io(&path, e))?;
        let text = parser::decode(&bytes, self.tmp_encoding, &path)?;
        let rows = parser::parse_ledger_rows(&text, &path)?;

        self.logger.log_info(
            "read",
            &format!("loaded {} ledger rows from {}", rows.len(), path.display()),
        );
        Ok(rows)
    }

    /// Log a failure with its operation, then hand it back for propagation
    fn report(&self, operation: &str, error: StoreError) -> StoreError {
        self.logger.log_error(operation, &error.to_string());
        error
    }
}

impl CashRecordStore for CsvStore {
    fn find_and_read(
        &self,
        directory: &Path,
        year_month: YearMonth,
    ) -> StoreResult<Vec<RawTransactionRecord>> {
        self.read_raw(directory, year_month)
            .map_err(|e| self.report("find_and_read", e))
    }

    fn write(
        &self,
        directory: &Path,
        year_month: YearMonth,
        rows: &[LedgerRow],
    ) -> StoreResult<PathBuf> {
        self.write_ledger(directory, year_month, rows)
            .map_err(|e| self.report("write", e))
    }

    fn read(&self, directory: &Path, year_month: YearMonth) -> StoreResult<Vec<LedgerRow>> {
        self.read_ledger(directory, year_month)
            .map_err(|e| self.report("read", e))
    }
}

fn lookup_encoding(label: &str) -> StoreResult<&'static Encoding> {
    Encoding::for_label(label.as_bytes()).ok_or_else(|| StoreError::UnknownEncoding {
        label: label.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use kakeibo_utils::{LogLevel, RecordingEventLogger};
    use rust_decimal_macros::dec;

    const PREAMBLE: &str = "お客さま口座番号,12345\n\
照会期間,2024年01月\n\
\n\
\n\
\n\
\n\
\n";

    const HEADER: &str = "取引日,受入金額（円）,払出金額（円）,詳細１,詳細２,現在（貸付）高\n";

    fn store(logger: Arc<RecordingEventLogger>) -> CsvStore {
        let config = Config::from_yaml("cashtrade:\n  file_path: raw\ntmp:\n  file_path: tmp\n").unwrap();
        CsvStore::new(&config, logger).unwrap()
    }

    fn write_sjis(path: &Path, text: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let (bytes, _, had_errors) = encoding_rs::SHIFT_JIS.encode(text);
        assert!(!had_errors);
        std::fs::write(path, bytes).unwrap();
    }

    fn ym() -> YearMonth {
        "202401".parse().unwrap()
    }

    #[test]
    fn test_find_and_read_skips_preamble() {
        let dir = tempfile::tempdir().unwrap();
        let text = format!("{}{}20240110,500,1500,振込,ヤマダ,9000\n", PREAMBLE, HEADER);
        write_sjis(&dir.path().join("202401").join("export.CSV"), &text);

        let logger = Arc::new(RecordingEventLogger::new());
        let records = store(logger.clone()).find_and_read(dir.path(), ym()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(records[0].income, Some(dec!(500)));
        assert_eq!(records[0].expense, Some(dec!(1500)));
        assert_eq!(records[0].balance, Some(dec!(9000)));
        assert_eq!(logger.messages(LogLevel::Info).len(), 1);
    }

    #[test]
    fn test_no_source_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("202401")).unwrap();

        let logger = Arc::new(RecordingEventLogger::new());
        let err = store(logger.clone()).find_and_read(dir.path(), ym()).unwrap_err();

        assert!(matches!(err, StoreError::SourceNotFound { .. }));
        assert_eq!(err.kind(), StoreErrorKind::SourceNotFound);
        assert_eq!(logger.messages(LogLevel::Error).len(), 1);
    }

    #[test]
    fn test_ambiguous_source_files() {
        let dir = tempfile::tempdir().unwrap();
        let text = format!("{}{}", PREAMBLE, HEADER);
        write_sjis(&dir.path().join("202401").join("a.csv"), &text);
        write_sjis(&dir.path().join("202401").join("b.csv"), &text);

        let logger = Arc::new(RecordingEventLogger::new());
        let err = store(logger.clone()).find_and_read(dir.path(), ym()).unwrap_err();
        assert!(matches!(err, StoreError::AmbiguousSource { count: 2, .. }));

        let debug = logger.messages(LogLevel::Debug);
        assert_eq!(debug.len(), 1);
        assert!(debug[0].contains("2 candidate files"));
    }

    #[test]
    fn test_ledger_file_is_not_a_source() {
        let dir = tempfile::tempdir().unwrap();
        let text = format!("{}{}", PREAMBLE, HEADER);
        write_sjis(&dir.path().join("202401").join("export.csv"), &text);
        write_sjis(&dir.path().join("202401").join(TMP_FILE_NAME), "取引日\n");

        let logger = Arc::new(RecordingEventLogger::new());
        let records = store(logger).find_and_read(dir.path(), ym()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_malformed_bytes_fail_to_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("202401").join("export.csv");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        // Lead byte 0x82 followed by a line feed is not valid Shift_JIS
        let mut bytes = b"account,12345\n".to_vec();
        bytes.extend_from_slice(&[0x82, b'\n']);
        std::fs::write(&path, bytes).unwrap();

        let logger = Arc::new(RecordingEventLogger::new());
        let err = store(logger).find_and_read(dir.path(), ym()).unwrap_err();
        assert_eq!(err.kind(), StoreErrorKind::IoFailure);
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![
            LedgerRow {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                income: dec!(0),
                expense: dec!(0),
                trade_type: None,
                counterpart: None,
                balance: dec!(10000),
                net: dec!(0),
            },
            LedgerRow {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                income: dec!(500),
                expense: dec!(1500),
                trade_type: Some("振込".to_string()),
                counterpart: Some("ヤマダ　タロウ".to_string()),
                balance: dec!(9000),
                net: dec!(-1000),
            },
        ];

        let logger = Arc::new(RecordingEventLogger::new());
        let store = store(logger);
        let path = store.write(dir.path(), ym(), &rows).unwrap();
        assert_eq!(path, dir.path().join("202401").join(TMP_FILE_NAME));

        let read_back = store.read(dir.path(), ym()).unwrap();
        assert_eq!(read_back, rows);
    }

    #[test]
    fn test_write_unmappable_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![LedgerRow {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            income: dec!(0),
            expense: dec!(0),
            trade_type: Some("🍣".to_string()),
            counterpart: None,
            balance: dec!(1),
            net: dec!(0),
        }];

        let logger = Arc::new(RecordingEventLogger::new());
        let err = store(logger).write(dir.path(), ym(), &rows).unwrap_err();
        assert!(matches!(err, StoreError::Encode { .. }));
        assert!(!ledger_path(dir.path(), ym()).exists());
    }

    #[test]
    fn test_read_missing_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Arc::new(RecordingEventLogger::new());
        let err = store(logger).read(dir.path(), ym()).unwrap_err();
        assert!(matches!(err, StoreError::SourceNotFound { .. }));
    }

    #[test]
    fn test_unknown_encoding() {
        let mut config = Config::default();
        config.cashtrade.encoding = "nope".to_string();
        let logger: LoggerRef = Arc::new(RecordingEventLogger::new());
        assert!(matches!(
            CsvStore::new(&config, logger),
            Err(StoreError::UnknownEncoding { .. })
        ));
    }
}
