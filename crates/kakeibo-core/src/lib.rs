//! Core ledger reconstruction and dashboard logic
//!
//! `build` turns one month of raw bank export into a gap-free daily ledger
//! ([`LedgerBuilder`]); the dashboard reads that ledger back and aggregates
//! it for charting ([`Dashboard`]).

pub mod chart;
pub mod dashboard;
pub mod error;
pub mod ledger;
pub mod time;
pub mod types;

pub use chart::{chart_spec, ChartSettings, ChartSpec, Layout, Trace};
pub use dashboard::{Dashboard, DashboardRow, DashboardTable};
pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use ledger::{LedgerBuilder, LedgerTable};
pub use time::DateGrid;
pub use types::SeriesKind;

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use kakeibo_config::Config;
    use kakeibo_store::{CsvStore, StoreRef, YearMonth};
    use kakeibo_utils::RecordingEventLogger;
    use rust_decimal_macros::dec;
    use std::path::Path;
    use std::sync::Arc;

    const EXPORT: &str = "お客さま口座番号,12345\n\
照会期間,2024年01月\n\
\n\
\n\
\n\
\n\
\n\
取引日,受入金額（円）,払出金額（円）,詳細１,詳細２,現在（貸付）高\n\
20240105,,3000,カード,コンビニ,97000\n\
20240120,50000,,振込,キュウヨ,147000\n";

    fn config(base: &Path) -> Config {
        let yaml = format!(
            "cashtrade:\n  file_path: {}\ntmp:\n  file_path: {}\n",
            base.join("raw").display(),
            base.join("tmp").display()
        );
        Config::from_yaml(&yaml).unwrap()
    }

    #[test]
    fn test_build_then_load_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let month_dir = config.cashtrade_month_dir("202401");
        std::fs::create_dir_all(&month_dir).unwrap();
        let path = month_dir.join("export.csv");
        let bytes = kakeibo_store::writer::encode(EXPORT, encoding_rs::SHIFT_JIS, &path).unwrap();
        std::fs::write(&path, bytes).unwrap();

        let logger = Arc::new(RecordingEventLogger::new());
        let store: StoreRef = Arc::new(CsvStore::new(&config, logger.clone()).unwrap());
        let ym: YearMonth = "202401".parse().unwrap();

        let ledger = LedgerBuilder::new(&config, store.clone(), logger.clone())
            .build(ym)
            .unwrap();
        assert_eq!(ledger.rows().len(), 31);
        assert_eq!(ledger.rows()[0].balance, dec!(100000));
        assert!(config.tmp_month_dir("202401").join("cash_record_tmp.csv").exists());

        let dashboard = Dashboard::load(&config, store, logger, ym).unwrap();
        let table = dashboard.table();
        assert_eq!(table.len(), 31);
        assert_eq!(table.rows[0].balance, dec!(10));
        assert_eq!(table.rows[30].cumulative_income, dec!(5));
        assert_eq!(table.rows[30].cumulative_expense, dec!(-0.3));
    }
}
