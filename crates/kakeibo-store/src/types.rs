//! Record types shared by the store and the ledger pipeline

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

// ==================== Column Names ====================

/// Transaction date column, shared by the raw export and the ledger file
pub const COL_DATE: &str = "取引日";
/// Paid-out amount in the raw export
pub const COL_RAW_EXPENSE: &str = "払出金額（円）";
/// Received amount in the raw export
pub const COL_RAW_INCOME: &str = "受入金額（円）";
/// Balance reported by the bank after the transaction
pub const COL_RAW_BALANCE: &str = "現在（貸付）高";
/// First free-text detail (transaction type)
pub const COL_RAW_TYPE: &str = "詳細１";
/// Second free-text detail (counterpart)
pub const COL_RAW_COUNTERPART: &str = "詳細２";

pub const COL_INCOME: &str = "収入";
pub const COL_EXPENSE: &str = "支出";
pub const COL_TYPE: &str = "種類";
pub const COL_COUNTERPART: &str = "対象";
pub const COL_BALANCE: &str = "残高";
pub const COL_NET: &str = "収支";

/// Header of the processed ledger file, in order
pub const LEDGER_COLUMNS: [&str; 7] = [
    COL_DATE,
    COL_INCOME,
    COL_EXPENSE,
    COL_TYPE,
    COL_COUNTERPART,
    COL_BALANCE,
    COL_NET,
];

/// Fixed file name of the processed ledger inside a month directory
pub const TMP_FILE_NAME: &str = "cash_record_tmp.csv";

/// Compact date format used in file names and the ledger file
pub const COMPACT_DATE_FORMAT: &str = "%Y%m%d";

// ==================== Year-Month ====================

/// A validated `YYYYMM` month identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
    last: NaiveDate,
}

impl YearMonth {
    /// Build from a calendar year and month (1-12)
    pub fn new(year: i32, month: u32) -> Result<Self, StoreError> {
        let invalid = || StoreError::InvalidYearMonth {
            value: format!("{:04}{:02}", year, month),
        };

        if !(1..=12).contains(&month) {
            return Err(invalid());
        }

        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };

        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|d| d.pred_opt())
            .ok_or_else(invalid)?;

        Ok(Self { first, last })
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    /// First calendar day of the month
    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    /// Last calendar day of the month
    pub fn last_day(&self) -> NaiveDate {
        self.last
    }

    /// Whether the date falls inside this month
    pub fn contains(&self, date: &NaiveDate) -> bool {
        *date >= self.first && *date <= self.last
    }
}

impl std::str::FromStr for YearMonth {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || StoreError::InvalidYearMonth {
            value: s.to_string(),
        };

        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let year: i32 = s[..4].parse().map_err(|_| invalid())?;
        let month: u32 = s[4..].parse().map_err(|_| invalid())?;

        YearMonth::new(year, month).map_err(|_| invalid())
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}{:02}", self.year(), self.month())
    }
}

// ==================== Records ====================

/// One transaction event as reported in the bank export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTransactionRecord {
    pub date: NaiveDate,
    /// 払出金額（円）
    pub expense: Option<Decimal>,
    /// 受入金額（円）
    pub income: Option<Decimal>,
    /// 現在（貸付）高, absent on rows without a reported balance
    pub balance: Option<Decimal>,
    /// 詳細１
    pub trade_type: Option<String>,
    /// 詳細２
    pub counterpart: Option<String>,
}

/// One reconstructed ledger day, as persisted in the processed file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub date: NaiveDate,
    pub income: Decimal,
    pub expense: Decimal,
    pub trade_type: Option<String>,
    pub counterpart: Option<String>,
    pub balance: Decimal,
    pub net: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_year_month() {
        let ym: YearMonth = "202401".parse().unwrap();
        assert_eq!(ym.year(), 2024);
        assert_eq!(ym.month(), 1);
        assert_eq!(ym.to_string(), "202401");
        assert_eq!(ym.first_day(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(ym.last_day(), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    #[test]
    fn test_december_rolls_over() {
        let ym: YearMonth = "202312".parse().unwrap();
        assert_eq!(ym.last_day(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_leap_february() {
        let leap: YearMonth = "202402".parse().unwrap();
        assert_eq!(leap.last_day().day(), 29);
        let common: YearMonth = "202302".parse().unwrap();
        assert_eq!(common.last_day().day(), 28);
        let century: YearMonth = "190002".parse().unwrap();
        assert_eq!(century.last_day().day(), 28);
    }

    #[test]
    fn test_invalid_year_month() {
        for bad in ["2024", "2024011", "202413", "202400", "2024-1", "abcdef", ""] {
            assert!(bad.parse::<YearMonth>().is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_contains() {
        let ym: YearMonth = "202403".parse().unwrap();
        assert!(ym.contains(&NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()));
        assert!(!ym.contains(&NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
        assert!(!ym.contains(&NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
    }
}
