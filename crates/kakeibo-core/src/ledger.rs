//! Daily ledger reconstruction
//!
//! The month is rebuilt as a chain of tables, each with its own invariant:
//!
//! 1. [`JoinedTable`]: one row per grid date, raw values or nulls.
//! 2. [`FilledTable`]: reported balance forward-filled, amounts zero-filled.
//!    Only the dates before the first reported balance may lack a balance.
//! 3. [`ReconstructedTable`]: every date has a balance.
//! 4. [`LedgerTable`]: net added, ready to persist.

use chrono::NaiveDate;
use kakeibo_config::Config;
use kakeibo_store::{LedgerRow, RawTransactionRecord, StoreRef, YearMonth};
use kakeibo_utils::{EventLogger, LoggerRef};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{CoreError, CoreResult};
use crate::time::DateGrid;

const CLASSIFICATION_SEPARATOR: &str = " / ";

// ==================== Join ====================

/// Grid date with the raw values of that day, if any
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRow {
    pub date: NaiveDate,
    pub income: Option<Decimal>,
    pub expense: Option<Decimal>,
    pub reported_balance: Option<Decimal>,
    pub trade_type: Option<String>,
    pub counterpart: Option<String>,
}

/// Left join of the date grid against raw records
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedTable {
    rows: Vec<JoinedRow>,
    /// Raw records whose date lies outside the grid
    dropped: usize,
}

/// Raw records of one day collapsed into a single row
#[derive(Default)]
struct DayRecords {
    income: Option<Decimal>,
    expense: Option<Decimal>,
    balance: Option<Decimal>,
    trade_types: Vec<String>,
    counterparts: Vec<String>,
}

fn add(total: Option<Decimal>, value: Option<Decimal>) -> Option<Decimal> {
    match (total, value) {
        (Some(t), Some(v)) => Some(t + v),
        (t, v) => t.or(v),
    }
}

fn push_distinct(values: &mut Vec<String>, value: &Option<String>) {
    if let Some(v) = value {
        if !values.contains(v) {
            values.push(v.clone());
        }
    }
}

fn join_text(values: Vec<String>) -> Option<String> {
    if values.is_empty() {
        None
    } else {
        Some(values.join(CLASSIFICATION_SEPARATOR))
    }
}

impl JoinedTable {
    /// Join raw records onto the grid; the grid drives the row set
    ///
    /// Several records on one date collapse into one row: amounts are
    /// summed, the last reported balance of the day wins and classification
    /// texts keep their distinct values.
    pub fn join(grid: &DateGrid, records: &[RawTransactionRecord]) -> Self {
        let mut by_date: BTreeMap<NaiveDate, DayRecords> = BTreeMap::new();
        let mut dropped = 0;

        for record in records {
            if !grid.year_month().contains(&record.date) {
                dropped += 1;
                continue;
            }
            let day = by_date.entry(record.date).or_default();
            day.income = add(day.income, record.income);
            day.expense = add(day.expense, record.expense);
            if record.balance.is_some() {
                day.balance = record.balance;
            }
            push_distinct(&mut day.trade_types, &record.trade_type);
            push_distinct(&mut day.counterparts, &record.counterpart);
        }

        let rows = grid
            .dates()
            .iter()
            .map(|date| match by_date.remove(date) {
                Some(day) => JoinedRow {
                    date: *date,
                    income: day.income,
                    expense: day.expense,
                    reported_balance: day.balance,
                    trade_type: join_text(day.trade_types),
                    counterpart: join_text(day.counterparts),
                },
                None => JoinedRow {
                    date: *date,
                    income: None,
                    expense: None,
                    reported_balance: None,
                    trade_type: None,
                    counterpart: None,
                },
            })
            .collect();

        Self { rows, dropped }
    }

    pub fn rows(&self) -> &[JoinedRow] {
        &self.rows
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

// ==================== Fill ====================

#[derive(Debug, Clone, PartialEq)]
pub struct FilledRow {
    pub date: NaiveDate,
    pub income: Decimal,
    pub expense: Decimal,
    /// Forward-filled reported balance
    pub balance: Option<Decimal>,
    pub trade_type: Option<String>,
    pub counterpart: Option<String>,
}

/// Forward-filled balances, zero-filled amounts
#[derive(Debug, Clone, PartialEq)]
pub struct FilledTable {
    rows: Vec<FilledRow>,
}

impl FilledTable {
    pub fn from_joined(joined: JoinedTable) -> Self {
        let mut last_balance: Option<Decimal> = None;
        let rows = joined
            .rows
            .into_iter()
            .map(|row| {
                if row.reported_balance.is_some() {
                    last_balance = row.reported_balance;
                }
                FilledRow {
                    date: row.date,
                    income: row.income.unwrap_or(Decimal::ZERO),
                    expense: row.expense.unwrap_or(Decimal::ZERO),
                    balance: last_balance,
                    trade_type: row.trade_type,
                    counterpart: row.counterpart,
                }
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[FilledRow] {
        &self.rows
    }
}

// ==================== Reconstruct ====================

#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructedRow {
    pub date: NaiveDate,
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
    pub trade_type: Option<String>,
    pub counterpart: Option<String>,
}

/// Every date carries a balance
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructedTable {
    rows: Vec<ReconstructedRow>,
}

impl ReconstructedTable {
    /// Fill the balances missing before the first reported one
    ///
    /// A date without balance takes the next date's balance with the next
    /// date's movement reversed (`balance + expense - income`). Dates still
    /// without one take the first balance found in the month.
    pub fn from_filled(filled: FilledTable, year_month: YearMonth) -> CoreResult<Self> {
        let rows = filled.rows;

        let stepped: Vec<Option<Decimal>> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.balance.or_else(|| {
                    rows.get(i + 1)
                        .and_then(|next| next.balance.map(|b| b + next.expense - next.income))
                })
            })
            .collect();

        let fallback = stepped.iter().flatten().next().copied();

        let rows = rows
            .into_iter()
            .zip(stepped)
            .map(|(row, balance)| -> CoreResult<ReconstructedRow> {
                let balance = balance.or(fallback).ok_or_else(|| CoreError::NoBalance {
                    year_month: year_month.to_string(),
                })?;
                Ok(ReconstructedRow {
                    date: row.date,
                    income: row.income,
                    expense: row.expense,
                    balance,
                    trade_type: row.trade_type,
                    counterpart: row.counterpart,
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[ReconstructedRow] {
        &self.rows
    }
}

// ==================== Ledger ====================

/// Final ledger of the month, one row per date
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerTable {
    year_month: YearMonth,
    rows: Vec<LedgerRow>,
}

impl LedgerTable {
    pub fn from_reconstructed(reconstructed: ReconstructedTable, year_month: YearMonth) -> Self {
        let rows = reconstructed
            .rows
            .into_iter()
            .map(|row| LedgerRow {
                date: row.date,
                income: row.income,
                expense: row.expense,
                net: row.income - row.expense,
                trade_type: row.trade_type,
                counterpart: row.counterpart,
                balance: row.balance,
            })
            .collect();
        Self { year_month, rows }
    }

    /// Run every step from raw records to the final ledger
    ///
    /// Records dated outside the month are reported as a warning; a month
    /// without any reported balance is reported as an error.
    pub fn compute(
        year_month: YearMonth,
        records: &[RawTransactionRecord],
        logger: &dyn EventLogger,
    ) -> CoreResult<Self> {
        let grid = DateGrid::for_month(year_month);
        let joined = JoinedTable::join(&grid, records);
        if joined.dropped() > 0 {
            logger.log_warning(
                "compute",
                &format!(
                    "ignored {} records dated outside {}",
                    joined.dropped(),
                    year_month
                ),
            );
        }

        let filled = FilledTable::from_joined(joined);
        let reconstructed = ReconstructedTable::from_filled(filled, year_month).map_err(|e| {
            logger.log_error("compute", &e.to_string());
            e
        })?;
        Ok(Self::from_reconstructed(reconstructed, year_month))
    }

    pub fn year_month(&self) -> YearMonth {
        self.year_month
    }

    pub fn rows(&self) -> &[LedgerRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<LedgerRow> {
        self.rows
    }
}

// ==================== Builder ====================

/// Builds and persists the ledger of a month
pub struct LedgerBuilder {
    source_dir: PathBuf,
    output_dir: PathBuf,
    store: StoreRef,
    logger: LoggerRef,
}

impl LedgerBuilder {
    pub fn new(config: &Config, store: StoreRef, logger: LoggerRef) -> Self {
        Self {
            source_dir: config.cashtrade.file_path.clone(),
            output_dir: config.tmp.file_path.clone(),
            store,
            logger,
        }
    }

    /// Read the raw export, rebuild the month and write the ledger file
    ///
    /// Nothing is written unless every step succeeds.
    pub fn build(&self, year_month: YearMonth) -> CoreResult<LedgerTable> {
        self.logger
            .log_info("build", &format!("building ledger for {}", year_month));

        let records = self.store.find_and_read(&self.source_dir, year_month)?;
        let ledger = LedgerTable::compute(year_month, &records, self.logger.as_ref())?;

        let path = self
            .store
            .write(&self.output_dir, year_month, ledger.rows())?;
        self.logger.log_info(
            "build",
            &format!("{} days written to {}", ledger.rows().len(), path.display()),
        );

        Ok(ledger)
    }
}

// ==================== Tests ====================
