//! Dashboard data: per-day aggregation and running totals

use chrono::NaiveDate;
use kakeibo_config::Config;
use kakeibo_store::{LedgerRow, StoreRef, YearMonth};
use kakeibo_utils::LoggerRef;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::chart::{chart_spec, ChartSettings, ChartSpec};
use crate::error::CoreResult;
use crate::types::SeriesKind;

/// One displayed day, money already divided by the display unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRow {
    pub date: NaiveDate,
    /// Last balance of the day
    pub balance: Decimal,
    pub income: Decimal,
    /// Negated so that spending plots below zero
    pub expense: Decimal,
    pub net: Decimal,
    pub cumulative_income: Decimal,
    pub cumulative_expense: Decimal,
    pub cumulative_net: Decimal,
}

impl DashboardRow {
    pub fn value(&self, kind: SeriesKind) -> Decimal {
        match kind {
            SeriesKind::Balance => self.balance,
            SeriesKind::Income => self.income,
            SeriesKind::Expense => self.expense,
            SeriesKind::Net => self.net,
            SeriesKind::CumulativeIncome => self.cumulative_income,
            SeriesKind::CumulativeExpense => self.cumulative_expense,
            SeriesKind::CumulativeNet => self.cumulative_net,
        }
    }
}

/// Per-day totals of a ledger, ascending by date
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardTable {
    pub rows: Vec<DashboardRow>,
}

#[derive(Default)]
struct DayTotals {
    balance: Decimal,
    income: Decimal,
    expense: Decimal,
    net: Decimal,
}

impl DashboardTable {
    /// Aggregate ledger rows per date and compute running totals
    pub fn from_ledger(rows: &[LedgerRow], unit_divisor: u32) -> Self {
        let divisor = Decimal::from(unit_divisor.max(1));

        let mut days: BTreeMap<NaiveDate, DayTotals> = BTreeMap::new();
        for row in rows {
            let day = days.entry(row.date).or_default();
            day.balance = row.balance;
            day.income += row.income;
            day.expense += row.expense;
            day.net += row.net;
        }

        let mut cumulative_income = Decimal::ZERO;
        let mut cumulative_expense = Decimal::ZERO;
        let mut cumulative_net = Decimal::ZERO;

        let rows = days
            .into_iter()
            .map(|(date, day)| {
                let income = day.income / divisor;
                let expense = -(day.expense / divisor);
                let net = day.net / divisor;
                cumulative_income += income;
                cumulative_expense += expense;
                cumulative_net += net;
                DashboardRow {
                    date,
                    balance: day.balance / divisor,
                    income,
                    expense,
                    net,
                    cumulative_income,
                    cumulative_expense,
                    cumulative_net,
                }
            })
            .collect();

        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// X axis values
    pub fn dates(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.date.format("%Y-%m-%d").to_string())
            .collect()
    }

    /// Y values of one series
    pub fn series(&self, kind: SeriesKind) -> Vec<Decimal> {
        self.rows.iter().map(|r| r.value(kind)).collect()
    }
}

/// Loaded dashboard of one month
pub struct Dashboard {
    year_month: YearMonth,
    directory: PathBuf,
    unit_divisor: u32,
    settings: ChartSettings,
    table: DashboardTable,
    store: StoreRef,
    logger: LoggerRef,
}

impl Dashboard {
    /// Read the persisted ledger of a month and aggregate it
    pub fn load(
        config: &Config,
        store: StoreRef,
        logger: LoggerRef,
        year_month: YearMonth,
    ) -> CoreResult<Self> {
        let mut dashboard = Self {
            year_month,
            directory: config.tmp.file_path.clone(),
            unit_divisor: config.dashboard.unit_divisor,
            settings: ChartSettings::from_config(config),
            table: DashboardTable::default(),
            store,
            logger,
        };
        dashboard.reload()?;
        Ok(dashboard)
    }

    /// Re-read the ledger file; the current table is kept on failure
    pub fn reload(&mut self) -> CoreResult<()> {
        let rows = self.store.read(&self.directory, self.year_month)?;
        self.table = DashboardTable::from_ledger(&rows, self.unit_divisor);
        self.logger.log_info(
            "dashboard",
            &format!("{} days loaded for {}", self.table.len(), self.year_month),
        );
        Ok(())
    }

    pub fn year_month(&self) -> YearMonth {
        self.year_month
    }

    pub fn table(&self) -> &DashboardTable {
        &self.table
    }

    pub fn settings(&self) -> &ChartSettings {
        &self.settings
    }

    /// Chart for the selected series; `None` when nothing is selected
    pub fn chart(&self, selected: &[SeriesKind]) -> Option<ChartSpec> {
        chart_spec(&self.table, selected, &self.settings)
    }
}
