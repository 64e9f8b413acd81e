//! Calendar helpers: the per-month date grid

use chrono::NaiveDate;
use kakeibo_store::YearMonth;

/// Every calendar date of one month, ascending, without gaps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateGrid {
    year_month: YearMonth,
    dates: Vec<NaiveDate>,
}

impl DateGrid {
    /// Build the grid from the first day up to the day before the next month
    pub fn for_month(year_month: YearMonth) -> Self {
        let dates = year_month
            .first_day()
            .iter_days()
            .take_while(|d| *d <= year_month.last_day())
            .collect();
        Self { year_month, dates }
    }

    pub fn year_month(&self) -> YearMonth {
        self.year_month
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
