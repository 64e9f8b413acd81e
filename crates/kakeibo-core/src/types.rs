//! Basic types for the dashboard

use serde::{Deserialize, Serialize};

/// Selectable chart series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    /// 残高
    Balance,
    /// 収入
    Income,
    /// 支出
    Expense,
    /// 収支
    Net,
    /// 累計収入
    CumulativeIncome,
    /// 累計支出
    CumulativeExpense,
    /// 累計収支
    CumulativeNet,
}

impl SeriesKind {
    /// All series, in the order the selector lists them
    pub const ALL: [SeriesKind; 7] = [
        SeriesKind::Balance,
        SeriesKind::Income,
        SeriesKind::Expense,
        SeriesKind::Net,
        SeriesKind::CumulativeIncome,
        SeriesKind::CumulativeExpense,
        SeriesKind::CumulativeNet,
    ];

    /// Display label, also the option value in the selector
    pub fn label(&self) -> &'static str {
        match self {
            SeriesKind::Balance => "残高",
            SeriesKind::Income => "収入",
            SeriesKind::Expense => "支出",
            SeriesKind::Net => "収支",
            SeriesKind::CumulativeIncome => "累計収入",
            SeriesKind::CumulativeExpense => "累計支出",
            SeriesKind::CumulativeNet => "累計収支",
        }
    }

    /// ASCII key for API clients
    pub fn key(&self) -> &'static str {
        match self {
            SeriesKind::Balance => "balance",
            SeriesKind::Income => "income",
            SeriesKind::Expense => "expense",
            SeriesKind::Net => "net",
            SeriesKind::CumulativeIncome => "cumulative_income",
            SeriesKind::CumulativeExpense => "cumulative_expense",
            SeriesKind::CumulativeNet => "cumulative_net",
        }
    }

    /// Parse a selection, skipping unknown labels and repeats
    pub fn parse_selection<S: AsRef<str>>(values: &[S]) -> Vec<SeriesKind> {
        let mut selected = Vec::new();
        for value in values {
            if let Ok(kind) = value.as_ref().parse::<SeriesKind>() {
                if !selected.contains(&kind) {
                    selected.push(kind);
                }
            }
        }
        selected
    }
}

impl std::str::FromStr for SeriesKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        SeriesKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.label() == s || kind.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Invalid series: {}", s))
    }
}

impl std::fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label_and_key() {
        assert_eq!("残高".parse::<SeriesKind>().unwrap(), SeriesKind::Balance);
        assert_eq!("累計収支".parse::<SeriesKind>().unwrap(), SeriesKind::CumulativeNet);
        assert_eq!("cumulative_income".parse::<SeriesKind>().unwrap(), SeriesKind::CumulativeIncome);
        assert!("貯金".parse::<SeriesKind>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for kind in SeriesKind::ALL {
            assert_eq!(kind.to_string().parse::<SeriesKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_parse_selection_keeps_order_drops_unknown_and_repeats() {
        let selected = SeriesKind::parse_selection(&["支出", "unknown", "残高", "expense"]);
        assert_eq!(selected, vec![SeriesKind::Expense, SeriesKind::Balance]);
    }
}
