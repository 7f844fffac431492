use serde::Deserialize;

use crate::models::wire;
use crate::models::{FinanceRecord, RecordKind};

/// Aggregates served by `GET /api/dashboard`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct DashboardSummary {
    #[serde(default, deserialize_with = "wire::number")]
    pub total_income: f64,
    #[serde(default, deserialize_with = "wire::number")]
    pub total_expense: f64,
    #[serde(default, deserialize_with = "wire::number")]
    pub net_profit: f64,
}

impl DashboardSummary {
    /// Net profit as a percentage of income, zero when there is no income.
    pub fn margin_percent(&self) -> f64 {
        if self.total_income > 0.0 {
            self.net_profit / self.total_income * 100.0
        } else {
            0.0
        }
    }
}

/// Totals over whatever records the finance screen currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FinanceTotals {
    pub income: f64,
    pub expense: f64,
}

impl FinanceTotals {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a FinanceRecord>) -> Self {
        records
            .into_iter()
            .fold(Self::default(), |mut totals, record| {
                match record.kind {
                    RecordKind::Income => totals.income += record.amount,
                    RecordKind::Expense => totals.expense += record.amount,
                }
                totals
            })
    }

    pub fn net(&self) -> f64 {
        self.income - self.expense
    }
}
