use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::Resource;
use crate::models::wire;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    #[default]
    Income,
    Expense,
}

impl RecordKind {
    /// Value substituted for `:kind` in the create route.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Income => Self::Expense,
            Self::Expense => Self::Income,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentMode {
    #[default]
    BankTransfer,
    Cash,
    Cheque,
}

impl PaymentMode {
    pub const ALL: [PaymentMode; 3] = [PaymentMode::BankTransfer, PaymentMode::Cash, PaymentMode::Cheque];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BankTransfer => "Bank Transfer",
            Self::Cash => "Cash",
            Self::Cheque => "Cheque",
        }
    }

    /// Matches the stored free text case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(raw.trim()))
    }

    pub fn next(self) -> Self {
        match self {
            Self::BankTransfer => Self::Cash,
            Self::Cash => Self::Cheque,
            Self::Cheque => Self::BankTransfer,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Self::BankTransfer => Self::Cheque,
            Self::Cash => Self::BankTransfer,
            Self::Cheque => Self::Cash,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FinanceRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "wire::optional_id")]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub client_name: String,
    #[serde(default, deserialize_with = "wire::number")]
    pub amount: f64,
    #[serde(default, deserialize_with = "wire::optional_date")]
    pub date_received: Option<NaiveDate>,
    #[serde(default)]
    pub payment_mode: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub kind: RecordKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinanceDraft {
    pub project_id: i64,
    pub client_name: String,
    pub amount: f64,
    #[serde(serialize_with = "wire::date_string")]
    pub date_received: NaiveDate,
    pub payment_mode: String,
    pub notes: String,
    #[serde(skip)]
    pub kind: RecordKind,
}

impl From<&FinanceRecord> for FinanceDraft {
    fn from(record: &FinanceRecord) -> Self {
        Self {
            project_id: record.project_id.unwrap_or_default(),
            client_name: record.client_name.clone(),
            amount: record.amount,
            date_received: record
                .date_received
                .unwrap_or_else(|| chrono::Local::now().date_naive()),
            payment_mode: record.payment_mode.clone(),
            notes: record.notes.clone().unwrap_or_default(),
            kind: record.kind,
        }
    }
}

#[derive(Deserialize)]
struct Ledger {
    #[serde(default)]
    income: Vec<Value>,
    #[serde(default, alias = "expenses")]
    expense: Vec<Value>,
}

fn decode_kind(rows: Vec<Value>, kind: RecordKind) -> Result<Vec<FinanceRecord>, serde_json::Error> {
    rows.into_iter()
        .map(|row| {
            let mut record: FinanceRecord = serde_json::from_value(row)?;
            record.kind = kind;
            Ok(record)
        })
        .collect()
}

impl Resource for FinanceRecord {
    type Id = i64;
    type Draft = FinanceDraft;
    const NAME: &'static str = "finance record";

    fn id(&self) -> i64 {
        self.id
    }

    /// Accepts `{ "income": [..], "expense": [..] }` or a plain array with a
    /// `kind` field per row.
    fn decode_list(body: Value) -> Result<Vec<Self>, serde_json::Error> {
        if body.is_array() {
            return serde_json::from_value(body);
        }
        let ledger: Ledger = serde_json::from_value(body)?;
        let mut records = decode_kind(ledger.income, RecordKind::Income)?;
        records.extend(decode_kind(ledger.expense, RecordKind::Expense)?);
        Ok(records)
    }

    fn route_params(draft: &FinanceDraft) -> Vec<(&'static str, String)> {
        vec![("kind", draft.kind.as_str().to_string())]
    }
}
