mod project;
mod document;
mod finance;
mod summary;

pub use project::{Project, ProjectDraft, ProjectStatus};
pub use document::{Document, DocumentDraft, DOCUMENT_TYPES};
pub use finance::{FinanceDraft, FinanceRecord, PaymentMode, RecordKind};
pub use summary::{DashboardSummary, FinanceTotals};

/// Serde helpers for the loosely typed fields the backend sends.
///
/// Postgres `NUMERIC` columns come back as strings and `DATE` columns as
/// either `YYYY-MM-DD` or a full ISO timestamp, so the models accept both.
pub(crate) mod wire {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Option::<NumberOrString>::deserialize(deserializer)? {
            None => Ok(0.0),
            Some(NumberOrString::Number(n)) => Ok(n),
            Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(0.0),
            Some(NumberOrString::Text(s)) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| serde::de::Error::custom(format!("invalid number: {s}"))),
        }
    }

    pub fn optional_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        match Option::<NumberOrString>::deserialize(deserializer)? {
            None => Ok(None),
            Some(NumberOrString::Number(n)) => Ok(Some(n as i64)),
            Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(NumberOrString::Text(s)) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("invalid id: {s}"))),
        }
    }

    /// Parses the leading `YYYY-MM-DD` of a date or timestamp string.
    pub fn parse_date(raw: &str) -> Option<NaiveDate> {
        let head = raw.trim().get(..10)?;
        NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
    }

    pub fn optional_date<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse_date(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {s}"))),
        }
    }

    pub fn date_string<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn optional_date_string<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => date_string(date, serializer),
            None => serializer.serialize_str(""),
        }
    }

    pub fn display_date(date: Option<NaiveDate>) -> String {
        date.map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }

}
