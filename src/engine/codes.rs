use chrono::{DateTime, NaiveDate, Utc};

/// Document families that draw day-scoped sequential codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePrefix {
    Transaction,
    Purchase,
}

impl CodePrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodePrefix::Transaction => "TRX",
            CodePrefix::Purchase => "PUR",
        }
    }
}

/// Render `PREFIX-YYYYMMDD-NNN`. The counter is zero-padded to three
/// digits and simply grows wider past 999.
pub fn format_code(prefix: CodePrefix, date: NaiveDate, number: i64) -> String {
    format!("{}-{}-{:03}", prefix.as_str(), date.format("%Y%m%d"), number)
}

/// Reference code for a manual stock adjustment.
pub fn adjustment_reference(at: DateTime<Utc>) -> String {
    format!("ADJ-{}", at.timestamp())
}
