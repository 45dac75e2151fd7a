//! Domain models for Finsight
//!
//! Transactions, budgets and account balances are owned by external
//! providers and consumed here as read-only snapshots. Dates arrive in
//! several shapes and are normalized to [`NaiveDate`] at deserialization.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Bucket used for transactions without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Direction of a transaction. Amounts are always positive magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "credit" => Ok(Self::Income),
            "expense" | "debit" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A financial transaction snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub name: String,
    /// Positive magnitude; direction lives in `tx_type`
    pub amount: f64,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub account_id: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Minimal constructor used by hosts and tests; optional fields start empty
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        amount: f64,
        tx_type: TransactionType,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            amount,
            tx_type,
            category: None,
            category_id: None,
            account_id: String::new(),
            date,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = account_id.into();
        self
    }

    /// Amount is a finite, strictly positive magnitude
    pub fn is_well_formed(&self) -> bool {
        self.amount.is_finite() && self.amount > 0.0
    }

    pub fn is_expense(&self) -> bool {
        self.tx_type == TransactionType::Expense
    }

    /// Category name, collapsing missing or blank values to [`UNCATEGORIZED`]
    pub fn category_label(&self) -> &str {
        match self.category.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c,
            _ => UNCATEGORIZED,
        }
    }

    pub fn as_candidate(&self) -> Candidate {
        Candidate {
            name: self.name.clone(),
            amount: self.amount,
            tx_type: self.tx_type,
        }
    }
}

/// A transaction being evaluated before it is compared to history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
}

impl Candidate {
    pub fn new(name: impl Into<String>, amount: f64, tx_type: TransactionType) -> Self {
        Self {
            name: name.into(),
            amount,
            tx_type,
        }
    }
}

/// Budget entry supplied by the budgets provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub category: String,
    pub limit: f64,
    pub spent: f64,
}

impl Budget {
    pub fn new(category: impl Into<String>, limit: f64, spent: f64) -> Self {
        Self {
            category: category.into(),
            limit,
            spent,
        }
    }

    /// spent / limit, or None when the entry cannot be evaluated
    pub fn utilization(&self) -> Option<f64> {
        if !self.limit.is_finite() || self.limit <= 0.0 || !self.spent.is_finite() {
            return None;
        }
        Some(self.spent / self.limit)
    }
}

/// Account balance supplied by the accounts provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub name: String,
    pub balance: f64,
}

impl AccountBalance {
    pub fn new(name: impl Into<String>, balance: f64) -> Self {
        Self {
            name: name.into(),
            balance,
        }
    }
}

/// Format an amount as dollars with cents and thousands separators
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Date representations accepted from external stores
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ExternalDate {
    /// `2024-01-15`, `01/15/2024` or an RFC 3339 timestamp
    Text(String),
    /// Milliseconds since the Unix epoch
    Millis(i64),
    /// Firestore-style timestamp object
    Timestamp {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },
}

impl ExternalDate {
    /// Calendar date of this value
    pub fn to_date(&self) -> Result<NaiveDate> {
        match self {
            Self::Text(s) => {
                let s = s.trim();
                if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    return Ok(date);
                }
                if let Ok(date) = NaiveDate::parse_from_str(s, "%m/%d/%Y") {
                    return Ok(date);
                }
                DateTime::parse_from_rfc3339(s)
                    .map(|dt| dt.date_naive())
                    .map_err(|_| Error::InvalidDate(s.to_string()))
            }
            _ => self.to_timestamp().map(|dt| dt.date_naive()),
        }
    }

    /// Instant of this value; plain dates resolve to midnight UTC
    pub fn to_timestamp(&self) -> Result<DateTime<Utc>> {
        match self {
            Self::Text(s) => {
                if let Ok(dt) = DateTime::parse_from_rfc3339(s.trim()) {
                    return Ok(dt.with_timezone(&Utc));
                }
                let date = self.to_date()?;
                Ok(date.and_time(NaiveTime::MIN).and_utc())
            }
            Self::Millis(ms) => DateTime::from_timestamp_millis(*ms)
                .ok_or_else(|| Error::InvalidDate(format!("{} ms", ms))),
            Self::Timestamp {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(*seconds, *nanoseconds)
                .ok_or_else(|| Error::InvalidDate(format!("{}s {}ns", seconds, nanoseconds))),
        }
    }
}

fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = ExternalDate::deserialize(deserializer)?;
    raw.to_date().map_err(serde::de::Error::custom)
}

fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<ExternalDate> = Option::deserialize(deserializer)?;
    raw.map(|r| r.to_timestamp())
        .transpose()
        .map_err(serde::de::Error::custom)
}
